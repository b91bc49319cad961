//! Output sink shared by every subcommand

use crate::error::RizzoError;
use crate::system::System;
use crate::utils::path::expand_path;
use std::io::{self, Write as _};
use tracing::debug;

/// Destination name selecting standard output
pub const STDOUT: &str = "STDOUT";
/// Destination name selecting standard error
pub const STDERR: &str = "STDERR";

/// Write `content` to `dest`
///
/// `STDOUT` and `STDERR` select the process streams; anything else is a file
/// path, expanded like every other configured path.
///
/// # Errors
///
/// Returns an error if:
/// - The destination path cannot be expanded
/// - Writing to the stream or file fails
pub fn write_output(system: &dyn System, dest: &str, content: &str) -> Result<(), RizzoError> {
    match dest {
        STDOUT => write_stream(&mut io::stdout().lock(), dest, content),
        STDERR => write_stream(&mut io::stderr().lock(), dest, content),
        _ => {
            let path = expand_path(system, dest).map_err(|e| RizzoError::output(dest, e.to_string()))?;
            system
                .write(&path, content.as_bytes())
                .map_err(|e| RizzoError::output(path.display().to_string(), e.to_string()))?;
            debug!("Wrote {} bytes to {}", content.len(), path.display());
            Ok(())
        }
    }
}

fn write_stream(stream: &mut dyn io::Write, dest: &str, content: &str) -> Result<(), RizzoError> {
    stream
        .write_all(content.as_bytes())
        .and_then(|()| stream.flush())
        .map_err(|e| RizzoError::output(dest, e.to_string()))
}
