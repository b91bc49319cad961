//! Deep merge of configuration layers
//!
//! Maps merge key by key; every other pairing (sequences, scalars, booleans,
//! mismatched kinds) is replaced wholesale by the overlay. Values are moved
//! between trees untouched, so a boolean leaf stays a boolean.

use crate::config::document::ConfigDocument;
use serde_yaml::{Mapping, Value};

/// Merge `overlay` on top of `base`, returning a new document
///
/// Neither input is modified. The overlay wins every conflict that is not
/// map-versus-map.
#[must_use]
pub fn merge(base: &ConfigDocument, overlay: &ConfigDocument) -> ConfigDocument {
    let mut merged = base.clone();
    merge_into(merged.as_mapping_mut(), overlay.as_mapping());
    merged
}

/// Fold `layers` left to right onto `base`; the last layer is strongest
#[must_use]
pub fn merge_all<'a, I>(base: &ConfigDocument, layers: I) -> ConfigDocument
where
    I: IntoIterator<Item = &'a ConfigDocument>,
{
    layers
        .into_iter()
        .fold(base.clone(), |acc, layer| merge(&acc, layer))
}

/// Recursively merge one mapping into another in place
pub fn merge_into(base: &mut Mapping, overlay: &Mapping) {
    for (key, overlay_value) in overlay {
        match base.get_mut(key) {
            Some(base_value) => merge_value(base_value, overlay_value),
            None => {
                base.insert(key.clone(), overlay_value.clone());
            }
        }
    }
}

/// Merge a single value in place
pub fn merge_value(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            merge_into(base_map, overlay_map);
        }
        (base, overlay) => {
            *base = overlay.clone();
        }
    }
}

/// Layer `layers` in order under nothing: the first is weakest, the last wins
#[must_use]
pub fn layered(layers: &[&Mapping]) -> Mapping {
    let mut merged = Mapping::new();
    for layer in layers {
        merge_into(&mut merged, layer);
    }
    merged
}
