//! CLI interface tests

#![expect(clippy::unwrap_used, reason = "This is a test module")]

use assert_cmd::Command;
use git2::Repository;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A home directory, a control repo and a bootstrap repo under one temp dir
struct Fixture {
    _dir: TempDir,
    root: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::create_dir_all(root.join("home")).unwrap();
        for repo in ["control", "bootstrap"] {
            fs::create_dir_all(root.join(repo)).unwrap();
            Repository::init(root.join(repo)).unwrap();
        }

        let fixture = Self { _dir: dir, root };
        fixture.write(
            "home/.rizzo.yaml",
            &format!(
                "control_repos:\n  - {control}\ndefaults:\n  bootstrap_repo_path: {bootstrap}\n",
                control = fixture.path("control").display(),
                bootstrap = fixture.path("bootstrap").display(),
            ),
        );
        fixture.write("control/.rizzo.yaml", CONTROL);
        fixture
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    fn write(&self, rel: &str, content: &str) {
        fs::write(self.path(rel), content).unwrap();
    }

    fn rizzo(&self) -> Command {
        let mut cmd = Command::cargo_bin("rizzo").unwrap();
        cmd.current_dir(&self.root)
            .env("HOME", self.path("home"))
            .env_remove("RZO_CONFIG")
            .env_remove("RZO_LOGTO")
            .env_remove("RZO_OUTPUT")
            .env_remove("RZO_VAGRANTFILE")
            .env_remove("RUST_LOG");
        cmd
    }
}

const CONTROL: &str = r#"
defaults:
  box: el7
  memory: "1024"
  bootstrap_guest_path: /tmp/bootstrap
  bootstrap_script_path: bootstrap.sh
  shutdown: true
puppetmaster:
  name: [puppet]
  modulepath: [./modules]
  synced_folders:
    /: {}
nodes:
  - name: puppet
    hostname: puppet.example.com
    ip: 10.0.0.5
    forwarded_ports:
      - guest: "8140"
        host: "8140"
  - name: web
    hostname: web.example.com
    ip: 10.0.0.6
"#;

#[test]
fn test_version_flag() {
    let mut cmd = Command::cargo_bin("rizzo").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rizzo"));
}

#[test]
fn test_help_flag() {
    let mut cmd = Command::cargo_bin("rizzo").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("roles"));
}

#[test]
fn test_no_subcommand_prints_help_and_fails() {
    let fixture = Fixture::new();
    fixture
        .rizzo()
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_unknown_option_fails_with_one() {
    let fixture = Fixture::new();
    fixture
        .rizzo()
        .arg("--no-such-flag")
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_missing_config_error() {
    let fixture = Fixture::new();
    fixture
        .rizzo()
        .args(["config", "--config", "/nonexistent/rizzo.yaml"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Cannot read config file"));
}

#[test]
fn test_invalid_yaml_config() {
    let fixture = Fixture::new();
    fixture.write("home/.rizzo.yaml", "control_repos: [\n");
    fixture
        .rizzo()
        .arg("config")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Could not parse rizzo config"));
}

#[test]
fn test_config_prints_merged_yaml() {
    let fixture = Fixture::new();
    let output = fixture.rizzo().arg("config").assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();

    let merged: serde_yaml::Value = serde_yaml::from_str(&stdout).unwrap();
    assert_eq!(
        merged["control_repos"][0].as_str().unwrap(),
        fixture.path("control").to_str().unwrap()
    );
    assert_eq!(merged["defaults"]["box"].as_str(), Some("el7"));
    assert_eq!(
        merged["defaults"]["bootstrap_repo_path"].as_str().unwrap(),
        fixture.path("bootstrap").to_str().unwrap()
    );
    assert_eq!(merged["nodes"].as_sequence().unwrap().len(), 2);
}

#[test]
fn test_config_to_file() {
    let fixture = Fixture::new();
    fixture
        .rizzo()
        .args(["config", "--output", "merged.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    let content = fs::read_to_string(fixture.path("merged.yaml")).unwrap();
    assert!(content.contains("puppetmaster:"));
}

#[test]
fn test_roles_lists_node_names() {
    let fixture = Fixture::new();
    fixture
        .rizzo()
        .arg("roles")
        .assert()
        .success()
        .stdout("puppet\nweb\n");
}

#[test]
fn test_generate_writes_vagrantfile() {
    let fixture = Fixture::new();
    fixture
        .rizzo()
        .args(["generate", "-o", "Vagrantfile"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote vagrant config to Vagrantfile"));

    let vagrantfile = fs::read_to_string(fixture.path("Vagrantfile")).unwrap();
    assert!(vagrantfile.contains("config.vm.define \"puppet\", autostart: false do |cfg|"));
    assert!(vagrantfile.contains("config.vm.define \"web\", autostart: false do |cfg|"));
    assert!(vagrantfile.contains("/bin/bash /tmp/bootstrap/bootstrap.sh"));
    assert!(vagrantfile.contains("modulepath = ./modules"));
    assert!(vagrantfile.contains("/sbin/shutdown -h now"));
}

#[test]
fn test_generate_default_destination_follows_env() {
    let fixture = Fixture::new();
    fixture
        .rizzo()
        .env("RZO_VAGRANTFILE", fixture.path("out/Vagrantfile"))
        .arg("generate")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Cannot write output"));

    fs::create_dir(fixture.path("out")).unwrap();
    fixture
        .rizzo()
        .env("RZO_VAGRANTFILE", fixture.path("out/Vagrantfile"))
        .arg("generate")
        .assert()
        .success();
    assert!(fixture.path("out/Vagrantfile").is_file());
}

#[test]
fn test_validation_failure_exits_two() {
    let fixture = Fixture::new();
    fixture.write("control/.rizzo.yaml", "nodes: []\n");
    fixture
        .rizzo()
        .arg("config")
        .assert()
        .failure()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Validation issues found"))
        .stderr(predicate::str::contains("puppetmaster"));
}

#[test]
fn test_missing_bootstrap_checkout_exits_two() {
    let fixture = Fixture::new();
    fs::remove_dir_all(fixture.path("bootstrap/.git")).unwrap();
    fixture
        .rizzo()
        .arg("roles")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("bootstrap_repo_path"));
}

#[test]
fn test_node_without_box_fails_generate() {
    let fixture = Fixture::new();
    fixture.write("control/.rizzo.yaml", &CONTROL.replace("  box: el7\n", ""));
    fixture
        .rizzo()
        .arg("generate")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("(node web)"));
    assert!(!fixture.path("Vagrantfile").exists());
}

#[test]
fn test_logto_file_with_debug() {
    let fixture = Fixture::new();
    fixture
        .rizzo()
        .args(["--debug", "--logto", "rizzo.log", "roles"])
        .assert()
        .success();
    let log = fs::read_to_string(fixture.path("rizzo.log")).unwrap();
    assert!(log.contains("Loaded"));
    assert!(log.contains(&fixture.path("control").display().to_string()));
}
