use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_config_path_command() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("quill")
        .env("QUILL_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_set_url_writes_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    cargo_bin_cmd!("quill")
        .env("QUILL_HOME", dir.path())
        .args(["config", "set-url", "https://blog.example.com/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://blog.example.com"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("base_url = \"https://blog.example.com\""));
}

#[test]
fn test_config_set_url_rejects_garbage() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("quill")
        .env("QUILL_HOME", dir.path())
        .args(["config", "set-url", "not a url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid base URL"));
}
