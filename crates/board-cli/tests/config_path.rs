use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_config_path_command() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("board")
        .env("BOARD_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_creates_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    assert!(!config_path.exists());

    cargo_bin_cmd!("board")
        .env("BOARD_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config at"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("api_base_url ="));
    assert!(contents.contains("[auth]"));
}

#[test]
fn test_config_init_fails_if_exists() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "# existing config").unwrap();

    cargo_bin_cmd!("board")
        .env("BOARD_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_backend_keeps_other_values() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "posts_per_page = 25\n").unwrap();

    cargo_bin_cmd!("board")
        .env("BOARD_HOME", dir.path())
        .args(["config", "backend", "identity-provider"])
        .assert()
        .success()
        .stdout(predicate::str::contains("identity-provider"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("backend = \"identity-provider\""));
    assert!(contents.contains("posts_per_page = 25"));
}

#[test]
fn test_config_backend_rejects_unknown() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("board")
        .env("BOARD_HOME", dir.path())
        .args(["config", "backend", "ldap"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown backend"));
}

#[test]
fn test_help_lists_commands() {
    cargo_bin_cmd!("board")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("posts"))
        .stdout(predicate::str::contains("comments"));
}
