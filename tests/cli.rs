use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cli(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("guest-quota").unwrap();
    cmd.env_remove("RUST_LOG")
        .env("GUEST_QUOTA_DATA_DIR", data_dir.path())
        .arg("--config")
        .arg(data_dir.path().join("missing-config.toml"));
    cmd
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("guest-quota").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("guest-quota 0.1.0"));
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("guest-quota").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Track daily free uses of gated features for guest visitors",
        ));
}

#[test]
fn test_cli_check_missing_feature() {
    let dir = TempDir::new().unwrap();
    cli(&dir)
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "required arguments were not provided",
        ));
}

#[test]
fn test_cli_unknown_feature() {
    let dir = TempDir::new().unwrap();
    cli(&dir)
        .args(["check", "reservations"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown feature: reservations"));
}

#[test]
fn test_cli_status_fresh() {
    let dir = TempDir::new().unwrap();
    cli(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Search"))
        .stdout(predicate::str::contains("3/3 remaining"));
}

#[test]
fn test_cli_use_until_blocked() {
    let dir = TempDir::new().unwrap();

    cli(&dir)
        .args(["use", "menu-scrape"])
        .assert()
        .success()
        .stdout(predicate::str::contains("menu_scrape: used (0 remaining today)"));

    cli(&dir)
        .args(["use", "menu-scrape"])
        .assert()
        .code(3)
        .stdout(predicate::str::contains("free menu scraping tries"))
        .stdout(predicate::str::contains("[Sign up: /auth?mode=signup]"));

    assert!(dir.path().join("guest_usage.json").exists());
}

#[test]
fn test_cli_check_does_not_consume() {
    let dir = TempDir::new().unwrap();
    for _ in 0..3 {
        cli(&dir)
            .args(["check", "ai-analysis"])
            .assert()
            .success()
            .stdout(predicate::str::contains("1 remaining today"));
    }
}

#[test]
fn test_cli_signed_in_is_exempt() {
    let dir = TempDir::new().unwrap();
    for _ in 0..3 {
        cli(&dir)
            .args(["--signed-in", "use", "comparison"])
            .assert()
            .success();
    }
    assert!(!dir.path().join("guest_usage.json").exists());
}

#[test]
fn test_cli_clear() {
    let dir = TempDir::new().unwrap();
    cli(&dir).args(["register", "comparison"]).assert().success();
    cli(&dir).args(["check", "comparison"]).assert().code(3);

    cli(&dir)
        .arg("clear")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared guest usage"));

    cli(&dir).args(["check", "comparison"]).assert().success();
}

#[test]
fn test_cli_status_json() {
    let dir = TempDir::new().unwrap();
    cli(&dir).args(["register", "search"]).assert().success();

    let output = cli(&dir).args(["status", "--json"]).output().unwrap();
    assert!(output.status.success());

    let snapshot: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(snapshot["viewer"], "anonymous");
    assert_eq!(snapshot["features"]["search"]["used"], 1);
    assert_eq!(snapshot["features"]["search"]["remaining"], 2);
}

#[test]
fn test_cli_logs_loaded_config_file() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(&config_path, "[quota]\nsearch_limit = 5\n").unwrap();

    let mut cmd = Command::cargo_bin("guest-quota").unwrap();
    cmd.env_remove("RUST_LOG")
        .env("GUEST_QUOTA_DATA_DIR", dir.path())
        .arg("--config")
        .arg(&config_path)
        .args(["check", "search"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5 remaining"))
        .stderr(predicate::str::contains("Loaded configuration from"));
}

#[test]
fn test_cli_warns_on_unparsable_enabled_override() {
    let dir = TempDir::new().unwrap();
    cli(&dir)
        .env("GUEST_QUOTA_ENABLED", "yes")
        .args(["use", "menu-scrape"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Ignoring GUEST_QUOTA_ENABLED"));

    cli(&dir)
        .env("GUEST_QUOTA_ENABLED", "yes")
        .args(["use", "menu-scrape"])
        .assert()
        .code(3);
}
