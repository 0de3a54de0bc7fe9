//! Smoke tests for the onboard CLI
//!
//! None of these need a device, Appium or chromedriver.

#![allow(deprecated)] // Command::cargo_bin
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;

/// Get a command for the onboard binary with a clean environment
fn onboard() -> Command {
    let mut cmd = Command::cargo_bin("onboard").expect("onboard binary should exist");
    for key in [
        "EXPLICIT_WAIT_MS",
        "APPIUM_HOST",
        "APPIUM_PORT",
        "ANDROID_DEVICE_NAME",
        "ANDROID_UDID",
        "ANDROID_PLATFORM_VERSION",
        "APP_PATH",
        "APP_PACKAGE",
        "APP_ACTIVITY",
        "PARTNER_PORTAL_URL",
        "CHROMEDRIVER_URL",
        "REPORTS_DIR",
        "HEADLESS",
        "RUST_LOG",
    ] {
        let _ = cmd.env_remove(key);
    }
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    onboard()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.3.0"));
}

#[test]
fn test_help_lists_commands() {
    onboard()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("register"))
        .stdout(predicate::str::contains("partner"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_no_args_fails() {
    onboard().assert().failure();
}

#[test]
fn test_register_rejects_unknown_role() {
    onboard()
        .args(["register", "--role", "admin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("admin"));
}

// ============================================================================
// Config Command
// ============================================================================

#[test]
fn test_config_prints_defaults() {
    let output = onboard().arg("config").assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["android"]["appium_port"], 4723);
    assert_eq!(json["android"]["app_package"], "com.pounce.ssds.dev");
    assert_eq!(json["web"]["chromedriver_url"], "http://localhost:9515");
    assert_eq!(json["reports_dir"], "reports");
    assert!(json["explicit_wait_ms"].is_null());
}

#[test]
fn test_config_reads_environment() {
    let output = onboard()
        .arg("config")
        .env("APPIUM_PORT", "4800")
        .env("HEADLESS", "yes")
        .env("PARTNER_PORTAL_URL", "https://portal.test")
        .assert()
        .success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["android"]["appium_port"], 4800);
    assert_eq!(json["web"]["headless"], true);
    assert_eq!(json["web"]["portal_url"], "https://portal.test");
}

#[test]
fn test_config_rejects_bad_port() {
    onboard()
        .arg("config")
        .env("APPIUM_PORT", "not-a-port")
        .assert()
        .failure()
        .stderr(predicate::str::contains("APPIUM_PORT must be a number"));
}

#[test]
fn test_config_treats_empty_variables_as_unset() {
    let output = onboard()
        .arg("config")
        .env("APPIUM_PORT", "")
        .env("EXPLICIT_WAIT_MS", "")
        .assert()
        .success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["android"]["appium_port"], 4723);
    assert!(json["explicit_wait_ms"].is_null());
}

#[test]
fn test_config_arguments_override_environment() {
    let output = onboard()
        .args(["config", "--appium-port", "4801", "--headless"])
        .env("APPIUM_PORT", "4800")
        .assert()
        .success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["android"]["appium_port"], 4801);
    assert_eq!(json["web"]["headless"], true);
}

// ============================================================================
// Partner Command
// ============================================================================

#[test]
fn test_partner_without_portal_url_fails() {
    onboard()
        .arg("partner")
        .assert()
        .failure()
        .stderr(predicate::str::contains("PARTNER_PORTAL_URL"));
}
