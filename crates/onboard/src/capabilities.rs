//! W3C capability sets for Appium and chromedriver sessions.

use crate::config::{AndroidConfig, WebConfig};
use serde_json::{json, Map, Value};

/// UiAutomator2 server launch and install timeout
pub const SERVER_TIMEOUT_MS: u64 = 60_000;

/// Seconds Appium waits for the next command before ending the session
pub const NEW_COMMAND_TIMEOUT_S: u64 = 240;

/// Browser window size for the partner portal
pub const WINDOW_SIZE: (u32, u32) = (1440, 900);

/// Capabilities for the Android app under UiAutomator2.
///
/// Without an app path the installed build is reused (`noReset`).
#[must_use]
pub fn android_capabilities(config: &AndroidConfig) -> Value {
    let mut caps = Map::new();
    let mut set = |key: &str, value: Value| {
        let _ = caps.insert(key.to_string(), value);
    };

    set("platformName", json!("Android"));
    set("appium:automationName", json!("UiAutomator2"));
    set("appium:deviceName", json!(config.device_name));
    if let Some(udid) = &config.udid {
        set("appium:udid", json!(udid));
    }
    if let Some(version) = &config.platform_version {
        set("appium:platformVersion", json!(version));
    }

    let app = config.resolved_app_path();
    if let Some(path) = &app {
        set("appium:app", json!(path.to_string_lossy()));
    }
    set("appium:appPackage", json!(config.app_package));
    set("appium:appActivity", json!(config.app_activity));

    set("appium:noReset", json!(app.is_none()));
    set("appium:fullReset", json!(false));
    set("appium:forceAppLaunch", json!(true));
    set("appium:newCommandTimeout", json!(NEW_COMMAND_TIMEOUT_S));

    set("appium:autoGrantPermissions", json!(true));
    set("appium:disableWindowAnimation", json!(true));
    set("appium:uiautomator2ServerLaunchTimeout", json!(SERVER_TIMEOUT_MS));
    set("appium:uiautomator2ServerInstallTimeout", json!(SERVER_TIMEOUT_MS));
    set("appium:ignoreHiddenApiPolicyError", json!(true));

    Value::Object(caps)
}

/// Capabilities for Chrome via chromedriver
#[must_use]
pub fn chrome_capabilities(config: &WebConfig) -> Value {
    let (width, height) = WINDOW_SIZE;
    let mut args = vec![
        format!("--window-size={width},{height}"),
        "--disable-notifications".to_string(),
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
    ];
    if config.headless {
        args.push("--headless=new".to_string());
    }

    json!({
        "browserName": "chrome",
        "goog:chromeOptions": { "args": args },
    })
}
