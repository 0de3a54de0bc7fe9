//! Environment configuration.
//!
//! Resolved once at start-up; every value has a hardcoded default except the
//! device identifiers, the app path and the portal URL. Empty variables count
//! as unset.

use crate::artifacts::DEFAULT_REPORTS_DIR;
use crate::result::{OnboardError, OnboardResult};
use crate::wait::{DEFAULT_NATIVE_WAIT_MS, DEFAULT_WEB_WAIT_MS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default Appium host
pub const DEFAULT_APPIUM_HOST: &str = "localhost";
/// Default Appium port
pub const DEFAULT_APPIUM_PORT: u16 = 4723;
/// Default device name capability
pub const DEFAULT_DEVICE_NAME: &str = "Android Device";
/// Package of the dev build
pub const DEFAULT_APP_PACKAGE: &str = "com.pounce.ssds.dev";
/// Launch activity
pub const DEFAULT_APP_ACTIVITY: &str = "com.pounce.ssds.MainActivity";
/// Default chromedriver endpoint
pub const DEFAULT_CHROMEDRIVER_URL: &str = "http://localhost:9515";

/// Appium / device settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AndroidConfig {
    /// `APPIUM_HOST`
    pub appium_host: String,
    /// `APPIUM_PORT`
    pub appium_port: u16,
    /// `ANDROID_DEVICE_NAME`
    pub device_name: String,
    /// `ANDROID_UDID`
    pub udid: Option<String>,
    /// `ANDROID_PLATFORM_VERSION`
    pub platform_version: Option<String>,
    /// `APP_PATH`; when unset the installed app is reused
    pub app_path: Option<PathBuf>,
    /// `APP_PACKAGE`
    pub app_package: String,
    /// `APP_ACTIVITY`
    pub app_activity: String,
}

impl Default for AndroidConfig {
    fn default() -> Self {
        Self {
            appium_host: DEFAULT_APPIUM_HOST.to_string(),
            appium_port: DEFAULT_APPIUM_PORT,
            device_name: DEFAULT_DEVICE_NAME.to_string(),
            udid: None,
            platform_version: None,
            app_path: None,
            app_package: DEFAULT_APP_PACKAGE.to_string(),
            app_activity: DEFAULT_APP_ACTIVITY.to_string(),
        }
    }
}

impl AndroidConfig {
    /// Appium server root, e.g. `http://localhost:4723`
    #[must_use]
    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.appium_host, self.appium_port)
    }

    /// `app_path` made absolute against the working directory
    #[must_use]
    pub fn resolved_app_path(&self) -> Option<PathBuf> {
        let path = self.app_path.as_deref()?;
        if path.is_absolute() {
            return Some(path.to_path_buf());
        }
        Some(
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf()),
        )
    }
}

/// Browser settings for the partner portal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebConfig {
    /// `PARTNER_PORTAL_URL`
    pub portal_url: Option<String>,
    /// `CHROMEDRIVER_URL`
    pub chromedriver_url: String,
    /// `HEADLESS`
    pub headless: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            portal_url: None,
            chromedriver_url: DEFAULT_CHROMEDRIVER_URL.to_string(),
            headless: false,
        }
    }
}

impl WebConfig {
    /// Portal base URL
    ///
    /// # Errors
    ///
    /// `Config` when `PARTNER_PORTAL_URL` is not set.
    pub fn portal_url(&self) -> OnboardResult<&str> {
        self.portal_url
            .as_deref()
            .ok_or_else(|| OnboardError::config("PARTNER_PORTAL_URL is not set"))
    }
}

/// Everything a run needs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// `EXPLICIT_WAIT_MS`; unset means the per-platform default
    pub explicit_wait_ms: Option<u64>,
    /// Native app settings
    pub android: AndroidConfig,
    /// Web settings
    pub web: WebConfig,
    /// `REPORTS_DIR`
    pub reports_dir: PathBuf,
}

impl SuiteConfig {
    /// Resolve from the process environment
    ///
    /// # Errors
    ///
    /// `Config` if a numeric or boolean variable does not parse.
    pub fn from_env() -> OnboardResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve through `lookup`
    ///
    /// # Errors
    ///
    /// `Config` if a numeric or boolean variable does not parse.
    pub fn from_lookup<F>(lookup: F) -> OnboardResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let android = AndroidConfig {
            appium_host: or("APPIUM_HOST", DEFAULT_APPIUM_HOST),
            appium_port: get("APPIUM_PORT")
                .map(|v| parse_number("APPIUM_PORT", &v))
                .transpose()?
                .unwrap_or(DEFAULT_APPIUM_PORT),
            device_name: or("ANDROID_DEVICE_NAME", DEFAULT_DEVICE_NAME),
            udid: get("ANDROID_UDID"),
            platform_version: get("ANDROID_PLATFORM_VERSION"),
            app_path: get("APP_PATH").map(PathBuf::from),
            app_package: or("APP_PACKAGE", DEFAULT_APP_PACKAGE),
            app_activity: or("APP_ACTIVITY", DEFAULT_APP_ACTIVITY),
        };

        let web = WebConfig {
            portal_url: get("PARTNER_PORTAL_URL"),
            chromedriver_url: or("CHROMEDRIVER_URL", DEFAULT_CHROMEDRIVER_URL),
            headless: get("HEADLESS")
                .map(|v| parse_bool("HEADLESS", &v))
                .transpose()?
                .unwrap_or(false),
        };

        Ok(Self {
            explicit_wait_ms: get("EXPLICIT_WAIT_MS")
                .map(|v| parse_number("EXPLICIT_WAIT_MS", &v))
                .transpose()?,
            android,
            web,
            reports_dir: PathBuf::from(or("REPORTS_DIR", DEFAULT_REPORTS_DIR)),
        })
    }

    /// Default explicit wait for native pages
    #[must_use]
    pub fn native_wait(&self) -> Duration {
        Duration::from_millis(self.explicit_wait_ms.unwrap_or(DEFAULT_NATIVE_WAIT_MS))
    }

    /// Default explicit wait for web pages
    #[must_use]
    pub fn web_wait(&self) -> Duration {
        Duration::from_millis(self.explicit_wait_ms.unwrap_or(DEFAULT_WEB_WAIT_MS))
    }

    /// Reports root
    #[must_use]
    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> OnboardResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| OnboardError::config(format!("{key} must be a number, got \"{raw}\"")))
}

fn parse_bool(key: &str, raw: &str) -> OnboardResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(OnboardError::config(format!(
            "{key} must be true or false, got \"{raw}\""
        ))),
    }
}
