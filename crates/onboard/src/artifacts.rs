//! Run artifacts: screenshots and result files under the reports directory.
//!
//! ```text
//! reports/
//! ├── screenshots/{sanitized}_{YYYYMMDD_HHmmss}.png
//! └── results/{flow}_{YYYYMMDD_HHmmss}.json
//! ```

use crate::driver::UiDriver;
use crate::result::{OnboardError, OnboardResult};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::info;

/// Default reports root
pub const DEFAULT_REPORTS_DIR: &str = "reports";

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Reduce a free-form name to a filesystem-safe stem.
///
/// Whitespace runs become a single `_`; anything outside `[A-Za-z0-9_-]` is
/// then dropped.
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for c in name.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            out.push(c);
        }
    }
    out
}

/// Local-time stamp used in artifact names
#[must_use]
pub fn timestamp(at: DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// `{sanitized}_{YYYYMMDD_HHmmss}.png`
#[must_use]
pub fn screenshot_file_name(name: &str, at: DateTime<Local>) -> String {
    format!("{}_{}.png", sanitize_name(name), timestamp(at))
}

/// Artifact locations for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    root: PathBuf,
}

impl Default for Artifacts {
    fn default() -> Self {
        Self::new(DEFAULT_REPORTS_DIR)
    }
}

impl Artifacts {
    /// Artifacts rooted at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Reports root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for screenshots
    #[must_use]
    pub fn screenshots_dir(&self) -> PathBuf {
        self.root.join("screenshots")
    }

    /// Directory for JSON results
    #[must_use]
    pub fn results_dir(&self) -> PathBuf {
        self.root.join("results")
    }

    /// Capture the screen and write it under the screenshots directory.
    ///
    /// # Errors
    ///
    /// Returns `Screenshot` if the driver cannot capture, or `Io` if the file
    /// cannot be written.
    pub async fn save_screenshot<D>(&self, driver: &D, name: &str) -> OnboardResult<PathBuf>
    where
        D: UiDriver + ?Sized,
    {
        let png = driver.screenshot().await.map_err(|e| match e {
            OnboardError::Screenshot { .. } => e,
            other => OnboardError::Screenshot {
                message: other.to_string(),
            },
        })?;

        let dir = self.screenshots_dir();
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(screenshot_file_name(name, Local::now()));
        tokio::fs::write(&path, png).await?;

        info!(path = %path.display(), "screenshot saved");
        Ok(path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::MockDriver;
    use chrono::TimeZone;

    mod sanitize_tests {
        use super::*;

        #[test]
        fn test_whitespace_and_punctuation() {
            assert_eq!(sanitize_name("Step 1: Test!"), "Step_1_Test");
        }

        #[test]
        fn test_whitespace_runs_collapse() {
            assert_eq!(sanitize_name("a \t  b"), "a_b");
        }

        #[test]
        fn test_keeps_dash_and_underscore() {
            assert_eq!(sanitize_name("pin-confirm_2"), "pin-confirm_2");
        }

        #[test]
        fn test_drops_non_ascii() {
            assert_eq!(sanitize_name("Käyttäjä"), "Kyttj");
        }
    }

    mod name_tests {
        use super::*;

        #[test]
        fn test_screenshot_file_name_format() {
            let at = Local.with_ymd_and_hms(2026, 3, 7, 9, 5, 2).unwrap();
            assert_eq!(
                screenshot_file_name("Step 1: Test!", at),
                "Step_1_Test_20260307_090502.png"
            );
        }
    }

    mod save_tests {
        use super::*;

        #[tokio::test]
        async fn test_save_writes_png_under_screenshots() {
            let dir = tempfile::tempdir().unwrap();
            let artifacts = Artifacts::new(dir.path());
            let driver = MockDriver::new();
            driver.set_screenshot(vec![1, 2, 3]);

            let path = artifacts.save_screenshot(&driver, "after submit").await.unwrap();

            assert!(path.starts_with(dir.path().join("screenshots")));
            let file_name = path.file_name().unwrap().to_string_lossy().to_string();
            assert!(file_name.starts_with("after_submit_"));
            assert!(file_name.ends_with(".png"));
            assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);
        }

        #[tokio::test]
        async fn test_capture_failure_maps_to_screenshot_error() {
            let dir = tempfile::tempdir().unwrap();
            let driver = MockDriver::new();
            driver.fail_on("screenshot");

            let err = Artifacts::new(dir.path())
                .save_screenshot(&driver, "x")
                .await
                .unwrap_err();
            assert!(matches!(err, OnboardError::Screenshot { .. }));
        }
    }
}
