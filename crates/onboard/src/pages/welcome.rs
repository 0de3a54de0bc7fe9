//! App launch screen.

use super::PageObject;
use crate::driver::UiDriver;
use crate::page::NativePage;
use crate::result::OnboardResult;
use async_trait::async_trait;
use std::time::Duration;

/// Create-account button on the launch screen
pub const CREATE_ACCOUNT_BUTTON: &str = "//android.widget.Button[@content-desc=\"CREATE ACCOUNT\"]";

/// Cold app start can be slow on emulators
pub const LOAD_TIMEOUT: Duration = Duration::from_secs(20);

/// Launch screen of the app
#[derive(Debug)]
pub struct WelcomePage<'d, D: UiDriver + ?Sized> {
    page: NativePage<'d, D>,
}

impl<'d, D: UiDriver + ?Sized> WelcomePage<'d, D> {
    /// Wrap a native base page
    #[must_use]
    pub const fn new(page: NativePage<'d, D>) -> Self {
        Self { page }
    }

    /// Base page
    #[must_use]
    pub const fn page(&self) -> &NativePage<'d, D> {
        &self.page
    }

    /// Start registration.
    ///
    /// # Errors
    ///
    /// `ElementNotVisible` if the button never shows.
    pub async fn tap_create_account(&self) -> OnboardResult<()> {
        self.page.tap(CREATE_ACCOUNT_BUTTON, None).await
    }
}

#[async_trait]
impl<D: UiDriver + ?Sized> PageObject for WelcomePage<'_, D> {
    fn page_name(&self) -> &'static str {
        "WelcomePage"
    }

    async fn is_loaded(&self) -> bool {
        self.page
            .is_displayed(CREATE_ACCOUNT_BUTTON, Some(LOAD_TIMEOUT))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement};
    use crate::result::OnboardError;

    #[tokio::test(start_paused = true)]
    async fn test_loaded_and_tap() {
        let driver = MockDriver::new().with_element(CREATE_ACCOUNT_BUTTON, MockElement::visible());
        let welcome = WelcomePage::new(NativePage::new(&driver));
        assert!(welcome.is_loaded().await);
        welcome.tap_create_account().await.unwrap();
        assert!(driver.was_called("click://android.widget.Button"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_loaded_waits_twenty_seconds() {
        let driver = MockDriver::new();
        let welcome = WelcomePage::new(NativePage::new(&driver));
        let start = tokio::time::Instant::now();
        let err = welcome.ensure_loaded().await.unwrap_err();
        assert_eq!(start.elapsed(), LOAD_TIMEOUT);
        assert!(matches!(err, OnboardError::AssertionFailed { .. }));
        assert_eq!(err.to_string(), "Assertion failed: WelcomePage is not loaded");
    }
}
