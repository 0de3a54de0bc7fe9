//! Page objects for the registration app and the partner portal.
//!
//! Each page object owns a base page over a borrowed session and exposes
//! domain actions built from its primitives. Selectors are constant strings
//! in the shorthand understood by [`crate::Selector::parse`].

pub mod partner_portal;
pub mod registration;
pub mod welcome;

pub use partner_portal::{AvailabilityPoll, PartnerPortalPage, COUNTRY_INPUT_ID, LANDING_MARKER};
pub use registration::RegistrationPage;
pub use welcome::WelcomePage;

use crate::result::{OnboardError, OnboardResult};
use async_trait::async_trait;

/// Trait for page objects representing one screen of the UI.
#[async_trait]
pub trait PageObject: Send + Sync {
    /// Get the page name for logging/debugging
    fn page_name(&self) -> &'static str;

    /// Non-failing check that the screen is showing
    async fn is_loaded(&self) -> bool;

    /// Fail with `AssertionFailed` unless [`Self::is_loaded`] holds
    async fn ensure_loaded(&self) -> OnboardResult<()> {
        if self.is_loaded().await {
            Ok(())
        } else {
            Err(OnboardError::assertion(format!(
                "{} is not loaded",
                self.page_name()
            )))
        }
    }
}
