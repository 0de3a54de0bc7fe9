//! Partner Portal join form (web).
//!
//! The portal runs on a host that cold-starts slowly and answers 502 while
//! warming up, so [`PartnerPortalPage::open`] polls for the landing marker
//! and refreshes until it shows or the availability deadline passes.

use super::PageObject;
use crate::data::{local_phone_number, PartnerData};
use crate::driver::UiDriver;
use crate::page::WebPage;
use crate::result::{OnboardError, OnboardResult};
use crate::wait::millis;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Block that only renders once the app server is up
pub const LANDING_MARKER: &str = "div.join-courier";

/// Tom Select input of the country picker
pub const COUNTRY_INPUT_ID: &str = "country_id_select-ts-control";

// Business
/// Y-tunnus input
pub const BUSINESS_ID_INPUT: &str = "#text_business_id";
/// Native business type `<select>`
pub const BUSINESS_TYPE_SELECT: &str = "select[name=\"business_type\"]";

// Address
/// Street address, backed by a Places autocomplete
pub const ADDRESS_INPUT: &str = "#text_business_address";
pub const POSTAL_CODE_INPUT: &str = "#text_business_postal_code";
pub const CITY_INPUT: &str = "#text_business_city";

// Contact person
pub const FIRST_NAME_INPUT: &str = "#text_first_name";
pub const LAST_NAME_INPUT: &str = "#text_last_name";
/// Mobile input with a fixed `+358` prefix
pub const MOBILE_INPUT: &str = "#mobile";
pub const EMAIL_INPUT: &str = "#text_email";

/// Form submit button
pub const SUBMIT_BUTTON: &str = "button[type=\"submit\"]";
/// Banner shown after an accepted application
pub const SUCCESS_MESSAGE: &str = ".alert-success, [class*=\"success\"]";

/// Livewire round trip that fills the company name from the business id
pub const AUTO_FILL_SETTLE: Duration = Duration::from_secs(2);

/// How long to wait for the success banner
pub const SUBMITTED_TIMEOUT: Duration = Duration::from_secs(10);

/// Timing of the server-availability poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityPoll {
    /// How long each attempt waits for the landing marker
    pub marker_timeout: Duration,
    /// Pause before refreshing
    pub retry_interval: Duration,
    /// Give up once this much time has passed
    pub deadline: Duration,
}

impl Default for AvailabilityPoll {
    fn default() -> Self {
        Self {
            marker_timeout: Duration::from_secs(5),
            retry_interval: Duration::from_secs(10),
            deadline: Duration::from_secs(120),
        }
    }
}

impl AvailabilityPoll {
    /// Set the per-attempt marker timeout
    #[must_use]
    pub const fn with_marker_timeout(mut self, timeout: Duration) -> Self {
        self.marker_timeout = timeout;
        self
    }

    /// Set the pause between attempts
    #[must_use]
    pub const fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Set the overall deadline
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }
}

/// Partner sign-up form
#[derive(Debug)]
pub struct PartnerPortalPage<'d, D: UiDriver + ?Sized> {
    page: WebPage<'d, D>,
    base_url: String,
    poll: AvailabilityPoll,
}

impl<'d, D: UiDriver + ?Sized> PartnerPortalPage<'d, D> {
    /// Form served at `base_url`
    #[must_use]
    pub fn new(page: WebPage<'d, D>, base_url: impl Into<String>) -> Self {
        Self {
            page,
            base_url: base_url.into(),
            poll: AvailabilityPoll::default(),
        }
    }

    /// Override the availability poll timing
    #[must_use]
    pub const fn with_poll(mut self, poll: AvailabilityPoll) -> Self {
        self.poll = poll;
        self
    }

    /// Base page
    #[must_use]
    pub const fn page(&self) -> &WebPage<'d, D> {
        &self.page
    }

    /// Load the portal, refreshing until the server answers.
    ///
    /// # Errors
    ///
    /// `ServerUnavailable` once the deadline has passed without the landing
    /// marker; driver failures on navigate/refresh.
    pub async fn open(&self) -> OnboardResult<()> {
        let started = Instant::now();
        self.page.navigate(&self.base_url).await?;

        while !self
            .page
            .is_displayed(LANDING_MARKER, Some(self.poll.marker_timeout))
            .await
        {
            let waited = started.elapsed();
            if waited > self.poll.deadline {
                return Err(OnboardError::ServerUnavailable {
                    url: self.base_url.clone(),
                    waited_ms: millis(waited),
                });
            }
            info!(
                url = %self.base_url,
                retry_in_ms = millis(self.poll.retry_interval),
                "server not ready, retrying"
            );
            tokio::time::sleep(self.poll.retry_interval).await;
            self.page.refresh().await?;
        }

        debug!(elapsed_ms = millis(started.elapsed()), "portal available");
        Ok(())
    }

    /// # Errors
    ///
    /// Wait or driver failures.
    pub async fn enter_business_id(&self, id: &str) -> OnboardResult<()> {
        self.page.fill(BUSINESS_ID_INPUT, id, None).await
    }

    /// Give the form time to fill the company name from the business id
    pub async fn wait_for_auto_fill(&self) {
        tokio::time::sleep(AUTO_FILL_SETTLE).await;
    }

    /// # Errors
    ///
    /// `ElementNotFound` if the type is not offered.
    pub async fn select_business_type(&self, business_type: &str) -> OnboardResult<()> {
        self.page
            .select_by_text(BUSINESS_TYPE_SELECT, business_type, None)
            .await
    }

    /// # Errors
    ///
    /// Wait or driver failures.
    pub async fn select_country(&self, country: &str) -> OnboardResult<()> {
        self.page.select_tom_select(COUNTRY_INPUT_ID, country).await
    }

    /// Type the street address and dismiss the Places autocomplete popup.
    ///
    /// # Errors
    ///
    /// Wait or driver failures.
    pub async fn enter_address(&self, address: &str) -> OnboardResult<()> {
        self.page.fill(ADDRESS_INPUT, address, None).await?;
        self.page.press_escape().await
    }

    /// # Errors
    ///
    /// Wait or driver failures.
    pub async fn enter_postal_code(&self, postal_code: &str) -> OnboardResult<()> {
        self.page.fill(POSTAL_CODE_INPUT, postal_code, None).await
    }

    /// # Errors
    ///
    /// Wait or driver failures.
    pub async fn enter_city(&self, city: &str) -> OnboardResult<()> {
        self.page.fill(CITY_INPUT, city, None).await
    }

    /// # Errors
    ///
    /// Wait or driver failures.
    pub async fn enter_first_name(&self, name: &str) -> OnboardResult<()> {
        self.page.fill(FIRST_NAME_INPUT, name, None).await
    }

    /// # Errors
    ///
    /// Wait or driver failures.
    pub async fn enter_last_name(&self, name: &str) -> OnboardResult<()> {
        self.page.fill(LAST_NAME_INPUT, name, None).await
    }

    /// The field shows `+358` as a fixed prefix, so the country code is
    /// stripped from the number before typing.
    ///
    /// # Errors
    ///
    /// Wait or driver failures.
    pub async fn enter_mobile(&self, mobile: &str) -> OnboardResult<()> {
        self.page
            .fill(MOBILE_INPUT, local_phone_number(mobile), None)
            .await
    }

    /// # Errors
    ///
    /// Wait or driver failures.
    pub async fn enter_email(&self, email: &str) -> OnboardResult<()> {
        self.page.fill(EMAIL_INPUT, email, None).await
    }

    /// # Errors
    ///
    /// Wait or driver failures.
    pub async fn submit_application(&self) -> OnboardResult<()> {
        self.page.scroll_to(SUBMIT_BUTTON, None).await?;
        self.page.click(SUBMIT_BUTTON, None).await
    }

    /// Fill every field of the form from `partner`.
    ///
    /// # Errors
    ///
    /// The first failing field.
    pub async fn fill_form(&self, partner: &PartnerData) -> OnboardResult<()> {
        self.enter_business_id(&partner.business_id).await?;
        self.wait_for_auto_fill().await;
        self.select_business_type(&partner.business_type).await?;
        self.enter_address(&partner.address).await?;
        self.enter_postal_code(&partner.postal_code).await?;
        self.enter_city(&partner.city).await?;
        if let Some(country) = &partner.country {
            self.select_country(country).await?;
        }
        self.enter_first_name(&partner.first_name).await?;
        self.enter_last_name(&partner.last_name).await?;
        self.enter_mobile(&partner.mobile).await?;
        self.enter_email(&partner.email).await
    }

    /// Whether the success banner shows within 10 s
    pub async fn is_submitted(&self) -> bool {
        self.page
            .is_displayed(SUCCESS_MESSAGE, Some(SUBMITTED_TIMEOUT))
            .await
    }
}

#[async_trait]
impl<D: UiDriver + ?Sized> PageObject for PartnerPortalPage<'_, D> {
    fn page_name(&self) -> &'static str {
        "PartnerPortalPage"
    }

    async fn is_loaded(&self) -> bool {
        self.page.is_displayed(BUSINESS_ID_INPUT, None).await
    }
}
