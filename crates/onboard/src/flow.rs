//! Registration and partner flows.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ Welcome → RoleSelect → PersonalDetails → Pin → Address      │
//! │   ├─ client:  → CardInfo                                    │
//! │   └─ service: → BankAccount → Pricing                       │
//! │ → Submit → SuccessDialog                                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each state's exit transition is one page-object action sequence run as a
//! named step by [`StepRunner`]. The first failing step stops the flow; the
//! remaining steps are recorded as skipped.

use crate::artifacts::Artifacts;
use crate::data::{PartnerData, Role, UserData};
use crate::driver::UiDriver;
use crate::page::{NativePage, WebPage};
use crate::pages::{AvailabilityPoll, PageObject, PartnerPortalPage, RegistrationPage, WelcomePage};
use crate::picker::DialOrder;
use crate::report::{StepRecord, SuiteReport};
use crate::result::{OnboardError, OnboardResult};
use crate::wait::{pause, DEFAULT_NATIVE_WAIT_MS, DEFAULT_WEB_WAIT_MS};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

/// Pause after the phone formatter runs and between PIN entries
pub const FORM_SETTLE: Duration = Duration::from_secs(3);

// ============================================================================
// Step runner
// ============================================================================

/// Runs named steps in order against one session.
///
/// A failed step gets a screenshot named after it; every later step is
/// recorded as skipped without running.
#[derive(Debug)]
pub struct StepRunner<'d, D: UiDriver + ?Sized> {
    driver: &'d D,
    artifacts: Artifacts,
    report: SuiteReport,
    error: Option<OnboardError>,
}

impl<'d, D: UiDriver + ?Sized> StepRunner<'d, D> {
    /// Runner for the flow named `flow`
    #[must_use]
    pub fn new(driver: &'d D, artifacts: Artifacts, flow: impl Into<String>) -> Self {
        Self {
            driver,
            artifacts,
            report: SuiteReport::new(flow),
            error: None,
        }
    }

    /// Whether a step has failed
    #[must_use]
    pub const fn has_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Run `action` as step `name`. Returns whether it ran and passed.
    pub async fn step<F, Fut>(&mut self, name: &str, action: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = OnboardResult<()>>,
    {
        if self.has_failed() {
            info!(step = name, "skipped");
            self.report.record(StepRecord::skipped(name));
            return false;
        }

        info!(step = name, "step started");
        let start = Instant::now();
        let result = action().await;
        let duration = start.elapsed();

        match result {
            Ok(()) => {
                info!(step = name, elapsed_ms = duration.as_millis() as u64, "step passed");
                self.report.record(StepRecord::passed(name, duration));
                true
            }
            Err(e) => {
                warn!(step = name, error = %e, "step failed");
                let mut record = StepRecord::failed(name, duration, e.to_string());
                match self.artifacts.save_screenshot(self.driver, name).await {
                    Ok(path) => record = record.with_screenshot(path),
                    Err(capture) => warn!(step = name, error = %capture, "failure screenshot not saved"),
                }
                self.report.record(record);
                self.error = Some(e);
                false
            }
        }
    }

    /// Finish the run
    #[must_use]
    pub fn finish(self) -> FlowOutcome {
        info!("{}", self.report.summary());
        FlowOutcome {
            report: self.report,
            error: self.error,
        }
    }
}

/// Report of a finished flow plus the error that stopped it
#[derive(Debug)]
pub struct FlowOutcome {
    /// Per-step records
    pub report: SuiteReport,
    /// First step error, untouched
    pub error: Option<OnboardError>,
}

impl FlowOutcome {
    /// Whether every step passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.error.is_none()
    }

    /// The report, or the error of the failing step
    ///
    /// # Errors
    ///
    /// The original error of the first failed step.
    pub fn into_result(self) -> OnboardResult<SuiteReport> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.report),
        }
    }
}

// ============================================================================
// Registration
// ============================================================================

/// States of the registration wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationStep {
    /// App launch screen
    Welcome,
    /// Client or service tile
    RoleSelect,
    /// Names, phone, email and date of birth
    PersonalDetails,
    /// PIN and confirmation
    Pin,
    /// Street, city and postal code
    Address,
    /// Pre-filled test card (client)
    CardInfo,
    /// Payout IBAN (service)
    BankAccount,
    /// Pre-filled price per kilometre (service)
    Pricing,
    /// Create account
    Submit,
    /// "Account created" dialog
    SuccessDialog,
}

impl RegistrationStep {
    /// Following state for `role`, `None` after the success dialog
    #[must_use]
    pub const fn next(self, role: Role) -> Option<Self> {
        match (self, role) {
            (Self::Welcome, _) => Some(Self::RoleSelect),
            (Self::RoleSelect, _) => Some(Self::PersonalDetails),
            (Self::PersonalDetails, _) => Some(Self::Pin),
            (Self::Pin, _) => Some(Self::Address),
            (Self::Address, Role::Client) => Some(Self::CardInfo),
            (Self::Address, Role::Service) => Some(Self::BankAccount),
            (Self::BankAccount, _) => Some(Self::Pricing),
            (Self::CardInfo | Self::Pricing, _) => Some(Self::Submit),
            (Self::Submit, _) => Some(Self::SuccessDialog),
            (Self::SuccessDialog, _) => None,
        }
    }

    /// Every state visited by `role`, in order
    #[must_use]
    pub fn path(role: Role) -> Vec<Self> {
        std::iter::successors(Some(Self::Welcome), |s| s.next(role)).collect()
    }

    /// Step name used in reports and screenshot names
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Welcome => "Welcome",
            Self::RoleSelect => "Role Select",
            Self::PersonalDetails => "Personal Details",
            Self::Pin => "PIN",
            Self::Address => "Address",
            Self::CardInfo => "Card Info",
            Self::BankAccount => "Bank Account",
            Self::Pricing => "Pricing",
            Self::Submit => "Submit",
            Self::SuccessDialog => "Success Dialog",
        }
    }
}

impl std::fmt::Display for RegistrationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// End-to-end account registration for one user
#[derive(Debug, Clone)]
pub struct RegistrationFlow {
    user: UserData,
    dial_order: DialOrder,
    settle: Duration,
    timeout: Duration,
}

impl RegistrationFlow {
    /// Flow for `user` with default dial order and waits
    #[must_use]
    pub fn new(user: UserData) -> Self {
        Self {
            user,
            dial_order: DialOrder::default(),
            settle: FORM_SETTLE,
            timeout: Duration::from_millis(DEFAULT_NATIVE_WAIT_MS),
        }
    }

    /// Set the date picker dial order
    #[must_use]
    pub const fn with_dial_order(mut self, order: DialOrder) -> Self {
        self.dial_order = order;
        self
    }

    /// Set the form settle pause
    #[must_use]
    pub const fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Set the default explicit wait
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// User being registered
    #[must_use]
    pub const fn user(&self) -> &UserData {
        &self.user
    }

    /// Report name, e.g. `client_registration`
    #[must_use]
    pub fn name(&self) -> String {
        format!("{}_registration", self.user.role).to_lowercase()
    }

    /// Drive the wizard from launch to the dismissed success dialog
    pub async fn run<D: UiDriver + ?Sized>(&self, driver: &D, artifacts: &Artifacts) -> FlowOutcome {
        let page = || {
            NativePage::new(driver)
                .with_timeout(self.timeout)
                .with_artifacts(artifacts.clone())
        };
        let welcome = WelcomePage::new(page());
        let registration = RegistrationPage::new(page());

        let mut runner = StepRunner::new(driver, artifacts.clone(), self.name());
        for step in RegistrationStep::path(self.user.role) {
            let _ = runner
                .step(step.title(), || self.perform(step, &welcome, &registration))
                .await;
        }
        runner.finish()
    }

    async fn perform<D: UiDriver + ?Sized>(
        &self,
        step: RegistrationStep,
        welcome: &WelcomePage<'_, D>,
        registration: &RegistrationPage<'_, D>,
    ) -> OnboardResult<()> {
        let user = &self.user;
        match step {
            RegistrationStep::Welcome => {
                welcome.ensure_loaded().await?;
                welcome.tap_create_account().await
            }
            RegistrationStep::RoleSelect => {
                registration.ensure_loaded().await?;
                registration.select_role(user.role).await
            }
            RegistrationStep::PersonalDetails => {
                registration.enter_first_name(&user.first_name).await?;
                registration.enter_last_name(&user.last_name).await?;
                registration.enter_phone(&user.phone).await?;
                registration.loose_focus_from_phone().await?;
                pause(self.settle).await;
                registration.enter_email(&user.email).await?;
                registration
                    .enter_date_of_birth(user.date_of_birth, self.dial_order)
                    .await?;
                registration.tap_next().await
            }
            RegistrationStep::Pin => {
                registration.enter_pin(&user.pin).await?;
                pause(self.settle).await;
                registration.confirm_pin(&user.pin).await?;
                registration.tap_next().await
            }
            RegistrationStep::Address => {
                registration.enter_street(&user.street).await?;
                if !user.additional_address.is_empty() {
                    registration
                        .enter_additional_address(&user.additional_address)
                        .await?;
                }
                registration.enter_city(&user.city).await?;
                registration.enter_postal_code(&user.postal_code).await?;
                registration.tap_next().await
            }
            RegistrationStep::CardInfo | RegistrationStep::Pricing => registration.tap_next().await,
            RegistrationStep::BankAccount => {
                registration
                    .enter_account_number(&user.account_number)
                    .await?;
                registration.tap_next().await
            }
            RegistrationStep::Submit => registration.tap_create_account().await,
            RegistrationStep::SuccessDialog => {
                if !registration.is_success_dialog_displayed().await {
                    return Err(OnboardError::assertion(
                        "registration success dialog not displayed",
                    ));
                }
                registration.dismiss_success_dialog().await
            }
        }
    }
}

// ============================================================================
// Partner portal
// ============================================================================

/// Partner onboarding through the web portal
#[derive(Debug, Clone)]
pub struct PartnerFlow {
    partner: PartnerData,
    base_url: String,
    poll: AvailabilityPoll,
    timeout: Duration,
}

impl PartnerFlow {
    /// Report name
    pub const NAME: &'static str = "partner_registration";

    /// Flow for `partner` against the portal at `base_url`
    #[must_use]
    pub fn new(partner: PartnerData, base_url: impl Into<String>) -> Self {
        Self {
            partner,
            base_url: base_url.into(),
            poll: AvailabilityPoll::default(),
            timeout: Duration::from_millis(DEFAULT_WEB_WAIT_MS),
        }
    }

    /// Set the server availability poll
    #[must_use]
    pub const fn with_poll(mut self, poll: AvailabilityPoll) -> Self {
        self.poll = poll;
        self
    }

    /// Set the default explicit wait
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Partner being registered
    #[must_use]
    pub const fn partner(&self) -> &PartnerData {
        &self.partner
    }

    /// Open the portal, fill the join form and check the success message
    pub async fn run<D: UiDriver + ?Sized>(&self, driver: &D, artifacts: &Artifacts) -> FlowOutcome {
        let page = WebPage::new(driver)
            .with_timeout(self.timeout)
            .with_artifacts(artifacts.clone());
        let portal = PartnerPortalPage::new(page, self.base_url.clone()).with_poll(self.poll);
        let partner = &self.partner;
        let portal = &portal;

        let mut runner = StepRunner::new(driver, artifacts.clone(), Self::NAME);
        let _ = runner.step("Open Portal", || portal.open()).await;
        let _ = runner.step("Portal Loaded", || portal.ensure_loaded()).await;
        let _ = runner
            .step("Business ID", || async move {
                portal.enter_business_id(&partner.business_id).await?;
                portal.wait_for_auto_fill().await;
                Ok(())
            })
            .await;
        let _ = runner
            .step("Business Type", || {
                portal.select_business_type(&partner.business_type)
            })
            .await;
        let _ = runner
            .step("Address", || async move {
                portal.enter_address(&partner.address).await?;
                portal.enter_postal_code(&partner.postal_code).await?;
                portal.enter_city(&partner.city).await?;
                if let Some(country) = &partner.country {
                    portal.select_country(country).await?;
                }
                Ok(())
            })
            .await;
        let _ = runner
            .step("Contact Person", || async move {
                portal.enter_first_name(&partner.first_name).await?;
                portal.enter_last_name(&partner.last_name).await?;
                portal.enter_mobile(&partner.mobile).await?;
                portal.enter_email(&partner.email).await
            })
            .await;
        let _ = runner.step("Submit", || portal.submit_application()).await;
        let _ = runner
            .step("Success Message", || async move {
                if portal.is_submitted().await {
                    Ok(())
                } else {
                    Err(OnboardError::assertion(
                        "partner application success message not displayed",
                    ))
                }
            })
            .await;
        runner.finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::MockDriver;
    use crate::report::StepStatus;

    mod state_machine_tests {
        use super::*;
        use RegistrationStep::*;

        #[test]
        fn test_client_path() {
            assert_eq!(
                RegistrationStep::path(Role::Client),
                vec![
                    Welcome,
                    RoleSelect,
                    PersonalDetails,
                    Pin,
                    Address,
                    CardInfo,
                    Submit,
                    SuccessDialog
                ]
            );
        }

        #[test]
        fn test_service_path() {
            assert_eq!(
                RegistrationStep::path(Role::Service),
                vec![
                    Welcome,
                    RoleSelect,
                    PersonalDetails,
                    Pin,
                    Address,
                    BankAccount,
                    Pricing,
                    Submit,
                    SuccessDialog
                ]
            );
        }

        #[test]
        fn test_no_transition_after_success() {
            assert_eq!(SuccessDialog.next(Role::Client), None);
            assert_eq!(SuccessDialog.next(Role::Service), None);
        }

        #[test]
        fn test_titles_are_unique() {
            let mut titles: Vec<_> = RegistrationStep::path(Role::Service)
                .into_iter()
                .chain([CardInfo])
                .map(RegistrationStep::title)
                .collect();
            titles.sort_unstable();
            titles.dedup();
            assert_eq!(titles.len(), 10);
        }
    }

    mod runner_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_skips_after_failure_and_keeps_error() {
            let dir = tempfile::tempdir().unwrap();
            let driver = MockDriver::new();
            let mut runner = StepRunner::new(&driver, Artifacts::new(dir.path()), "demo");

            assert!(runner.step("first", || async { Ok(()) }).await);
            assert!(
                !runner
                    .step("second", || async { Err(OnboardError::invalid_data("bad pin")) })
                    .await
            );
            let mut ran = false;
            assert!(
                !runner
                    .step("third", || {
                        ran = true;
                        async { Ok(()) }
                    })
                    .await
            );
            assert!(!ran);

            let outcome = runner.finish();
            let statuses: Vec<_> = outcome.report.steps.iter().map(|s| s.status).collect();
            assert_eq!(
                statuses,
                vec![StepStatus::Passed, StepStatus::Failed, StepStatus::Skipped]
            );
            let failed = &outcome.report.steps[1];
            assert_eq!(failed.error.as_deref(), Some("Invalid test data: bad pin"));
            let shot = failed.screenshot.as_ref().unwrap();
            assert!(shot.starts_with(dir.path().join("screenshots")));
            assert!(shot.exists());

            let err = outcome.into_result().unwrap_err();
            assert!(matches!(err, OnboardError::InvalidData { .. }));
        }

        #[tokio::test(start_paused = true)]
        async fn test_screenshot_failure_is_soft() {
            let dir = tempfile::tempdir().unwrap();
            let driver = MockDriver::new();
            driver.fail_on("screenshot");
            let mut runner = StepRunner::new(&driver, Artifacts::new(dir.path()), "demo");

            let _ = runner
                .step("broken", || async { Err(OnboardError::assertion("nope")) })
                .await;
            let outcome = runner.finish();
            assert!(outcome.report.steps[0].screenshot.is_none());
            assert!(matches!(
                outcome.error,
                Some(OnboardError::AssertionFailed { .. })
            ));
        }

        #[tokio::test(start_paused = true)]
        async fn test_records_step_duration() {
            let driver = MockDriver::new();
            let mut runner = StepRunner::new(&driver, Artifacts::default(), "demo");
            let _ = runner
                .step("wait", || async {
                    pause(Duration::from_secs(2)).await;
                    Ok(())
                })
                .await;
            let outcome = runner.finish();
            assert!(outcome.passed());
            assert_eq!(outcome.report.steps[0].duration, Duration::from_secs(2));
        }
    }

    #[test]
    fn test_flow_names() {
        let flow = RegistrationFlow::new(UserData::valid(Role::Service));
        assert_eq!(flow.name(), "service_registration");
        assert_eq!(PartnerFlow::NAME, "partner_registration");
    }
}
