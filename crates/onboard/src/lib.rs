//! Onboard: page-object automation for the registration app and partner portal
//!
//! Drives the Android registration wizard through Appium (UiAutomator2) and
//! the partner onboarding form through chromedriver, both over the W3C
//! WebDriver wire protocol.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    ONBOARD Architecture                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Flows +    │    │ Page       │    │ Base pages │            │
//! │   │ StepRunner │───►│ objects    │───►│ (waits,    │            │
//! │   │            │    │            │    │  fallback) │            │
//! │   └────────────┘    └────────────┘    └─────┬──────┘            │
//! │         │                                   ▼                   │
//! │   ┌─────▼──────┐                     ┌────────────┐             │
//! │   │ SuiteReport│                     │ UiDriver   │──► Appium / │
//! │   │ screenshots│                     │            │   chrome    │
//! │   └────────────┘                     └────────────┘             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

mod artifacts;
mod capabilities;
mod config;
mod data;
mod flow;
mod report;
mod result;
mod retry;
mod selector;
mod wait;

/// UiDriver trait and its transports
pub mod driver;

/// Base pages shared by every page object
pub mod page;

/// Page objects, one per screen
pub mod pages;

/// Date picker dials
#[allow(clippy::doc_markdown)]
pub mod picker;

pub use artifacts::{sanitize_name, screenshot_file_name, timestamp, Artifacts, DEFAULT_REPORTS_DIR};
pub use capabilities::{android_capabilities, chrome_capabilities};
pub use config::{AndroidConfig, SuiteConfig, WebConfig};
pub use data::{
    business_id_is_valid, iban_is_valid, invalid_users, local_phone_number, unique_email,
    Address, DateOfBirth, PartnerData, Role, UserData, COUNTRY_CODE, DEFAULT_PIN,
};
#[cfg(feature = "wire")]
pub use driver::WebDriverSession;
pub use driver::{
    Direction, ElementHandle, Gesture, Key, MockDriver, MockElement, Rect, UiDriver, WindowSize,
};
pub use flow::{FlowOutcome, PartnerFlow, RegistrationFlow, RegistrationStep, StepRunner, FORM_SETTLE};
pub use page::{LoaderOutcome, NativePage, Probe, WebPage};
pub use pages::{
    AvailabilityPoll, PageObject, PartnerPortalPage, RegistrationPage, WelcomePage,
};
pub use picker::{DatePicker, DateField, DialOrder};
pub use report::{StepRecord, StepStatus, SuiteReport};
pub use result::{OnboardError, OnboardResult};
pub use retry::{retry, RetryPolicy};
pub use selector::Selector;
pub use wait::{poll_until, WaitOptions, WaitOutcome};

/// Generated test data
pub mod generate {
    pub use super::data::{
        business_id, date_of_birth, finnish_iban, phone_number, BUSINESS_TYPES,
    };
}

/// Prelude for convenient imports
pub mod prelude {
    pub use super::{
        Artifacts, DateOfBirth, DialOrder, FlowOutcome, MockDriver, MockElement, NativePage,
        OnboardError, OnboardResult, PageObject, PartnerData, PartnerFlow, Probe,
        RegistrationFlow, Role, Selector, StepRunner, SuiteConfig, UiDriver, UserData, WebPage,
    };
}
