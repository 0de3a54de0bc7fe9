//! Multi-step account registration screens.

use super::PageObject;
use crate::data::{DateOfBirth, Role};
use crate::driver::UiDriver;
use crate::page::NativePage;
use crate::picker::{DatePicker, DialOrder};
use crate::result::OnboardResult;
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

// Role selection
pub const CLIENT_ROLE: &str = "//android.widget.ImageView[@content-desc=\"Client\"]";
pub const SERVICE_ROLE: &str = "//android.widget.ImageView[@content-desc=\"Service\"]";

// Personal details
pub const FIRST_NAME_INPUT: &str =
    "android=new UiSelector().className(\"android.widget.EditText\").instance(0)";
pub const LAST_NAME_INPUT: &str =
    "android=new UiSelector().className(\"android.widget.EditText\").instance(1)";
pub const PHONE_INPUT: &str =
    "android=new UiSelector().className(\"android.widget.EditText\").instance(2)";
pub const EMAIL_INPUT: &str =
    "android=new UiSelector().className(\"android.widget.EditText\").instance(3)";
pub const EMAIL_IN_SCROLL_VIEW: &str =
    "android=new UiSelector().className(\"android.widget.EditText\").instance(1)";

// Date of birth picker
pub const DATE_OF_BIRTH_TRIGGER: &str =
    "android=new UiSelector().className(\"android.view.View\").instance(17)";
pub const DATE_PICKER_OK: &str = "~OK";
pub const DATE_PICKER: DatePicker<'static> = DatePicker {
    day: "android=new UiSelector().className(\"android.widget.SeekBar\").instance(0)",
    month: "android=new UiSelector().className(\"android.widget.SeekBar\").instance(1)",
    year: "android=new UiSelector().className(\"android.widget.SeekBar\").instance(2)",
};

// PIN
pub const PIN_INPUT: &str =
    "android=new UiSelector().className(\"android.widget.EditText\").instance(0)";
pub const CONFIRM_PIN_INPUT: &str =
    "android=new UiSelector().className(\"android.widget.EditText\").instance(1)";
pub const CONFIRM_PIN_IN_SCROLL_VIEW: &str =
    "android=new UiSelector().className(\"android.widget.EditText\")";

// Address
pub const STREET_INPUT: &str =
    "android=new UiSelector().className(\"android.widget.EditText\").instance(0)";
pub const ADDITIONAL_ADDRESS_INPUT: &str =
    "android=new UiSelector().className(\"android.widget.EditText\").instance(1)";
pub const CITY_INPUT: &str =
    "android=new UiSelector().className(\"android.widget.EditText\").instance(2)";
pub const POSTAL_CODE_INPUT: &str =
    "android=new UiSelector().className(\"android.widget.EditText\").instance(3)";
pub const POSTAL_CODE_IN_SCROLL_VIEW: &str =
    "android=new UiSelector().className(\"android.widget.EditText\").instance(2)";

// Bank account
pub const ACCOUNT_NUMBER_INPUT: &str =
    "android=new UiSelector().className(\"android.widget.EditText\").instance(0)";

// Navigation and submit
pub const NEXT_BUTTON: &str =
    "(//android.widget.ImageView[@clickable=\"true\" and not(@content-desc)])[last()]";
pub const PREVIOUS_BUTTON: &str =
    "(//android.widget.ImageView[@clickable=\"true\" and not(@content-desc)])[1]";
pub const CREATE_ACCOUNT_BUTTON: &str = "//android.widget.Button[@content-desc=\"Create Account\"]";
pub const SUCCESS_DIALOG: &str =
    "//android.view.View[contains(@content-desc, \"successfully\")]";
pub const SUCCESS_OK_BUTTON: &str = "~OK";

pub const LOAD_TIMEOUT: Duration = Duration::from_secs(15);

/// Account creation can take a while on the backend
pub const SUCCESS_DIALOG_TIMEOUT: Duration = Duration::from_secs(30);

/// Multi-step registration form
#[derive(Debug)]
pub struct RegistrationPage<'d, D: UiDriver + ?Sized> {
    page: NativePage<'d, D>,
}

impl<'d, D: UiDriver + ?Sized> RegistrationPage<'d, D> {
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

    /// Choose client or service account
    ///
    /// # Errors
    ///
    /// `ElementNotVisible` if the role tile never shows.
    pub async fn select_role(&self, role: Role) -> OnboardResult<()> {
        let tile = match role {
            Role::Client => CLIENT_ROLE,
            Role::Service => SERVICE_ROLE,
        };
        self.page.tap(tile, None).await
    }

    /// # Errors
    ///
    /// Wait or driver failures.
    pub async fn enter_first_name(&self, name: &str) -> OnboardResult<()> {
        self.page.set_field(FIRST_NAME_INPUT, name, None).await
    }

    /// # Errors
    ///
    /// Wait or driver failures.
    pub async fn enter_last_name(&self, name: &str) -> OnboardResult<()> {
        self.page.set_field(LAST_NAME_INPUT, name, None).await
    }

    /// # Errors
    ///
    /// Wait or driver failures.
    pub async fn enter_phone(&self, phone: &str) -> OnboardResult<()> {
        self.page.set_field(PHONE_INPUT, phone, None).await
    }

    /// Move focus off the phone field so its formatter runs and the
    /// keyboard stops covering the email field.
    ///
    /// # Errors
    ///
    /// Wait or driver failures.
    pub async fn loose_focus_from_phone(&self) -> OnboardResult<()> {
        self.page.tap(EMAIL_INPUT, None).await
    }

    /// Email sits lower once the form has scrolled; either position works.
    ///
    /// # Errors
    ///
    /// Wait or driver failures.
    pub async fn enter_email(&self, email: &str) -> OnboardResult<()> {
        self.page
            .set_field_with_fallback(EMAIL_INPUT, EMAIL_IN_SCROLL_VIEW, email)
            .await
    }

    /// Open the date picker, dial in `dob` in `order` and confirm.
    ///
    /// # Errors
    ///
    /// Wait, parse or gesture failures.
    pub async fn enter_date_of_birth(&self, dob: DateOfBirth, order: DialOrder) -> OnboardResult<()> {
        self.page.tap(DATE_OF_BIRTH_TRIGGER, None).await?;
        DATE_PICKER.set_date(&self.page, dob, order).await?;
        self.page.tap(DATE_PICKER_OK, None).await
    }

    /// # Errors
    ///
    /// Wait or driver failures.
    pub async fn enter_pin(&self, pin: &str) -> OnboardResult<()> {
        self.page.set_field(PIN_INPUT, pin, None).await
    }

    /// # Errors
    ///
    /// Wait or driver failures.
    pub async fn confirm_pin(&self, pin: &str) -> OnboardResult<()> {
        self.page
            .set_field_with_fallback(CONFIRM_PIN_INPUT, CONFIRM_PIN_IN_SCROLL_VIEW, pin)
            .await
    }

    /// # Errors
    ///
    /// Wait or driver failures.
    pub async fn enter_street(&self, street: &str) -> OnboardResult<()> {
        self.page.set_field(STREET_INPUT, street, None).await
    }

    /// # Errors
    ///
    /// Wait or driver failures.
    pub async fn enter_additional_address(&self, line: &str) -> OnboardResult<()> {
        self.page.set_field(ADDITIONAL_ADDRESS_INPUT, line, None).await
    }

    /// # Errors
    ///
    /// Wait or driver failures.
    pub async fn enter_city(&self, city: &str) -> OnboardResult<()> {
        self.page.set_field(CITY_INPUT, city, None).await
    }

    /// # Errors
    ///
    /// Wait or driver failures.
    pub async fn enter_postal_code(&self, postal_code: &str) -> OnboardResult<()> {
        self.page
            .set_field_with_fallback(POSTAL_CODE_INPUT, POSTAL_CODE_IN_SCROLL_VIEW, postal_code)
            .await
    }

    /// # Errors
    ///
    /// Wait or driver failures.
    pub async fn enter_account_number(&self, iban: &str) -> OnboardResult<()> {
        self.page.set_field(ACCOUNT_NUMBER_INPUT, iban, None).await
    }

    /// Advance to the next form step
    ///
    /// # Errors
    ///
    /// Wait or driver failures.
    pub async fn tap_next(&self) -> OnboardResult<()> {
        self.page.tap(NEXT_BUTTON, None).await
    }

    /// Go back one form step
    ///
    /// # Errors
    ///
    /// Wait or driver failures.
    pub async fn tap_previous(&self) -> OnboardResult<()> {
        self.page.tap(PREVIOUS_BUTTON, None).await
    }

    /// Submit the registration
    ///
    /// # Errors
    ///
    /// Wait or driver failures.
    pub async fn tap_create_account(&self) -> OnboardResult<()> {
        self.page.tap(CREATE_ACCOUNT_BUTTON, None).await
    }

    /// Whether the "account created" dialog shows within 30 s
    pub async fn is_success_dialog_displayed(&self) -> bool {
        self.page
            .is_displayed(SUCCESS_DIALOG, Some(SUCCESS_DIALOG_TIMEOUT))
            .await
    }

    /// Close the success dialog
    ///
    /// # Errors
    ///
    /// Wait or driver failures.
    pub async fn dismiss_success_dialog(&self) -> OnboardResult<()> {
        self.page.tap(SUCCESS_OK_BUTTON, None).await?;
        info!("success dialog dismissed");
        Ok(())
    }
}

#[async_trait]
impl<D: UiDriver + ?Sized> PageObject for RegistrationPage<'_, D> {
    fn page_name(&self) -> &'static str {
        "RegistrationPage"
    }

    async fn is_loaded(&self) -> bool {
        self.page.is_displayed(CLIENT_ROLE, Some(LOAD_TIMEOUT)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement};

    fn page(driver: &MockDriver) -> RegistrationPage<'_, MockDriver> {
        RegistrationPage::new(NativePage::new(driver))
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_role_taps_matching_tile() {
        let driver = MockDriver::new()
            .with_element(CLIENT_ROLE, MockElement::visible())
            .with_element(SERVICE_ROLE, MockElement::visible());
        page(&driver).select_role(Role::Service).await.unwrap();
        assert!(driver.was_called(&format!("click:{SERVICE_ROLE}")));
        assert!(!driver.was_called(&format!("click:{CLIENT_ROLE}")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_enter_email_in_scrolled_layout() {
        let driver = MockDriver::new().with_element(EMAIL_IN_SCROLL_VIEW, MockElement::visible());
        page(&driver).enter_email("qa120000@example.com").await.unwrap();
        assert_eq!(
            driver.value_of(EMAIL_IN_SCROLL_VIEW).as_deref(),
            Some("qa120000@example.com")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirm_pin_primary_layout() {
        let driver = MockDriver::new()
            .with_element(CONFIRM_PIN_INPUT, MockElement::visible())
            .with_element(CONFIRM_PIN_IN_SCROLL_VIEW, MockElement::visible());
        page(&driver).confirm_pin("Test7@").await.unwrap();
        assert_eq!(driver.value_of(CONFIRM_PIN_INPUT).as_deref(), Some("Test7@"));
        assert_eq!(driver.lookups(CONFIRM_PIN_IN_SCROLL_VIEW), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_dialog_absent() {
        let driver = MockDriver::new();
        let start = tokio::time::Instant::now();
        assert!(!page(&driver).is_success_dialog_displayed().await);
        assert_eq!(start.elapsed(), SUCCESS_DIALOG_TIMEOUT);
    }

    #[tokio::test(start_paused = true)]
    async fn test_is_loaded_on_role_tiles() {
        let driver = MockDriver::new().with_element(CLIENT_ROLE, MockElement::visible());
        assert!(page(&driver).is_loaded().await);
    }
}
