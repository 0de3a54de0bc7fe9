//! Browser base page.

use super::{check_visible, require_visible, Probe};
use crate::artifacts::Artifacts;
use crate::driver::{ElementHandle, Key, UiDriver};
use crate::result::{OnboardError, OnboardResult};
use crate::selector::{xpath_literal, Selector};
use crate::wait::DEFAULT_WEB_WAIT_MS;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Id suffix of a Tom Select text input
const TS_CONTROL_SUFFIX: &str = "-ts-control";

/// Id suffix of the matching Tom Select dropdown
const TS_DROPDOWN_SUFFIX: &str = "-ts-dropdown";

/// Selector for the option labelled `option_text` in the dropdown that
/// belongs to the Tom Select input `input_id`.
///
/// Tom Select ids follow `{base}-ts-control` / `{base}-ts-dropdown`.
///
/// # Errors
///
/// `InvalidSelector` if `input_id` does not end in `-ts-control`.
pub fn tom_select_option_selector(input_id: &str, option_text: &str) -> OnboardResult<String> {
    let base = input_id
        .strip_suffix(TS_CONTROL_SUFFIX)
        .filter(|base| !base.is_empty())
        .ok_or_else(|| OnboardError::InvalidSelector {
            selector: input_id.to_string(),
            message: format!("Tom Select input id must end in \"{TS_CONTROL_SUFFIX}\""),
        })?;
    Ok(format!(
        "//*[@id={}]//*[contains(concat(' ', normalize-space(@class), ' '), ' option ') and normalize-space(.)={}]",
        xpath_literal(&format!("{base}{TS_DROPDOWN_SUFFIX}")),
        xpath_literal(option_text),
    ))
}

/// Selector for a native `<option>` below a `<select>`
fn option_by_text(text: &str) -> String {
    format!(".//option[normalize-space(.)={}]", xpath_literal(text))
}

/// Primitives for browser pages.
///
/// `timeout: None` means the page default (`EXPLICIT_WAIT_MS`, 15 s).
#[derive(Debug)]
pub struct WebPage<'d, D: UiDriver + ?Sized> {
    driver: &'d D,
    default_timeout: Duration,
    artifacts: Artifacts,
}

impl<'d, D: UiDriver + ?Sized> WebPage<'d, D> {
    /// Create a page over `driver` with default settings
    #[must_use]
    pub fn new(driver: &'d D) -> Self {
        Self {
            driver,
            default_timeout: Duration::from_millis(DEFAULT_WEB_WAIT_MS),
            artifacts: Artifacts::default(),
        }
    }

    /// Set the default explicit wait
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Set where screenshots go
    #[must_use]
    pub fn with_artifacts(mut self, artifacts: Artifacts) -> Self {
        self.artifacts = artifacts;
        self
    }

    /// Underlying driver
    #[must_use]
    pub const fn driver(&self) -> &'d D {
        self.driver
    }

    /// Default explicit wait
    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    fn resolve(&self, timeout: Option<Duration>) -> Duration {
        timeout.unwrap_or(self.default_timeout)
    }

    /// Wait until `selector` is visible.
    ///
    /// # Errors
    ///
    /// `ElementNotVisible` on timeout; driver errors propagate.
    pub async fn wait_for_element(
        &self,
        selector: &str,
        timeout: Option<Duration>,
    ) -> OnboardResult<ElementHandle> {
        let selector = Selector::parse(selector);
        debug!(%selector, "wait_for_element");
        require_visible(self.driver, &selector, self.resolve(timeout)).await
    }

    /// Wait for the element, then click it.
    ///
    /// # Errors
    ///
    /// Same as [`Self::wait_for_element`], plus click failures.
    pub async fn click(&self, selector: &str, timeout: Option<Duration>) -> OnboardResult<()> {
        let handle = self.wait_for_element(selector, timeout).await?;
        self.driver.click(&handle).await
    }

    /// Clear an input and type `value` into it.
    ///
    /// # Errors
    ///
    /// Same as [`Self::wait_for_element`], plus driver failures.
    pub async fn fill(
        &self,
        selector: &str,
        value: &str,
        timeout: Option<Duration>,
    ) -> OnboardResult<()> {
        let handle = self.wait_for_element(selector, timeout).await?;
        debug!(selector, "fill");
        self.driver.clear(&handle).await?;
        self.driver.set_value(&handle, value).await
    }

    /// Pick the `<option>` of a native `<select>` by its visible text.
    ///
    /// # Errors
    ///
    /// `ElementNotFound` if no option carries `text`; otherwise as
    /// [`Self::wait_for_element`].
    pub async fn select_by_text(
        &self,
        selector: &str,
        text: &str,
        timeout: Option<Duration>,
    ) -> OnboardResult<()> {
        let select = self.wait_for_element(selector, timeout).await?;
        let option = Selector::xpath(option_by_text(text));
        let handle = self
            .driver
            .find_child(&select, &option)
            .await?
            .ok_or_else(|| OnboardError::ElementNotFound {
                selector: format!("{selector} >> {option}"),
                elapsed_ms: 0,
            })?;
        self.driver.click(&handle).await
    }

    /// Visible text of an element.
    ///
    /// # Errors
    ///
    /// Same as [`Self::wait_for_element`].
    pub async fn get_text(&self, selector: &str, timeout: Option<Duration>) -> OnboardResult<String> {
        let handle = self.wait_for_element(selector, timeout).await?;
        self.driver.text(&handle).await
    }

    /// Visibility lookup that never fails; driver errors count as `NotFound`.
    pub async fn probe(&self, selector: &str, timeout: Option<Duration>) -> Probe {
        check_visible(self.driver, &Selector::parse(selector), self.resolve(timeout)).await
    }

    /// Whether `selector` becomes visible within the timeout. Never fails.
    pub async fn is_displayed(&self, selector: &str, timeout: Option<Duration>) -> bool {
        self.probe(selector, timeout).await.is_found()
    }

    /// Scroll the element into the middle of the viewport.
    ///
    /// # Errors
    ///
    /// Same as [`Self::wait_for_element`].
    pub async fn scroll_to(&self, selector: &str, timeout: Option<Duration>) -> OnboardResult<()> {
        let handle = self.wait_for_element(selector, timeout).await?;
        self.driver.scroll_into_view(&handle).await
    }

    /// Press Escape on the focused element (closes autocomplete popups).
    ///
    /// # Errors
    ///
    /// Driver failures.
    pub async fn press_escape(&self) -> OnboardResult<()> {
        self.driver.press_key(Key::Escape).await
    }

    /// Load `url`.
    ///
    /// # Errors
    ///
    /// Driver failures.
    pub async fn navigate(&self, url: &str) -> OnboardResult<()> {
        debug!(url, "navigate");
        self.driver.navigate(url).await
    }

    /// Reload the current page.
    ///
    /// # Errors
    ///
    /// Driver failures.
    pub async fn refresh(&self) -> OnboardResult<()> {
        self.driver.refresh().await
    }

    /// Save a screenshot named after `name`.
    ///
    /// # Errors
    ///
    /// `Screenshot` or `Io` if capture or write fails.
    pub async fn take_screenshot(&self, name: &str) -> OnboardResult<PathBuf> {
        self.artifacts.save_screenshot(self.driver, name).await
    }

    /// Choose `option_text` in a Tom Select searchable dropdown.
    ///
    /// Tom Select hides the native `<select>` behind `{base}-ts-control`;
    /// typing into that input filters the `{base}-ts-dropdown` overlay, whose
    /// matching `.option` is then clicked.
    ///
    /// # Errors
    ///
    /// `InvalidSelector` for a non-conforming id; `ElementNotVisible` if the
    /// input or option never shows.
    pub async fn select_tom_select(&self, input_id: &str, option_text: &str) -> OnboardResult<()> {
        let option = tom_select_option_selector(input_id, option_text)?;

        let input = self.wait_for_element(&format!("#{input_id}"), None).await?;
        self.driver.scroll_into_view(&input).await?;
        self.driver.click(&input).await?;
        self.driver.set_value(&input, option_text).await?;

        debug!(input_id, option_text, "waiting for tom select option");
        self.click(&option, None).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement};

    mod tom_select_tests {
        use super::*;

        #[test]
        fn test_option_selector_derives_dropdown_id() {
            let sel = tom_select_option_selector("country_id_select-ts-control", "Finland").unwrap();
            assert!(sel.starts_with("//*[@id='country_id_select-ts-dropdown']"));
            assert!(sel.ends_with("normalize-space(.)='Finland']"));
        }

        #[test]
        fn test_non_conforming_id_is_invalid_selector() {
            for bad in ["country_id_select", "-ts-control", "country-ts-dropdown"] {
                let err = tom_select_option_selector(bad, "Finland").unwrap_err();
                assert!(matches!(err, OnboardError::InvalidSelector { .. }), "{bad}");
            }
        }

        #[tokio::test(start_paused = true)]
        async fn test_select_tom_select_clicks_matching_option() {
            let input_id = "country_id_select-ts-control";
            let option = tom_select_option_selector(input_id, "Finland").unwrap();
            let driver = MockDriver::new()
                .with_element(&format!("#{input_id}"), MockElement::visible())
                .with_element(&option, MockElement::visible().appearing_after_lookups(2));

            WebPage::new(&driver)
                .select_tom_select(input_id, "Finland")
                .await
                .unwrap();

            assert!(driver.was_called(&format!("scroll_into_view:#{input_id}")));
            assert_eq!(driver.value_of(&format!("#{input_id}")).as_deref(), Some("Finland"));
            assert!(driver.was_called(&format!("click:{option}")));
        }

        #[tokio::test(start_paused = true)]
        async fn test_select_tom_select_rejects_bad_id_before_touching_driver() {
            let driver = MockDriver::new();
            let err = WebPage::new(&driver)
                .select_tom_select("country", "Finland")
                .await
                .unwrap_err();
            assert!(matches!(err, OnboardError::InvalidSelector { .. }));
            assert!(driver.history().is_empty());
        }
    }

    mod form_tests {
        use super::*;

        const SELECT: &str = "select[name=\"business_type\"]";

        #[tokio::test(start_paused = true)]
        async fn test_fill_clears_then_sets() {
            let driver = MockDriver::new()
                .with_element("#text_city", MockElement::visible().with_value("Espoo"));
            WebPage::new(&driver)
                .fill("#text_city", "Helsinki", None)
                .await
                .unwrap();
            assert_eq!(driver.value_of("#text_city").as_deref(), Some("Helsinki"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_select_by_text_clicks_option() {
            let driver = MockDriver::new().with_element(SELECT, MockElement::visible());
            driver.add_child(SELECT, &option_by_text("Oy"), MockElement::visible());

            WebPage::new(&driver)
                .select_by_text(SELECT, "Oy", None)
                .await
                .unwrap();
            assert!(driver.was_called(&format!("click:{SELECT} >> .//option")));
        }

        #[tokio::test(start_paused = true)]
        async fn test_select_by_text_missing_option() {
            let driver = MockDriver::new().with_element(SELECT, MockElement::visible());
            let err = WebPage::new(&driver)
                .select_by_text(SELECT, "Ay", None)
                .await
                .unwrap_err();
            assert!(matches!(err, OnboardError::ElementNotFound { .. }));
        }

        #[tokio::test]
        async fn test_press_escape_and_scroll() {
            let driver = MockDriver::new()
                .with_element("button[type=\"submit\"]", MockElement::visible());
            let page = WebPage::new(&driver);
            page.scroll_to("button[type=\"submit\"]", None).await.unwrap();
            page.press_escape().await.unwrap();
            assert!(driver.was_called("scroll_into_view:button"));
            assert!(driver.was_called("key:Escape"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_web_default_timeout_is_fifteen_seconds() {
        let driver = MockDriver::new();
        let err = WebPage::new(&driver)
            .wait_for_element("#missing", None)
            .await
            .unwrap_err();
        match err {
            OnboardError::ElementNotVisible { elapsed_ms, .. } => assert_eq!(elapsed_ms, 15_000),
            other => panic!("unexpected error: {other}"),
        }
    }
}
