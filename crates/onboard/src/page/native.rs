//! Native (Appium) base page.

use super::{
    check_visible, locate_gone, require_present, require_visible, try_check_visible,
    LoaderOutcome, Probe,
};
use crate::artifacts::Artifacts;
use crate::driver::{Direction, ElementHandle, Gesture, UiDriver};
use crate::result::{OnboardError, OnboardResult};
use crate::selector::Selector;
use crate::wait::{DEFAULT_NATIVE_WAIT_MS, FALLBACK_PROBE_MS};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

/// Loader shown by the app while a step is submitting
pub const DEFAULT_LOADER: &str = "~loading_indicator";

/// How long a loader gets to show up before it is assumed to have been skipped
pub const LOADER_APPEAR_TIMEOUT: Duration = Duration::from_secs(3);

/// Primitives for native app screens.
///
/// Every method re-acquires its element; handles never outlive a call.
/// `timeout: None` means the page default (`EXPLICIT_WAIT_MS`, 30 s).
#[derive(Debug)]
pub struct NativePage<'d, D: UiDriver + ?Sized> {
    driver: &'d D,
    default_timeout: Duration,
    artifacts: Artifacts,
}

impl<'d, D: UiDriver + ?Sized> NativePage<'d, D> {
    /// Create a page over `driver` with default settings
    #[must_use]
    pub fn new(driver: &'d D) -> Self {
        Self {
            driver,
            default_timeout: Duration::from_millis(DEFAULT_NATIVE_WAIT_MS),
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

    /// Wait until `selector` is in the UI tree, visible or not.
    ///
    /// # Errors
    ///
    /// `ElementNotFound` on timeout; driver errors propagate.
    pub async fn wait_for_element_exist(
        &self,
        selector: &str,
        timeout: Option<Duration>,
    ) -> OnboardResult<ElementHandle> {
        let selector = Selector::parse(selector);
        debug!(%selector, "wait_for_element_exist");
        require_present(self.driver, &selector, self.resolve(timeout)).await
    }

    /// Wait for the element, then click it.
    ///
    /// # Errors
    ///
    /// Same as [`Self::wait_for_element`], plus click failures.
    pub async fn tap(&self, selector: &str, timeout: Option<Duration>) -> OnboardResult<()> {
        let handle = self.wait_for_element(selector, timeout).await?;
        debug!(selector, "tap");
        self.driver.click(&handle).await
    }

    /// Replace the content of a text field.
    ///
    /// Focuses the field, clears it, then injects `value` with `mobile: type`
    /// (the app's Flutter fields ignore plain send-keys).
    ///
    /// # Errors
    ///
    /// Same as [`Self::wait_for_element`], plus driver failures.
    pub async fn set_field(
        &self,
        selector: &str,
        value: &str,
        timeout: Option<Duration>,
    ) -> OnboardResult<()> {
        let handle = self.wait_for_element(selector, timeout).await?;
        self.type_into(&handle, value).await
    }

    async fn type_into(&self, handle: &ElementHandle, value: &str) -> OnboardResult<()> {
        self.driver.click(handle).await?;
        self.driver.clear(handle).await?;
        self.driver.type_text(value).await
    }

    /// Fill whichever of two layouts of the same field is on screen.
    ///
    /// `primary` gets a 3 s wait; only if it is not found is `alternate`
    /// waited for with the default timeout.
    ///
    /// # Errors
    ///
    /// `ElementNotVisible` if the alternate also times out; driver errors
    /// from either lookup propagate.
    pub async fn set_field_with_fallback(
        &self,
        primary: &str,
        alternate: &str,
        value: &str,
    ) -> OnboardResult<()> {
        match self
            .try_probe(primary, Some(Duration::from_millis(FALLBACK_PROBE_MS)))
            .await?
        {
            Probe::Found(handle) => self.type_into(&handle, value).await,
            Probe::NotFound => {
                debug!(primary, alternate, "primary layout absent, using alternate");
                self.set_field(alternate, value, None).await
            }
        }
    }

    /// Tap a neutral point near the top of the screen to drop input focus.
    ///
    /// # Errors
    ///
    /// Driver failures.
    pub async fn loose_focus(&self) -> OnboardResult<()> {
        let size = self.driver.window_size().await?;
        let gesture = Gesture::ClickAt {
            x: i64::from(size.width / 2),
            y: (f64::from(size.height) * 0.05).floor() as i64,
        };
        self.driver.perform_gesture(&gesture).await
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

    /// Attribute of a visible element.
    ///
    /// # Errors
    ///
    /// Same as [`Self::wait_for_element`].
    pub async fn get_attribute(
        &self,
        selector: &str,
        name: &str,
        timeout: Option<Duration>,
    ) -> OnboardResult<Option<String>> {
        let handle = self.wait_for_element(selector, timeout).await?;
        self.driver.attribute(&handle, name).await
    }

    /// Visibility lookup that reports a timeout as `NotFound`.
    ///
    /// # Errors
    ///
    /// Only genuine driver failures.
    pub async fn try_probe(&self, selector: &str, timeout: Option<Duration>) -> OnboardResult<Probe> {
        try_check_visible(self.driver, &Selector::parse(selector), self.resolve(timeout)).await
    }

    /// Visibility lookup that never fails; driver errors count as `NotFound`.
    pub async fn probe(&self, selector: &str, timeout: Option<Duration>) -> Probe {
        check_visible(self.driver, &Selector::parse(selector), self.resolve(timeout)).await
    }

    /// Whether `selector` becomes visible within the timeout. Never fails.
    pub async fn is_displayed(&self, selector: &str, timeout: Option<Duration>) -> bool {
        self.probe(selector, timeout).await.is_found()
    }

    /// Scroll content down over the middle band of the screen.
    ///
    /// # Errors
    ///
    /// Driver failures.
    pub async fn scroll_down(&self, percent: f64) -> OnboardResult<()> {
        self.scroll(Direction::Down, percent).await
    }

    /// Scroll content up over the middle band of the screen.
    ///
    /// # Errors
    ///
    /// Driver failures.
    pub async fn scroll_up(&self, percent: f64) -> OnboardResult<()> {
        self.scroll(Direction::Up, percent).await
    }

    async fn scroll(&self, direction: Direction, percent: f64) -> OnboardResult<()> {
        let area = self.driver.window_size().await?.scroll_band();
        self.driver
            .perform_gesture(&Gesture::Scroll {
                area,
                direction,
                percent,
            })
            .await
    }

    /// Let a transient loader come and go.
    ///
    /// Waits up to 3 s for `loader` (default [`DEFAULT_LOADER`]) to appear,
    /// then up to `timeout` for it to disappear. Never fails: a loader that
    /// outlives the timeout is logged and reported as `StillVisible`.
    pub async fn wait_for_loader_to_disappear(
        &self,
        loader: Option<&str>,
        timeout: Option<Duration>,
    ) -> LoaderOutcome {
        let loader = loader.unwrap_or(DEFAULT_LOADER);
        if !self.is_displayed(loader, Some(LOADER_APPEAR_TIMEOUT)).await {
            debug!(loader, "loader never appeared");
            return LoaderOutcome::NeverAppeared;
        }

        let timeout = self.resolve(timeout);
        match locate_gone(self.driver, &Selector::parse(loader), timeout).await {
            Ok(true) => LoaderOutcome::Disappeared,
            Ok(false) => {
                warn!(loader, timeout_ms = crate::wait::millis(timeout), "loader still visible");
                LoaderOutcome::StillVisible
            }
            Err(e) => {
                warn!(loader, error = %e, "loader wait failed");
                LoaderOutcome::StillVisible
            }
        }
    }

    /// Save a screenshot named after `name`.
    ///
    /// # Errors
    ///
    /// `Screenshot` or `Io` if capture or write fails.
    pub async fn take_screenshot(&self, name: &str) -> OnboardResult<PathBuf> {
        self.artifacts.save_screenshot(self.driver, name).await
    }

    /// Fail with `AssertionFailed` unless `selector` shows up in time.
    ///
    /// # Errors
    ///
    /// `AssertionFailed` naming `what`.
    pub async fn expect_displayed(
        &self,
        selector: &str,
        what: &str,
        timeout: Option<Duration>,
    ) -> OnboardResult<()> {
        if self.is_displayed(selector, timeout).await {
            Ok(())
        } else {
            Err(OnboardError::assertion(format!("{what} not displayed")))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement, Rect, WindowSize};
    use tokio::time::Instant;

    const FIELD: &str = "android=new UiSelector().className(\"android.widget.EditText\").instance(0)";

    mod wait_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_wait_for_element_times_out_with_selector() {
            let driver = MockDriver::new();
            let page = NativePage::new(&driver);

            let err = page
                .wait_for_element("~missing", Some(Duration::from_secs(2)))
                .await
                .unwrap_err();
            match err {
                OnboardError::ElementNotVisible { selector, elapsed_ms } => {
                    assert_eq!(selector, "~missing");
                    assert_eq!(elapsed_ms, 2_000);
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test(start_paused = true)]
        async fn test_hidden_element_exists_but_is_not_visible() {
            let driver = MockDriver::new().with_element("~ghost", MockElement::hidden());
            let page = NativePage::new(&driver);

            assert!(page
                .wait_for_element_exist("~ghost", Some(Duration::from_secs(1)))
                .await
                .is_ok());
            let err = page
                .wait_for_element("~ghost", Some(Duration::from_secs(1)))
                .await
                .unwrap_err();
            assert!(matches!(err, OnboardError::ElementNotVisible { .. }));
        }

        #[tokio::test(start_paused = true)]
        async fn test_exist_timeout_is_not_found() {
            let driver = MockDriver::new();
            let err = NativePage::new(&driver)
                .wait_for_element_exist("~nothing", Some(Duration::from_millis(500)))
                .await
                .unwrap_err();
            assert!(matches!(err, OnboardError::ElementNotFound { .. }));
        }

        #[tokio::test(start_paused = true)]
        async fn test_default_timeout_applies() {
            let driver = MockDriver::new();
            let page = NativePage::new(&driver).with_timeout(Duration::from_secs(7));
            let start = Instant::now();
            let _ = page.wait_for_element("~missing", None).await;
            assert_eq!(start.elapsed(), Duration::from_secs(7));
        }
    }

    mod field_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_set_field_replaces_content() {
            let driver =
                MockDriver::new().with_element(FIELD, MockElement::visible().with_value("old"));
            NativePage::new(&driver)
                .set_field(FIELD, "Aino", None)
                .await
                .unwrap();
            assert_eq!(driver.value_of(FIELD).as_deref(), Some("Aino"));
            assert!(driver.was_called("type:Aino"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_fallback_skips_alternate_when_primary_resolves() {
            let driver = MockDriver::new()
                .with_element("~primary", MockElement::visible())
                .with_element("~alternate", MockElement::visible());
            NativePage::new(&driver)
                .set_field_with_fallback("~primary", "~alternate", "x@example.com")
                .await
                .unwrap();
            assert_eq!(driver.value_of("~primary").as_deref(), Some("x@example.com"));
            assert_eq!(driver.lookups("~alternate"), 0);
        }

        #[tokio::test(start_paused = true)]
        async fn test_fallback_uses_alternate_after_short_wait() {
            let driver = MockDriver::new().with_element("~alternate", MockElement::visible());
            let start = Instant::now();
            NativePage::new(&driver)
                .set_field_with_fallback("~primary", "~alternate", "1234")
                .await
                .unwrap();
            assert_eq!(start.elapsed(), Duration::from_secs(3));
            assert_eq!(driver.value_of("~alternate").as_deref(), Some("1234"));
            assert_eq!(driver.lookups("~alternate"), 1);
        }

        #[tokio::test(start_paused = true)]
        async fn test_fallback_propagates_driver_errors() {
            let driver = MockDriver::new().with_element("~alternate", MockElement::visible());
            driver.fail_on("find_element");
            let err = NativePage::new(&driver)
                .set_field_with_fallback("~primary", "~alternate", "1234")
                .await
                .unwrap_err();
            assert!(matches!(err, OnboardError::Driver { .. }));
        }
    }

    mod presence_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_is_displayed_false_on_timeout() {
            let driver = MockDriver::new();
            assert!(
                !NativePage::new(&driver)
                    .is_displayed("~missing", Some(Duration::from_secs(1)))
                    .await
            );
        }

        #[tokio::test(start_paused = true)]
        async fn test_is_displayed_false_on_driver_error() {
            let driver = MockDriver::new().with_element("~ok", MockElement::visible());
            driver.fail_on("is_displayed");
            assert!(
                !NativePage::new(&driver)
                    .is_displayed("~ok", Some(Duration::from_secs(1)))
                    .await
            );
        }

        #[tokio::test(start_paused = true)]
        async fn test_finds_late_element() {
            let driver = MockDriver::new()
                .with_element("~late", MockElement::visible().appearing_after_lookups(3));
            let found = NativePage::new(&driver)
                .probe("~late", Some(Duration::from_secs(5)))
                .await;
            assert!(found.is_found());
        }
    }

    mod gesture_tests {
        use super::*;

        #[tokio::test]
        async fn test_loose_focus_taps_top_centre() {
            let driver = MockDriver::new();
            driver.set_window_size(WindowSize::new(1080, 2400));
            NativePage::new(&driver).loose_focus().await.unwrap();
            assert_eq!(
                driver.gestures(),
                vec![Gesture::ClickAt { x: 540, y: 120 }]
            );
        }

        #[tokio::test]
        async fn test_scroll_down_uses_middle_band() {
            let driver = MockDriver::new();
            NativePage::new(&driver).scroll_down(1.0).await.unwrap();
            match &driver.gestures()[0] {
                Gesture::Scroll {
                    area, direction, ..
                } => {
                    assert_eq!(*direction, Direction::Down);
                    assert!((area.y - 600.0).abs() < f64::EPSILON);
                }
                other => panic!("unexpected gesture {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_scroll_up_uses_same_band() {
            let driver = MockDriver::new();
            driver.set_window_size(WindowSize::new(720, 1600));
            NativePage::new(&driver).scroll_up(0.5).await.unwrap();

            assert_eq!(
                driver.gestures(),
                vec![Gesture::Scroll {
                    area: Rect::new(0.0, 400.0, 720.0, 800.0),
                    direction: Direction::Up,
                    percent: 0.5,
                }]
            );
            assert!(driver.was_called("gesture:mobile: scrollGesture:up"));
        }
    }

    mod loader_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_loader_never_appears() {
            let driver = MockDriver::new();
            let outcome = NativePage::new(&driver)
                .wait_for_loader_to_disappear(None, None)
                .await;
            assert_eq!(outcome, LoaderOutcome::NeverAppeared);
        }

        #[tokio::test(start_paused = true)]
        async fn test_loader_disappears() {
            let driver = MockDriver::new().with_element(
                DEFAULT_LOADER,
                MockElement::visible().vanishing_after_lookups(4),
            );
            let outcome = NativePage::new(&driver)
                .wait_for_loader_to_disappear(None, Some(Duration::from_secs(10)))
                .await;
            assert_eq!(outcome, LoaderOutcome::Disappeared);
        }

        #[tokio::test(start_paused = true)]
        async fn test_loader_timeout_is_swallowed() {
            let driver = MockDriver::new().with_element("~spinner", MockElement::visible());
            let outcome = NativePage::new(&driver)
                .wait_for_loader_to_disappear(Some("~spinner"), Some(Duration::from_secs(2)))
                .await;
            assert_eq!(outcome, LoaderOutcome::StillVisible);
        }
    }
}
