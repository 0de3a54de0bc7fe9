//! Base pages: timeout-bounded primitives shared by every page object.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  Page objects (Welcome, Registration, PartnerPortal)             │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  NativePage                  │  WebPage                          │
//! │  tap / set_field / scroll    │  click / fill / select / tom-sel  │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  locate: find → displayed?   (polled, always under a deadline)   │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  UiDriver                                                        │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A lookup that runs out of time is not an error at this layer: it yields
//! [`Probe::NotFound`]. The waiting primitives turn that into
//! `ElementNotVisible` / `ElementNotFound`; the probing primitives hand it
//! back to the caller for branching.

mod native;
mod web;

pub use native::{NativePage, DEFAULT_LOADER, LOADER_APPEAR_TIMEOUT};
pub use web::{tom_select_option_selector, WebPage};

use crate::driver::{ElementHandle, UiDriver};
use crate::result::{OnboardError, OnboardResult};
use crate::selector::Selector;
use crate::wait::{millis, poll_until, WaitOptions, WaitOutcome};
use std::time::Duration;
use tracing::debug;

/// Result of a non-failing lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// The element was located (and visible, for visibility checks)
    Found(ElementHandle),
    /// Nothing matched within the timeout
    NotFound,
}

impl Probe {
    /// Check if the element was found
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Borrow the handle, if found
    #[must_use]
    pub const fn handle(&self) -> Option<&ElementHandle> {
        match self {
            Self::Found(handle) => Some(handle),
            Self::NotFound => None,
        }
    }

    /// Take the handle, if found
    #[must_use]
    pub fn into_handle(self) -> Option<ElementHandle> {
        match self {
            Self::Found(handle) => Some(handle),
            Self::NotFound => None,
        }
    }
}

impl From<Option<ElementHandle>> for Probe {
    fn from(handle: Option<ElementHandle>) -> Self {
        handle.map_or(Self::NotFound, Self::Found)
    }
}

/// How a loader wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderOutcome {
    /// The loader never showed up within the appearance window
    NeverAppeared,
    /// The loader showed up and went away
    Disappeared,
    /// The loader was still visible when the timeout ran out
    StillVisible,
}

/// Poll until `selector` is present and displayed.
pub(crate) async fn locate_visible<D>(
    driver: &D,
    selector: &Selector,
    timeout: Duration,
) -> OnboardResult<WaitOutcome<ElementHandle>>
where
    D: UiDriver + ?Sized,
{
    poll_until(WaitOptions::timeout_of(timeout), move || async move {
        match driver.find_element(selector).await? {
            Some(handle) if driver.is_displayed(&handle).await? => Ok(Some(handle)),
            _ => Ok(None),
        }
    })
    .await
}

/// Visibility lookup that reports a timeout as `NotFound`.
pub(crate) async fn try_check_visible<D>(
    driver: &D,
    selector: &Selector,
    timeout: Duration,
) -> OnboardResult<Probe>
where
    D: UiDriver + ?Sized,
{
    let outcome = locate_visible(driver, selector, timeout).await?;
    Ok(Probe::from(outcome.ready()))
}

/// Visibility lookup that never fails; driver errors count as `NotFound`.
pub(crate) async fn check_visible<D>(driver: &D, selector: &Selector, timeout: Duration) -> Probe
where
    D: UiDriver + ?Sized,
{
    try_check_visible(driver, selector, timeout)
        .await
        .unwrap_or_else(|e| {
            debug!(%selector, error = %e, "visibility check failed");
            Probe::NotFound
        })
}

/// Poll until `selector` is present in the UI tree.
pub(crate) async fn locate_present<D>(
    driver: &D,
    selector: &Selector,
    timeout: Duration,
) -> OnboardResult<WaitOutcome<ElementHandle>>
where
    D: UiDriver + ?Sized,
{
    poll_until(WaitOptions::timeout_of(timeout), move || async move {
        driver.find_element(selector).await
    })
    .await
}

/// Poll until `selector` is absent or hidden. Yields `true` once gone.
pub(crate) async fn locate_gone<D>(
    driver: &D,
    selector: &Selector,
    timeout: Duration,
) -> OnboardResult<bool>
where
    D: UiDriver + ?Sized,
{
    let outcome = poll_until(WaitOptions::timeout_of(timeout), move || async move {
        match driver.find_element(selector).await? {
            Some(handle) if driver.is_displayed(&handle).await? => Ok(None),
            _ => Ok(Some(())),
        }
    })
    .await?;
    Ok(outcome.is_ready())
}

/// Wait for visibility, failing with `ElementNotVisible` on timeout.
pub(crate) async fn require_visible<D>(
    driver: &D,
    selector: &Selector,
    timeout: Duration,
) -> OnboardResult<ElementHandle>
where
    D: UiDriver + ?Sized,
{
    match locate_visible(driver, selector, timeout).await? {
        WaitOutcome::Ready(handle) => Ok(handle),
        WaitOutcome::TimedOut { elapsed } => Err(OnboardError::ElementNotVisible {
            selector: selector.to_string(),
            elapsed_ms: millis(elapsed),
        }),
    }
}

/// Wait for presence, failing with `ElementNotFound` on timeout.
pub(crate) async fn require_present<D>(
    driver: &D,
    selector: &Selector,
    timeout: Duration,
) -> OnboardResult<ElementHandle>
where
    D: UiDriver + ?Sized,
{
    match locate_present(driver, selector, timeout).await? {
        WaitOutcome::Ready(handle) => Ok(handle),
        WaitOutcome::TimedOut { elapsed } => Err(OnboardError::ElementNotFound {
            selector: selector.to_string(),
            elapsed_ms: millis(elapsed),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement};

    #[test]
    fn test_from_option() {
        let found = Probe::from(Some(ElementHandle::new("a")));
        assert!(found.is_found());
        assert_eq!(found.handle(), Some(&ElementHandle::new("a")));
        assert_eq!(Probe::from(None), Probe::NotFound);
        assert_eq!(Probe::NotFound.into_handle(), None);
    }

    mod visibility_check_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_timeout_is_not_found() {
            let driver = MockDriver::new();
            let found = try_check_visible(&driver, &Selector::parse("~gone"), Duration::from_secs(1))
                .await
                .unwrap();
            assert_eq!(found, Probe::NotFound);
        }

        #[tokio::test(start_paused = true)]
        async fn test_driver_errors_surface() {
            let driver = MockDriver::new();
            driver.fail_on("find_element");
            let result =
                try_check_visible(&driver, &Selector::parse("~any"), Duration::from_secs(1)).await;
            assert!(result.is_err());
        }

        #[tokio::test(start_paused = true)]
        async fn test_lenient_check_swallows_driver_errors() {
            let driver = MockDriver::new().with_element("~ok", MockElement::visible());
            let sel = Selector::parse("~ok");
            assert!(check_visible(&driver, &sel, Duration::from_secs(1)).await.is_found());

            driver.fail_on("is_displayed");
            assert_eq!(
                check_visible(&driver, &sel, Duration::from_secs(1)).await,
                Probe::NotFound
            );
        }
    }
}
