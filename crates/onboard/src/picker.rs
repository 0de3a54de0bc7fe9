//! Date picker dials.
//!
//! The registration app picks the date of birth on three wheel dials (day,
//! month, year). Each dial exposes its current value in `content-desc`;
//! the month dial shows an English month name. A dial is moved one value per
//! short swipe over its own rect: up increases, down decreases.
//!
//! Each dial is read immediately before it is moved, so a dial whose range
//! depends on another (days in February) is always read after the dials
//! before it in the [`DialOrder`] have settled.

use crate::data::DateOfBirth;
use crate::driver::{Direction, Gesture, UiDriver};
use crate::page::NativePage;
use crate::result::{OnboardError, OnboardResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Travel of a single-step dial swipe, as a fraction of the dial rect
pub const DIAL_SWIPE_PERCENT: f64 = 0.3;

/// Settle time after each dial step
pub const DIAL_SETTLE: Duration = Duration::from_millis(100);

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// One dial of the date picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateField {
    /// Day of month
    Day,
    /// Month (1-12)
    Month,
    /// Four-digit year
    Year,
}

impl DateField {
    /// Field name for logs and errors
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

/// Order in which the dials are scrolled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DialOrder {
    /// Day, then month, then year
    #[default]
    DayMonthYear,
    /// Year, then month, then day
    YearMonthDay,
}

impl DialOrder {
    /// Dials in scroll order
    #[must_use]
    pub const fn fields(&self) -> [DateField; 3] {
        match self {
            Self::DayMonthYear => [DateField::Day, DateField::Month, DateField::Year],
            Self::YearMonthDay => [DateField::Year, DateField::Month, DateField::Day],
        }
    }
}

impl fmt::Display for DialOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DayMonthYear => "dmy",
            Self::YearMonthDay => "ymd",
        })
    }
}

impl FromStr for DialOrder {
    type Err = OnboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dmy" | "day-month-year" => Ok(Self::DayMonthYear),
            "ymd" | "year-month-day" => Ok(Self::YearMonthDay),
            other => Err(OnboardError::invalid_data(format!(
                "unknown dial order \"{other}\" (expected dmy or ymd)"
            ))),
        }
    }
}

/// Month number for an English month name or three-letter abbreviation
#[must_use]
pub fn month_from_name(name: &str) -> Option<u32> {
    let name = name.trim().to_ascii_lowercase();
    if name.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|m| *m == name || (name.len() == 3 && m.starts_with(&name)))
        .and_then(|i| u32::try_from(i + 1).ok())
}

/// Parse the `content-desc` of a dial into its numeric value.
///
/// # Errors
///
/// `InvalidData` if the text is neither a number nor (for months) a month
/// name.
pub fn parse_dial_value(field: DateField, raw: &str) -> OnboardResult<i32> {
    let trimmed = raw.trim();
    if let Ok(n) = trimmed.parse::<i32>() {
        return Ok(n);
    }
    if field == DateField::Month {
        if let Some(m) = month_from_name(trimmed) {
            return Ok(m as i32);
        }
    }
    Err(OnboardError::invalid_data(format!(
        "{} dial shows unreadable value \"{raw}\"",
        field.as_str()
    )))
}

/// Swipe direction and count that move a dial from `current` to `target`.
///
/// `None` when already on target.
#[must_use]
pub fn swipe_plan(current: i32, target: i32) -> Option<(Direction, u32)> {
    let delta = target - current;
    if delta == 0 {
        return None;
    }
    let direction = if delta > 0 {
        Direction::Up
    } else {
        Direction::Down
    };
    Some((direction, delta.unsigned_abs()))
}

/// Selectors of the three dials
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatePicker<'s> {
    /// Day dial
    pub day: &'s str,
    /// Month dial
    pub month: &'s str,
    /// Year dial
    pub year: &'s str,
}

impl<'s> DatePicker<'s> {
    /// Selector for a dial
    #[must_use]
    pub const fn dial(&self, field: DateField) -> &'s str {
        match field {
            DateField::Day => self.day,
            DateField::Month => self.month,
            DateField::Year => self.year,
        }
    }

    /// Read one dial.
    ///
    /// # Errors
    ///
    /// Wait or parse failures.
    pub async fn read<D>(&self, page: &NativePage<'_, D>, field: DateField) -> OnboardResult<i32>
    where
        D: UiDriver + ?Sized,
    {
        let selector = self.dial(field);
        let raw = page
            .get_attribute(selector, "content-desc", None)
            .await?
            .unwrap_or_default();
        parse_dial_value(field, &raw)
    }

    /// Move one dial to `target`, returning the number of steps swiped.
    ///
    /// # Errors
    ///
    /// Wait, parse or gesture failures.
    pub async fn scroll_to<D>(
        &self,
        page: &NativePage<'_, D>,
        field: DateField,
        target: i32,
    ) -> OnboardResult<u32>
    where
        D: UiDriver + ?Sized,
    {
        let current = self.read(page, field).await?;
        let Some((direction, steps)) = swipe_plan(current, target) else {
            debug!(field = field.as_str(), target, "dial already on target");
            return Ok(0);
        };

        let handle = page.wait_for_element(self.dial(field), None).await?;
        let area = page.driver().rect(&handle).await?;
        debug!(field = field.as_str(), current, target, steps, %direction, "scrolling dial");

        let gesture = Gesture::Swipe {
            area,
            direction,
            percent: DIAL_SWIPE_PERCENT,
        };
        for _ in 0..steps {
            page.driver().perform_gesture(&gesture).await?;
            tokio::time::sleep(DIAL_SETTLE).await;
        }
        Ok(steps)
    }

    /// Move all three dials to `date` in `order`.
    ///
    /// # Errors
    ///
    /// Wait, parse or gesture failures.
    pub async fn set_date<D>(
        &self,
        page: &NativePage<'_, D>,
        date: DateOfBirth,
        order: DialOrder,
    ) -> OnboardResult<()>
    where
        D: UiDriver + ?Sized,
    {
        for field in order.fields() {
            let _ = self.scroll_to(page, field, date.get(field)).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement, Rect};

    fn numbers(range: std::ops::RangeInclusive<i32>) -> Vec<String> {
        range.map(|n| n.to_string()).collect()
    }

    fn month_names() -> Vec<String> {
        ["January", "February", "March", "April", "May", "June", "July", "August",
         "September", "October", "November", "December"]
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    const PICKER: DatePicker<'static> = DatePicker {
        day: "~day",
        month: "~month",
        year: "~year",
    };

    mod parse_tests {
        use super::*;

        #[test]
        fn test_month_names() {
            assert_eq!(month_from_name("January"), Some(1));
            assert_eq!(month_from_name("sep"), Some(9));
            assert_eq!(month_from_name(" December "), Some(12));
            assert_eq!(month_from_name("Ju"), None);
            assert_eq!(month_from_name("Smarch"), None);
        }

        #[test]
        fn test_dial_values() {
            assert_eq!(parse_dial_value(DateField::Day, "17").unwrap(), 17);
            assert_eq!(parse_dial_value(DateField::Month, "March").unwrap(), 3);
            assert_eq!(parse_dial_value(DateField::Month, "11").unwrap(), 11);
            assert!(parse_dial_value(DateField::Year, "March").is_err());
        }

        #[test]
        fn test_dial_order_from_str() {
            assert_eq!("dmy".parse::<DialOrder>().unwrap(), DialOrder::DayMonthYear);
            assert_eq!("YMD".parse::<DialOrder>().unwrap(), DialOrder::YearMonthDay);
            assert!("mdy".parse::<DialOrder>().is_err());
            assert_eq!(DialOrder::YearMonthDay.to_string(), "ymd");
        }
    }

    mod plan_tests {
        use super::*;

        #[test]
        fn test_zero_delta_is_noop() {
            assert_eq!(swipe_plan(15, 15), None);
        }

        #[test]
        fn test_increase_swipes_up() {
            assert_eq!(swipe_plan(1990, 1995), Some((Direction::Up, 5)));
        }

        #[test]
        fn test_decrease_swipes_down() {
            assert_eq!(swipe_plan(12, 3), Some((Direction::Down, 9)));
        }
    }

    mod scroll_tests {
        use super::*;

        fn picker_driver(day: usize, month: usize, year: usize) -> MockDriver {
            MockDriver::new()
                .with_element(
                    "~day",
                    MockElement::dial(numbers(1..=31), day)
                        .with_rect(Rect::new(100.0, 1500.0, 200.0, 300.0)),
                )
                .with_element(
                    "~month",
                    MockElement::dial(month_names(), month)
                        .with_rect(Rect::new(400.0, 1500.0, 200.0, 300.0)),
                )
                .with_element(
                    "~year",
                    MockElement::dial(numbers(1950..=2010), year)
                        .with_rect(Rect::new(700.0, 1500.0, 200.0, 300.0)),
                )
        }

        #[tokio::test(start_paused = true)]
        async fn test_steps_equal_absolute_delta() {
            // 15 June 2000 -> 20 March 1990
            let driver = picker_driver(14, 5, 50);
            let page = NativePage::new(&driver);

            PICKER
                .set_date(
                    &page,
                    DateOfBirth::new(20, 3, 1990).unwrap(),
                    DialOrder::DayMonthYear,
                )
                .await
                .unwrap();

            assert_eq!(driver.count_calls("gesture:mobile: swipeGesture:up"), 5);
            assert_eq!(driver.count_calls("gesture:mobile: swipeGesture:down"), 3 + 10);
            assert_eq!(driver.content_desc_of("~day").as_deref(), Some("20"));
            assert_eq!(driver.content_desc_of("~month").as_deref(), Some("March"));
            assert_eq!(driver.content_desc_of("~year").as_deref(), Some("1990"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_on_target_issues_no_gestures() {
            let driver = picker_driver(19, 2, 40);
            let page = NativePage::new(&driver);
            PICKER
                .set_date(
                    &page,
                    DateOfBirth::new(20, 3, 1990).unwrap(),
                    DialOrder::YearMonthDay,
                )
                .await
                .unwrap();
            assert!(driver.gestures().is_empty());
        }

        #[tokio::test(start_paused = true)]
        async fn test_year_month_day_order() {
            let driver = picker_driver(0, 0, 0);
            let page = NativePage::new(&driver);
            PICKER
                .set_date(
                    &page,
                    DateOfBirth::new(2, 2, 1951).unwrap(),
                    DialOrder::YearMonthDay,
                )
                .await
                .unwrap();

            let gestures = driver.gestures();
            assert_eq!(gestures.len(), 3);
            let lefts: Vec<f64> = gestures
                .iter()
                .map(|g| match g {
                    Gesture::Swipe { area, .. } => area.x,
                    _ => -1.0,
                })
                .collect();
            assert_eq!(lefts, vec![700.0, 400.0, 100.0]);
        }

        #[tokio::test(start_paused = true)]
        async fn test_settles_between_steps() {
            let driver = picker_driver(0, 0, 0);
            let page = NativePage::new(&driver);
            let start = tokio::time::Instant::now();
            let steps = PICKER.scroll_to(&page, DateField::Day, 5).await.unwrap();
            assert_eq!(steps, 4);
            assert_eq!(start.elapsed(), DIAL_SETTLE * 4);
        }
    }
}
