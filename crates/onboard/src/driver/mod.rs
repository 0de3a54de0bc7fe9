//! UiDriver - Abstract Automation Driver Trait
//!
//! Every page primitive is expressed against [`UiDriver`], implemented once
//! per transport:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  UiDriver (Abstract Trait)                                           │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────────┐   ┌──────────────────────┐                 │
//! │  │  WebDriverSession    │   │  MockDriver          │                 │
//! │  │  W3C JSON over HTTP  │   │  scripted UI tree    │                 │
//! │  │  (Appium, chrome)    │   │  (unit tests)        │                 │
//! │  └──────────────────────┘   └──────────────────────┘                 │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The session is an explicit value: page objects borrow it, the runner owns
//! it for the lifetime of one suite.

mod mock;
#[cfg(feature = "wire")]
mod wire;

pub use mock::{MockDriver, MockElement};
#[cfg(feature = "wire")]
pub use wire::WebDriverSession;

use crate::result::OnboardResult;
use crate::selector::Selector;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Driver-provided reference to a located element.
///
/// Only valid for the interaction sequence that acquired it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    /// W3C element reference
    pub id: String,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Element or viewport rectangle in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Screen size reported by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl WindowSize {
    /// Create a new window size
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Vertical band from 25% to 75% of the screen height, full width.
    ///
    /// Scroll gestures run inside this band so they never start on a status
    /// bar or a bottom navigation row.
    #[must_use]
    pub fn scroll_band(&self) -> Rect {
        let height = f64::from(self.height);
        Rect::new(
            0.0,
            (height * 0.25).round(),
            f64::from(self.width),
            (height * 0.5).round(),
        )
    }
}

/// Gesture direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Finger moves up
    Up,
    /// Finger moves down
    Down,
    /// Finger moves left
    Left,
    /// Finger moves right
    Right,
}

impl Direction {
    /// Name used by the `mobile:` gesture commands
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Native gesture issued through the driver
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    /// Scroll the content inside `area`
    Scroll {
        /// Area the gesture runs over
        area: Rect,
        /// Scroll direction
        direction: Direction,
        /// Travel as a fraction of the area (1.0 = full)
        percent: f64,
    },
    /// Swipe across `area`
    Swipe {
        /// Area the gesture runs over
        area: Rect,
        /// Swipe direction
        direction: Direction,
        /// Travel as a fraction of the area
        percent: f64,
    },
    /// Single tap at an absolute point
    ClickAt {
        /// X coordinate
        x: i64,
        /// Y coordinate
        y: i64,
    },
}

impl Gesture {
    /// Appium extension command implementing this gesture
    #[must_use]
    pub const fn command(&self) -> &'static str {
        match self {
            Self::Scroll { .. } => "mobile: scrollGesture",
            Self::Swipe { .. } => "mobile: swipeGesture",
            Self::ClickAt { .. } => "mobile: clickGesture",
        }
    }

    /// Argument object for the extension command
    #[must_use]
    pub fn arguments(&self) -> serde_json::Value {
        match self {
            Self::Scroll {
                area,
                direction,
                percent,
            }
            | Self::Swipe {
                area,
                direction,
                percent,
            } => serde_json::json!({
                "left": area.x.round() as i64,
                "top": area.y.round() as i64,
                "width": area.width.round() as i64,
                "height": area.height.round() as i64,
                "direction": direction.as_str(),
                "percent": percent,
            }),
            Self::ClickAt { x, y } => serde_json::json!({ "x": x, "y": y }),
        }
    }
}

/// Keyboard keys the pages need
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Escape
    Escape,
    /// Enter / Return
    Enter,
    /// Tab
    Tab,
}

impl Key {
    /// W3C WebDriver key code point
    #[must_use]
    pub const fn code_point(&self) -> &'static str {
        match self {
            Self::Escape => "\u{E00C}",
            Self::Enter => "\u{E007}",
            Self::Tab => "\u{E004}",
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Escape => "Escape",
            Self::Enter => "Enter",
            Self::Tab => "Tab",
        };
        f.write_str(name)
    }
}

/// Abstract driver trait for UI automation.
///
/// Lookups return `Ok(None)` when nothing matches; `Err` is reserved for the
/// driver itself failing. Waiting is never done here: the base pages own the
/// timeout discipline.
#[async_trait]
pub trait UiDriver: Send + Sync {
    /// Locate the first element matching `selector`
    async fn find_element(&self, selector: &Selector) -> OnboardResult<Option<ElementHandle>>;

    /// Locate the first descendant of `parent` matching `selector`
    async fn find_child(
        &self,
        parent: &ElementHandle,
        selector: &Selector,
    ) -> OnboardResult<Option<ElementHandle>>;

    /// Whether the element is rendered and visible
    async fn is_displayed(&self, element: &ElementHandle) -> OnboardResult<bool>;

    /// Click the element
    async fn click(&self, element: &ElementHandle) -> OnboardResult<()>;

    /// Clear the element's content
    async fn clear(&self, element: &ElementHandle) -> OnboardResult<()>;

    /// Send keys to the element (appends to its content)
    async fn set_value(&self, element: &ElementHandle, value: &str) -> OnboardResult<()>;

    /// Inject raw text into the focused native field (`mobile: type`)
    async fn type_text(&self, text: &str) -> OnboardResult<()>;

    /// Read an attribute
    async fn attribute(&self, element: &ElementHandle, name: &str)
        -> OnboardResult<Option<String>>;

    /// Read the visible text
    async fn text(&self, element: &ElementHandle) -> OnboardResult<String>;

    /// Element position and size
    async fn rect(&self, element: &ElementHandle) -> OnboardResult<Rect>;

    /// Perform a native gesture
    async fn perform_gesture(&self, gesture: &Gesture) -> OnboardResult<()>;

    /// Current screen size
    async fn window_size(&self) -> OnboardResult<WindowSize>;

    /// Capture the screen as PNG bytes
    async fn screenshot(&self) -> OnboardResult<Vec<u8>>;

    /// Navigate to URL
    async fn navigate(&self, url: &str) -> OnboardResult<()>;

    /// Reload the current page
    async fn refresh(&self) -> OnboardResult<()>;

    /// Scroll the page until the element is in view
    async fn scroll_into_view(&self, element: &ElementHandle) -> OnboardResult<()>;

    /// Press a key on the active element
    async fn press_key(&self, key: Key) -> OnboardResult<()>;

    /// End the session
    async fn end_session(&self) -> OnboardResult<()>;
}
