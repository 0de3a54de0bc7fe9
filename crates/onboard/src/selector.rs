//! Selector parsing.
//!
//! Page objects keep their selectors as constant strings in the conventional
//! shorthand used by Appium and browser drivers. [`Selector::parse`] maps that
//! shorthand onto the W3C locator strategy the wire client sends.
//!
//! | Shorthand                    | Strategy             |
//! |------------------------------|----------------------|
//! | `~CREATE ACCOUNT`            | `accessibility id`   |
//! | `//android.widget.Button`    | `xpath`              |
//! | `(//node)[1]`, `.//option`   | `xpath`              |
//! | `android=new UiSelector()…`  | `-android uiautomator` |
//! | `-ios class chain:**/Cell`   | `-ios class chain`   |
//! | `#text_email`                | `css selector`       |
//! | anything else                | `css selector`       |

use serde::{Deserialize, Serialize};
use std::fmt;

/// A parsed element query
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selector {
    /// Accessibility id (`content-desc` on Android)
    AccessibilityId(String),
    /// XPath expression
    XPath(String),
    /// UiAutomator2 `UiSelector` expression
    UiAutomator(String),
    /// iOS class chain query
    ClassChain(String),
    /// CSS selector (web)
    Css(String),
}

impl Selector {
    /// Parse the shorthand form used by page objects.
    ///
    /// Parsing never fails; an unknown prefix is treated as CSS and only the
    /// driver can tell whether it matches anything.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if let Some(id) = raw.strip_prefix('~') {
            Self::AccessibilityId(id.to_string())
        } else if raw.starts_with("//") || raw.starts_with("(//") || raw.starts_with("./") {
            Self::XPath(raw.to_string())
        } else if let Some(expr) = raw.strip_prefix("android=") {
            Self::UiAutomator(expr.to_string())
        } else if let Some(chain) = raw.strip_prefix("-ios class chain:") {
            Self::ClassChain(chain.to_string())
        } else {
            Self::Css(raw.to_string())
        }
    }

    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// W3C `using` value for this selector
    #[must_use]
    pub const fn strategy(&self) -> &'static str {
        match self {
            Self::AccessibilityId(_) => "accessibility id",
            Self::XPath(_) => "xpath",
            Self::UiAutomator(_) => "-android uiautomator",
            Self::ClassChain(_) => "-ios class chain",
            Self::Css(_) => "css selector",
        }
    }

    /// W3C `value` for this selector
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::AccessibilityId(v)
            | Self::XPath(v)
            | Self::UiAutomator(v)
            | Self::ClassChain(v)
            | Self::Css(v) => v,
        }
    }

    /// JSON body for a `POST /element` request
    #[must_use]
    pub fn to_locator(&self) -> serde_json::Value {
        serde_json::json!({ "using": self.strategy(), "value": self.value() })
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccessibilityId(v) => write!(f, "~{v}"),
            Self::UiAutomator(v) => write!(f, "android={v}"),
            Self::ClassChain(v) => write!(f, "-ios class chain:{v}"),
            Self::XPath(v) | Self::Css(v) => f.write_str(v),
        }
    }
}

impl From<&str> for Selector {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

/// Quote a string for use inside an XPath literal.
///
/// XPath 1.0 has no escape sequences, so text containing both quote kinds
/// is assembled with `concat()`.
#[must_use]
pub fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        format!("'{text}'")
    } else if !text.contains('"') {
        format!("\"{text}\"")
    } else {
        let parts: Vec<String> = text.split('\'').map(|p| format!("'{p}'")).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}
