//! Scripted in-memory driver for unit tests.
//!
//! Elements are registered under their selector shorthand and can be made
//! to appear or vanish after a number of lookups or page refreshes, which is
//! enough to exercise every wait, fallback and poll path without a device.

use super::{Direction, ElementHandle, Gesture, Key, Rect, UiDriver, WindowSize};
use crate::result::{OnboardError, OnboardResult};
use crate::selector::Selector;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// PNG magic bytes returned when no screenshot is scripted
const PLACEHOLDER_PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// A scripted element
#[derive(Debug, Clone)]
pub struct MockElement {
    text: String,
    value: String,
    attributes: HashMap<String, String>,
    rect: Rect,
    displayed: bool,
    present_after_lookups: usize,
    absent_after_lookups: Option<usize>,
    present_after_refreshes: usize,
    dial: Option<Vec<String>>,
    dial_index: usize,
}

impl MockElement {
    /// A present, visible element
    #[must_use]
    pub fn visible() -> Self {
        Self {
            text: String::new(),
            value: String::new(),
            attributes: HashMap::new(),
            rect: Rect::new(0.0, 0.0, 100.0, 40.0),
            displayed: true,
            present_after_lookups: 0,
            absent_after_lookups: None,
            present_after_refreshes: 0,
            dial: None,
            dial_index: 0,
        }
    }

    /// Present in the tree but not rendered
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            displayed: false,
            ..Self::visible()
        }
    }

    /// A picker dial showing `values[index]` in its `content-desc`
    #[must_use]
    pub fn dial(values: Vec<String>, index: usize) -> Self {
        Self {
            dial: Some(values),
            dial_index: index,
            ..Self::visible()
        }
    }

    /// Set visible text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the current field content
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set the element rect
    #[must_use]
    pub const fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    /// Absent for the first `n` lookups
    #[must_use]
    pub const fn appearing_after_lookups(mut self, n: usize) -> Self {
        self.present_after_lookups = n;
        self
    }

    /// Absent from lookup `n + 1` onwards
    #[must_use]
    pub const fn vanishing_after_lookups(mut self, n: usize) -> Self {
        self.absent_after_lookups = Some(n);
        self
    }

    /// Absent until the page has been refreshed `n` times
    #[must_use]
    pub const fn appearing_after_refreshes(mut self, n: usize) -> Self {
        self.present_after_refreshes = n;
        self
    }

    fn is_present(&self, lookup: usize, refreshes: usize) -> bool {
        lookup > self.present_after_lookups
            && self.absent_after_lookups.map_or(true, |n| lookup <= n)
            && refreshes >= self.present_after_refreshes
    }

    fn content_desc(&self) -> Option<String> {
        match &self.dial {
            Some(values) => values.get(self.dial_index).cloned(),
            None => self.attributes.get("content-desc").cloned(),
        }
    }

    fn step_dial(&mut self, direction: Direction) {
        if let Some(values) = &self.dial {
            match direction {
                Direction::Up => {
                    self.dial_index = (self.dial_index + 1).min(values.len().saturating_sub(1));
                }
                Direction::Down => self.dial_index = self.dial_index.saturating_sub(1),
                Direction::Left | Direction::Right => {}
            }
        }
    }
}

#[derive(Debug)]
struct MockState {
    elements: HashMap<String, MockElement>,
    lookups: HashMap<String, usize>,
    refreshes: usize,
    focused: Option<String>,
    current_url: String,
    history: Vec<String>,
    gestures: Vec<Gesture>,
    failing: HashSet<String>,
    screenshot: Option<Vec<u8>>,
    window: WindowSize,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            elements: HashMap::new(),
            lookups: HashMap::new(),
            refreshes: 0,
            focused: None,
            current_url: String::new(),
            history: Vec::new(),
            gestures: Vec::new(),
            failing: HashSet::new(),
            screenshot: None,
            window: WindowSize::new(1080, 2400),
        }
    }
}

impl MockState {
    fn check(&self, command: &str) -> OnboardResult<()> {
        if self.failing.contains(command) {
            Err(OnboardError::driver(command, "injected failure"))
        } else {
            Ok(())
        }
    }

    fn element_mut(&mut self, id: &str, command: &str) -> OnboardResult<&mut MockElement> {
        self.elements
            .get_mut(id)
            .ok_or_else(|| OnboardError::driver(command, format!("no such element: {id}")))
    }

    fn lookup(&mut self, key: String) -> Option<ElementHandle> {
        let count = self.lookups.entry(key.clone()).or_insert(0);
        *count += 1;
        let lookup = *count;
        self.history.push(format!("find:{key}"));
        let refreshes = self.refreshes;
        self.elements
            .get(&key)
            .filter(|el| el.is_present(lookup, refreshes))
            .map(|_| ElementHandle::new(key))
    }
}

/// Mock driver for unit testing
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

fn key_of(raw: &str) -> String {
    Selector::parse(raw).to_string()
}

fn child_key(parent: &str, child: &Selector) -> String {
    format!("{parent} >> {child}")
}

impl MockDriver {
    /// Create new mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an element under its selector shorthand
    pub fn add_element(&self, selector: &str, element: MockElement) {
        let _ = self.state().elements.insert(key_of(selector), element);
    }

    /// Register an element reachable only through `parent`
    pub fn add_child(&self, parent: &str, child: &str, element: MockElement) {
        let key = child_key(&key_of(parent), &Selector::parse(child));
        let _ = self.state().elements.insert(key, element);
    }

    /// Builder-style [`Self::add_element`]
    #[must_use]
    pub fn with_element(self, selector: &str, element: MockElement) -> Self {
        self.add_element(selector, element);
        self
    }

    /// Make every call of `command` fail with a driver error
    pub fn fail_on(&self, command: &str) {
        let _ = self.state().failing.insert(command.to_string());
    }

    /// Set the screenshot payload
    pub fn set_screenshot(&self, png: Vec<u8>) {
        self.state().screenshot = Some(png);
    }

    /// Set the reported window size
    pub fn set_window_size(&self, size: WindowSize) {
        self.state().window = size;
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().history.clone()
    }

    /// Check if a call starting with `prefix` was made
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.state().history.iter().any(|c| c.starts_with(prefix))
    }

    /// Count calls starting with `prefix`
    #[must_use]
    pub fn count_calls(&self, prefix: &str) -> usize {
        self.state()
            .history
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// Number of lookups issued for a selector
    #[must_use]
    pub fn lookups(&self, selector: &str) -> usize {
        self.state()
            .lookups
            .get(&key_of(selector))
            .copied()
            .unwrap_or(0)
    }

    /// Current content of a field
    #[must_use]
    pub fn value_of(&self, selector: &str) -> Option<String> {
        self.state()
            .elements
            .get(&key_of(selector))
            .map(|el| el.value.clone())
    }

    /// Current `content-desc` of an element (dial value for dials)
    #[must_use]
    pub fn content_desc_of(&self, selector: &str) -> Option<String> {
        self.state()
            .elements
            .get(&key_of(selector))
            .and_then(MockElement::content_desc)
    }

    /// Gestures performed so far
    #[must_use]
    pub fn gestures(&self) -> Vec<Gesture> {
        self.state().gestures.clone()
    }

    /// Number of page refreshes so far
    #[must_use]
    pub fn refresh_count(&self) -> usize {
        self.state().refreshes
    }

    /// Last navigated URL
    #[must_use]
    pub fn current_url(&self) -> String {
        self.state().current_url.clone()
    }
}

#[async_trait]
impl UiDriver for MockDriver {
    async fn find_element(&self, selector: &Selector) -> OnboardResult<Option<ElementHandle>> {
        let mut state = self.state();
        state.check("find_element")?;
        Ok(state.lookup(selector.to_string()))
    }

    async fn find_child(
        &self,
        parent: &ElementHandle,
        selector: &Selector,
    ) -> OnboardResult<Option<ElementHandle>> {
        let mut state = self.state();
        state.check("find_element")?;
        Ok(state.lookup(child_key(&parent.id, selector)))
    }

    async fn is_displayed(&self, element: &ElementHandle) -> OnboardResult<bool> {
        let mut state = self.state();
        state.check("is_displayed")?;
        Ok(state.element_mut(&element.id, "is_displayed")?.displayed)
    }

    async fn click(&self, element: &ElementHandle) -> OnboardResult<()> {
        let mut state = self.state();
        state.check("click")?;
        let _ = state.element_mut(&element.id, "click")?;
        state.history.push(format!("click:{}", element.id));
        state.focused = Some(element.id.clone());
        Ok(())
    }

    async fn clear(&self, element: &ElementHandle) -> OnboardResult<()> {
        let mut state = self.state();
        state.check("clear")?;
        state.element_mut(&element.id, "clear")?.value.clear();
        state.history.push(format!("clear:{}", element.id));
        Ok(())
    }

    async fn set_value(&self, element: &ElementHandle, value: &str) -> OnboardResult<()> {
        let mut state = self.state();
        state.check("set_value")?;
        state
            .element_mut(&element.id, "set_value")?
            .value
            .push_str(value);
        state
            .history
            .push(format!("set_value:{}:{value}", element.id));
        Ok(())
    }

    async fn type_text(&self, text: &str) -> OnboardResult<()> {
        let mut state = self.state();
        state.check("type_text")?;
        let focused = state
            .focused
            .clone()
            .ok_or_else(|| OnboardError::driver("type_text", "no focused element"))?;
        state.element_mut(&focused, "type_text")?.value.push_str(text);
        state.history.push(format!("type:{text}"));
        Ok(())
    }

    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> OnboardResult<Option<String>> {
        let mut state = self.state();
        state.check("attribute")?;
        let el = state.element_mut(&element.id, "attribute")?;
        Ok(match name {
            "content-desc" => el.content_desc(),
            "value" => Some(el.value.clone()),
            _ => el.attributes.get(name).cloned(),
        })
    }

    async fn text(&self, element: &ElementHandle) -> OnboardResult<String> {
        let mut state = self.state();
        state.check("text")?;
        Ok(state.element_mut(&element.id, "text")?.text.clone())
    }

    async fn rect(&self, element: &ElementHandle) -> OnboardResult<Rect> {
        let mut state = self.state();
        state.check("rect")?;
        Ok(state.element_mut(&element.id, "rect")?.rect)
    }

    async fn perform_gesture(&self, gesture: &Gesture) -> OnboardResult<()> {
        let mut state = self.state();
        state.check("perform_gesture")?;
        let entry = match gesture {
            Gesture::Scroll { direction, .. } | Gesture::Swipe { direction, .. } => {
                format!("gesture:{}:{direction}", gesture.command())
            }
            Gesture::ClickAt { x, y } => format!("gesture:{}:{x},{y}", gesture.command()),
        };
        state.history.push(entry);
        if let Gesture::Swipe {
            area, direction, ..
        } = gesture
        {
            if let Some(dial) = state
                .elements
                .values_mut()
                .find(|el| el.dial.is_some() && el.rect == *area)
            {
                dial.step_dial(*direction);
            }
        }
        state.gestures.push(gesture.clone());
        Ok(())
    }

    async fn window_size(&self) -> OnboardResult<WindowSize> {
        let state = self.state();
        state.check("window_size")?;
        Ok(state.window)
    }

    async fn screenshot(&self) -> OnboardResult<Vec<u8>> {
        let mut state = self.state();
        state.check("screenshot")?;
        state.history.push("screenshot".to_string());
        Ok(state
            .screenshot
            .clone()
            .unwrap_or_else(|| PLACEHOLDER_PNG.to_vec()))
    }

    async fn navigate(&self, url: &str) -> OnboardResult<()> {
        let mut state = self.state();
        state.check("navigate")?;
        state.history.push(format!("navigate:{url}"));
        state.current_url = url.to_string();
        Ok(())
    }

    async fn refresh(&self) -> OnboardResult<()> {
        let mut state = self.state();
        state.check("refresh")?;
        state.history.push("refresh".to_string());
        state.refreshes += 1;
        Ok(())
    }

    async fn scroll_into_view(&self, element: &ElementHandle) -> OnboardResult<()> {
        let mut state = self.state();
        state.check("scroll_into_view")?;
        state
            .history
            .push(format!("scroll_into_view:{}", element.id));
        Ok(())
    }

    async fn press_key(&self, key: Key) -> OnboardResult<()> {
        let mut state = self.state();
        state.check("press_key")?;
        state.history.push(format!("key:{key}"));
        Ok(())
    }

    async fn end_session(&self) -> OnboardResult<()> {
        let mut state = self.state();
        state.history.push("end_session".to_string());
        Ok(())
    }
}
