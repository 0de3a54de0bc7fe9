//! W3C WebDriver client.
//!
//! Speaks the JSON wire protocol shared by Appium (UiAutomator2) and
//! browser drivers such as chromedriver. Appium-only behaviour goes through
//! `POST /execute/sync` with the `mobile:` extension commands.

use super::{ElementHandle, Gesture, Key, Rect, UiDriver, WindowSize};
use crate::result::{OnboardError, OnboardResult};
use crate::selector::Selector;
use async_trait::async_trait;
use base64::Engine;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

/// W3C web element identifier key
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Legacy JSONWP element key still emitted by some Appium drivers
const LEGACY_ELEMENT_KEY: &str = "ELEMENT";

/// Upper bound for a single HTTP round trip; session creation on a cold
/// emulator is the slow case
const HTTP_TIMEOUT: Duration = Duration::from_secs(180);

/// Decoded reply of one wire command
#[derive(Debug, Clone, PartialEq)]
enum Reply {
    Value(Value),
    Failure { error: String, message: String },
}

impl Reply {
    fn from_payload(success: bool, payload: Value) -> Self {
        let value = payload.get("value").cloned().unwrap_or(Value::Null);
        if success {
            return Self::Value(value);
        }
        let error = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Self::Failure { error, message }
    }

    fn into_result(self, command: &str) -> OnboardResult<Value> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Failure { error, message } => {
                Err(OnboardError::driver(command, format!("{error}: {message}")))
            }
        }
    }
}

/// Outcome of `DELETE /session/{id}`; a non-2xx status fails even without a W3C error body.
fn session_end_result(status: StatusCode, body: &str) -> OnboardResult<()> {
    if status.is_success() {
        return Ok(());
    }
    let has_error = serde_json::from_str::<Value>(body)
        .ok()
        .filter(|payload| payload.pointer("/value/error").is_some());
    match has_error {
        Some(payload) => Reply::from_payload(false, payload)
            .into_result("end_session")
            .map(|_| ()),
        None => Err(OnboardError::driver(
            "end_session",
            format!("server answered {status}"),
        )),
    }
}

fn element_from_value(value: &Value) -> Option<ElementHandle> {
    value
        .get(ELEMENT_KEY)
        .or_else(|| value.get(LEGACY_ELEMENT_KEY))
        .and_then(Value::as_str)
        .map(ElementHandle::new)
}

fn element_reference(element: &ElementHandle) -> Value {
    json!({ ELEMENT_KEY: element.id, LEGACY_ELEMENT_KEY: element.id })
}

fn session_id_from(payload: &Value) -> Option<String> {
    payload
        .pointer("/value/sessionId")
        .or_else(|| payload.get("sessionId"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn key_actions(key: Key) -> Value {
    json!({
        "actions": [{
            "type": "key",
            "id": "keyboard",
            "actions": [
                { "type": "keyDown", "value": key.code_point() },
                { "type": "keyUp", "value": key.code_point() },
            ],
        }]
    })
}

/// A live WebDriver session
#[derive(Debug, Clone)]
pub struct WebDriverSession {
    client: reqwest::Client,
    server_url: String,
    session_id: String,
}

impl WebDriverSession {
    /// Open a session on the server at `server_url`.
    ///
    /// # Errors
    ///
    /// Returns `SessionNotStarted` if the server rejects the capabilities.
    pub async fn start(server_url: impl Into<String>, capabilities: Value) -> OnboardResult<Self> {
        let server_url = server_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;

        let body = json!({
            "capabilities": { "alwaysMatch": capabilities, "firstMatch": [{}] }
        });
        let resp = client
            .post(format!("{server_url}/session"))
            .json(&body)
            .send()
            .await?;
        let success = resp.status().is_success();
        let payload: Value = resp.json().await?;

        if !success {
            let message = match Reply::from_payload(false, payload) {
                Reply::Failure { error, message } => format!("{error}: {message}"),
                Reply::Value(_) => "unexpected reply".to_string(),
            };
            return Err(OnboardError::SessionNotStarted { message });
        }

        let session_id =
            session_id_from(&payload).ok_or_else(|| OnboardError::SessionNotStarted {
                message: "reply carried no session id".to_string(),
            })?;
        info!(%server_url, %session_id, "session started");

        Ok(Self {
            client,
            server_url,
            session_id,
        })
    }

    /// Session identifier assigned by the server
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Server the session lives on
    #[must_use]
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> OnboardResult<Reply> {
        let url = format!("{}/session/{}{path}", self.server_url, self.session_id);
        debug!(%method, %path, "webdriver command");

        let mut request = self.client.request(method.clone(), url);
        if method == Method::POST {
            request = request.json(&body.unwrap_or_else(|| json!({})));
        }
        let resp = request.send().await?;
        let success = resp.status().is_success();
        let payload: Value = resp.json().await?;
        Ok(Reply::from_payload(success, payload))
    }

    async fn command(
        &self,
        name: &str,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> OnboardResult<Value> {
        self.send(method, path, body).await?.into_result(name)
    }

    async fn execute(&self, name: &str, script: &str, args: Vec<Value>) -> OnboardResult<Value> {
        self.command(
            name,
            Method::POST,
            "/execute/sync",
            Some(json!({ "script": script, "args": args })),
        )
        .await
    }

    async fn locate(&self, path: &str, selector: &Selector) -> OnboardResult<Option<ElementHandle>> {
        match self
            .send(Method::POST, path, Some(selector.to_locator()))
            .await?
        {
            Reply::Value(value) => Ok(element_from_value(&value)),
            Reply::Failure { error, .. } if error == "no such element" => Ok(None),
            reply => reply.into_result("find_element").map(|_| None),
        }
    }
}

#[async_trait]
impl UiDriver for WebDriverSession {
    async fn find_element(&self, selector: &Selector) -> OnboardResult<Option<ElementHandle>> {
        self.locate("/element", selector).await
    }

    async fn find_child(
        &self,
        parent: &ElementHandle,
        selector: &Selector,
    ) -> OnboardResult<Option<ElementHandle>> {
        self.locate(&format!("/element/{}/element", parent.id), selector)
            .await
    }

    async fn is_displayed(&self, element: &ElementHandle) -> OnboardResult<bool> {
        let path = format!("/element/{}/displayed", element.id);
        match self.send(Method::GET, &path, None).await? {
            Reply::Value(value) => Ok(value.as_bool().unwrap_or(false)),
            // The screen re-rendered between lookup and check
            Reply::Failure { error, .. } if error == "stale element reference" => Ok(false),
            reply => reply.into_result("is_displayed").map(|_| false),
        }
    }

    async fn click(&self, element: &ElementHandle) -> OnboardResult<()> {
        let path = format!("/element/{}/click", element.id);
        self.command("click", Method::POST, &path, None).await?;
        Ok(())
    }

    async fn clear(&self, element: &ElementHandle) -> OnboardResult<()> {
        let path = format!("/element/{}/clear", element.id);
        self.command("clear", Method::POST, &path, None).await?;
        Ok(())
    }

    async fn set_value(&self, element: &ElementHandle, value: &str) -> OnboardResult<()> {
        let path = format!("/element/{}/value", element.id);
        self.command("set_value", Method::POST, &path, Some(json!({ "text": value })))
            .await?;
        Ok(())
    }

    async fn type_text(&self, text: &str) -> OnboardResult<()> {
        self.execute("type_text", "mobile: type", vec![json!({ "text": text })])
            .await?;
        Ok(())
    }

    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> OnboardResult<Option<String>> {
        let path = format!("/element/{}/attribute/{name}", element.id);
        let value = self.command("attribute", Method::GET, &path, None).await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn text(&self, element: &ElementHandle) -> OnboardResult<String> {
        let path = format!("/element/{}/text", element.id);
        let value = self.command("text", Method::GET, &path, None).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn rect(&self, element: &ElementHandle) -> OnboardResult<Rect> {
        let path = format!("/element/{}/rect", element.id);
        let value = self.command("rect", Method::GET, &path, None).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn perform_gesture(&self, gesture: &Gesture) -> OnboardResult<()> {
        self.execute("perform_gesture", gesture.command(), vec![gesture.arguments()])
            .await?;
        Ok(())
    }

    async fn window_size(&self) -> OnboardResult<WindowSize> {
        let value = self
            .command("window_size", Method::GET, "/window/rect", None)
            .await?;
        let rect: Rect = serde_json::from_value(value)?;
        Ok(WindowSize::new(rect.width as u32, rect.height as u32))
    }

    async fn screenshot(&self) -> OnboardResult<Vec<u8>> {
        let value = self
            .command("screenshot", Method::GET, "/screenshot", None)
            .await?;
        let encoded = value.as_str().ok_or_else(|| OnboardError::Screenshot {
            message: "reply was not a base64 string".to_string(),
        })?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| OnboardError::Screenshot {
                message: e.to_string(),
            })
    }

    async fn navigate(&self, url: &str) -> OnboardResult<()> {
        self.command("navigate", Method::POST, "/url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    async fn refresh(&self) -> OnboardResult<()> {
        self.command("refresh", Method::POST, "/refresh", None)
            .await?;
        Ok(())
    }

    async fn scroll_into_view(&self, element: &ElementHandle) -> OnboardResult<()> {
        self.execute(
            "scroll_into_view",
            "arguments[0].scrollIntoView({block: 'center', inline: 'nearest'});",
            vec![element_reference(element)],
        )
        .await?;
        Ok(())
    }

    async fn press_key(&self, key: Key) -> OnboardResult<()> {
        self.command("press_key", Method::POST, "/actions", Some(key_actions(key)))
            .await?;
        Ok(())
    }

    async fn end_session(&self) -> OnboardResult<()> {
        let url = format!("{}/session/{}", self.server_url, self.session_id);
        let resp = self.client.delete(url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        session_end_result(status, &body)?;
        info!(session_id = %self.session_id, %status, "session ended");
        Ok(())
    }
}
