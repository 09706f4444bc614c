//! Browser session driver
//!
//! A thin async client for the W3C WebDriver protocol. The session talks to
//! an external driver binary (chromedriver, geckodriver, or a Selenium hub)
//! over HTTP; every element interaction re-resolves its locator with an
//! explicit polling wait, so callers never hold on to stale element handles.

use std::path::Path;
use std::time::{Duration, Instant};

use base64::Engine;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use hub360_common::{BrowserKind, Error, Result, SuiteConfig};

/// W3C element identifier key in find-element responses.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Poll interval for explicit waits.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Element lookup strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Css,
    XPath,
}

/// An element locator: strategy plus selector text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub strategy: Strategy,
    pub value: String,
}

impl Locator {
    pub fn css(value: impl Into<String>) -> Self {
        Self { strategy: Strategy::Css, value: value.into() }
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self { strategy: Strategy::XPath, value: value.into() }
    }

    /// The `using` field of a find-element request.
    fn using(&self) -> &'static str {
        match self.strategy {
            Strategy::Css => "css selector",
            Strategy::XPath => "xpath",
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.strategy {
            Strategy::Css => write!(f, "css={}", self.value),
            Strategy::XPath => write!(f, "xpath={}", self.value),
        }
    }
}

/// Handle to one live browser session.
pub struct BrowserSession {
    client: reqwest::Client,
    endpoint: String,
    session_id: String,
    base_url: String,
    explicit_wait: Duration,
    closed: bool,
}

impl BrowserSession {
    /// Start a new browser session against the configured WebDriver endpoint.
    pub async fn start(config: &SuiteConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.page_load_timeout + Duration::from_secs(10))
            .build()?;

        let endpoint = config.webdriver_url.trim_end_matches('/').to_string();
        let capabilities = build_capabilities(config);

        info!(
            "Starting {} session (headless: {}) via {}",
            config.browser, config.headless, endpoint
        );

        let resp = client
            .post(format!("{}/session", endpoint))
            .json(&json!({ "capabilities": { "alwaysMatch": capabilities } }))
            .send()
            .await
            .map_err(|e| Error::SessionStartup(format!("cannot reach {}: {}", endpoint, e)))?;

        let value = unwrap_value(resp).await?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::SessionStartup("driver returned no sessionId".to_string()))?
            .to_string();

        let session = Self {
            client,
            endpoint,
            session_id,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            explicit_wait: config.explicit_wait,
            closed: false,
        };

        session
            .cmd(
                reqwest::Method::POST,
                "timeouts",
                Some(json!({
                    "implicit": config.implicit_wait.as_millis() as u64,
                    "pageLoad": config.page_load_timeout.as_millis() as u64,
                })),
            )
            .await?;

        debug!("Session {} started", session.session_id);
        Ok(session)
    }

    /// Issue one WebDriver command under this session.
    async fn cmd(&self, method: reqwest::Method, path: &str, body: Option<Value>) -> Result<Value> {
        let url = if path.is_empty() {
            format!("{}/session/{}", self.endpoint, self.session_id)
        } else {
            format!("{}/session/{}/{}", self.endpoint, self.session_id, path)
        };

        let mut req = self.client.request(method.clone(), url.as_str());
        // WebDriver requires a JSON body on every POST, even parameterless ones.
        if method == reqwest::Method::POST {
            req = req.json(body.as_ref().unwrap_or(&json!({})));
        }

        unwrap_value(req.send().await?).await
    }

    // -- navigation ---------------------------------------------------------

    /// Navigate to an absolute URL.
    pub async fn navigate(&self, url: &str) -> Result<()> {
        info!("Opening URL: {}", url);
        self.cmd(reqwest::Method::POST, "url", Some(json!({ "url": url }))).await?;
        Ok(())
    }

    /// Navigate to a path relative to the application base URL.
    pub async fn open(&self, path: &str) -> Result<()> {
        self.navigate(&format!("{}{}", self.base_url, path)).await
    }

    pub async fn refresh(&self) -> Result<()> {
        self.cmd(reqwest::Method::POST, "refresh", None).await?;
        debug!("Page refreshed");
        Ok(())
    }

    pub async fn current_url(&self) -> Result<String> {
        let value = self.cmd(reqwest::Method::GET, "url", None).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    pub async fn title(&self) -> Result<String> {
        let value = self.cmd(reqwest::Method::GET, "title", None).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    // -- elements -----------------------------------------------------------

    /// Single find attempt, no waiting. `Ok(None)` when absent.
    async fn try_find(&self, locator: &Locator) -> Result<Option<String>> {
        let body = json!({ "using": locator.using(), "value": locator.value });
        match self.cmd(reqwest::Method::POST, "element", Some(body)).await {
            Ok(value) => Ok(value.get(ELEMENT_KEY).and_then(Value::as_str).map(String::from)),
            Err(Error::WebDriver { code, .. }) if code == "no such element" => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Find an element, polling up to the explicit wait.
    pub async fn find(&self, locator: &Locator) -> Result<String> {
        self.find_with_timeout(locator, self.explicit_wait).await
    }

    pub async fn find_with_timeout(&self, locator: &Locator, timeout: Duration) -> Result<String> {
        let start = Instant::now();
        loop {
            if let Some(id) = self.try_find(locator).await? {
                debug!("Element found: {}", locator);
                return Ok(id);
            }
            if start.elapsed() >= timeout {
                error!("Element not found: {}", locator);
                return Err(Error::timeout(format!("element {}", locator), timeout.as_millis() as u64));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Click an element once it is present.
    pub async fn click(&self, locator: &Locator) -> Result<()> {
        let id = self.find(locator).await?;
        self.cmd(reqwest::Method::POST, &format!("element/{}/click", id), None).await?;
        info!("Clicked element: {}", locator);
        Ok(())
    }

    /// Type into an input, clearing it first unless told otherwise.
    pub async fn send_keys(&self, locator: &Locator, text: &str, clear_first: bool) -> Result<()> {
        let id = self.find(locator).await?;
        if clear_first {
            self.cmd(reqwest::Method::POST, &format!("element/{}/clear", id), None).await?;
        }
        self.cmd(
            reqwest::Method::POST,
            &format!("element/{}/value", id),
            Some(json!({ "text": text })),
        )
        .await?;
        info!("Entered text into {}", locator);
        Ok(())
    }

    pub async fn text(&self, locator: &Locator) -> Result<String> {
        let id = self.find(locator).await?;
        let value = self.cmd(reqwest::Method::GET, &format!("element/{}/text", id), None).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    pub async fn attribute(&self, locator: &Locator, name: &str) -> Result<Option<String>> {
        let id = self.find(locator).await?;
        let value = self
            .cmd(reqwest::Method::GET, &format!("element/{}/attribute/{}", id, name), None)
            .await?;
        Ok(value.as_str().map(String::from))
    }

    pub async fn is_enabled(&self, locator: &Locator) -> Result<bool> {
        let id = self.find(locator).await?;
        let value = self.cmd(reqwest::Method::GET, &format!("element/{}/enabled", id), None).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    /// Whether the element is present in the DOM right now (no wait).
    pub async fn is_present(&self, locator: &Locator) -> bool {
        matches!(self.try_find(locator).await, Ok(Some(_)))
    }

    // -- waits --------------------------------------------------------------

    /// Wait until the element is displayed. Returns false on timeout.
    pub async fn is_visible(&self, locator: &Locator, timeout: Duration) -> bool {
        let start = Instant::now();
        loop {
            if let Ok(Some(id)) = self.try_find(locator).await {
                match self
                    .cmd(reqwest::Method::GET, &format!("element/{}/displayed", id), None)
                    .await
                {
                    Ok(value) if value.as_bool().unwrap_or(false) => return true,
                    Ok(_) | Err(_) => {}
                }
            }
            if start.elapsed() >= timeout {
                return false;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Wait until no element matches the locator. Returns false on timeout.
    pub async fn wait_for_gone(&self, locator: &Locator, timeout: Duration) -> bool {
        let start = Instant::now();
        loop {
            match self.try_find(locator).await {
                Ok(None) => return true,
                Ok(Some(_)) | Err(_) => {}
            }
            if start.elapsed() >= timeout {
                warn!("Element still present: {}", locator);
                return false;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Wait for the current URL to contain a fragment. Returns false on timeout.
    pub async fn wait_for_url_contains(&self, fragment: &str, timeout: Duration) -> bool {
        let start = Instant::now();
        loop {
            if let Ok(url) = self.current_url().await {
                if url.contains(fragment) {
                    debug!("URL contains '{}': {}", fragment, url);
                    return true;
                }
            }
            if start.elapsed() >= timeout {
                warn!("URL does not contain '{}' after {:?}", fragment, timeout);
                return false;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    // -- scripting & capture ------------------------------------------------

    /// Execute synchronous JavaScript in the page, returning its value.
    pub async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        self.cmd(
            reqwest::Method::POST,
            "execute/sync",
            Some(json!({ "script": script, "args": args })),
        )
        .await
    }

    /// Capture a PNG screenshot of the viewport into `path`.
    pub async fn screenshot(&self, path: &Path) -> Result<()> {
        let value = self.cmd(reqwest::Method::GET, "screenshot", None).await?;
        let encoded = value.as_str().unwrap_or_default();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| Error::WebDriver {
                code: "invalid screenshot payload".to_string(),
                message: e.to_string(),
            })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes)?;
        info!("Screenshot saved: {}", path.display());
        Ok(())
    }

    /// End the session. Safe to call twice.
    pub async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.cmd(reqwest::Method::DELETE, "", None).await?;
        info!("Session {} closed", self.session_id);
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if !self.closed {
            // Best-effort fire-and-forget delete; the driver reaps orphaned
            // sessions on its own timeout if this never lands.
            let url = format!("{}/session/{}", self.endpoint, self.session_id);
            let client = self.client.clone();
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(async move {
                    let _ = client.request(reqwest::Method::DELETE, url).send().await;
                });
            }
        }
    }
}

/// Build the `alwaysMatch` capabilities object for the configured browser.
fn build_capabilities(config: &SuiteConfig) -> Value {
    let (width, height) = config.window_size;

    match config.browser {
        BrowserKind::Chrome | BrowserKind::Edge => {
            let mut args = vec![
                "--no-sandbox".to_string(),
                "--disable-dev-shm-usage".to_string(),
                format!("--window-size={},{}", width, height),
            ];
            if config.headless {
                args.push("--headless=new".to_string());
            }
            let options_key = match config.browser {
                BrowserKind::Chrome => "goog:chromeOptions",
                _ => "ms:edgeOptions",
            };
            json!({
                "browserName": config.browser.browser_name(),
                options_key: { "args": args },
            })
        }
        BrowserKind::Firefox => {
            let mut args = vec![
                "-width".to_string(),
                width.to_string(),
                "-height".to_string(),
                height.to_string(),
            ];
            if config.headless {
                args.push("-headless".to_string());
            }
            json!({
                "browserName": "firefox",
                "moz:firefoxOptions": { "args": args },
            })
        }
    }
}

/// Extract the `value` field of a WebDriver response, mapping error payloads.
async fn unwrap_value(resp: reqwest::Response) -> Result<Value> {
    let status = resp.status();
    let body: Value = resp.json().await?;
    let value = body.get("value").cloned().unwrap_or(Value::Null);

    if !status.is_success() {
        let code = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("no message")
            .to_string();
        return Err(Error::WebDriver { code, message });
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locator_using_field() {
        assert_eq!(Locator::css("input[name=email]").using(), "css selector");
        assert_eq!(Locator::xpath("//button").using(), "xpath");
    }

    #[test]
    fn chrome_capabilities_carry_headless_and_window_size() {
        let mut config = SuiteConfig::default();
        config.headless = true;
        let caps = build_capabilities(&config);

        assert_eq!(caps["browserName"], "chrome");
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(args.iter().any(|a| a == "--headless=new"));
        assert!(args.iter().any(|a| a == "--window-size=1920,1080"));
    }

    #[test]
    fn firefox_capabilities_omit_headless_when_headed() {
        let mut config = SuiteConfig::default();
        config.browser = BrowserKind::Firefox;
        config.headless = false;
        let caps = build_capabilities(&config);

        let args = caps["moz:firefoxOptions"]["args"].as_array().unwrap();
        assert!(!args.iter().any(|a| a == "-headless"));
    }

    #[test]
    fn edge_uses_ms_options_key() {
        let mut config = SuiteConfig::default();
        config.browser = BrowserKind::Edge;
        let caps = build_capabilities(&config);
        assert_eq!(caps["browserName"], "MicrosoftEdge");
        assert!(caps.get("ms:edgeOptions").is_some());
    }
}
