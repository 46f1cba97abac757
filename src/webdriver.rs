use std::time::Duration;

use anyhow::Context;
use fantoccini::actions::{InputSource, MouseActions, PointerAction};
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::wd::WindowHandle;
use fantoccini::{Client, ClientBuilder};
use serde_json::{Value, json};
use tempfile::TempDir;
use tracing::{debug, info};

use crate::driver::Driver;
use crate::errors::{ProbeError, Result};
use crate::locator::{Locator, Strategy};
use crate::types::ViewportSize;
use crate::webdriver_manager::GLOBAL_WEBDRIVER_MANAGER;

const RECOVERY_PAUSE: Duration = Duration::from_millis(500);

/// Browser session backed by a W3C WebDriver server
pub struct Browser {
    client: Client,
    browser_type: BrowserType,
    // Chrome profile; removed when the session is dropped
    _profile_dir: Option<TempDir>,
}

/// Supported browser types
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BrowserType {
    /// Google Chrome/Chromium
    Chrome,
    /// Mozilla Firefox
    Firefox,
}

impl std::str::FromStr for BrowserType {
    type Err = anyhow::Error;

    /// Parse browser type from string (case-insensitive)
    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "firefox" => Ok(BrowserType::Firefox),
            "chrome" | "chromium" => Ok(BrowserType::Chrome),
            _ => anyhow::bail!("Unsupported browser: {}", s),
        }
    }
}

impl BrowserType {
    pub fn driver_command(self) -> &'static str {
        match self {
            BrowserType::Chrome => "chromedriver",
            BrowserType::Firefox => "geckodriver",
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            BrowserType::Chrome => 9515,
            BrowserType::Firefox => 4444,
        }
    }

    pub fn default_webdriver_url(self) -> String {
        format!("http://localhost:{}", self.default_port())
    }
}

/// Launch flags; notifications, popup blocking, infobars and extensions are
/// all turned off so nothing overlays the page under test
pub fn chrome_args(headless: bool, viewport: Option<ViewportSize>) -> Vec<String> {
    let mut args: Vec<String> = [
        "--disable-notifications",
        "--disable-popup-blocking",
        "--disable-infobars",
        "--disable-extensions",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    if headless {
        args.push("--headless=new".to_string());
        args.push("--no-sandbox".to_string());
        args.push("--disable-dev-shm-usage".to_string());
    }

    match viewport {
        Some(vp) => args.push(format!("--window-size={},{}", vp.width, vp.height)),
        None => args.push("--start-maximized".to_string()),
    }
    args
}

pub fn firefox_args(headless: bool, viewport: Option<ViewportSize>) -> Vec<String> {
    let mut args = Vec::new();
    if headless {
        args.push("--headless".to_string());
    }
    if let Some(vp) = viewport {
        args.push(format!("--width={}", vp.width));
        args.push(format!("--height={}", vp.height));
    }
    args
}

fn capabilities(
    browser_type: BrowserType,
    headless: bool,
    viewport: Option<ViewportSize>,
    profile_dir: Option<&TempDir>,
) -> serde_json::Map<String, Value> {
    let mut caps = serde_json::Map::new();
    match browser_type {
        BrowserType::Chrome => {
            let mut args = chrome_args(headless, viewport);
            if let Some(dir) = profile_dir {
                args.push(format!("--user-data-dir={}", dir.path().display()));
            }
            caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        }
        BrowserType::Firefox => {
            caps.insert(
                "moz:firefoxOptions".to_string(),
                json!({ "args": firefox_args(headless, viewport) }),
            );
        }
    }
    caps
}

fn webdriver_error(context: &str) -> impl FnOnce(CmdError) -> ProbeError + '_ {
    move |e| {
        if e.is_miss() {
            return ProbeError::ElementNotFound(format!("{}: {}", context, e));
        }
        let code = match &e {
            CmdError::Standard(w) => Some(w.error().to_string()),
            _ => None,
        };
        ProbeError::from_webdriver_code(context, code.as_deref(), &e.to_string())
    }
}

fn element_arg(element: &Element) -> Result<Value> {
    serde_json::to_value(element)
        .map_err(|e| ProbeError::WebDriver(format!("cannot pass element to script: {}", e)))
}

impl Browser {
    /// Start a session, launching the driver server if needed.
    ///
    /// # Arguments
    /// * `browser_type` - Chrome or Firefox
    /// * `viewport` - Window size; Chrome starts maximized without one
    /// * `headless` - Run without a visible window
    pub async fn new(
        browser_type: BrowserType,
        viewport: Option<ViewportSize>,
        headless: bool,
    ) -> anyhow::Result<Self> {
        info!("Connecting to {:?} WebDriver", browser_type);

        let webdriver_url = GLOBAL_WEBDRIVER_MANAGER.ensure_driver(browser_type).await?;

        // Chrome refuses to share a profile directory between sessions
        let profile_dir = match browser_type {
            BrowserType::Chrome => Some(
                tempfile::Builder::new()
                    .prefix("careerprobe-chrome-")
                    .tempdir()?,
            ),
            BrowserType::Firefox => None,
        };

        let caps = capabilities(browser_type, headless, viewport, profile_dir.as_ref());
        debug!("Connecting to WebDriver at {}", webdriver_url);

        let client = match ClientBuilder::rustls()
            .capabilities(caps.clone())
            .connect(&webdriver_url)
            .await
        {
            Ok(client) => client,
            Err(e) if e.to_string().contains("session not created") => {
                info!("WebDriver refused a new session, restarting it");
                GLOBAL_WEBDRIVER_MANAGER.stop_all();
                tokio::time::sleep(RECOVERY_PAUSE).await;

                let url = GLOBAL_WEBDRIVER_MANAGER
                    .ensure_driver(browser_type)
                    .await
                    .context("Failed to restart WebDriver")?;
                ClientBuilder::rustls()
                    .capabilities(caps)
                    .connect(&url)
                    .await
                    .context("Failed to connect to WebDriver after restart")?
            }
            Err(e) => return Err(e).context("Failed to connect to WebDriver"),
        };

        if let Some(vp) = viewport {
            debug!("Setting viewport to {}", vp);
            if let Err(e) = client.set_window_size(vp.width, vp.height).await {
                debug!("Could not set window size: {}", e);
            }
        }

        Ok(Browser {
            client,
            browser_type,
            _profile_dir: profile_dir,
        })
    }

    pub fn browser_type(&self) -> BrowserType {
        self.browser_type
    }

    async fn find_in(&self, parent: Option<&Element>, locator: &Locator) -> Result<Vec<Element>> {
        let (strategy, value) = locator.to_w3c();
        let w3c = match strategy {
            Strategy::XPath => fantoccini::Locator::XPath(&value),
            _ => fantoccini::Locator::Css(&value),
        };
        let found = match parent {
            Some(parent) => parent.find_all(w3c).await,
            None => self.client.find_all(w3c).await,
        };

        match found {
            Ok(elements) => Ok(elements),
            Err(e) => match ProbeError::from_webdriver_message("find", &e.to_string()) {
                // find_all reports zero matches on some drivers as an error
                ProbeError::ElementNotFound(_) => Ok(Vec::new()),
                other => Err(other),
            },
        }
    }
}

impl Driver for Browser {
    type Element = Element;
    type Window = WindowHandle;

    async fn goto(&self, url: &str) -> Result<()> {
        info!("Navigating to {}", url);
        self.client.goto(url).await.map_err(webdriver_error("goto"))
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self
            .client
            .current_url()
            .await
            .map_err(webdriver_error("current url"))?
            .to_string())
    }

    async fn title(&self) -> Result<String> {
        self.client.title().await.map_err(webdriver_error("title"))
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<Element>> {
        self.find_in(None, locator).await
    }

    async fn find_all_within(&self, parent: &Element, locator: &Locator) -> Result<Vec<Element>> {
        self.find_in(Some(parent), locator).await
    }

    async fn execute(&self, script: &str, args: &[&Element]) -> Result<Value> {
        let args = args
            .iter()
            .map(|el| element_arg(el))
            .collect::<Result<Vec<_>>>()?;
        self.client
            .execute(script, args)
            .await
            .map_err(webdriver_error("script"))
    }

    async fn window_handles(&self) -> Result<Vec<WindowHandle>> {
        self.client.windows().await.map_err(webdriver_error("windows"))
    }

    async fn switch_to_window(&self, window: &WindowHandle) -> Result<()> {
        self.client
            .switch_to_window(window.clone())
            .await
            .map_err(webdriver_error("switch window"))
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.client
            .screenshot()
            .await
            .map_err(webdriver_error("screenshot"))
    }

    async fn quit(self) -> Result<()> {
        debug!("Closing {:?} session", self.browser_type);
        self.client.close().await.map_err(webdriver_error("quit"))
    }

    async fn text(&self, element: &Element) -> Result<String> {
        element.text().await.map_err(webdriver_error("text"))
    }

    async fn attribute(&self, element: &Element, name: &str) -> Result<Option<String>> {
        element.attr(name).await.map_err(webdriver_error("attribute"))
    }

    async fn is_displayed(&self, element: &Element) -> Result<bool> {
        element
            .is_displayed()
            .await
            .map_err(webdriver_error("is displayed"))
    }

    async fn is_enabled(&self, element: &Element) -> Result<bool> {
        element
            .is_enabled()
            .await
            .map_err(webdriver_error("is enabled"))
    }

    async fn click(&self, element: &Element) -> Result<()> {
        element.click().await.map_err(webdriver_error("click"))
    }

    async fn clear(&self, element: &Element) -> Result<()> {
        element.clear().await.map_err(webdriver_error("clear"))
    }

    async fn send_keys(&self, element: &Element, text: &str) -> Result<()> {
        element
            .send_keys(text)
            .await
            .map_err(webdriver_error("send keys"))
    }

    async fn hover(&self, element: &Element) -> Result<()> {
        let actions = MouseActions::new("mouse".to_string()).then(PointerAction::MoveToElement {
            element: element.clone(),
            duration: None,
            x: 0,
            y: 0,
        });
        self.client
            .perform_actions(actions)
            .await
            .map_err(webdriver_error("hover"))
    }
}
