use anyhow::{Context, Result};
use std::process::{Child, Command, Stdio};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::webdriver::BrowserType;

const STARTUP_ATTEMPTS: u32 = 30;
const STARTUP_POLL: Duration = Duration::from_millis(100);
const STATUS_TIMEOUT: Duration = Duration::from_secs(1);

/// Finds or starts the driver server (chromedriver, geckodriver) a browser
/// session talks to
#[derive(Default)]
pub struct WebDriverManager {
    processes: Mutex<Vec<WebDriverProcess>>,
}

struct WebDriverProcess {
    browser_type: BrowserType,
    child: Child,
    port: u16,
    url: String,
}

impl WebDriverManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn processes(&self) -> MutexGuard<'_, Vec<WebDriverProcess>> {
        self.processes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// URL of a ready driver server for `browser_type`, starting one if none
    /// answers on its standard port
    pub async fn ensure_driver(&self, browser_type: BrowserType) -> Result<String> {
        let managed: Vec<String> = self
            .processes()
            .iter()
            .filter(|p| p.browser_type == browser_type)
            .map(|p| p.url.clone())
            .collect();

        for url in managed {
            if Self::is_driver_ready(&url).await {
                debug!("Using managed WebDriver at {}", url);
                return Ok(url);
            }
        }

        let standard = browser_type.default_webdriver_url();
        if Self::is_driver_ready(&standard).await {
            debug!("Found external WebDriver at {}", standard);
            return Ok(standard);
        }

        info!("No {} detected, starting one", browser_type.driver_command());
        self.start_driver(browser_type).await
    }

    async fn start_driver(&self, browser_type: BrowserType) -> Result<String> {
        let command = browser_type.driver_command();
        if !Self::command_exists(command) {
            anyhow::bail!(
                "{} not found in PATH. Install it or start it manually on port {}",
                command,
                browser_type.default_port()
            );
        }

        let port = Self::find_free_port(browser_type)?;
        let port_arg = match browser_type {
            BrowserType::Chrome => vec![format!("--port={}", port)],
            BrowserType::Firefox => vec!["--port".to_string(), port.to_string()],
        };
        info!("Starting {} on port {}", command, port);

        let child = Command::new(command)
            .args(&port_arg)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to start {}", command))?;

        let url = format!("http://localhost:{}", port);
        self.processes().push(WebDriverProcess {
            browser_type,
            child,
            port,
            url: url.clone(),
        });

        for _ in 0..STARTUP_ATTEMPTS {
            if Self::is_driver_running(&url).await {
                info!("{} ready at {}", command, url);
                return Ok(url);
            }
            sleep(STARTUP_POLL).await;
        }

        self.stop_port(port);
        anyhow::bail!("{} did not become ready on port {}", command, port)
    }

    pub fn command_exists(command: &str) -> bool {
        #[cfg(unix)]
        let finder = "which";
        #[cfg(windows)]
        let finder = "where";

        Command::new(finder)
            .arg(command)
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// The browser's standard port if free, else one the OS picks
    pub fn find_free_port(browser_type: BrowserType) -> Result<u16> {
        let preferred = browser_type.default_port();
        if !Self::is_port_in_use(preferred) {
            return Ok(preferred);
        }

        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        drop(listener);
        Ok(port)
    }

    pub fn is_port_in_use(port: u16) -> bool {
        std::net::TcpListener::bind(("127.0.0.1", port)).is_err()
    }

    /// `/status` answers with a success code
    pub async fn is_driver_running(url: &str) -> bool {
        match reqwest::Client::new()
            .get(format!("{}/status", url))
            .timeout(STATUS_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// `/status` reports `value.ready == true`
    pub async fn is_driver_ready(url: &str) -> bool {
        let response = match reqwest::Client::new()
            .get(format!("{}/status", url))
            .timeout(STATUS_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(_) => return false,
        };

        response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| body.pointer("/value/ready").and_then(|r| r.as_bool()))
            .unwrap_or(false)
    }

    fn stop_port(&self, port: u16) {
        let mut processes = self.processes();
        if let Some(index) = processes.iter().position(|p| p.port == port) {
            let mut process = processes.remove(index);
            if let Err(e) = process.child.kill() {
                warn!("Failed to kill WebDriver on port {}: {}", port, e);
            }
            let _ = process.child.wait();
        }
    }

    /// Kill every driver server this manager started
    pub fn stop_all(&self) {
        let mut processes = self.processes();
        for process in processes.iter_mut() {
            debug!("Stopping WebDriver on port {}", process.port);
            let _ = process.child.kill();
            let _ = process.child.wait();
        }
        processes.clear();
    }
}

impl Drop for WebDriverManager {
    fn drop(&mut self) {
        self.stop_all();
    }
}

lazy_static::lazy_static! {
    pub static ref GLOBAL_WEBDRIVER_MANAGER: WebDriverManager = WebDriverManager::new();
}

#[cfg(test)]
#[path = "webdriver_manager_test.rs"]
mod webdriver_manager_test;
