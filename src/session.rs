//! Scoped browser sessions: acquire, use, always release.

use std::fmt::Display;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::artifacts::{self, SCREENSHOT_DIR};
use crate::driver::Driver;
use crate::toolkit::Toolkit;
use crate::wait::WaitConfig;

/// Per-run settings for [`run_session`]
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Names the failure screenshot
    pub name: String,
    pub screenshots_dir: PathBuf,
    pub wait: WaitConfig,
}

impl SessionOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            screenshots_dir: PathBuf::from(SCREENSHOT_DIR),
            wait: WaitConfig::default(),
        }
    }
}

/// Run `body` against a fresh toolkit that owns `driver`.
///
/// On `Err` one failure screenshot is written before teardown. The session
/// is quit in every case; a failing quit is logged and never replaces the
/// body's result.
pub async fn run_session<D, T, E, F>(driver: D, options: &SessionOptions, body: F) -> Result<T, E>
where
    D: Driver,
    E: Display,
    F: AsyncFnOnce(&Toolkit<D>) -> Result<T, E>,
{
    let toolkit = Toolkit::new(driver, options.wait);
    let outcome = body(&toolkit).await;

    if let Err(e) = &outcome {
        warn!("Session '{}' failed: {}", options.name, e);
        match artifacts::capture_failure(toolkit.driver(), &options.screenshots_dir, &options.name)
            .await
        {
            Ok(path) => info!("Screenshot saved: {}", path.display()),
            Err(err) => warn!("Could not save screenshot: {}", err),
        }
    }

    if let Err(e) = toolkit.into_driver().quit().await {
        warn!("Failed to quit browser session: {}", e);
    }

    outcome
}

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;
