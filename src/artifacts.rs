use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::debug;

use crate::driver::Driver;
use crate::errors::Result;

/// Default directory for failure screenshots
pub const SCREENSHOT_DIR: &str = "screenshots";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// `FAIL_<name>_<timestamp>.png`, with anything that is not safe in a file
/// name replaced by `_`
pub fn failure_screenshot_name(name: &str, at: DateTime<Local>) -> String {
    let safe: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("FAIL_{}_{}.png", safe, at.format(TIMESTAMP_FORMAT))
}

/// Capture the current viewport into `dir`, creating it if needed
pub async fn capture_failure<D: Driver>(driver: &D, dir: &Path, name: &str) -> Result<PathBuf> {
    let png = driver.screenshot().await?;
    tokio::fs::create_dir_all(dir).await?;

    let path = dir.join(failure_screenshot_name(name, Local::now()));
    tokio::fs::write(&path, &png).await?;
    debug!("Wrote {} bytes to {}", png.len(), path.display());
    Ok(path)
}
