use std::time::Duration;

use thiserror::Error;

/// Result alias used throughout the interaction layer
pub type Result<T, E = ProbeError> = std::result::Result<T, E>;

/// Errors raised by the wait-and-retry layer and the flow built on it
#[derive(Debug, Error)]
pub enum ProbeError {
    /// A wait condition never held within its budget (exit code 5)
    #[error("Timed out after {timeout:?} waiting for {condition}")]
    Timeout { condition: String, timeout: Duration },

    /// The browser gave up on a script or page load (exit code 5)
    #[error("Timed out in the browser: {0}")]
    DriverTimeout(String),

    /// A required lookup matched nothing (exit code 2)
    #[error("No elements found matching {0}")]
    ElementNotFound(String),

    /// The element handle outlived its DOM node and must be re-located
    #[error("Stale element reference: {0}")]
    StaleElement(String),

    /// The browser refused a native interaction (obscured, disabled, ...)
    #[error("Element not interactable: {0}")]
    ElementNotInteractable(String),

    /// The job board rendered no postings
    #[error("No job postings found on the listing page")]
    NoJobsFound,

    /// The posting has no apply link to follow
    #[error("Apply target missing: {0}")]
    ApplyTargetMissing(String),

    /// A scenario check evaluated to false (exit code 6)
    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    /// WebDriver connection or command failure (exit code 4)
    #[error("WebDriver error: {0}")]
    WebDriver(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic error (exit code 1)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProbeError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ProbeError::ElementNotFound(_) => 2,
            ProbeError::WebDriver(_) => 4,
            ProbeError::Timeout { .. } | ProbeError::DriverTimeout(_) => 5,
            ProbeError::AssertionFailed(_) => 6,
            _ => 1,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ProbeError::Timeout { .. } | ProbeError::DriverTimeout(_)
        )
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, ProbeError::StaleElement(_))
    }

    /// Classify a WebDriver failure from its W3C error code.
    ///
    /// The code is the same across geckodriver and chromedriver; the
    /// message text is only consulted when no code came back.
    pub fn from_webdriver_code(context: &str, code: Option<&str>, msg: &str) -> Self {
        let detail = format!("{}: {}", context, msg);
        match code {
            Some("stale element reference") => ProbeError::StaleElement(detail),
            Some("no such element") => ProbeError::ElementNotFound(detail),
            Some("element click intercepted" | "element not interactable") => {
                ProbeError::ElementNotInteractable(detail)
            }
            Some("timeout" | "script timeout") => ProbeError::DriverTimeout(detail),
            _ => Self::from_webdriver_message(context, msg),
        }
    }

    /// Classify a raw WebDriver failure message into a specific kind.
    pub fn from_webdriver_message(context: &str, msg: &str) -> Self {
        let lower = msg.to_lowercase();
        let detail = format!("{}: {}", context, msg);

        if lower.contains("stale element")
            || lower.contains("not attached to the page")
            || lower.contains("is stale;")
            || lower.contains("no longer connected to the dom")
        {
            ProbeError::StaleElement(detail)
        } else if lower.contains("no such element") {
            ProbeError::ElementNotFound(detail)
        } else if lower.contains("not interactable")
            || lower.contains("click intercepted")
            || lower.contains("is not clickable at point")
            || lower.contains("element is not clickable")
        {
            ProbeError::ElementNotInteractable(detail)
        } else if lower.contains("timeout") || lower.contains("timed out") {
            ProbeError::DriverTimeout(detail)
        } else {
            ProbeError::WebDriver(detail)
        }
    }
}

#[cfg(test)]
#[path = "errors_test.rs"]
mod errors_test;
