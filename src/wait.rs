//! Explicit waits.
//!
//! Every wait in the crate goes through [`poll_until`]: evaluate a probe,
//! and if it has not produced a value yet sleep one fixed interval and try
//! again, until the deadline passes. There is no backoff; UI waits favour
//! responsiveness.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::errors::{ProbeError, Result};
use crate::locator::Locator;

/// Timeout used by lookups when the caller gives no override
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Pause between DOM re-checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Window for the boolean `is_*` probes
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Window for the best-effort `document.readyState` wait
pub const DEFAULT_SETTLE_TIMEOUT: Duration = Duration::from_secs(2);

/// Window for waiting on an element to detach
pub const DEFAULT_STALENESS_TIMEOUT: Duration = Duration::from_secs(10);

/// Timing configuration for one session.
///
/// Passed to the toolkit at construction; individual calls may override the
/// timeout but never the poll interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub probe_timeout: Duration,
    pub settle_timeout: Duration,
    pub staleness_timeout: Duration,
}

impl WaitConfig {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// The per-call override if given, otherwise the session default
    pub fn resolve(&self, timeout: Option<Duration>) -> Duration {
        timeout.unwrap_or(self.timeout)
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            settle_timeout: DEFAULT_SETTLE_TIMEOUT,
            staleness_timeout: DEFAULT_STALENESS_TIMEOUT,
        }
    }
}

/// States a located element can be waited into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementCondition {
    /// First match is displayed
    Visible,
    /// First match is displayed, enabled and not covered by another element
    Clickable,
    /// First match exists, visible or not
    Present,
    /// At least one match exists; yields all of them
    AllPresent,
}

impl fmt::Display for ElementCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementCondition::Visible => write!(f, "visibility"),
            ElementCondition::Clickable => write!(f, "clickability"),
            ElementCondition::Present => write!(f, "presence"),
            ElementCondition::AllPresent => write!(f, "presence of all"),
        }
    }
}

/// A predicate over browser state, named for log lines and timeout errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitCondition {
    Element {
        locator: Locator,
        condition: ElementCondition,
    },
    UrlContains(String),
    TitleContains(String),
    /// Element handle no longer resolves to a DOM node
    Stale,
    /// `document.readyState === "complete"`
    DocumentReady,
    /// More than one window/tab is open
    NewWindow,
    /// Free-form predicate
    Custom(String),
}

impl fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitCondition::Element { locator, condition } => {
                write!(f, "{} of {}", condition, locator)
            }
            WaitCondition::UrlContains(text) => write!(f, "url to contain '{}'", text),
            WaitCondition::TitleContains(text) => write!(f, "title to contain '{}'", text),
            WaitCondition::Stale => write!(f, "staleness of element"),
            WaitCondition::DocumentReady => write!(f, "document ready"),
            WaitCondition::NewWindow => write!(f, "a new window"),
            WaitCondition::Custom(description) => write!(f, "{}", description),
        }
    }
}

/// Re-run `probe` every `interval` until it yields a value or `timeout`
/// elapses.
///
/// - `Ok(Some(v))` ends the wait with `v`.
/// - `Ok(None)` means "not yet".
/// - A stale element counts as "not yet": the next round re-locates.
/// - Any other error ends the wait immediately.
///
/// The probe always runs at least once, and runs one final time at the
/// deadline, so a timeout never fires early and never later than one
/// interval past the budget.
pub async fn poll_until<T, F, Fut>(
    timeout: Duration,
    interval: Duration,
    description: &str,
    mut probe: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let start = Instant::now();
    let deadline = start + timeout;
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        match probe().await {
            Ok(Some(value)) => {
                debug!(
                    "Condition '{}' met after {:?} ({} attempts)",
                    description,
                    start.elapsed(),
                    attempts
                );
                return Ok(value);
            }
            Ok(None) => {}
            Err(e) if e.is_stale() => {
                debug!("Stale handle while waiting for '{}', retrying", description);
            }
            Err(e) => return Err(e),
        }

        let now = Instant::now();
        if now >= deadline {
            debug!(
                "Condition '{}' not met within {:?} ({} attempts)",
                description, timeout, attempts
            );
            return Err(ProbeError::Timeout {
                condition: description.to_string(),
                timeout,
            });
        }

        sleep(interval.min(deadline - now)).await;
    }
}

#[cfg(test)]
#[path = "wait_test.rs"]
mod wait_test;
