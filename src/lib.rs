//! # careerprobe
#![allow(clippy::uninlined_format_args)]
//!
//! End-to-end check of a company careers funnel, driven through a real
//! browser over WebDriver.
//!
//! The flow opens the Insider One homepage, follows the footer "We're
//! hiring" link to the careers page, jumps to the Software Development job
//! board on Lever, filters it by location and team, verifies every posting
//! left on the board against those filters and finally follows the first
//! posting's Apply link to the application form.
//!
//! ## CLI Usage
//!
//! ```bash
//! # Run the default flow (Istanbul, Turkiye / Quality Assurance) in Chrome
//! careerprobe run
//!
//! # Headless Firefox, fixed viewport, JSON report on stdout
//! careerprobe run --browser firefox --headless --viewport 1366x768 --format json
//!
//! # Different filters
//! careerprobe run --location "London" --department "Software Development"
//!
//! # Is a WebDriver server reachable?
//! careerprobe status --browser chrome
//! ```
//!
//! Logs go to stderr (`RUST_LOG` overrides the default `careerprobe=info`),
//! the report to stdout. A failing run saves
//! `screenshots/FAIL_<name>_<timestamp>.png` and exits non-zero.
//!
//! ## Layers
//!
//! - [`driver::Driver`] is the browser capability set; [`Browser`]
//!   implements it over fantoccini.
//! - [`Toolkit`] adds explicit waits ([`wait::poll_until`]) and the
//!   interaction helpers every page uses.
//! - [`filter::FilterSelector`] and [`listing::ListingVerifier`] handle the
//!   job board's dropdown filters and posting cards.
//! - [`pages`] holds the page components, [`scenario`] the ten-step flow and
//!   [`session`] the acquire/use/release wrapper with failure screenshots.
//!
//! ## Library Usage
//!
//! ```no_run
//! use careerprobe::{Browser, BrowserType, Scenario, SessionOptions, Toolkit, run_session};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let browser = Browser::new(BrowserType::Chrome, None, true).await?;
//! let options = SessionOptions::new("insider_qa_jobs_istanbul");
//! let scenario = Scenario::default();
//!
//! let report = run_session(browser, &options, async |toolkit: &Toolkit<Browser>| {
//!     scenario.run(toolkit).await
//! })
//! .await?;
//! println!("{}", report.trace());
//! # Ok(())
//! # }
//! ```

/// Failure screenshots
pub mod artifacts;

/// Browser capability trait
pub mod driver;

/// Error types and exit codes
pub mod errors;

/// Dropdown filter selection
pub mod filter;

/// Posting card verification
pub mod listing;

/// Element locators
pub mod locator;

/// Page components
pub mod pages;

/// The end-to-end careers flow
pub mod scenario;

/// Scripts run in the page
pub mod scripts;

/// Scoped browser sessions
pub mod session;

/// Wait-and-retry interaction helpers
pub mod toolkit;

/// CLI-facing value types
pub mod types;

/// Explicit waits
pub mod wait;

/// WebDriver browser control
pub mod webdriver;

/// Automatic WebDriver process management
pub mod webdriver_manager;

#[cfg(test)]
mod fake_driver;
#[cfg(test)]
mod fake_site;

pub use driver::Driver;
pub use errors::ProbeError;
pub use filter::{FilterCategory, FilterOutcome, FilterSelector};
pub use listing::{ListingReport, ListingVerifier};
pub use locator::{Locator, Strategy};
pub use pages::{CareersPage, HomePage};
pub use scenario::{Scenario, ScenarioFailure, ScenarioReport};
pub use session::{SessionOptions, run_session};
pub use toolkit::Toolkit;
pub use types::{OutputFormat, ViewportSize};
pub use wait::WaitConfig;
pub use webdriver::{Browser, BrowserType};
