//! The end-to-end careers flow: homepage, careers page, job board, filters,
//! listing checks, apply.
//!
//! Steps run strictly in order. Each one is recorded in a trace before it
//! starts, so a failure report shows every step executed up to and
//! including the one that failed.

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::driver::Driver;
use crate::errors::{ProbeError, Result};
use crate::filter::FilterOutcome;
use crate::listing::ListingReport;
use crate::pages::home::HOME_URL;
use crate::pages::{CareersPage, HomePage};
use crate::toolkit::Toolkit;

pub const DEFAULT_LOCATION: &str = "Istanbul, Turkiye";
pub const DEFAULT_DEPARTMENT: &str = "Quality Assurance";

/// Inputs to one run of the flow
#[derive(Debug, Clone, Serialize)]
pub struct Scenario {
    pub home_url: String,
    pub location: String,
    pub department: String,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            home_url: HOME_URL.to_string(),
            location: DEFAULT_LOCATION.to_string(),
            department: DEFAULT_DEPARTMENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub number: usize,
    pub name: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Everything a successful (or partially run) flow observed
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScenarioReport {
    pub steps: Vec<StepRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_filter: Option<FilterOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_filter: Option<FilterOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing: Option<ListingReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_url: Option<String>,
}

impl ScenarioReport {
    fn begin(&mut self, name: &str) {
        let number = self.steps.len() + 1;
        info!("[Step {}] {}", number, name);
        self.steps.push(StepRecord {
            number,
            name: name.to_string(),
            passed: false,
            detail: None,
        });
    }

    fn pass(&mut self, detail: Option<String>) {
        if let Some(step) = self.steps.last_mut() {
            step.passed = true;
            step.detail = detail;
            match &step.detail {
                Some(detail) => info!("  OK - {}", detail),
                None => info!("  OK"),
            }
        }
    }

    /// Human-readable trace, one line per executed step
    pub fn trace(&self) -> String {
        self.steps
            .iter()
            .map(|s| {
                let mark = if s.passed { "PASS" } else { "FAIL" };
                match &s.detail {
                    Some(detail) => format!("[{}] Step {}: {} - {}", mark, s.number, s.name, detail),
                    None => format!("[{}] Step {}: {}", mark, s.number, s.name),
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A step failed; carries the trace up to that point
#[derive(Debug, Error)]
#[error("Step {step} ({name}) failed: {source}")]
pub struct ScenarioFailure {
    pub step: usize,
    pub name: String,
    #[source]
    pub source: ProbeError,
    pub report: ScenarioReport,
}

impl ScenarioFailure {
    pub fn exit_code(&self) -> i32 {
        self.source.exit_code()
    }
}

fn ensure(condition: bool, message: &str) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(ProbeError::AssertionFailed(message.to_string()))
    }
}

impl Scenario {
    pub async fn run<D: Driver>(
        &self,
        toolkit: &Toolkit<D>,
    ) -> std::result::Result<ScenarioReport, ScenarioFailure> {
        let mut report = ScenarioReport::default();

        match self.run_steps(toolkit, &mut report).await {
            Ok(()) => {
                info!("All {} steps passed", report.steps.len());
                Ok(report)
            }
            Err(source) => {
                let (step, name) = report
                    .steps
                    .last()
                    .map(|s| (s.number, s.name.clone()))
                    .unwrap_or((0, "setup".to_string()));
                error!("Step {} ({}) failed: {}", step, name, source);
                Err(ScenarioFailure {
                    step,
                    name,
                    source,
                    report,
                })
            }
        }
    }

    async fn run_steps<D: Driver>(
        &self,
        toolkit: &Toolkit<D>,
        report: &mut ScenarioReport,
    ) -> Result<()> {
        let home = HomePage::with_url(toolkit, &self.home_url);
        let careers = CareersPage::new(toolkit);

        report.begin("Open homepage");
        home.open().await?;
        ensure(home.is_opened().await?, "Homepage did not load correctly")?;
        report.pass(Some(toolkit.current_url().await?));

        report.begin("Click \"We're hiring\"");
        home.click_we_are_hiring().await?;
        ensure(
            careers.is_careers_page_opened().await?,
            "Careers page did not open; URL does not contain 'careers'",
        )?;
        report.pass(Some(toolkit.current_url().await?));

        report.begin("Check \"Explore open roles\" button");
        ensure(
            careers.is_explore_open_roles_visible().await,
            "'Explore open roles' button not found",
        )?;
        report.pass(None);

        report.begin("Click \"Explore open roles\"");
        careers.click_explore_open_roles().await?;
        report.pass(None);

        report.begin("Click Software Development block");
        let board = careers.click_software_development_block().await?;
        report.pass(Some(board));

        report.begin("Apply filters");
        let (location, team) = careers
            .apply_filters(&self.location, &self.department)
            .await?;
        let detail = format!("location: {:?}, team: {:?}", location, team);
        report.location_filter = Some(location);
        report.team_filter = Some(team);
        report.pass(Some(detail));

        report.begin("Check job listings");
        ensure(
            careers.is_job_list_displayed().await,
            "No job listings are displayed",
        )?;
        let count = careers.job_count().await?;
        report.job_count = Some(count);
        report.pass(Some(format!("{} job(s) listed", count)));

        report.begin("Verify job details match filters");
        let listing = careers
            .verify_all_jobs_match_filters(&self.location, &self.department)
            .await?;
        let passed = listing.passed();
        let detail = format!(
            "{} checked, {} mismatched, {} skipped",
            listing.cards.len(),
            listing.mismatches().count(),
            listing.skipped.len()
        );
        report.listing = Some(listing);
        ensure(
            passed,
            "Some job listings do not match the applied filters",
        )?;
        report.pass(Some(detail));

        report.begin("Click Apply on first job");
        let href = careers.click_apply_on_first_job().await?;
        report.pass(href);

        report.begin("Verify redirect to application form");
        ensure(
            careers.is_application_form_opened().await?,
            "Did not redirect to the application form",
        )?;
        let url = toolkit.current_url().await?;
        report.application_url = Some(url.clone());
        report.pass(Some(url));

        Ok(())
    }
}

#[cfg(test)]
#[path = "scenario_test.rs"]
mod scenario_test;
