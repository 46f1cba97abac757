//! Checks that the postings left after filtering really match the filters.
//!
//! Every card is checked (no short-circuit) so a report lists all
//! mismatches at once. A card whose fields cannot be read is skipped with a
//! warning rather than counted as a mismatch. The department is checked
//! against the group headers the board renders above each team's postings.

use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::driver::Driver;
use crate::errors::{ProbeError, Result};
use crate::locator::Locator;
use crate::toolkit::Toolkit;

/// How long the department headers get to show up
pub const GROUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Locators for a listing page
#[derive(Debug, Clone)]
pub struct ListingLocators {
    pub card: Locator,
    /// Within a card
    pub title: Locator,
    /// Within a card
    pub location: Locator,
    pub group_title: Locator,
}

/// One readable posting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardCheck {
    /// 1-based position on the page
    pub index: usize,
    pub title: String,
    pub location: String,
    pub matches: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingReport {
    pub expected_location: String,
    pub expected_department: String,
    pub cards: Vec<CardCheck>,
    /// 1-based positions of cards that could not be read
    pub skipped: Vec<usize>,
    /// Distinct group headers, in page order
    pub groups: Vec<String>,
    pub department_found: bool,
}

impl ListingReport {
    pub fn mismatches(&self) -> impl Iterator<Item = &CardCheck> {
        self.cards.iter().filter(|c| !c.matches)
    }

    /// Every readable card matched the location AND the department header
    /// was found
    pub fn passed(&self) -> bool {
        self.cards.iter().all(|c| c.matches) && self.department_found
    }
}

pub fn location_matches(location: &str, expected: &str) -> bool {
    location.to_lowercase().contains(&expected.to_lowercase())
}

pub fn department_listed<S: AsRef<str>>(groups: &[S], department: &str) -> bool {
    let department = department.to_lowercase();
    groups
        .iter()
        .any(|g| g.as_ref().to_lowercase().contains(&department))
}

/// Drop repeats, keep first-seen order, ignore blank headers
pub fn distinct_groups(headers: Vec<String>) -> Vec<String> {
    let mut seen = Vec::new();
    for header in headers {
        let header = header.trim().to_string();
        if !header.is_empty() && !seen.contains(&header) {
            seen.push(header);
        }
    }
    seen
}

pub struct ListingVerifier<'a, D: Driver> {
    toolkit: &'a Toolkit<D>,
    locators: ListingLocators,
}

impl<'a, D: Driver> ListingVerifier<'a, D> {
    pub fn new(toolkit: &'a Toolkit<D>, locators: ListingLocators) -> Self {
        Self { toolkit, locators }
    }

    /// All posting cards; `NoJobsFound` if none render within `timeout`
    pub async fn cards(&self, timeout: Option<Duration>) -> Result<Vec<D::Element>> {
        match self.toolkit.find_all(&self.locators.card, timeout).await {
            Ok(cards) => Ok(cards),
            Err(e) if e.is_timeout() => Err(ProbeError::NoJobsFound),
            Err(e) => Err(e),
        }
    }

    pub async fn verify(
        &self,
        expected_location: &str,
        expected_department: &str,
        timeout: Option<Duration>,
    ) -> Result<ListingReport> {
        let cards = self.cards(timeout).await?;
        info!("Scanning {} job posting(s)", cards.len());

        let mut report = ListingReport {
            expected_location: expected_location.to_string(),
            expected_department: expected_department.to_string(),
            cards: Vec::with_capacity(cards.len()),
            skipped: Vec::new(),
            groups: Vec::new(),
            department_found: false,
        };

        for (i, card) in cards.iter().enumerate() {
            let index = i + 1;
            match self.read_card(card).await {
                Ok((title, location)) => {
                    let matches = location_matches(&location, expected_location);
                    info!("Job {}: {} | Location: {}", index, title, location);
                    if !matches {
                        warn!(
                            "Job {}: expected location '{}', found '{}'",
                            index, expected_location, location
                        );
                    }
                    report.cards.push(CardCheck {
                        index,
                        title,
                        location,
                        matches,
                    });
                }
                Err(e) => {
                    warn!("Could not inspect job {}: {}", index, e);
                    report.skipped.push(index);
                }
            }
        }

        report.groups = self.group_headers().await;
        report.department_found = department_listed(&report.groups, expected_department);
        if report.department_found {
            info!("'{}' group header verified", expected_department);
        } else {
            warn!(
                "'{}' group header not found in {:?}",
                expected_department, report.groups
            );
        }

        Ok(report)
    }

    async fn read_card(&self, card: &D::Element) -> Result<(String, String)> {
        let toolkit = self.toolkit;
        toolkit.scroll_to_element(card).await?;
        let title = toolkit
            .find_within(card, &self.locators.title)
            .await?;
        let location = toolkit
            .find_within(card, &self.locators.location)
            .await?;
        Ok((
            toolkit.text_of(&title).await?,
            toolkit.text_of(&location).await?,
        ))
    }

    /// Headers that never render read as an empty list
    async fn group_headers(&self) -> Vec<String> {
        let toolkit = self.toolkit;
        let headers = match toolkit
            .find_all(&self.locators.group_title, Some(GROUP_TIMEOUT))
            .await
        {
            Ok(headers) => headers,
            Err(e) => {
                warn!("Could not read group headers: {}", e);
                return Vec::new();
            }
        };

        let mut texts = Vec::with_capacity(headers.len());
        for header in &headers {
            match toolkit.text_of(header).await {
                Ok(text) => texts.push(text),
                Err(e) => warn!("Skipping unreadable group header: {}", e),
            }
        }
        distinct_groups(texts)
    }
}

#[cfg(test)]
#[path = "listing_test.rs"]
mod listing_test;
