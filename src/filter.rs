//! Tolerant selection in dropdown-style filter widgets.
//!
//! A job board renders several same-shaped filter widgets side by side; the
//! position of a widget encodes its category. Selecting an option:
//!
//! 1. skips when the widget's button label already shows the option,
//! 2. otherwise opens the popup and scans its leaf nodes,
//! 3. prefers an exact (case-insensitive) label, then the first label that
//!    contains the option,
//! 4. closes the popup again if nothing matched.
//!
//! A missing option is *not* an error. The widget is left unset, a warning
//! is logged and [`FilterOutcome::OptionNotFound`] is returned. The partial
//! match fallback and this leniency can hide a renamed option; callers that
//! need strictness check [`FilterOutcome::is_applied`].

use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::driver::Driver;
use crate::errors::{ProbeError, Result};
use crate::locator::Locator;
use crate::toolkit::Toolkit;

/// How long to wait for a popup to open
pub const POPUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Leaf nodes (no element children) under a popup
pub const LEAF_OPTION: Locator = Locator::xpath(".//*[not(*)]");

/// Filter widget positions on a Lever job board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCategory {
    LocationType = 0,
    Location = 1,
    Team = 2,
    WorkType = 3,
}

impl FilterCategory {
    pub fn ordinal(self) -> usize {
        self as usize
    }
}

/// Locators describing one family of filter widgets
#[derive(Debug, Clone)]
pub struct FilterWidget {
    /// Every widget on the page, in display order
    pub wrapper: Locator,
    /// Toggle button inside a wrapper; its text is the current selection
    pub button: Locator,
    /// Popup inside a wrapper that holds the options
    pub popup: Locator,
    /// Candidate options inside the popup
    pub option: Locator,
}

/// Result of one selection attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FilterOutcome {
    /// The button label already contained the option; nothing was clicked
    AlreadySelected,
    /// The option with this label was clicked
    Selected { label: String },
    /// No option matched; the popup was closed and the filter left unset
    OptionNotFound,
}

impl FilterOutcome {
    pub fn is_applied(&self) -> bool {
        !matches!(self, FilterOutcome::OptionNotFound)
    }
}

/// Index of the option to pick for `target`.
///
/// The first pass wants an exact case-insensitive label; only when none
/// exists does the second pass take the first label containing `target`.
/// Blank labels never match.
pub fn pick_option<S: AsRef<str>>(labels: &[S], target: &str) -> Option<usize> {
    let target = target.trim().to_lowercase();
    let labels: Vec<String> = labels
        .iter()
        .map(|l| l.as_ref().trim().to_lowercase())
        .collect();

    labels
        .iter()
        .position(|l| !l.is_empty() && *l == target)
        .or_else(|| {
            labels
                .iter()
                .position(|l| !l.is_empty() && l.contains(&target))
        })
}

/// Case-insensitive check of a button label against the wanted option
pub fn label_shows(label: &str, option: &str) -> bool {
    label.trim().to_lowercase().contains(&option.to_lowercase())
}

/// Drives one family of filter widgets through a shared toolkit
pub struct FilterSelector<'a, D: Driver> {
    toolkit: &'a Toolkit<D>,
    widget: FilterWidget,
}

impl<'a, D: Driver> FilterSelector<'a, D> {
    pub fn new(toolkit: &'a Toolkit<D>, widget: FilterWidget) -> Self {
        Self { toolkit, widget }
    }

    pub async fn select_category(
        &self,
        category: FilterCategory,
        option: &str,
    ) -> Result<FilterOutcome> {
        self.select(category.ordinal(), option).await
    }

    /// Select `option` in the widget at position `ordinal`
    pub async fn select(&self, ordinal: usize, option: &str) -> Result<FilterOutcome> {
        let toolkit = self.toolkit;
        let wrappers = toolkit.find_all(&self.widget.wrapper, None).await?;
        let wrapper = wrappers.get(ordinal).ok_or_else(|| {
            ProbeError::ElementNotFound(format!(
                "filter #{} ({} widgets matching {})",
                ordinal,
                wrappers.len(),
                self.widget.wrapper
            ))
        })?;

        let button = toolkit.find_within(wrapper, &self.widget.button).await?;
        let current = toolkit.text_of(&button).await?;

        if label_shows(&current, option) {
            info!("Filter [{}]: '{}' already selected, skipping", ordinal, option);
            return Ok(FilterOutcome::AlreadySelected);
        }

        toolkit.scroll_to_element(&button).await?;
        toolkit.js_click(&button).await?;

        let popup = toolkit
            .find_visible_within(wrapper, &self.widget.popup, Some(POPUP_TIMEOUT))
            .await?;

        let candidates = toolkit
            .find_all_within(&popup, &self.widget.option)
            .await?;
        let mut labelled = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            match toolkit.text_of(&candidate).await {
                Ok(text) => labelled.push((candidate, text.trim().to_string())),
                Err(e) if e.is_stale() => continue,
                Err(e) => return Err(e),
            }
        }

        let labels: Vec<&str> = labelled.iter().map(|(_, l)| l.as_str()).collect();
        let outcome = match pick_option(&labels, option) {
            Some(index) => {
                let (target, label) = &labelled[index];
                info!("Filter [{}]: selecting '{}'", ordinal, label);
                toolkit.js_click(target).await?;
                FilterOutcome::Selected {
                    label: label.clone(),
                }
            }
            None => {
                warn!(
                    "Filter [{}]: '{}' not found among {:?}, closing popup",
                    ordinal, option, labels
                );
                toolkit.js_click(&button).await?;
                FilterOutcome::OptionNotFound
            }
        };

        toolkit.wait_for_page_stable(None).await?;
        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod filter_test;
