use std::time::Duration;

use tracing::info;

use crate::driver::Driver;
use crate::errors::{ProbeError, Result};
use crate::filter::{FilterCategory, FilterOutcome, FilterSelector, FilterWidget, LEAF_OPTION};
use crate::listing::{ListingLocators, ListingReport, ListingVerifier};
use crate::locator::Locator;
use crate::toolkit::Toolkit;

// Careers page
pub const EXPLORE_OPEN_ROLES_BTN: Locator = Locator::xpath("//a[contains(@href, '#open-roles')]");
pub const SOFTWARE_DEV_LINK: Locator =
    Locator::xpath("//a[contains(@href,'Software%20Development')]");

// Lever filters, in order: location type, location, team, work type
pub const FILTER_WRAPPER: Locator = Locator::css("div.filter-button-wrapper");
pub const FILTER_BUTTON: Locator = Locator::css("div.filter-button");
pub const FILTER_POPUP: Locator = Locator::css("div.filter-popup");

// Lever postings
pub const JOB_ITEM: Locator = Locator::class_name("posting");
pub const JOB_TITLE: Locator = Locator::css("h5[data-qa='posting-name']");
pub const JOB_LOCATION: Locator = Locator::class_name("sort-by-location");
pub const JOB_GROUP_TITLE: Locator = Locator::class_name("posting-category-title");
pub const APPLY_BTN: Locator = Locator::css("a.posting-btn-submit");

pub const JOB_BOARD_HOST: &str = "lever.co";

/// Team blocks render via AJAX after `readyState` is already complete
const TEAM_BLOCK_TIMEOUT: Duration = Duration::from_secs(30);
const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(20);
const JOB_LIST_TIMEOUT: Duration = Duration::from_secs(15);
const JOBS_TIMEOUT: Duration = Duration::from_secs(10);

/// Insider One careers page and the Lever job board it links to
pub struct CareersPage<'a, D: Driver> {
    toolkit: &'a Toolkit<D>,
}

impl<'a, D: Driver> CareersPage<'a, D> {
    pub fn new(toolkit: &'a Toolkit<D>) -> Self {
        Self { toolkit }
    }

    pub fn filter_widget() -> FilterWidget {
        FilterWidget {
            wrapper: FILTER_WRAPPER,
            button: FILTER_BUTTON,
            popup: FILTER_POPUP,
            option: LEAF_OPTION,
        }
    }

    pub fn listing_locators() -> ListingLocators {
        ListingLocators {
            card: JOB_ITEM,
            title: JOB_TITLE,
            location: JOB_LOCATION,
            group_title: JOB_GROUP_TITLE,
        }
    }

    // --- Careers page ---

    pub async fn is_careers_page_opened(&self) -> Result<bool> {
        Ok(self
            .toolkit
            .current_url()
            .await?
            .to_lowercase()
            .contains("careers"))
    }

    pub async fn is_explore_open_roles_visible(&self) -> bool {
        self.toolkit
            .is_present(&EXPLORE_OPEN_ROLES_BTN, Some(Duration::from_secs(15)))
            .await
    }

    pub async fn click_explore_open_roles(&self) -> Result<()> {
        let button = self.toolkit.find(&EXPLORE_OPEN_ROLES_BTN, None).await?;
        self.toolkit.scroll_to_element(&button).await?;
        self.toolkit.js_click(&button).await?;
        self.toolkit.wait_for_page_stable(None).await
    }

    /// Follow the Software Development block to the job board; returns the
    /// board URL
    pub async fn click_software_development_block(&self) -> Result<String> {
        let link = self
            .toolkit
            .find_present(&SOFTWARE_DEV_LINK, Some(TEAM_BLOCK_TIMEOUT))
            .await?;

        // href is filled in after the block renders
        let href = self
            .toolkit
            .wait_for_attribute_contains(
                &link,
                "href",
                "Software%20Development",
                Some(NAVIGATION_TIMEOUT),
            )
            .await?;
        info!(
            "Found: {} ({})",
            self.toolkit.text_of(&link).await.unwrap_or_default(),
            href
        );

        self.toolkit.scroll_to_element(&link).await?;
        self.toolkit.js_click(&link).await?;

        let url = self
            .toolkit
            .wait_for_url_contains(JOB_BOARD_HOST, Some(NAVIGATION_TIMEOUT))
            .await?;
        info!("Navigated to job board: {}", url);
        Ok(url)
    }

    // --- Lever filters ---

    /// Location first, then team. Neither is fatal when the option is
    /// missing; the outcomes say what happened.
    pub async fn apply_filters(
        &self,
        location: &str,
        department: &str,
    ) -> Result<(FilterOutcome, FilterOutcome)> {
        let selector = FilterSelector::new(self.toolkit, Self::filter_widget());

        info!("Location filter: {}", location);
        let location = selector
            .select_category(FilterCategory::Location, location)
            .await?;

        info!("Team filter: {}", department);
        let team = selector
            .select_category(FilterCategory::Team, department)
            .await?;

        Ok((location, team))
    }

    // --- Job listings ---

    pub async fn is_job_list_displayed(&self) -> bool {
        self.toolkit
            .is_present(&JOB_ITEM, Some(JOB_LIST_TIMEOUT))
            .await
    }

    pub async fn get_all_jobs(&self) -> Result<Vec<D::Element>> {
        ListingVerifier::new(self.toolkit, Self::listing_locators())
            .cards(Some(JOBS_TIMEOUT))
            .await
    }

    pub async fn job_count(&self) -> Result<usize> {
        Ok(self.get_all_jobs().await?.len())
    }

    pub async fn verify_all_jobs_match_filters(
        &self,
        expected_location: &str,
        expected_department: &str,
    ) -> Result<ListingReport> {
        ListingVerifier::new(self.toolkit, Self::listing_locators())
            .verify(expected_location, expected_department, Some(JOBS_TIMEOUT))
            .await
    }

    // --- Application ---

    /// Click Apply on the first posting; returns the link target
    pub async fn click_apply_on_first_job(&self) -> Result<Option<String>> {
        let jobs = self.get_all_jobs().await?;
        let first = jobs.first().ok_or(ProbeError::NoJobsFound)?;
        self.toolkit.scroll_to_element(first).await?;

        let apply = match self.toolkit.find_within(first, &APPLY_BTN).await {
            Ok(apply) => apply,
            Err(ProbeError::ElementNotFound(what)) => {
                return Err(ProbeError::ApplyTargetMissing(what));
            }
            Err(e) => return Err(e),
        };

        let href = self.toolkit.attribute_of(&apply, "href").await?;
        info!("Apply URL: {}", href.as_deref().unwrap_or("(none)"));
        self.toolkit.js_click(&apply).await?;
        Ok(href)
    }

    /// The application form may open in a new tab; follow it if so
    pub async fn is_application_form_opened(&self) -> Result<bool> {
        if self.toolkit.tab_count().await? > 1 {
            self.toolkit.switch_to_new_tab().await?;
        }
        self.toolkit.wait_for_page_stable(None).await?;

        let url = self.toolkit.current_url().await?;
        info!("Redirected to: {}", url);
        Ok(url.contains(JOB_BOARD_HOST))
    }
}
