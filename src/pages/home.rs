use std::time::Duration;

use tracing::{debug, info};
use url::Url;

use crate::driver::Driver;
use crate::errors::Result;
use crate::locator::Locator;
use crate::toolkit::Toolkit;

pub const HOME_URL: &str = "https://insiderone.com/";

pub const COOKIE_ACCEPT_BTN: Locator = Locator::id("wt-cli-accept-all-btn");
pub const WE_ARE_HIRING_LINK: Locator =
    Locator::xpath("//footer//a[contains(text(), \"We're hiring\")]");

/// Insider One homepage
pub struct HomePage<'a, D: Driver> {
    toolkit: &'a Toolkit<D>,
    url: String,
}

impl<'a, D: Driver> HomePage<'a, D> {
    pub fn new(toolkit: &'a Toolkit<D>) -> Self {
        Self::with_url(toolkit, HOME_URL)
    }

    pub fn with_url(toolkit: &'a Toolkit<D>, url: &str) -> Self {
        Self {
            toolkit,
            url: url.to_string(),
        }
    }

    /// Load the homepage and dismiss the cookie banner if it shows up
    pub async fn open(&self) -> Result<()> {
        self.toolkit.goto(&self.url).await?;
        self.accept_cookies().await;
        self.toolkit.wait_for_page_stable(None).await
    }

    /// Banner is optional; any failure here is ignored
    async fn accept_cookies(&self) {
        if self
            .toolkit
            .is_visible(&COOKIE_ACCEPT_BTN, Some(Duration::from_secs(5)))
            .await
        {
            match self.toolkit.click(&COOKIE_ACCEPT_BTN, None).await {
                Ok(()) => info!("Accepted cookie banner"),
                Err(e) => debug!("Cookie banner click failed: {}", e),
            }
        }
    }

    /// URL host or page title identifies the site
    pub async fn is_opened(&self) -> Result<bool> {
        let url = self.toolkit.current_url().await?;
        let title = self.toolkit.title().await?;
        let host_matches = Url::parse(&url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.ends_with("insiderone.com")))
            .unwrap_or(false);

        Ok(host_matches || title.contains("Insider") || url.to_lowercase().contains("insider"))
    }

    /// The footer link sits under overlays, so it is clicked by script
    pub async fn click_we_are_hiring(&self) -> Result<String> {
        self.toolkit.scroll_to_bottom().await?;
        let link = self
            .toolkit
            .find(&WE_ARE_HIRING_LINK, Some(Duration::from_secs(10)))
            .await?;
        self.toolkit.scroll_to_element(&link).await?;
        self.toolkit.js_click(&link).await?;
        self.toolkit.wait_for_url_contains("careers", None).await
    }
}
