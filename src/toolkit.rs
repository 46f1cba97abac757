//! Explicit-wait element lookup and the interaction helpers built on it.
//!
//! A [`Toolkit`] owns the driver session and its [`WaitConfig`]. Page
//! components borrow it; they never talk to the driver directly.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::driver::Driver;
use crate::errors::{ProbeError, Result};
use crate::locator::Locator;
use crate::scripts;
use crate::wait::{ElementCondition, WaitCondition, WaitConfig, poll_until};

/// Shared interaction toolkit for one browser session
pub struct Toolkit<D: Driver> {
    driver: D,
    config: WaitConfig,
}

impl<D: Driver> Toolkit<D> {
    pub fn new(driver: D, config: WaitConfig) -> Self {
        Self { driver, config }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn config(&self) -> &WaitConfig {
        &self.config
    }

    /// Give the session back, e.g. to quit it
    pub fn into_driver(self) -> D {
        self.driver
    }

    // --- Element lookup ---

    /// Wait for the first match of `locator` to be visible
    pub async fn find(&self, locator: &Locator, timeout: Option<Duration>) -> Result<D::Element> {
        self.wait_for_first(None, locator, ElementCondition::Visible, timeout)
            .await
    }

    /// Wait for the first match of `locator` to be visible, enabled and
    /// unobscured
    pub async fn find_clickable(
        &self,
        locator: &Locator,
        timeout: Option<Duration>,
    ) -> Result<D::Element> {
        self.wait_for_first(None, locator, ElementCondition::Clickable, timeout)
            .await
    }

    /// Wait until at least one element matches, then return all matches
    pub async fn find_all(
        &self,
        locator: &Locator,
        timeout: Option<Duration>,
    ) -> Result<Vec<D::Element>> {
        self.wait_until(None, locator, ElementCondition::AllPresent, timeout)
            .await
    }

    /// Wait for the first match to exist in the DOM, visible or not
    pub async fn find_present(
        &self,
        locator: &Locator,
        timeout: Option<Duration>,
    ) -> Result<D::Element> {
        self.wait_for_first(None, locator, ElementCondition::Present, timeout)
            .await
    }

    /// Wait for a match of `locator` under `parent` to become visible
    pub async fn find_visible_within(
        &self,
        parent: &D::Element,
        locator: &Locator,
        timeout: Option<Duration>,
    ) -> Result<D::Element> {
        self.wait_for_first(Some(parent), locator, ElementCondition::Visible, timeout)
            .await
    }

    /// Immediate scoped lookup: no waiting, no retry
    pub async fn find_within(&self, parent: &D::Element, locator: &Locator) -> Result<D::Element> {
        self.driver
            .find_all_within(parent, locator)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ProbeError::ElementNotFound(locator.to_string()))
    }

    /// All current matches under `parent`; may be empty
    pub async fn find_all_within(
        &self,
        parent: &D::Element,
        locator: &Locator,
    ) -> Result<Vec<D::Element>> {
        self.driver.find_all_within(parent, locator).await
    }

    /// Poll `locator` until `condition` holds.
    ///
    /// For the single-element conditions the first match decides; the
    /// returned vector then holds just that element.
    pub async fn wait_until(
        &self,
        scope: Option<&D::Element>,
        locator: &Locator,
        condition: ElementCondition,
        timeout: Option<Duration>,
    ) -> Result<Vec<D::Element>> {
        let timeout = self.config.resolve(timeout);
        let description = WaitCondition::Element {
            locator: locator.clone(),
            condition,
        }
        .to_string();

        poll_until(timeout, self.config.poll_interval, &description, || {
            self.check(scope, locator, condition)
        })
        .await
    }

    async fn wait_for_first(
        &self,
        scope: Option<&D::Element>,
        locator: &Locator,
        condition: ElementCondition,
        timeout: Option<Duration>,
    ) -> Result<D::Element> {
        self.wait_until(scope, locator, condition, timeout)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ProbeError::ElementNotFound(locator.to_string()))
    }

    async fn check(
        &self,
        scope: Option<&D::Element>,
        locator: &Locator,
        condition: ElementCondition,
    ) -> Result<Option<Vec<D::Element>>> {
        let found = match scope {
            Some(parent) => self.driver.find_all_within(parent, locator).await?,
            None => self.driver.find_all(locator).await?,
        };

        if condition == ElementCondition::AllPresent {
            return Ok((!found.is_empty()).then_some(found));
        }

        let Some(first) = found.into_iter().next() else {
            return Ok(None);
        };

        let ok = match condition {
            ElementCondition::Present | ElementCondition::AllPresent => true,
            ElementCondition::Visible => self.driver.is_displayed(&first).await?,
            ElementCondition::Clickable => self.is_clickable_now(&first).await?,
        };

        Ok(ok.then(|| vec![first]))
    }

    async fn is_clickable_now(&self, element: &D::Element) -> Result<bool> {
        if !self.driver.is_displayed(element).await? || !self.driver.is_enabled(element).await? {
            return Ok(false);
        }
        let obscured = self
            .driver
            .execute(scripts::IS_OBSCURED, &[element])
            .await?;
        Ok(!obscured.as_bool().unwrap_or(false))
    }

    // --- Boolean probes ---

    /// True if `locator` becomes visible within the probe window.
    /// Never fails; a timeout or driver error reads as `false`.
    pub async fn is_visible(&self, locator: &Locator, timeout: Option<Duration>) -> bool {
        self.probe(locator, ElementCondition::Visible, timeout).await
    }

    pub async fn is_clickable(&self, locator: &Locator, timeout: Option<Duration>) -> bool {
        self.probe(locator, ElementCondition::Clickable, timeout)
            .await
    }

    pub async fn is_present(&self, locator: &Locator, timeout: Option<Duration>) -> bool {
        self.probe(locator, ElementCondition::Present, timeout).await
    }

    async fn probe(
        &self,
        locator: &Locator,
        condition: ElementCondition,
        timeout: Option<Duration>,
    ) -> bool {
        let timeout = timeout.unwrap_or(self.config.probe_timeout);
        match self
            .wait_until(None, locator, condition, Some(timeout))
            .await
        {
            Ok(_) => true,
            Err(e) => {
                debug!("Probe for {} of {} failed: {}", condition, locator, e);
                false
            }
        }
    }

    // --- Page info ---

    pub async fn title(&self) -> Result<String> {
        self.driver.title().await
    }

    pub async fn current_url(&self) -> Result<String> {
        self.driver.current_url().await
    }

    pub async fn goto(&self, url: &str) -> Result<()> {
        info!("Navigating to {}", url);
        self.driver.goto(url).await
    }

    pub async fn wait_for_url_contains(
        &self,
        text: &str,
        timeout: Option<Duration>,
    ) -> Result<String> {
        let description = WaitCondition::UrlContains(text.to_string()).to_string();
        poll_until(
            self.config.resolve(timeout),
            self.config.poll_interval,
            &description,
            || async move {
                let url = self.driver.current_url().await?;
                Ok(url.contains(text).then_some(url))
            },
        )
        .await
    }

    pub async fn wait_for_title_contains(
        &self,
        text: &str,
        timeout: Option<Duration>,
    ) -> Result<String> {
        let description = WaitCondition::TitleContains(text.to_string()).to_string();
        poll_until(
            self.config.resolve(timeout),
            self.config.poll_interval,
            &description,
            || async move {
                let title = self.driver.title().await?;
                Ok(title.contains(text).then_some(title))
            },
        )
        .await
    }

    /// Wait until `element`'s attribute `name` is set and contains `needle`.
    /// Used for links whose `href` is filled in after the node renders.
    pub async fn wait_for_attribute_contains(
        &self,
        element: &D::Element,
        name: &str,
        needle: &str,
        timeout: Option<Duration>,
    ) -> Result<String> {
        let description =
            WaitCondition::Custom(format!("attribute '{}' to contain '{}'", name, needle))
                .to_string();
        poll_until(
            self.config.resolve(timeout),
            self.config.poll_interval,
            &description,
            || async move {
                let value = self.driver.attribute(element, name).await?;
                Ok(value.filter(|v| v.contains(needle)))
            },
        )
        .await
    }

    // --- Element actions ---

    /// Wait for clickability, then click natively
    pub async fn click(&self, locator: &Locator, timeout: Option<Duration>) -> Result<()> {
        let element = self.find_clickable(locator, timeout).await?;
        debug!("Clicking {}", locator);
        self.driver.click(&element).await
    }

    /// Click via script; ignores overlays such as sticky headers
    pub async fn js_click(&self, element: &D::Element) -> Result<()> {
        self.driver.execute(scripts::CLICK, &[element]).await?;
        Ok(())
    }

    /// Clear the visible field at `locator` and type `text` verbatim
    pub async fn send_keys(
        &self,
        locator: &Locator,
        text: &str,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let element = self.find(locator, timeout).await?;
        self.driver.clear(&element).await?;
        self.driver.send_keys(&element, text).await
    }

    pub async fn get_text(&self, locator: &Locator, timeout: Option<Duration>) -> Result<String> {
        let element = self.find(locator, timeout).await?;
        self.driver.text(&element).await
    }

    pub async fn text_of(&self, element: &D::Element) -> Result<String> {
        self.driver.text(element).await
    }

    pub async fn attribute_of(&self, element: &D::Element, name: &str) -> Result<Option<String>> {
        self.driver.attribute(element, name).await
    }

    // --- Scrolling ---

    /// Smooth-scroll `element` to the centre of the viewport, then let the
    /// layout settle
    pub async fn scroll_to_element(&self, element: &D::Element) -> Result<()> {
        self.driver
            .execute(scripts::SCROLL_INTO_VIEW, &[element])
            .await?;
        self.wait_for_page_stable(None).await
    }

    pub async fn scroll_to_bottom(&self) -> Result<()> {
        self.driver.execute(scripts::SCROLL_TO_BOTTOM, &[]).await?;
        self.wait_for_page_stable(None).await
    }

    pub async fn scroll_down(&self, pixels: i64) -> Result<()> {
        self.driver.execute(&scripts::scroll_by(pixels), &[]).await?;
        self.wait_for_page_stable(None).await
    }

    // --- Mouse ---

    pub async fn hover(&self, element: &D::Element) -> Result<()> {
        self.driver.hover(element).await
    }

    pub async fn hover_locator(&self, locator: &Locator, timeout: Option<Duration>) -> Result<()> {
        let element = self.find(locator, timeout).await?;
        self.hover(&element).await
    }

    // --- Tabs ---

    /// Block until a second window exists, then activate the newest one
    pub async fn switch_to_new_tab(&self) -> Result<()> {
        let description = WaitCondition::NewWindow.to_string();
        let windows = poll_until(
            self.config.timeout,
            self.config.poll_interval,
            &description,
            || async move {
                let windows = self.driver.window_handles().await?;
                Ok((windows.len() > 1).then_some(windows))
            },
        )
        .await?;

        if let Some(newest) = windows.last() {
            debug!("Switching to window {:?}", newest);
            self.driver.switch_to_window(newest).await?;
        }
        Ok(())
    }

    pub async fn switch_to_main_tab(&self) -> Result<()> {
        let windows = self.driver.window_handles().await?;
        match windows.first() {
            Some(main) => self.driver.switch_to_window(main).await,
            None => Err(ProbeError::WebDriver("no open windows".to_string())),
        }
    }

    pub async fn tab_count(&self) -> Result<usize> {
        Ok(self.driver.window_handles().await?.len())
    }

    // --- Settling ---

    /// Best-effort wait for `document.readyState == "complete"`.
    ///
    /// A timeout is swallowed: this reduces flakiness, it does not assert
    /// anything. Driver errors still propagate.
    pub async fn wait_for_page_stable(&self, timeout: Option<Duration>) -> Result<()> {
        let timeout = timeout.unwrap_or(self.config.settle_timeout);
        let description = WaitCondition::DocumentReady.to_string();
        let result = poll_until(timeout, self.config.poll_interval, &description, || async move {
            let state = self.driver.execute(scripts::READY_STATE, &[]).await?;
            Ok((state == Value::from("complete")).then_some(()))
        })
        .await;

        match result {
            Err(e) if e.is_timeout() => {
                debug!("Page not stable after {:?}, continuing", timeout);
                Ok(())
            }
            other => other,
        }
    }

    /// Block until `element` no longer resolves to a DOM node, confirming a
    /// reload or navigation happened
    pub async fn wait_for_element_staleness(
        &self,
        element: &D::Element,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let timeout = timeout.unwrap_or(self.config.staleness_timeout);
        let description = WaitCondition::Stale.to_string();
        poll_until(timeout, self.config.poll_interval, &description, || async move {
            match self.driver.is_enabled(element).await {
                Ok(_) => Ok(None),
                Err(e) if e.is_stale() => Ok(Some(())),
                Err(e) => Err(e),
            }
        })
        .await
        .inspect_err(|e| warn!("Element did not go stale: {}", e))
    }
}

#[cfg(test)]
#[path = "toolkit_test.rs"]
mod toolkit_test;
