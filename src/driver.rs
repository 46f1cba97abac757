//! The capability set the interaction layer needs from a browser.
//!
//! Everything above this trait (waits, helpers, filters, pages) is written
//! against `Driver` only, so it runs the same against a live WebDriver
//! session and against the in-memory fake used by the unit tests.

#![allow(async_fn_in_trait)]

use std::fmt::Debug;

use serde_json::Value;

use crate::errors::Result;
use crate::locator::Locator;

/// Browser-automation session the interaction layer drives.
///
/// Element handles are opaque and owned by the session. Any call made with
/// a handle whose DOM node is gone must fail with
/// [`ProbeError::StaleElement`](crate::errors::ProbeError::StaleElement).
pub trait Driver {
    /// Reference into the live DOM
    type Element: Clone + Debug;
    /// Browsing context (window or tab) handle
    type Window: Clone + Debug + PartialEq;

    async fn goto(&self, url: &str) -> Result<()>;

    async fn current_url(&self) -> Result<String>;

    async fn title(&self) -> Result<String>;

    /// All elements currently matching `locator`, in document order.
    /// Zero matches is `Ok(vec![])`, not an error.
    async fn find_all(&self, locator: &Locator) -> Result<Vec<Self::Element>>;

    /// Like [`Driver::find_all`], scoped to the subtree under `parent`
    async fn find_all_within(
        &self,
        parent: &Self::Element,
        locator: &Locator,
    ) -> Result<Vec<Self::Element>>;

    /// Run `script` in the page; `arguments[i]` is bound to `args[i]`
    async fn execute(&self, script: &str, args: &[&Self::Element]) -> Result<Value>;

    /// Open windows/tabs in the order the browser reports them (oldest first)
    async fn window_handles(&self) -> Result<Vec<Self::Window>>;

    async fn switch_to_window(&self, window: &Self::Window) -> Result<()>;

    /// PNG bytes of the current viewport
    async fn screenshot(&self) -> Result<Vec<u8>>;

    /// End the session and release the browser
    async fn quit(self) -> Result<()>
    where
        Self: Sized;

    async fn text(&self, element: &Self::Element) -> Result<String>;

    async fn attribute(&self, element: &Self::Element, name: &str) -> Result<Option<String>>;

    async fn is_displayed(&self, element: &Self::Element) -> Result<bool>;

    async fn is_enabled(&self, element: &Self::Element) -> Result<bool>;

    /// Native click; fails with `ElementNotInteractable` when something else
    /// would receive it
    async fn click(&self, element: &Self::Element) -> Result<()>;

    async fn clear(&self, element: &Self::Element) -> Result<()>;

    async fn send_keys(&self, element: &Self::Element, text: &str) -> Result<()>;

    /// Move the pointer onto the element without pressing any button
    async fn hover(&self, element: &Self::Element) -> Result<()>;
}
