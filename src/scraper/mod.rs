//! Browser automation for rendered restaurant pages.
//!
//! The pipeline never talks to a rendering engine directly. Resolvers and
//! extractors receive a [`BrowserSession`] handle and use it to navigate,
//! fill search boxes, wait for elements and read the rendered markup, which
//! is then queried with [`Markup`].
//!
//! # Architecture
//!
//! ```text
//! BrowserSession (navigate/type/wait) → content() → Markup (selectors) → SourceRecord
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use platescout::scraper::{with_chrome_session, ScraperConfig};
//!
//! let report = with_chrome_session(ScraperConfig::default(), |session| async move {
//!     orchestrator
//!         .run_maps(session.as_ref(), adapter.as_ref(), &names)
//!         .await
//! })
//! .await?;
//! ```

mod chrome;
mod config;
#[cfg(test)]
pub(crate) mod fixture;
mod markup;

pub use chrome::{with_chrome_session, ChromeSession};
pub use config::ScraperConfig;
pub use markup::{child_attr, child_text, element_text, non_empty, Markup};

use std::time::Duration;

use async_trait::async_trait;

use crate::app::Result;

/// Capability handle over one browser page.
///
/// Operations are strictly sequential: callers await each step before the
/// next, so no two steps race on the same page state.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Navigate to `url` and wait for the load to finish.
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Wait until `selector` matches an element.
    ///
    /// Returns `Ok(false)` when `timeout` elapses first.
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<bool>;

    /// Clear the input matching `selector` and type `text` into it.
    async fn type_into(&self, selector: &str, text: &str) -> Result<()>;

    /// Press a key (e.g. "Enter") on the focused element.
    async fn press_key(&self, key: &str) -> Result<()>;

    /// Click the first element matching `selector`.
    async fn click(&self, selector: &str) -> Result<()>;

    /// URL of the page currently loaded.
    async fn current_url(&self) -> Result<Option<String>>;

    /// Rendered HTML of the current page.
    async fn content(&self) -> Result<String>;

    /// Whether the underlying browser still answers.
    async fn is_alive(&self) -> bool;

    /// Idle for `duration` to let client-side rendering settle.
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    /// Attribute `name` of the first element matching `selector`.
    async fn read_attribute(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let html = self.content().await?;
        Ok(Markup::parse(&html).attr(selector, name))
    }
}
