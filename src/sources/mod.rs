//! Per-site URL resolution and record extraction.
//!
//! Each source module pairs a resolver (search UI → restaurant page URL) with
//! an extractor (rendered page → [`SourceRecord`]). Selectors are pinned per
//! site; everything above them only sees [`SourceAdapter`].
//!
//! Faults are converted locally: an unresolvable restaurant is `Ok(None)`, a
//! page that never renders is an [`Extraction::Failed`] marker, and a missing
//! field is an empty value. Only a lost browser session comes back as `Err`.

mod config;
mod google_maps;
mod magicpin;
mod swiggy;
mod zomato;

pub use config::SourcesConfig;
pub use google_maps::GoogleMapsSource;
pub use magicpin::MagicpinSource;
pub use swiggy::SwiggySource;
pub use zomato::ZomatoSource;

use async_trait::async_trait;
use tracing::warn;

use crate::app::Result;
use crate::domain::{Extraction, FailureReason, Source};
use crate::scraper::{BrowserSession, ScraperConfig};

#[cfg(test)]
use crate::domain::SourceRecord;

/// One external site: how to find a restaurant on it and how to read its page.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn source(&self) -> Source;

    /// Search for `query` and return the restaurant page URL, if any.
    async fn resolve(&self, session: &dyn BrowserSession, query: &str) -> Result<Option<String>>;

    /// Extract a record from `url`. A `None` URL yields a failure marker
    /// without touching the session.
    async fn extract(&self, session: &dyn BrowserSession, url: Option<&str>) -> Result<Extraction>;

    /// Whether an extraction is worth retrying.
    fn is_empty(&self, extraction: &Extraction) -> bool {
        extraction.menu().is_empty()
    }
}

/// Builds the adapter for `source` from configuration.
pub fn build_adapter(
    source: Source,
    sources: &SourcesConfig,
    scraper: &ScraperConfig,
    min_match_score: u8,
) -> Box<dyn SourceAdapter> {
    match source {
        Source::GoogleMaps => Box::new(GoogleMapsSource::new(
            sources.google_maps_url.clone(),
            scraper.clone(),
            min_match_score,
        )),
        Source::Swiggy => Box::new(SwiggySource::new(sources.swiggy_url.clone(), scraper.clone())),
        Source::Zomato => Box::new(ZomatoSource::new(sources.zomato_url.clone(), scraper.clone())),
        Source::Magicpin => Box::new(MagicpinSource::new(
            sources.magicpin_urls.clone(),
            scraper.clone(),
        )),
    }
}

/// Keeps session loss as an error and turns every other failure into `None`.
pub(crate) fn degrade<T>(source: Source, stage: &str, result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_session_fatal() => Err(e),
        Err(e) => {
            warn!(%source, stage, "{}", e);
            Ok(None)
        }
    }
}

/// Types `query` into a site's search box and submits it.
///
/// Returns `Ok(false)` when the search box never shows up or cannot be used.
pub(crate) async fn submit_search(
    session: &dyn BrowserSession,
    source: Source,
    entry_url: &str,
    input_selector: &str,
    query: &str,
    config: &ScraperConfig,
) -> Result<bool> {
    if degrade(source, "open search", session.navigate(entry_url).await)?.is_none() {
        return Ok(false);
    }

    let ready = degrade(
        source,
        "wait for search box",
        session.wait_for(input_selector, config.wait_timeout()).await,
    )?;
    if ready != Some(true) {
        warn!(%source, query, "Search box did not appear");
        return Ok(false);
    }

    if degrade(source, "type query", session.type_into(input_selector, query).await)?.is_none() {
        return Ok(false);
    }
    Ok(degrade(source, "submit search", session.press_key("Enter").await)?.is_some())
}

/// Loads `url` and returns its rendered HTML once `marker` appears.
///
/// Without a marker the page is given a fixed render wait instead.
pub(crate) async fn render_page(
    session: &dyn BrowserSession,
    source: Source,
    url: &str,
    marker: Option<&str>,
    config: &ScraperConfig,
) -> Result<std::result::Result<String, FailureReason>> {
    if let Err(e) = session.navigate(url).await {
        if e.is_session_fatal() {
            return Err(e);
        }
        warn!(%source, url, "{}", e);
        return Ok(Err(FailureReason::Navigation(e.to_string())));
    }

    match marker {
        Some(marker) => {
            let found = degrade(
                source,
                "wait for page marker",
                session.wait_for(marker, config.wait_timeout()).await,
            )?;
            if found != Some(true) {
                warn!(%source, url, marker, "Page marker never appeared");
                return Ok(Err(FailureReason::Timeout(marker.to_string())));
            }
        }
        None => session.pause(config.render_wait()).await,
    }

    match session.content().await {
        Ok(html) => Ok(Ok(html)),
        Err(e) if e.is_session_fatal() => Err(e),
        Err(e) => Ok(Err(FailureReason::Navigation(e.to_string()))),
    }
}

/// Resolves `href` against the page it was read from.
pub(crate) fn absolute_url(base: Option<&str>, href: &str) -> Option<String> {
    if let Ok(url) = url::Url::parse(href) {
        return Some(url.to_string());
    }
    let base = url::Url::parse(base?).ok()?;
    base.join(href).ok().map(|u| u.to_string())
}

#[cfg(test)]
pub(crate) fn record_with_menu(source: Source, names: &[&str]) -> SourceRecord {
    let mut record = SourceRecord::new(source, Some(format!("https://{}.test/r", source)));
    record.name = "Test Restaurant".into();
    for name in names {
        record
            .menu
            .push(crate::domain::MenuItem::new(*name, format!("₹{}", name.len() * 10)));
    }
    record
}
