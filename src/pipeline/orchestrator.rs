use std::fmt;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::app::{PlatescoutError, Result};
use crate::domain::{Extraction, ReconciledRestaurant, Source, SourceRecord};
use crate::pipeline::{fetch_source, reconcile, PipelineConfig};
use crate::scraper::BrowserSession;
use crate::sources::SourceAdapter;
use crate::store::Store;

/// Where a restaurant is in its batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestaurantState {
    Resolving,
    Extracting,
    Reconciling,
    Persisted,
    Skipped,
}

impl fmt::Display for RestaurantState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RestaurantState::Resolving => "resolving",
            RestaurantState::Extracting => "extracting",
            RestaurantState::Reconciling => "reconciling",
            RestaurantState::Persisted => "persisted",
            RestaurantState::Skipped => "skipped",
        };
        f.write_str(s)
    }
}

/// Final state of one restaurant.
#[derive(Debug, Clone)]
pub struct RestaurantOutcome {
    pub name: String,
    pub state: RestaurantState,
    /// State the restaurant was in when it was skipped.
    pub failed_in: Option<RestaurantState>,
    pub error: Option<String>,
}

/// Per-restaurant outcomes, in input order, plus the records persisted.
#[derive(Debug, Clone)]
pub struct BatchReport<T> {
    pub outcomes: Vec<RestaurantOutcome>,
    pub records: Vec<T>,
}

impl<T> Default for BatchReport<T> {
    fn default() -> Self {
        Self {
            outcomes: Vec::new(),
            records: Vec::new(),
        }
    }
}

impl<T> BatchReport<T> {
    pub fn persisted(&self) -> usize {
        self.count(RestaurantState::Persisted)
    }

    pub fn skipped(&self) -> usize {
        self.count(RestaurantState::Skipped)
    }

    fn count(&self, state: RestaurantState) -> usize {
        self.outcomes.iter().filter(|o| o.state == state).count()
    }

    fn push_persisted(&mut self, name: &str, record: T) {
        self.outcomes.push(RestaurantOutcome {
            name: name.to_string(),
            state: RestaurantState::Persisted,
            failed_in: None,
            error: None,
        });
        self.records.push(record);
    }

    fn push_skipped(&mut self, name: &str, failed_in: RestaurantState, error: &PlatescoutError) {
        self.outcomes.push(RestaurantOutcome {
            name: name.to_string(),
            state: RestaurantState::Skipped,
            failed_in: Some(failed_in),
            error: Some(error.to_string()),
        });
    }
}

/// Drives each restaurant name through resolve, extract, reconcile and
/// persist, one at a time in input order.
///
/// A failing restaurant is skipped and the batch moves on. Only a lost
/// browser session aborts the batch.
pub struct BatchOrchestrator {
    store: Arc<dyn Store>,
    config: PipelineConfig,
}

impl BatchOrchestrator {
    pub fn new(store: Arc<dyn Store>, config: PipelineConfig) -> Self {
        Self { store, config }
    }

    /// Compares the delivery `adapters` for every name and upserts one
    /// reconciled record per restaurant.
    pub async fn run_compare(
        &self,
        session: &dyn BrowserSession,
        adapters: &[Box<dyn SourceAdapter>],
        names: &[String],
    ) -> Result<BatchReport<ReconciledRestaurant>> {
        let mut report = BatchReport::default();

        for (i, name) in names.iter().enumerate() {
            info!(restaurant = %name, position = i + 1, total = names.len(), "Comparing restaurant");
            let mut state = RestaurantState::Resolving;
            let outcome = self.compare_one(session, adapters, name, &mut state).await;
            self.settle(session, &mut report, name, state, outcome).await?;
        }

        info!(
            persisted = report.persisted(),
            skipped = report.skipped(),
            "Compare batch finished"
        );
        Ok(report)
    }

    /// Scrapes the map listing for every name and upserts each place record.
    pub async fn run_maps(
        &self,
        session: &dyn BrowserSession,
        adapter: &dyn SourceAdapter,
        names: &[String],
    ) -> Result<BatchReport<SourceRecord>> {
        let mut report = BatchReport::default();

        for (i, name) in names.iter().enumerate() {
            info!(restaurant = %name, position = i + 1, total = names.len(), "Scraping map listing");
            let mut state = RestaurantState::Resolving;
            let outcome = self.map_one(session, adapter, name, &mut state).await;
            self.settle(session, &mut report, name, state, outcome).await?;
        }

        info!(
            persisted = report.persisted(),
            skipped = report.skipped(),
            "Maps batch finished"
        );
        Ok(report)
    }

    /// Records one restaurant's outcome. Returns `Err` only when the session
    /// is gone and the batch must stop.
    async fn settle<T>(
        &self,
        session: &dyn BrowserSession,
        report: &mut BatchReport<T>,
        name: &str,
        state: RestaurantState,
        outcome: Result<T>,
    ) -> Result<()> {
        match outcome {
            Ok(record) => {
                report.push_persisted(name, record);
                Ok(())
            }
            Err(e) if e.is_session_fatal() => {
                error!(restaurant = name, %state, "Browser session lost, aborting batch: {}", e);
                Err(e)
            }
            Err(e) => {
                warn!(restaurant = name, %state, "Skipping restaurant: {}", e);
                report.push_skipped(name, state, &e);

                if !session.is_alive().await {
                    error!(restaurant = name, "Browser session no longer responds, aborting batch");
                    return Err(PlatescoutError::Session(format!(
                        "session unusable after skipping {}",
                        name
                    )));
                }
                Ok(())
            }
        }
    }

    async fn compare_one(
        &self,
        session: &dyn BrowserSession,
        adapters: &[Box<dyn SourceAdapter>],
        name: &str,
        state: &mut RestaurantState,
    ) -> Result<ReconciledRestaurant> {
        let mut urls: Vec<Option<String>> = Vec::with_capacity(adapters.len());
        for adapter in adapters {
            let url = adapter.resolve(session, name).await?;
            match &url {
                Some(url) => info!(restaurant = name, source = %adapter.source(), url = %url, "Resolved"),
                None => warn!(restaurant = name, source = %adapter.source(), "Not found on source"),
            }
            urls.push(url);
        }

        if !adapters.is_empty() && urls.iter().all(Option::is_none) {
            return Err(PlatescoutError::RestaurantNotFound(name.to_string()));
        }

        *state = RestaurantState::Extracting;
        let mut extractions: Vec<Extraction> = Vec::with_capacity(adapters.len());
        for (adapter, url) in adapters.iter().zip(&urls) {
            let extraction = fetch_source(adapter.as_ref(), session, url.as_deref(), self.config.max_retries).await?;
            log_extraction(name, &extraction);
            extractions.push(extraction);
        }

        *state = RestaurantState::Reconciling;
        let restaurant = reconcile(name, &extractions, self.config.anchor, self.config.inclusion);

        self.store.upsert_restaurant(&restaurant)?;
        *state = RestaurantState::Persisted;
        Ok(restaurant)
    }

    async fn map_one(
        &self,
        session: &dyn BrowserSession,
        adapter: &dyn SourceAdapter,
        name: &str,
        state: &mut RestaurantState,
    ) -> Result<SourceRecord> {
        let Some(url) = adapter.resolve(session, name).await? else {
            return Err(PlatescoutError::RestaurantNotFound(name.to_string()));
        };
        info!(restaurant = name, source = %adapter.source(), url = %url, "Resolved");

        *state = RestaurantState::Extracting;
        let extraction = fetch_source(adapter, session, Some(&url), self.config.maps_max_retries).await?;
        log_extraction(name, &extraction);

        *state = RestaurantState::Reconciling;
        let record = match extraction {
            Extraction::Record(record) => record,
            Extraction::Failed { source, reason } => {
                return Err(PlatescoutError::Other(format!("{} extraction failed: {}", source, reason)));
            }
        };

        self.store.upsert_place(name, &record)?;
        *state = RestaurantState::Persisted;
        Ok(record)
    }
}

fn log_extraction(name: &str, extraction: &Extraction) {
    match extraction {
        Extraction::Record(record) => info!(
            restaurant = name,
            source = %record.source,
            menu = record.menu.len(),
            offers = record.offers.len(),
            reviews = record.reviews.len(),
            "Extracted"
        ),
        Extraction::Failed { source, reason } => {
            warn!(restaurant = name, source = %source, %reason, "Extraction failed")
        }
    }
}

/// Delivery sources in configured order, for the compare batch.
pub fn delivery_sources(config: &PipelineConfig) -> Vec<Source> {
    config
        .sources
        .iter()
        .copied()
        .filter(|s| *s != Source::GoogleMaps)
        .collect()
}
