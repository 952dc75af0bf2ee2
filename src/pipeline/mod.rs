//! Resolve, extract, reconcile and persist restaurants in batches.
//!
//! [`fetch_with_retry`] re-runs an extraction while its result is empty,
//! [`reconcile`] joins per-source menus under an [`InclusionPolicy`], and
//! [`BatchOrchestrator`] drives one restaurant at a time through both,
//! skipping failures without stopping the batch.

mod config;
mod orchestrator;
mod reconcile;
mod retry;

pub use config::{InclusionPolicy, PipelineConfig};
pub use orchestrator::{delivery_sources, BatchOrchestrator, BatchReport, RestaurantOutcome, RestaurantState};
pub use reconcile::reconcile;
pub use retry::{fetch_source, fetch_with_retry};
