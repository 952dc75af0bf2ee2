pub mod record;
pub mod restaurant;
pub mod source;

pub use record::{
    Extraction, FailureReason, MenuItem, Offer, RatingSummary, Review, SourceRecord,
};
pub use restaurant::{ReconciledMenuItem, ReconciledRestaurant, StoredSummary};
pub use source::Source;
