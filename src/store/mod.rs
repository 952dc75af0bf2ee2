pub mod sqlite;

use crate::app::Result;
use crate::domain::{ReconciledRestaurant, SourceRecord, StoredSummary};

pub use sqlite::SqliteStore;

/// Whether an upsert created a new document or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Inserted,
    Updated,
}

/// Document persistence keyed by restaurant name.
pub trait Store: Send + Sync {
    // Reconciled restaurant operations
    fn find_restaurant(&self, name: &str) -> Result<Option<ReconciledRestaurant>>;
    fn insert_restaurant(&self, restaurant: &ReconciledRestaurant) -> Result<()>;
    fn update_restaurant(&self, restaurant: &ReconciledRestaurant) -> Result<()>;

    /// Replaces the document with the same name, or inserts it.
    fn upsert_restaurant(&self, restaurant: &ReconciledRestaurant) -> Result<Upserted> {
        if self.find_restaurant(&restaurant.restaurant_name)?.is_some() {
            self.update_restaurant(restaurant)?;
            Ok(Upserted::Updated)
        } else {
            self.insert_restaurant(restaurant)?;
            Ok(Upserted::Inserted)
        }
    }

    // Place operations
    fn find_place(&self, name: &str) -> Result<Option<SourceRecord>>;
    fn upsert_place(&self, name: &str, place: &SourceRecord) -> Result<Upserted>;

    /// Every stored document, restaurants first, each group by name.
    fn list(&self) -> Result<Vec<StoredSummary>>;
}
