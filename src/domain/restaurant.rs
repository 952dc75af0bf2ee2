use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Offer, Source};

/// One menu item joined across sources, with the price each source lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledMenuItem {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub prices: BTreeMap<Source, String>,
}

impl ReconciledMenuItem {
    pub fn price(&self, source: Source) -> Option<&str> {
        self.prices.get(&source).map(String::as_str)
    }
}

/// The unified record persisted for one restaurant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledRestaurant {
    pub restaurant_name: String,
    pub offers: BTreeMap<Source, Vec<Offer>>,
    pub menu: Vec<ReconciledMenuItem>,
    pub reconciled_at: DateTime<Utc>,
}

impl ReconciledRestaurant {
    pub fn new(restaurant_name: impl Into<String>) -> Self {
        Self {
            restaurant_name: restaurant_name.into(),
            offers: BTreeMap::new(),
            menu: Vec::new(),
            reconciled_at: Utc::now(),
        }
    }

    pub fn offers_for(&self, source: Source) -> &[Offer] {
        self.offers.get(&source).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Summary row for a stored document.
#[derive(Debug, Clone)]
pub struct StoredSummary {
    pub name: String,
    pub kind: &'static str,
    pub updated_at: DateTime<Utc>,
}
