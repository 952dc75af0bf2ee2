use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::Source;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub discount: String,
    pub code: String,
}

impl Offer {
    pub fn new(discount: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            discount: discount.into(),
            code: code.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    /// Raw price text as rendered by the source (currency sign and separators kept).
    pub price: String,
}

impl MenuItem {
    pub fn new(name: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
            ..Default::default()
        }
    }

    /// Matching key used to join items across sources.
    pub fn key(&self) -> String {
        fold_name(&self.name)
    }
}

/// Case-folds a name for exact cross-source matching.
fn fold_name(name: &str) -> String {
    name.to_lowercase()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub author: String,
    pub avatar_url: Option<String>,
    pub author_context: Option<String>,
    /// Star rating label, e.g. "5 stars".
    pub star_rating: String,
    pub posted_time: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub rating: String,
    pub review_count: String,
}

/// Normalized result of extracting one restaurant page on one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub source: Source,
    pub url: Option<String>,
    pub name: String,
    pub cuisine: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub website: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub rating: Option<RatingSummary>,
    pub offers: Vec<Offer>,
    pub menu: Vec<MenuItem>,
    pub reviews: Vec<Review>,
    pub opening_hours: Vec<String>,
    pub service_options: Vec<String>,
}

impl SourceRecord {
    pub fn new(source: Source, url: Option<String>) -> Self {
        Self {
            source,
            url,
            name: String::new(),
            cuisine: None,
            address: None,
            phone_number: None,
            website: None,
            latitude: None,
            longitude: None,
            rating: None,
            offers: Vec::new(),
            menu: Vec::new(),
            reviews: Vec::new(),
            opening_hours: Vec::new(),
            service_options: Vec::new(),
        }
    }

    pub fn find_menu_item(&self, name: &str) -> Option<&MenuItem> {
        let key = fold_name(name);
        self.menu.iter().find(|item| item.key() == key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    /// No URL could be resolved for the restaurant on this source.
    Unresolved,
    /// The page identity marker never appeared.
    Timeout(String),
    /// Navigation or page reading failed.
    Navigation(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Unresolved => f.write_str("no URL resolved"),
            FailureReason::Timeout(selector) => write!(f, "timed out waiting for {}", selector),
            FailureReason::Navigation(msg) => write!(f, "navigation failed: {}", msg),
        }
    }
}

/// Outcome of one extraction attempt: a record, or an explicit failure marker.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Record(SourceRecord),
    Failed { source: Source, reason: FailureReason },
}

impl Extraction {
    pub fn failed(source: Source, reason: FailureReason) -> Self {
        Extraction::Failed { source, reason }
    }

    pub fn source(&self) -> Source {
        match self {
            Extraction::Record(record) => record.source,
            Extraction::Failed { source, .. } => *source,
        }
    }

    pub fn record(&self) -> Option<&SourceRecord> {
        match self {
            Extraction::Record(record) => Some(record),
            Extraction::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Extraction::Failed { .. })
    }

    /// Menu items, empty for a failure marker.
    pub fn menu(&self) -> &[MenuItem] {
        self.record().map(|r| r.menu.as_slice()).unwrap_or(&[])
    }

    /// Offers, empty for a failure marker.
    pub fn offers(&self) -> &[Offer] {
        self.record().map(|r| r.offers.as_slice()).unwrap_or(&[])
    }

    /// Reviews, empty for a failure marker.
    pub fn reviews(&self) -> &[Review] {
        self.record().map(|r| r.reviews.as_slice()).unwrap_or(&[])
    }
}
