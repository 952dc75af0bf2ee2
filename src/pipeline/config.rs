use serde::{Deserialize, Serialize};

use crate::domain::Source;

/// Which anchor menu items survive the cross-source join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InclusionPolicy {
    /// Keep an item only if every configured source lists it. A failed
    /// source counts as an empty menu.
    #[default]
    RequireAll,
    /// Keep an item if every successfully extracted source lists it.
    RequireAvailable,
    /// Keep every item listed by at least one source.
    RequireAny,
    /// Keep every anchor item, with prices from whichever sources list it.
    AnchorOnly,
}

/// Batch pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Restaurant names to process, in order
    pub restaurants: Vec<String>,

    /// Delivery sources compared by the `compare` batch
    pub sources: Vec<Source>,

    /// Source whose menu is iterated first when joining items
    pub anchor: Source,

    /// Menu join policy (default: require_all)
    pub inclusion: InclusionPolicy,

    /// Extra extraction attempts when a delivery page yields no menu (default: 3)
    pub max_retries: u32,

    /// Extra extraction attempts when a map page yields no reviews (default: 4)
    pub maps_max_retries: u32,

    /// Minimum token-set similarity (0-100) for a map search result to count
    /// as a match (default: 0, accept the best candidate)
    pub min_match_score: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            restaurants: Vec::new(),
            sources: Source::DELIVERY.to_vec(),
            anchor: Source::Swiggy,
            inclusion: InclusionPolicy::RequireAll,
            max_retries: 3,
            maps_max_retries: 4,
            min_match_score: 0,
        }
    }
}
