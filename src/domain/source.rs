use std::fmt;

use serde::{Deserialize, Serialize};

/// An external website that provides restaurant data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    GoogleMaps,
    Swiggy,
    Zomato,
    Magicpin,
}

impl Source {
    /// The delivery/offer sites compared by the `compare` batch, in anchor order.
    pub const DELIVERY: [Source; 3] = [Source::Swiggy, Source::Zomato, Source::Magicpin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::GoogleMaps => "google_maps",
            Source::Swiggy => "swiggy",
            Source::Zomato => "zomato",
            Source::Magicpin => "magicpin",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
