use serde::{Deserialize, Serialize};

/// Entry points for each site's search UI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Google Maps view the search box is used from
    pub google_maps_url: String,

    /// Swiggy search page
    pub swiggy_url: String,

    /// Zomato delivery listing page with a restaurant search box
    pub zomato_url: String,

    /// Known Magicpin restaurant pages; a restaurant resolves to the first
    /// URL containing its name with spaces replaced by dashes
    pub magicpin_urls: Vec<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            google_maps_url: "https://www.google.co.in/maps/@12.962000,77.597038,15z?entry=ttu"
                .to_string(),
            swiggy_url: "https://www.swiggy.com/search".to_string(),
            zomato_url: "https://www.zomato.com/bangalore/delivery-in-shanti-nagar".to_string(),
            magicpin_urls: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_sources_keep_defaults() {
        let config: SourcesConfig = toml::from_str(
            r#"magicpin_urls = ["https://magicpin.in/Bangalore/Richmond-Town/Restaurant/Meghana-Foods/store/1a2b3c/"]"#,
        )
        .unwrap();
        assert_eq!(config.magicpin_urls.len(), 1);
        assert_eq!(config.swiggy_url, "https://www.swiggy.com/search");
    }
}
