use async_trait::async_trait;
use tracing::debug;

use crate::app::Result;
use crate::domain::{Extraction, FailureReason, MenuItem, Offer, Source, SourceRecord};
use crate::scraper::{child_text, BrowserSession, Markup, ScraperConfig};
use crate::sources::{render_page, SourceAdapter};

const NAME: &str = "h1.v2";
const OFFER: &str = ".save-highlight.hide-mb span";
const MENU_ITEM: &str = "article.itemInfo";
const ITEM_NAME: &str = ".itemName > a";
const ITEM_PRICE: &str = ".itemPrice";

/// Magicpin listing. Pages are found through a configured URL catalogue and
/// render without a dependable marker, so extraction waits a fixed interval.
pub struct MagicpinSource {
    catalogue: Vec<String>,
    config: ScraperConfig,
}

impl MagicpinSource {
    pub fn new(catalogue: Vec<String>, config: ScraperConfig) -> Self {
        Self { catalogue, config }
    }

    /// First catalogue URL containing the dash-joined restaurant name.
    /// Matching is case-sensitive, as catalogue URLs keep the site's casing.
    pub fn lookup(&self, query: &str) -> Option<&str> {
        let slug = query.split_whitespace().collect::<Vec<_>>().join("-");
        if slug.is_empty() {
            return None;
        }
        self.catalogue
            .iter()
            .find(|url| url.contains(&slug))
            .map(String::as_str)
    }
}

#[async_trait]
impl SourceAdapter for MagicpinSource {
    fn source(&self) -> Source {
        Source::Magicpin
    }

    async fn resolve(&self, _session: &dyn BrowserSession, query: &str) -> Result<Option<String>> {
        let url = self.lookup(query).map(str::to_string);
        if url.is_none() {
            debug!(source = %self.source(), query, "Restaurant not in the URL catalogue");
        }
        Ok(url)
    }

    async fn extract(&self, session: &dyn BrowserSession, url: Option<&str>) -> Result<Extraction> {
        let source = self.source();
        let Some(url) = url else {
            return Ok(Extraction::failed(source, FailureReason::Unresolved));
        };

        match render_page(session, source, url, None, &self.config).await? {
            Ok(html) => Ok(Extraction::Record(parse_restaurant(&html, url))),
            Err(reason) => Ok(Extraction::failed(source, reason)),
        }
    }
}

pub fn parse_restaurant(html: &str, url: &str) -> SourceRecord {
    let markup = Markup::parse(html);
    let mut record = SourceRecord::new(Source::Magicpin, Some(url.to_string()));

    record.name = markup.text(NAME);

    record.offers = markup
        .texts(OFFER)
        .into_iter()
        .filter(|text| !text.is_empty())
        .map(|text| Offer::new(text, ""))
        .collect();

    record.menu = markup
        .select(MENU_ITEM)
        .iter()
        .filter_map(|el| {
            let name = child_text(el, ITEM_NAME);
            if name.is_empty() {
                return None;
            }
            let price = child_text(el, ITEM_PRICE).replace('₹', "").trim().to_string();
            Some(MenuItem::new(name, price))
        })
        .collect();

    record
}
