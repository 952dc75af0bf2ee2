use async_trait::async_trait;
use tracing::{debug, warn};

use crate::app::Result;
use crate::domain::{Extraction, FailureReason, MenuItem, Offer, Source, SourceRecord};
use crate::scraper::{child_text, BrowserSession, Markup, ScraperConfig};
use crate::sources::{degrade, render_page, submit_search, SourceAdapter};

const SEARCH_INPUT: &str = "input[placeholder=\"Search for restaurant, cuisine or a dish\"]";
/// Result tiles are not links; clicking one navigates to the restaurant.
const FIRST_RESULT: &str = ".sc-1kx5g6g-3.dkwpEa";

const NAME: &str = "h1.sc-iSDuPN";
const MENU_ITEM: &str = "div.sc-1s0saks-13.kQHKsO";
const ITEM_NAME: &str = "h4.sc-1s0saks-15.iSmBPS";
const ITEM_PRICE: &str = "span.sc-17hyc2s-1.cCiQWA";
const ITEM_DESCRIPTION: &str = "p.sc-1s0saks-12";
const OFFER: &str = "div.sc-1a03l6b-2.gerWzu";
const OFFER_AMOUNT: &str = "div.sc-1a03l6b-0.lkqupg";
const OFFER_CODE: &str = "div.sc-1a03l6b-1.kvnZBD";

/// Zomato delivery listing: offers and a priced menu.
pub struct ZomatoSource {
    listing_url: String,
    config: ScraperConfig,
}

impl ZomatoSource {
    pub fn new(listing_url: String, config: ScraperConfig) -> Self {
        Self {
            listing_url,
            config,
        }
    }
}

#[async_trait]
impl SourceAdapter for ZomatoSource {
    fn source(&self) -> Source {
        Source::Zomato
    }

    async fn resolve(&self, session: &dyn BrowserSession, query: &str) -> Result<Option<String>> {
        let source = self.source();
        if !submit_search(session, source, &self.listing_url, SEARCH_INPUT, query, &self.config).await? {
            return Ok(None);
        }

        session.pause(self.config.settle()).await;
        let listed = degrade(
            source,
            "wait for results",
            session.wait_for(FIRST_RESULT, self.config.wait_timeout()).await,
        )?;
        if listed != Some(true) {
            warn!(%source, query, "No search results appeared");
            return Ok(None);
        }

        if degrade(source, "open first result", session.click(FIRST_RESULT).await)?.is_none() {
            return Ok(None);
        }

        let url = degrade(source, "read URL", session.current_url().await)?.flatten();
        match url {
            Some(url) if url != self.listing_url => Ok(Some(url)),
            _ => {
                debug!(%source, query, "Click did not leave the listing page");
                Ok(None)
            }
        }
    }

    async fn extract(&self, session: &dyn BrowserSession, url: Option<&str>) -> Result<Extraction> {
        let source = self.source();
        let Some(url) = url else {
            return Ok(Extraction::failed(source, FailureReason::Unresolved));
        };

        match render_page(session, source, url, Some(NAME), &self.config).await? {
            Ok(html) => Ok(Extraction::Record(parse_restaurant(&html, url))),
            Err(reason) => Ok(Extraction::failed(source, reason)),
        }
    }
}

pub fn parse_restaurant(html: &str, url: &str) -> SourceRecord {
    let markup = Markup::parse(html);
    let mut record = SourceRecord::new(Source::Zomato, Some(url.to_string()));

    record.name = markup.text(NAME);

    record.menu = markup
        .select(MENU_ITEM)
        .iter()
        .filter_map(|el| {
            let name = child_text(el, ITEM_NAME);
            if name.is_empty() {
                return None;
            }
            let mut item = MenuItem::new(name, child_text(el, ITEM_PRICE));
            item.description = crate::scraper::non_empty(child_text(el, ITEM_DESCRIPTION));
            Some(item)
        })
        .collect();

    record.offers = markup
        .select(OFFER)
        .iter()
        .map(|el| Offer::new(child_text(el, OFFER_AMOUNT), child_text(el, OFFER_CODE)))
        .collect();

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::fixture::StaticSession;

    const LISTING: &str = "https://www.zomato.com/bangalore/delivery-in-shanti-nagar";
    const SEARCHED: &str = "https://www.zomato.com/bangalore/delivery-in-shanti-nagar?q=truffles";
    const PAGE_URL: &str = "https://www.zomato.com/bangalore/truffles-koramangala/order";

    const SEARCH_HTML: &str =
        r#"<input class="sc-fxgLge jUPfKP" placeholder="Search for restaurant, cuisine or a dish">"#;

    const RESTAURANT_HTML: &str = r#"
        <html><body>
          <h1 class="sc-iSDuPN cvdgm">Truffles</h1>
          <div class="sc-1a03l6b-2 gerWzu">
            <div class="sc-1a03l6b-0 lkqupg">50% OFF up to ₹100</div>
            <div class="sc-1a03l6b-1 kvnZBD">use code WELCOME50</div>
          </div>
          <div class="sc-1s0saks-13 kQHKsO">
            <h4 class="sc-1s0saks-15 iSmBPS">All American Cheese Burger</h4>
            <span class="sc-17hyc2s-1 cCiQWA">₹273</span>
          </div>
          <div class="sc-1s0saks-13 kQHKsO">
            <h4 class="sc-1s0saks-15 iSmBPS">Peri Peri Fries</h4>
            <span class="sc-17hyc2s-1 cCiQWA">₹159</span>
            <p class="sc-1s0saks-12 hcROsL">Crispy fries tossed in peri peri</p>
          </div>
        </body></html>
    "#;

    fn source() -> ZomatoSource {
        ZomatoSource::new(LISTING.to_string(), ScraperConfig::default())
    }

    #[test]
    fn test_parse_restaurant() {
        let record = parse_restaurant(RESTAURANT_HTML, PAGE_URL);
        assert_eq!(record.name, "Truffles");
        assert_eq!(record.offers, vec![Offer::new("50% OFF up to ₹100", "use code WELCOME50")]);
        assert_eq!(record.menu.len(), 2);
        assert_eq!(record.menu[0], MenuItem::new("All American Cheese Burger", "₹273"));
        assert_eq!(
            record.menu[1].description.as_deref(),
            Some("Crispy fries tossed in peri peri")
        );
    }

    #[tokio::test]
    async fn test_resolve_clicks_first_result() {
        let session = StaticSession::new()
            .with_page(LISTING, SEARCH_HTML)
            .with_page(
                SEARCHED,
                r#"<div class="sc-1kx5g6g-3 dkwpEa">Truffles</div><div class="sc-1kx5g6g-3 dkwpEa">Truffles Ice</div>"#,
            )
            .with_page(PAGE_URL, RESTAURANT_HTML)
            .with_search("Truffles", SEARCHED)
            .with_click(FIRST_RESULT, PAGE_URL);

        let url = source().resolve(&session, "Truffles").await.unwrap();
        assert_eq!(url.as_deref(), Some(PAGE_URL));
    }

    #[tokio::test]
    async fn test_resolve_without_results_is_none() {
        let session = StaticSession::new()
            .with_page(LISTING, SEARCH_HTML)
            .with_page(SEARCHED, "<p>No restaurants found</p>")
            .with_search("Nowhere", SEARCHED);

        assert_eq!(source().resolve(&session, "Nowhere").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_extract_reads_rendered_page() {
        let session = StaticSession::new().with_page(PAGE_URL, RESTAURANT_HTML);
        let extraction = source().extract(&session, Some(PAGE_URL)).await.unwrap();
        assert_eq!(extraction.menu().len(), 2);
        assert!(!source().is_empty(&extraction));
    }
}
