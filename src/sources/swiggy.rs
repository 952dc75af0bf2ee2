use async_trait::async_trait;
use tracing::warn;

use crate::app::Result;
use crate::domain::{Extraction, FailureReason, MenuItem, Offer, Source, SourceRecord};
use crate::scraper::{child_attr, child_text, non_empty, BrowserSession, Markup, ScraperConfig};
use crate::sources::{absolute_url, degrade, render_page, submit_search, SourceAdapter};

const SEARCH_INPUT: &str = "input._2FkHZ";
const RESULT_ITEM: &str = ".styles_restaurantListItem__1lOsF";
const FIRST_RESULT_LINK: &str = ".styles_restaurantListItem__1lOsF > a";

const NAME: &str = "p.RestaurantNameAddress_name__2IaTv";
const CUISINE: &str = "p.RestaurantNameAddress_cuisines__mBHr2";
const OFFER: &str = "div.RestaurantOffer_infoWrapper__2trmg";
const OFFER_HEADER: &str = "p.RestaurantOffer_header__3FBtQ";
const OFFER_CODE: &str = "div.RestaurantOffer_offerCodeWrapper__2Cr4F";
const MENU_ITEM: &str = "div.styles_container__-kShr";
const ITEM_NAME: &str = "h3.styles_itemNameText__3ZmZZ";
const ITEM_PRICE: &str = "span.styles_price__2xrhD";
const ITEM_DESCRIPTION: &str = "div.styles_itemDesc__3vhM0";
const ITEM_IMAGE: &str = "img.styles_itemImage__3CsDL";

/// Swiggy delivery listing: offers and a priced menu.
pub struct SwiggySource {
    search_url: String,
    config: ScraperConfig,
}

impl SwiggySource {
    pub fn new(search_url: String, config: ScraperConfig) -> Self {
        Self { search_url, config }
    }
}

#[async_trait]
impl SourceAdapter for SwiggySource {
    fn source(&self) -> Source {
        Source::Swiggy
    }

    async fn resolve(&self, session: &dyn BrowserSession, query: &str) -> Result<Option<String>> {
        let source = self.source();
        if !submit_search(session, source, &self.search_url, SEARCH_INPUT, query, &self.config).await? {
            return Ok(None);
        }

        let listed = degrade(
            source,
            "wait for results",
            session.wait_for(RESULT_ITEM, self.config.wait_timeout()).await,
        )?;
        if listed != Some(true) {
            warn!(%source, query, "No search results appeared");
            return Ok(None);
        }

        let href = degrade(
            source,
            "read first result",
            session.read_attribute(FIRST_RESULT_LINK, "href").await,
        )?
        .flatten();
        let page_url = degrade(source, "read URL", session.current_url().await)?.flatten();

        Ok(href.and_then(|href| absolute_url(page_url.as_deref().or(Some(&self.search_url)), &href)))
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
    let mut record = SourceRecord::new(Source::Swiggy, Some(url.to_string()));

    record.name = markup.text(NAME);
    record.cuisine = markup.opt_text(CUISINE);

    record.offers = markup
        .select(OFFER)
        .iter()
        .map(|el| Offer::new(child_text(el, OFFER_HEADER), child_text(el, OFFER_CODE)))
        .collect();

    record.menu = markup
        .select(MENU_ITEM)
        .iter()
        .filter_map(|el| {
            let name = child_text(el, ITEM_NAME);
            if name.is_empty() {
                return None;
            }
            Some(MenuItem {
                name,
                description: non_empty(child_text(el, ITEM_DESCRIPTION)),
                image: child_attr(el, ITEM_IMAGE, "src"),
                price: child_text(el, ITEM_PRICE),
            })
        })
        .collect();

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::fixture::StaticSession;

    const SEARCH: &str = "https://www.swiggy.com/search";
    const RESULTS: &str = "https://www.swiggy.com/search?query=Meghana+Foods";
    const PAGE_URL: &str = "https://www.swiggy.com/restaurants/meghana-foods-residency-road-1234";

    const RESTAURANT_HTML: &str = r#"
        <html><body>
          <p class="RestaurantNameAddress_name__2IaTv">Meghana Foods</p>
          <p class="RestaurantNameAddress_cuisines__mBHr2">Biryani, Andhra</p>
          <div class="RestaurantOffer_infoWrapper__2trmg">
            <p class="RestaurantOffer_header__3FBtQ">60% OFF UPTO ₹120</p>
            <div class="RestaurantOffer_offerCodeWrapper__2Cr4F">USE TRYNEW</div>
          </div>
          <div class="styles_container__-kShr">
            <h3 class="styles_itemNameText__3ZmZZ">Chicken Biryani</h3>
            <span class="styles_price__2xrhD">320</span>
            <div class="styles_itemDesc__3vhM0">Andhra style dum biryani</div>
            <img class="styles_itemImage__3CsDL" src="https://media.swiggy.test/biryani.jpg">
          </div>
          <div class="styles_container__-kShr">
            <h3 class="styles_itemNameText__3ZmZZ">Paneer Tikka</h3>
            <span class="styles_price__2xrhD">249</span>
          </div>
          <div class="styles_container__-kShr"><span class="styles_price__2xrhD">10</span></div>
        </body></html>
    "#;

    fn source() -> SwiggySource {
        SwiggySource::new(SEARCH.to_string(), ScraperConfig::default())
    }

    #[test]
    fn test_parse_restaurant() {
        let record = parse_restaurant(RESTAURANT_HTML, PAGE_URL);
        assert_eq!(record.source, Source::Swiggy);
        assert_eq!(record.name, "Meghana Foods");
        assert_eq!(record.cuisine.as_deref(), Some("Biryani, Andhra"));
        assert_eq!(record.offers, vec![Offer::new("60% OFF UPTO ₹120", "USE TRYNEW")]);

        assert_eq!(record.menu.len(), 2);
        let biryani = &record.menu[0];
        assert_eq!(biryani.name, "Chicken Biryani");
        assert_eq!(biryani.price, "320");
        assert_eq!(biryani.description.as_deref(), Some("Andhra style dum biryani"));
        assert_eq!(biryani.image.as_deref(), Some("https://media.swiggy.test/biryani.jpg"));

        let paneer = &record.menu[1];
        assert_eq!(paneer.description, None);
        assert_eq!(paneer.image, None);
    }

    #[tokio::test]
    async fn test_resolve_takes_first_result_and_absolutizes_it() {
        let session = StaticSession::new()
            .with_page(SEARCH, r#"<input class="_2FkHZ">"#)
            .with_page(
                RESULTS,
                r#"<div class="styles_restaurantListItem__1lOsF"><a href="/restaurants/meghana-foods-residency-road-1234">Meghana Foods</a></div>
                   <div class="styles_restaurantListItem__1lOsF"><a href="/restaurants/meghana-biryani-99">Meghana Biryani</a></div>"#,
            )
            .with_search("Meghana Foods", RESULTS);

        let url = source().resolve(&session, "Meghana Foods").await.unwrap();
        assert_eq!(url.as_deref(), Some(PAGE_URL));
    }

    #[tokio::test]
    async fn test_resolve_without_search_box_is_none() {
        let session = StaticSession::new().with_page(SEARCH, "<p>Something went wrong</p>");
        assert_eq!(source().resolve(&session, "Meghana Foods").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_extract_timeout_yields_failure_marker() {
        let session = StaticSession::new().with_page(PAGE_URL, "<p>Loading...</p>");
        let extraction = source().extract(&session, Some(PAGE_URL)).await.unwrap();
        assert_eq!(
            extraction,
            Extraction::failed(Source::Swiggy, FailureReason::Timeout(NAME.to_string()))
        );
        assert!(source().is_empty(&extraction));
    }
}
