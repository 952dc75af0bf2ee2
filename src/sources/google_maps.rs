use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::app::Result;
use crate::domain::{Extraction, FailureReason, RatingSummary, Review, Source, SourceRecord};
use crate::matcher;
use crate::scraper::{child_attr, child_text, element_text, non_empty, BrowserSession, Markup, ScraperConfig};
use crate::sources::{absolute_url, degrade, render_page, submit_search, SourceAdapter};

const SEARCH_INPUT: &str = "input.searchboxinput";
const RESULT_CARD: &str = "div.Nv2PK";
const RESULT_NAME: &str = ".qBF1Pd.fontHeadlineSmall";
const RESULT_LINK: &str = "a[href]";
/// Place header; a search with a single hit lands directly on the place page.
const PLACE_MARKER: &str = "h1.DUwDvf";

const CUISINE: &str = "button.DkEaL";
const ADDRESS: &str = "div.rogA2c > div.Io6YTe.fontBodyMedium";
const WEBSITE: &str = "div.rogA2c.ITvuef";
const PHONE_BUTTON: &str = "button[data-item-id^=\"phone:tel\"]";
const RATING: &str = ".F7nice > span > span[aria-hidden=\"true\"]";
const REVIEW_COUNT: &str = ".F7nice > span > span > span[aria-label]";
const REVIEW: &str = ".jftiEf.fontBodyMedium";
const SERVICE_OPTION: &str = "div.LTs0Rc";
const OPENING_HOURS: &str = "div.t39EBf.GUrTXd";

static COORDINATES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!3d(-?\d+\.\d+)!4d(-?\d+\.\d+)").expect("valid coordinates pattern"));

/// One entry of the map search result list.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub name: String,
    pub url: Option<String>,
}

/// Google Maps listing: identity, contact details, hours and reviews.
pub struct GoogleMapsSource {
    search_url: String,
    config: ScraperConfig,
    min_match_score: u8,
}

impl GoogleMapsSource {
    pub fn new(search_url: String, config: ScraperConfig, min_match_score: u8) -> Self {
        Self {
            search_url,
            config,
            min_match_score,
        }
    }
}

#[async_trait]
impl SourceAdapter for GoogleMapsSource {
    fn source(&self) -> Source {
        Source::GoogleMaps
    }

    async fn resolve(&self, session: &dyn BrowserSession, query: &str) -> Result<Option<String>> {
        let source = self.source();
        if !submit_search(session, source, &self.search_url, SEARCH_INPUT, query, &self.config).await? {
            return Ok(None);
        }

        let landed = degrade(
            source,
            "wait for results",
            session
                .wait_for(&format!("{}, {}", RESULT_CARD, PLACE_MARKER), self.config.wait_timeout())
                .await,
        )?;
        if landed != Some(true) {
            warn!(%source, query, "No search results appeared");
            return Ok(None);
        }

        let Some(html) = degrade(source, "read results", session.content().await)? else {
            return Ok(None);
        };
        let page_url = degrade(source, "read URL", session.current_url().await)?.flatten();
        let candidates = parse_candidates(&html, page_url.as_deref());

        if candidates.is_empty() {
            // Single hit: the search went straight to the place page
            if Markup::parse(&html).exists(PLACE_MARKER) {
                debug!(%source, query, "Search landed on a place page");
                return Ok(page_url);
            }
            return Ok(None);
        }

        let names: Vec<&str> = candidates.iter().map(|c| c.name.as_str()).collect();
        let Some(best) = matcher::best_match(query, &names, self.min_match_score) else {
            warn!(%source, query, min_score = self.min_match_score, "No candidate matched closely enough");
            return Ok(None);
        };

        info!(%source, query, matched = %best.name, score = best.score, "Closest matching restaurant");
        Ok(candidates[best.index].url.clone())
    }

    async fn extract(&self, session: &dyn BrowserSession, url: Option<&str>) -> Result<Extraction> {
        let source = self.source();
        let Some(url) = url else {
            return Ok(Extraction::failed(source, FailureReason::Unresolved));
        };

        match render_page(session, source, url, Some(PLACE_MARKER), &self.config).await? {
            Ok(html) => Ok(Extraction::Record(parse_place(&html, url))),
            Err(reason) => Ok(Extraction::failed(source, reason)),
        }
    }

    fn is_empty(&self, extraction: &Extraction) -> bool {
        extraction.reviews().is_empty()
    }
}

/// Reads the result list as (name, link) pairs in display order.
pub fn parse_candidates(html: &str, page_url: Option<&str>) -> Vec<Candidate> {
    let markup = Markup::parse(html);
    markup
        .select(RESULT_CARD)
        .iter()
        .filter_map(|card| {
            let name = child_text(card, RESULT_NAME);
            if name.is_empty() {
                return None;
            }
            let url = child_attr(card, RESULT_LINK, "href").and_then(|href| absolute_url(page_url, &href));
            Some(Candidate { name, url })
        })
        .collect()
}

/// Extracts a place page. Every field is looked up independently.
pub fn parse_place(html: &str, url: &str) -> SourceRecord {
    let markup = Markup::parse(html);
    let mut record = SourceRecord::new(Source::GoogleMaps, Some(url.to_string()));

    record.name = markup.text(PLACE_MARKER);
    record.cuisine = markup.opt_text(CUISINE);
    record.address = markup.opt_text(ADDRESS);
    record.website = markup.opt_text(WEBSITE);
    record.phone_number = markup
        .attr(PHONE_BUTTON, "data-item-id")
        .and_then(|id| phone_from_item_id(&id));

    if let Some((lat, lng)) = coordinates_from_url(url) {
        record.latitude = Some(lat);
        record.longitude = Some(lng);
    }

    let rating = markup.text(RATING);
    let review_count: String = markup
        .text(REVIEW_COUNT)
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    if !rating.is_empty() || !review_count.is_empty() {
        record.rating = Some(RatingSummary {
            rating,
            review_count,
        });
    }

    record.reviews = markup
        .select(REVIEW)
        .iter()
        .map(|el| Review {
            author: child_text(el, "div.d4r55"),
            avatar_url: child_attr(el, "img.NBa7we", "src"),
            author_context: non_empty(child_text(el, "div.RfnDt")),
            star_rating: child_attr(el, "span.kvMYJc", "aria-label").unwrap_or_default(),
            posted_time: child_text(el, "span.rsqaWe"),
            text: child_text(el, "span.wiI7pd"),
        })
        .collect();

    record.service_options = markup
        .select(SERVICE_OPTION)
        .iter()
        .filter_map(|el| service_option(&element_text(el)))
        .collect();

    record.opening_hours = markup
        .attr(OPENING_HOURS, "aria-label")
        .map(|label| format_opening_hours(&label))
        .unwrap_or_default();

    record
}

/// `phone:tel:08041234567` → `08041234567`
pub fn phone_from_item_id(item_id: &str) -> Option<String> {
    item_id.split(':').nth(2).map(str::to_string).and_then(non_empty)
}

/// Place URLs embed the pin as `!3d<lat>!4d<lng>`.
pub fn coordinates_from_url(url: &str) -> Option<(f64, f64)> {
    let caps = COORDINATES.captures(url)?;
    let lat = caps.get(1)?.as_str().parse().ok()?;
    let lng = caps.get(2)?.as_str().parse().ok()?;
    Some((lat, lng))
}

/// `"Serves · Dine-in"` → `"Dine-in"`
fn service_option(text: &str) -> Option<String> {
    let option = match text.split_once('·') {
        Some((_, rest)) => rest.trim(),
        None => text.trim(),
    };
    non_empty(option.to_string())
}

/// Turns the hours aria-label (`"Monday, 11 am to 11 pm; Tuesday, ..."`)
/// into one `"Monday: 11 am to 11 pm"` line per day.
pub fn format_opening_hours(label: &str) -> Vec<String> {
    label
        .split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let line = match pair.split_once(',') {
                Some((day, timing)) => format!("{}: {}", day.trim(), timing.trim()),
                None => pair.to_string(),
            };
            line.replace("Hide open hours for the week", "")
                .trim()
                .trim_end_matches('.')
                .trim()
                .to_string()
        })
        .collect()
}
