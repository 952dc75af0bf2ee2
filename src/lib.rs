//! # platescout
//!
//! Collects restaurant menus, prices, offers and reviews from a map listing
//! and several food-delivery sites by driving a headless browser, and
//! reconciles the same menu item across sites into one stored record.
//!
//! ## Architecture
//!
//! ```text
//! names → Resolver → Retrying Fetcher → Extractor → Reconciler → Store
//! ```
//!
//! - [`matcher`]: token-set fuzzy matching of search results
//! - [`sources`]: per-site URL resolution and record extraction
//! - [`pipeline`]: retries, menu reconciliation, batch orchestration
//! - [`store`]: SQLite document persistence
//!
//! ## Quick Start
//!
//! ```bash
//! # Compare the delivery sites for the configured restaurants
//! platescout compare
//!
//! # Same, for names listed in a file, without writing to the database
//! platescout compare --names restaurants.txt --dry-run
//!
//! # Scrape map listings and export them
//! platescout maps --output places.json
//!
//! # Inspect results
//! platescout list
//! platescout show "Meghana Foods"
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires the store to the loaded
/// configuration.
pub mod app;

/// Command-line interface using clap.
///
/// - `compare [--names <file>] [--dry-run]` - Compare delivery sites
/// - `maps [--names <file>] [--output <file>]` - Scrape map listings
/// - `show <name>` - Print a stored record
/// - `list` - List stored records
/// - `config` - Print the config file path
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/platescout/config.toml`, with `[scraper]`,
/// `[pipeline]` and `[sources]` sections.
pub mod config;

/// Core domain models.
///
/// - [`Source`](domain::Source): the sites records come from
/// - [`Extraction`](domain::Extraction): a per-source record or failure marker
/// - [`ReconciledRestaurant`](domain::ReconciledRestaurant): the merged record
pub mod domain;

/// Token-set fuzzy name matching.
pub mod matcher;

/// Retrying extraction, menu reconciliation and batch orchestration.
pub mod pipeline;

/// Browser automation.
///
/// - [`BrowserSession`](scraper::BrowserSession): the browsing capability
///   every resolver and extractor runs against
/// - [`ChromeSession`](scraper::ChromeSession): headless Chrome via chromiumoxide
/// - [`with_chrome_session`](scraper::with_chrome_session): scoped session
///   that is always closed
pub mod scraper;

/// Per-site resolvers and extractors.
pub mod sources;

/// SQLite persistence layer.
///
/// - [`Store`](store::Store): find/insert/update by restaurant name
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;
