use std::path::Path;
use std::sync::Arc;

use crate::app::{AppContext, PlatescoutError, Result};
use crate::domain::Source;
use crate::pipeline::{delivery_sources, BatchOrchestrator, BatchReport, RestaurantState};
use crate::scraper::with_chrome_session;
use crate::sources::{build_adapter, SourceAdapter};
use crate::store::Store;

/// Compare the delivery sites for every restaurant and store the results.
pub async fn compare(ctx: &AppContext, names_file: Option<&Path>, dry_run: bool) -> Result<()> {
    let names = restaurant_names(names_file, &ctx.config.pipeline.restaurants)?;
    if names.is_empty() {
        println!("No restaurants to compare");
        return Ok(());
    }

    let config = &ctx.config;
    let adapters: Vec<Box<dyn SourceAdapter>> = delivery_sources(&config.pipeline)
        .into_iter()
        .map(|source| {
            build_adapter(
                source,
                &config.sources,
                &config.scraper,
                config.pipeline.min_match_score,
            )
        })
        .collect();
    if adapters.is_empty() {
        return Err(PlatescoutError::Config("No delivery sources configured".into()));
    }

    println!("Comparing {} restaurants...", names.len());

    let store: Arc<dyn Store> = ctx.store.clone();
    let orchestrator = BatchOrchestrator::new(store, config.pipeline.clone());
    let report = with_chrome_session(config.scraper.clone(), |session| async move {
        orchestrator
            .run_compare(session.as_ref(), &adapters, &names)
            .await
    })
    .await?;

    print_outcomes(&report);

    if dry_run {
        println!("{}", serde_json::to_string_pretty(&report.records)?);
    }
    Ok(())
}

/// Scrape map listings for every restaurant and store them as places.
pub async fn maps(ctx: &AppContext, names_file: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let names = restaurant_names(names_file, &ctx.config.pipeline.restaurants)?;
    if names.is_empty() {
        println!("No restaurants to look up");
        return Ok(());
    }

    let config = &ctx.config;
    let adapter = build_adapter(
        Source::GoogleMaps,
        &config.sources,
        &config.scraper,
        config.pipeline.min_match_score,
    );

    println!("Looking up {} restaurants...", names.len());

    let store: Arc<dyn Store> = ctx.store.clone();
    let orchestrator = BatchOrchestrator::new(store, config.pipeline.clone());
    let report = with_chrome_session(config.scraper.clone(), |session| async move {
        orchestrator
            .run_maps(session.as_ref(), adapter.as_ref(), &names)
            .await
    })
    .await?;

    print_outcomes(&report);

    if let Some(path) = output {
        std::fs::write(path, serde_json::to_string_pretty(&report.records)?)?;
        println!("Wrote {} records to {}", report.records.len(), path.display());
    }
    Ok(())
}

/// Print a stored restaurant, falling back to a stored place.
pub fn show(ctx: &AppContext, name: &str) -> Result<()> {
    if let Some(restaurant) = ctx.store.find_restaurant(name)? {
        println!("{}", serde_json::to_string_pretty(&restaurant)?);
        return Ok(());
    }

    let place = ctx
        .store
        .find_place(name)?
        .ok_or_else(|| PlatescoutError::RestaurantNotFound(name.to_string()))?;
    println!("{}", serde_json::to_string_pretty(&place)?);
    Ok(())
}

pub fn list(ctx: &AppContext) -> Result<()> {
    let summaries = ctx.store.list()?;

    if summaries.is_empty() {
        println!("Nothing stored yet");
        return Ok(());
    }

    for summary in summaries {
        println!(
            "{:<10} {} {}",
            summary.kind,
            summary.updated_at.format("%Y-%m-%d %H:%M"),
            summary.name
        );
    }

    Ok(())
}

fn print_outcomes<T>(report: &BatchReport<T>) {
    for outcome in &report.outcomes {
        match (outcome.state, outcome.failed_in) {
            (RestaurantState::Skipped, Some(stage)) => println!(
                "  ! {} - skipped while {}: {}",
                outcome.name,
                stage,
                outcome.error.as_deref().unwrap_or("unknown error")
            ),
            _ => println!("  + {}", outcome.name),
        }
    }

    println!(
        "\nBatch complete: {} stored, {} skipped",
        report.persisted(),
        report.skipped()
    );
}

/// Names from `file` (one per non-blank line) or else the configured list.
fn restaurant_names(file: Option<&Path>, configured: &[String]) -> Result<Vec<String>> {
    match file {
        Some(path) => Ok(parse_names(&std::fs::read_to_string(path)?)),
        None => Ok(configured.to_vec()),
    }
}

fn parse_names(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::domain::ReconciledRestaurant;

    #[test]
    fn test_parse_names_skips_blank_lines() {
        let names = parse_names("Meghana Foods\r\n\n  \nTruffles\nempire restaurant\n");
        assert_eq!(names, vec!["Meghana Foods", "Truffles", "empire restaurant"]);
    }

    #[test]
    fn test_restaurant_names_prefers_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("names.txt");
        std::fs::write(&path, "Nagarjuna\n").unwrap();

        let configured = vec!["Truffles".to_string()];
        assert_eq!(restaurant_names(Some(&path), &configured).unwrap(), vec!["Nagarjuna"]);
        assert_eq!(restaurant_names(None, &configured).unwrap(), vec!["Truffles"]);
    }

    #[test]
    fn test_show_missing_restaurant_is_not_found() {
        let ctx = AppContext::in_memory(Config::default()).unwrap();
        assert!(matches!(
            show(&ctx, "Truffles"),
            Err(PlatescoutError::RestaurantNotFound(_))
        ));

        ctx.store
            .insert_restaurant(&ReconciledRestaurant::new("Truffles"))
            .unwrap();
        assert!(show(&ctx, "Truffles").is_ok());
    }

    #[tokio::test]
    async fn test_compare_without_names_does_nothing() {
        let ctx = AppContext::in_memory(Config::default()).unwrap();
        compare(&ctx, None, true).await.unwrap();
        assert!(ctx.store.list().unwrap().is_empty());
    }
}
