use std::future::Future;

use tracing::{debug, info};

use crate::app::Result;
use crate::domain::Extraction;
use crate::scraper::BrowserSession;
use crate::sources::SourceAdapter;

/// Calls `extract` until `is_empty` no longer holds or `max_retries` extra
/// attempts have been made, and returns the last result.
///
/// Exhausting the retries is not an error: the final (possibly empty) result
/// is returned as is. Only a lost session ends the loop early.
pub async fn fetch_with_retry<F, Fut, P>(mut extract: F, is_empty: P, max_retries: u32) -> Result<Extraction>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Extraction>>,
    P: Fn(&Extraction) -> bool,
{
    let mut result = extract().await?;
    let mut retries = 0;

    while is_empty(&result) && retries < max_retries {
        retries += 1;
        info!(
            source = %result.source(),
            attempt = retries,
            max_retries,
            "Empty extraction, retrying"
        );
        result = extract().await?;
    }

    if is_empty(&result) {
        debug!(source = %result.source(), retries, "Giving up with an empty extraction");
    }

    Ok(result)
}

/// Extracts `url` with `adapter`, retrying while the adapter reports the
/// result as empty. An unresolved URL is returned as a failure marker at once.
pub async fn fetch_source(
    adapter: &dyn SourceAdapter,
    session: &dyn BrowserSession,
    url: Option<&str>,
    max_retries: u32,
) -> Result<Extraction> {
    if url.is_none() {
        return adapter.extract(session, None).await;
    }

    fetch_with_retry(
        || adapter.extract(session, url),
        |extraction| adapter.is_empty(extraction),
        max_retries,
    )
    .await
}
