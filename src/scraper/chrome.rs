use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::app::{PlatescoutError, Result};
use crate::scraper::config::ScraperConfig;
use crate::scraper::BrowserSession;

/// Chrome-backed browsing session using chromiumoxide.
///
/// Owns one browser process and one page. Every navigation on the page sets
/// the configured user agent.
pub struct ChromeSession {
    browser: Mutex<Browser>,
    page: Page,
    handler: JoinHandle<()>,
    config: ScraperConfig,
}

impl ChromeSession {
    /// Launch a browser with the given configuration and open a blank page
    pub async fn launch(config: ScraperConfig) -> Result<Self> {
        let mut builder = BrowserConfig::builder().request_timeout(config.timeout());
        for arg in &config.browser_args {
            builder = builder.arg(arg.as_str());
        }

        if !config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .build()
            .map_err(|e| PlatescoutError::Browser(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            PlatescoutError::Session(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            ))
        })?;

        // Drive CDP events until the browser goes away
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler event error: {}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| PlatescoutError::Session(format!("Failed to create page: {}", e)))?;

        info!(headless = config.headless, "Browser session started");

        Ok(Self {
            browser: Mutex::new(browser),
            page,
            handler,
            config,
        })
    }

    /// Close the page and the browser process.
    pub async fn close(self) -> Result<()> {
        let Self {
            browser,
            page,
            handler,
            ..
        } = self;

        if let Err(e) = page.close().await {
            debug!("Failed to close page: {}", e);
        }

        let mut browser = browser.into_inner();
        let closed = browser
            .close()
            .await
            .map_err(|e| PlatescoutError::Browser(format!("Failed to close browser: {}", e)));
        if closed.is_ok() {
            let _ = browser.wait().await;
        }
        handler.abort();

        info!("Browser session closed");
        closed.map(|_| ())
    }

    /// Errors after the CDP handler has stopped mean the browser is gone.
    fn fail(&self, what: &str, e: impl std::fmt::Display) -> PlatescoutError {
        if self.handler.is_finished() {
            PlatescoutError::Session(format!("{}: {}", what, e))
        } else {
            PlatescoutError::Browser(format!("{}: {}", what, e))
        }
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        if let Some(ref ua) = self.config.user_agent {
            self.page
                .set_user_agent(ua.as_str())
                .await
                .map_err(|e| self.fail("Failed to set user agent", e))?;
        }

        match tokio::time::timeout(self.config.timeout(), self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(self.fail("Navigation failed", e)),
            Err(_) => Err(PlatescoutError::Browser(format!(
                "Navigation to {} timed out after {}s",
                url, self.config.timeout_secs
            ))),
        }
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<bool> {
        let started = Instant::now();
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(true);
            }
            if self.handler.is_finished() {
                return Err(PlatescoutError::Session(format!(
                    "Browser exited while waiting for {}",
                    selector
                )));
            }
            if started.elapsed() >= timeout {
                debug!(selector, ?timeout, "Timed out waiting for element");
                return Ok(false);
            }
            tokio::time::sleep(self.config.poll_interval()).await;
        }
    }

    async fn type_into(&self, selector: &str, text: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| self.fail(&format!("No input for {}", selector), e))?;

        element
            .click()
            .await
            .map_err(|e| self.fail("Failed to focus input", e))?;
        element
            .call_js_fn("function() { this.value = ''; }", false)
            .await
            .map_err(|e| self.fail("Failed to clear input", e))?;
        element
            .type_str(text)
            .await
            .map_err(|e| self.fail("Failed to type into input", e))?;

        Ok(())
    }

    async fn press_key(&self, key: &str) -> Result<()> {
        let element = match self.page.find_element("*:focus").await {
            Ok(element) => element,
            Err(_) => self
                .page
                .find_element("body")
                .await
                .map_err(|e| self.fail("No element to receive key press", e))?,
        };

        element
            .press_key(key)
            .await
            .map_err(|e| self.fail(&format!("Failed to press {}", key), e))?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| self.fail(&format!("Nothing to click for {}", selector), e))?;

        element
            .click()
            .await
            .map_err(|e| self.fail("Click failed", e))?;

        // Clicks on result tiles trigger client-side navigation
        let _ = tokio::time::timeout(self.config.timeout(), self.page.wait_for_navigation()).await;
        Ok(())
    }

    async fn current_url(&self) -> Result<Option<String>> {
        self.page
            .url()
            .await
            .map_err(|e| self.fail("Failed to read page URL", e))
    }

    async fn content(&self) -> Result<String> {
        self.page
            .content()
            .await
            .map_err(|e| self.fail("Failed to read page content", e))
    }

    async fn is_alive(&self) -> bool {
        if self.handler.is_finished() {
            return false;
        }
        self.browser.lock().await.version().await.is_ok()
    }
}

/// Run `f` with a freshly launched browser session and always close it
/// afterwards, whether `f` succeeded or not.
pub async fn with_chrome_session<T, F, Fut>(config: ScraperConfig, f: F) -> Result<T>
where
    F: FnOnce(Arc<ChromeSession>) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let session = Arc::new(ChromeSession::launch(config).await?);
    let result = f(session.clone()).await;

    match Arc::try_unwrap(session) {
        Ok(session) => {
            if let Err(e) = session.close().await {
                warn!("Failed to close browser session cleanly: {}", e);
            }
        }
        Err(_) => {
            // A clone escaped the scope; the browser process is killed when the last handle drops
            warn!("Browser session still referenced after batch; deferring shutdown");
        }
    }

    result
}
