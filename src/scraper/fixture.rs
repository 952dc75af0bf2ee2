//! In-memory browsing session serving canned HTML, for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::app::{PlatescoutError, Result};
use crate::scraper::{BrowserSession, Markup};

#[derive(Default)]
pub struct StaticSession {
    pages: HashMap<String, String>,
    /// Typed query → URL loaded when Enter is pressed.
    searches: HashMap<String, String>,
    /// Selector → URL loaded when it is clicked.
    clicks: HashMap<String, String>,
    current: Mutex<Option<String>>,
    typed: Mutex<Option<String>>,
    visited: Mutex<Vec<String>>,
    alive: AtomicBool,
}

impl StaticSession {
    pub fn new() -> Self {
        Self {
            alive: AtomicBool::new(true),
            ..Default::default()
        }
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn with_search(mut self, query: &str, results_url: &str) -> Self {
        self.searches
            .insert(query.to_string(), results_url.to_string());
        self
    }

    pub fn with_click(mut self, selector: &str, target_url: &str) -> Self {
        self.clicks
            .insert(selector.to_string(), target_url.to_string());
        self
    }

    pub fn kill(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Every URL loaded so far, in order.
    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }

    fn load(&self, url: &str) -> Result<()> {
        if !self.alive.load(Ordering::SeqCst) {
            return Err(PlatescoutError::Session("browser closed".into()));
        }
        if !self.pages.contains_key(url) {
            return Err(PlatescoutError::Browser(format!("net::ERR_NAME_NOT_RESOLVED {}", url)));
        }
        *self.current.lock().unwrap() = Some(url.to_string());
        self.visited.lock().unwrap().push(url.to_string());
        Ok(())
    }

    fn current_html(&self) -> String {
        let current = self.current.lock().unwrap().clone();
        current
            .and_then(|url| self.pages.get(&url).cloned())
            .unwrap_or_default()
    }
}

#[async_trait]
impl BrowserSession for StaticSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.load(url)
    }

    async fn wait_for(&self, selector: &str, _timeout: Duration) -> Result<bool> {
        Ok(Markup::parse(&self.current_html()).exists(selector))
    }

    async fn type_into(&self, selector: &str, text: &str) -> Result<()> {
        if !Markup::parse(&self.current_html()).exists(selector) {
            return Err(PlatescoutError::Browser(format!("No input for {}", selector)));
        }
        *self.typed.lock().unwrap() = Some(text.to_string());
        Ok(())
    }

    async fn press_key(&self, key: &str) -> Result<()> {
        if key != "Enter" {
            return Ok(());
        }
        let typed = self.typed.lock().unwrap().clone().unwrap_or_default();
        match self.searches.get(&typed) {
            Some(url) => self.load(url),
            None => Ok(()),
        }
    }

    async fn click(&self, selector: &str) -> Result<()> {
        match self.clicks.get(selector) {
            Some(url) => self.load(url),
            None => Err(PlatescoutError::Browser(format!("Nothing to click for {}", selector))),
        }
    }

    async fn current_url(&self) -> Result<Option<String>> {
        Ok(self.current.lock().unwrap().clone())
    }

    async fn content(&self) -> Result<String> {
        if !self.alive.load(Ordering::SeqCst) {
            return Err(PlatescoutError::Session("browser closed".into()));
        }
        Ok(self.current_html())
    }

    async fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    async fn pause(&self, _duration: Duration) {}
}
