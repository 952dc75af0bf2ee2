use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the browsing session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Whether to run the browser in headless mode (default: true)
    pub headless: bool,

    /// Page navigation timeout in seconds (default: 30)
    pub timeout_secs: u64,

    /// How long to wait for a marker element before giving up, in seconds (default: 10)
    pub wait_timeout_secs: u64,

    /// Interval between element presence checks in milliseconds (default: 250)
    pub poll_interval_ms: u64,

    /// Pause after submitting a search for results to render, in milliseconds (default: 2000)
    pub settle_ms: u64,

    /// Pause after loading a page that renders without a reliable marker,
    /// in milliseconds (default: 5000)
    pub render_wait_ms: u64,

    /// Extra command-line arguments passed to Chrome
    pub browser_args: Vec<String>,

    /// User agent string to use
    pub user_agent: Option<String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            headless: true,
            timeout_secs: 30,
            wait_timeout_secs: 10,
            poll_interval_ms: 250,
            settle_ms: 2000,
            render_wait_ms: 5000,
            browser_args: vec![
                "--no-sandbox".to_string(),
                "--disable-gpu".to_string(),
                "--disable-dev-shm-usage".to_string(),
                "--disable-software-rasterizer".to_string(),
            ],
            user_agent: Some(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
            ),
        }
    }
}

impl ScraperConfig {
    /// Get the navigation timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the element wait timeout as a Duration
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn render_wait(&self) -> Duration {
        Duration::from_millis(self.render_wait_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = ScraperConfig::default();
        assert!(config.headless);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.wait_timeout_secs, 10);
        assert_eq!(config.poll_interval_ms, 250);
        assert!(config.user_agent.is_some());
        assert!(config.browser_args.iter().any(|a| a == "--no-sandbox"));
    }

    #[test]
    fn test_durations() {
        let config = ScraperConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.wait_timeout(), Duration::from_secs(10));
        assert_eq!(config.settle(), Duration::from_millis(2000));
        assert_eq!(config.render_wait(), Duration::from_millis(5000));
    }

    #[test]
    fn test_zero_poll_interval_is_clamped() {
        let config = ScraperConfig {
            poll_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.poll_interval(), Duration::from_millis(1));
    }
}
