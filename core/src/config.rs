//! Client configuration resolved from the environment.

use std::time::Duration;

use once_cell::sync::Lazy;

pub const BASE_URL_ENV: &str = "TASKBOARD_API_URL";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Read once per process; later changes to the variable are ignored.
static BASE_URL: Lazy<String> = Lazy::new(|| {
    std::env::var(BASE_URL_ENV)
        .ok()
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(BASE_URL.as_str())
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Absolute endpoints are used verbatim; anything else is joined to the base URL.
    pub fn resolve(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else if endpoint.starts_with('/') {
            format!("{}{endpoint}", self.base_url)
        } else {
            format!("{}/{endpoint}", self.base_url)
        }
    }
}
