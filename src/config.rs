use dotenvy::dotenv;
use std::env;

pub const DEFAULT_BASE_URL: &str = "https://regions-test.2gis.com/1.0/regions";

#[derive(Clone, Debug)]
pub struct Settings {
    pub base_url: String,
    pub http_timeout_ms: u64,
    /// page_size the service applies when the request omits it
    pub default_page_size: usize,
    /// upper bound for page walks
    pub max_pages: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            http_timeout_ms: 15_000,
            default_page_size: 15,
            max_pages: 3,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let _ = dotenv();
        let defaults = Self::default();

        let base_url = env::var("REGIONS_BASE_URL").unwrap_or(defaults.base_url);
        let http_timeout_ms = env::var("REGIONS_HTTP_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.http_timeout_ms);
        let default_page_size = env::var("REGIONS_DEFAULT_PAGE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.default_page_size);
        let max_pages = env::var("REGIONS_MAX_PAGES").ok().and_then(|v| v.parse().ok()).unwrap_or(defaults.max_pages);

        Self {
            base_url,
            http_timeout_ms,
            default_page_size,
            max_pages,
        }
    }

    /// Same settings aimed at another endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}
