use serde::{Deserialize, Serialize};

/// Catalog client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// API root
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Items requested per page for paged endpoints
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Number of artwork images kept in memory (0 disables caching)
    #[serde(default = "default_artwork_cache_size")]
    pub artwork_cache_size: usize,
}

fn default_base_url() -> String {
    "https://api.deezer.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_page_size() -> u32 {
    25
}

fn default_artwork_cache_size() -> usize {
    64
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            page_size: default_page_size(),
            artwork_cache_size: default_artwork_cache_size(),
        }
    }
}

impl CatalogConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}
