//! Now-playing artwork over HTTP
//!
//! Images are fetched with the catalog's HTTP client, checked for an
//! `image/*` content type and a size limit, and kept in an LRU cache keyed by
//! URI.

use async_trait::async_trait;
use encore_core::ArtworkSize;
use encore_playback::{ArtworkData, ArtworkLoader, PlaybackError};
use lru::LruCache;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::num::NonZeroUsize;
use tokio::sync::Mutex;
use tracing::debug;

/// Maximum artwork size (5MB)
const MAX_ARTWORK_SIZE: usize = 5 * 1024 * 1024;

/// Fetches now-playing artwork over HTTP with LRU caching
pub struct HttpArtworkLoader {
    http: Client,
    size: ArtworkSize,
    cache: Mutex<LruCache<String, ArtworkData>>,
}

impl HttpArtworkLoader {
    /// Create a loader keeping up to `cache_size` images (0 keeps only the last one)
    pub fn new(http: Client, cache_size: usize) -> Self {
        let capacity = NonZeroUsize::new(cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            http,
            size: ArtworkSize::Big,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Resolution to ask tracks for
    #[must_use]
    pub fn with_size(mut self, size: ArtworkSize) -> Self {
        self.size = size;
        self
    }

    pub async fn cached(&self) -> usize {
        self.cache.lock().await.len()
    }

    async fn fetch(&self, uri: &str) -> Result<ArtworkData, PlaybackError> {
        let response = self
            .http
            .get(uri)
            .send()
            .await
            .map_err(|e| PlaybackError::artwork(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlaybackError::artwork(format!(
                "{uri} answered {}",
                status.as_u16()
            )));
        }

        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();
        if !mime_type.starts_with("image/") {
            return Err(PlaybackError::artwork(format!(
                "{uri} is not an image ({mime_type})"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PlaybackError::artwork(e.to_string()))?;
        if bytes.len() > MAX_ARTWORK_SIZE {
            return Err(PlaybackError::artwork(format!(
                "{uri} is too large ({} bytes)",
                bytes.len()
            )));
        }

        Ok(ArtworkData {
            data: bytes.as_ref().into(),
            mime_type,
        })
    }
}

#[async_trait]
impl ArtworkLoader for HttpArtworkLoader {
    async fn load(&self, uri: &str) -> encore_playback::Result<ArtworkData> {
        if let Some(cached) = self.cache.lock().await.get(uri) {
            return Ok(cached.clone());
        }

        let artwork = self.fetch(uri).await?;
        debug!(uri, bytes = artwork.data.len(), "Fetched artwork");

        self.cache.lock().await.put(uri.to_string(), artwork.clone());
        Ok(artwork)
    }

    fn preferred_size(&self) -> ArtworkSize {
        self.size
    }
}
