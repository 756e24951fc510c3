//! Catalog API client.

use encore_core::{ArtistId, Track, TrackId};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::types::{
    convert_tracks, Album, AlbumDto, AlbumSummary, ApiErrorDto, ArtistDto, ArtistSummary, Page,
    PageCursor, PageDto, Playlist, PlaylistDto, PlaylistSummary, TrackDto, API_NO_DATA,
};

/// Read-only client for the remote music catalog.
///
/// Fetches charts, playlists, albums, tracks and search results and turns
/// them into domain [`Track`]s. Catalog failures are returned to the caller
/// and never touch playback.
///
/// # Example
///
/// ```ignore
/// use encore_catalog::{CatalogClient, CatalogConfig};
///
/// let client = CatalogClient::new(&CatalogConfig::default())?;
///
/// let mut page = client.search("daft punk").await?;
/// while let Some(cursor) = page.next.take() {
///     page = client.next_page(&cursor).await?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Client,
    base_url: Url,
    page_size: u32,
}

impl CatalogClient {
    /// Create a new client with the given configuration.
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let base_url = parse_base_url(&config.base_url)?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(format!("Encore/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            page_size: config.page_size.max(1),
        })
    }

    /// API root, always ending in `/`
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// HTTP client shared with the artwork loader
    pub fn http(&self) -> &Client {
        &self.http
    }

    // ===== Charts =====

    /// Most played tracks
    pub async fn chart_tracks(&self, limit: Option<u32>) -> Result<Vec<Track>> {
        let limit = limit.unwrap_or(self.page_size);
        let page: PageDto<TrackDto> = self
            .get_json("chart/0/tracks", &[("limit", limit.to_string())])
            .await?;

        let tracks = convert_tracks(page.data, None);
        debug!(tracks = tracks.len(), "Fetched chart tracks");
        Ok(tracks)
    }

    pub async fn chart_playlists(&self) -> Result<Vec<PlaylistSummary>> {
        let page: PageDto<PlaylistDto> = self.get_json("chart/0/playlists", &[]).await?;
        Ok(page.data.into_iter().map(PlaylistSummary::from).collect())
    }

    pub async fn chart_artists(&self) -> Result<Vec<ArtistSummary>> {
        let page: PageDto<ArtistDto> = self.get_json("chart/0/artists", &[]).await?;
        Ok(page.data.into_iter().map(ArtistSummary::from).collect())
    }

    pub async fn chart_albums(&self) -> Result<Vec<AlbumSummary>> {
        let page: PageDto<AlbumDto> = self.get_json("chart/0/albums", &[]).await?;
        Ok(page.data.into_iter().map(AlbumSummary::from).collect())
    }

    // ===== Details =====

    /// Playlist with its tracks
    pub async fn playlist(&self, id: u64) -> Result<Playlist> {
        let dto: PlaylistDto = self.get_json(&format!("playlist/{id}"), &[]).await?;
        let (summary, description, tracks) = dto.split();

        let tracks = convert_tracks(tracks.map(|page| page.data).unwrap_or_default(), None);
        debug!(playlist = id, tracks = tracks.len(), "Fetched playlist");

        Ok(Playlist {
            summary,
            description: description.filter(|d| !d.is_empty()),
            tracks,
        })
    }

    /// Album with its tracks; tracks inherit the album cover
    pub async fn album(&self, id: u64) -> Result<Album> {
        let dto: AlbumDto = self.get_json(&format!("album/{id}"), &[]).await?;
        let (summary, tracks) = dto.split();

        let tracks = convert_tracks(
            tracks.map(|page| page.data).unwrap_or_default(),
            Some(&summary.cover),
        );
        debug!(album = id, tracks = tracks.len(), "Fetched album");

        Ok(Album { summary, tracks })
    }

    pub async fn track(&self, id: TrackId) -> Result<Track> {
        let dto: TrackDto = self.get_json(&format!("track/{id}"), &[]).await?;
        dto.into_track(None)
    }

    /// Top tracks of an artist
    pub async fn artist_top(&self, id: ArtistId, limit: Option<u32>) -> Result<Vec<Track>> {
        let limit = limit.unwrap_or(self.page_size);
        let page: PageDto<TrackDto> = self
            .get_json(
                &format!("artist/{id}/top"),
                &[("limit", limit.to_string())],
            )
            .await?;
        Ok(convert_tracks(page.data, None))
    }

    // ===== Search =====

    /// First page of a keyword track search
    pub async fn search(&self, query: &str) -> Result<Page<Track>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Page {
                items: Vec::new(),
                total: Some(0),
                next: None,
            });
        }

        let page: PageDto<TrackDto> = self
            .get_json(
                "search",
                &[
                    ("q", query.to_string()),
                    ("index", "0".to_string()),
                    ("limit", self.page_size.to_string()),
                ],
            )
            .await?;

        let page = self.track_page(page)?;
        info!(query, total = ?page.total, "Search");
        Ok(page)
    }

    /// Page a cursor from a previous page points at
    pub async fn next_page(&self, cursor: &PageCursor) -> Result<Page<Track>> {
        let query: Vec<(&str, String)> = cursor
            .query
            .iter()
            .map(|(key, value)| (key.as_str(), value.clone()))
            .collect();

        let page: PageDto<TrackDto> = self.get_json(&cursor.path, &query).await?;
        self.track_page(page)
    }

    fn track_page(&self, page: PageDto<TrackDto>) -> Result<Page<Track>> {
        let next = page
            .next
            .as_deref()
            .map(|next| PageCursor::from_next(next, &self.base_url))
            .transpose()?;

        Ok(Page {
            items: convert_tracks(page.data, None),
            total: page.total,
            next,
        })
    }

    // ===== Transport =====

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| CatalogError::InvalidUrl(format!("{path}: {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        debug!(url = %url, "Catalog request");

        let response = self.http.get(url.clone()).send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                CatalogError::Unreachable(e.to_string())
            } else {
                CatalogError::Request(e)
            }
        })?;

        let status = response.status();

        if status.as_u16() == 404 {
            return Err(CatalogError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::Http {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            CatalogError::Parse(format!("Failed to parse response from {path}: {e}"))
        })?;

        if let Some(error) = body.get("error") {
            let error: ApiErrorDto = serde_json::from_value(error.clone())
                .map_err(|e| CatalogError::Parse(format!("Malformed error document: {e}")))?;

            return Err(if error.code == API_NO_DATA {
                CatalogError::NotFound(path.to_string())
            } else {
                CatalogError::Api {
                    kind: error.kind,
                    message: error.message,
                    code: error.code,
                }
            });
        }

        serde_json::from_value(body)
            .map_err(|e| CatalogError::Parse(format!("Unexpected response from {path}: {e}")))
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    if raw.trim().is_empty() {
        return Err(CatalogError::InvalidUrl("URL cannot be empty".into()));
    }

    let mut url = Url::parse(raw.trim()).map_err(|e| CatalogError::InvalidUrl(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(CatalogError::InvalidUrl(
            "URL must start with http:// or https://".into(),
        ));
    }

    // Relative joins need a trailing slash on the root
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
