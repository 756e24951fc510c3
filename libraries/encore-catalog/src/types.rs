//! Catalog API types.
//!
//! `*Dto` structs mirror the JSON documents; the remaining types are what the
//! client hands out.

use encore_core::{ArtistRef, Artwork, Track, TrackId};
use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

use crate::error::{CatalogError, Result};

// =============================================================================
// Wire format
// =============================================================================

/// Error document, sent with HTTP 200
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorDto {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: i64,
}

/// Catalog code for "no data"
pub(crate) const API_NO_DATA: i64 = 800;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PageDto<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ArtistDto {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub picture_small: Option<String>,
    #[serde(default)]
    pub picture_medium: Option<String>,
    #[serde(default)]
    pub picture_big: Option<String>,
    #[serde(default)]
    pub picture_xl: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TrackAlbumDto {
    #[serde(default)]
    pub cover_small: Option<String>,
    #[serde(default)]
    pub cover_medium: Option<String>,
    #[serde(default)]
    pub cover_big: Option<String>,
    #[serde(default)]
    pub cover_xl: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TrackDto {
    pub id: u64,
    pub title: String,
    /// Seconds
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub explicit_lyrics: bool,
    #[serde(default)]
    pub preview: Option<String>,
    #[serde(default)]
    pub artist: Option<ArtistDto>,
    #[serde(default)]
    pub contributors: Vec<ArtistDto>,
    #[serde(default)]
    pub album: Option<TrackAlbumDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UserDto {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PlaylistDto {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub nb_tracks: Option<u32>,
    #[serde(default)]
    pub picture_small: Option<String>,
    #[serde(default)]
    pub picture_medium: Option<String>,
    #[serde(default)]
    pub picture_big: Option<String>,
    #[serde(default)]
    pub picture_xl: Option<String>,
    // Detail documents name the owner `creator`, chart entries `user`
    #[serde(default, alias = "user")]
    pub creator: Option<UserDto>,
    #[serde(default)]
    pub tracks: Option<PageDto<TrackDto>>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AlbumDto {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub cover_small: Option<String>,
    #[serde(default)]
    pub cover_medium: Option<String>,
    #[serde(default)]
    pub cover_big: Option<String>,
    #[serde(default)]
    pub cover_xl: Option<String>,
    #[serde(default)]
    pub artist: Option<ArtistDto>,
    #[serde(default)]
    pub tracks: Option<PageDto<TrackDto>>,
}

fn artwork_of(
    small: Option<String>,
    medium: Option<String>,
    big: Option<String>,
    xl: Option<String>,
) -> Artwork {
    Artwork {
        small,
        medium,
        big,
        xl,
    }
}

impl ArtistDto {
    fn into_ref(self) -> ArtistRef {
        ArtistRef::new(self.id, self.name)
    }
}

impl TrackDto {
    /// Convert to a domain track
    ///
    /// `album_artwork` is used when the document carries no album of its
    /// own, as in the track list of an album.
    pub(crate) fn into_track(self, album_artwork: Option<&Artwork>) -> Result<Track> {
        let artwork = match self.album {
            Some(album) => artwork_of(
                album.cover_small,
                album.cover_medium,
                album.cover_big,
                album.cover_xl,
            ),
            None => album_artwork.cloned().unwrap_or_default(),
        };

        let mut builder = Track::builder(TrackId::new(self.id), self.title)
            .explicit(self.explicit_lyrics)
            .artwork(artwork)
            .artists(
                self.artist
                    .into_iter()
                    .chain(self.contributors)
                    .map(ArtistDto::into_ref),
            );

        if let Some(seconds) = self.duration.filter(|s| *s > 0) {
            builder = builder.duration_ms(seconds * 1000);
        }
        if let Some(preview) = self.preview.filter(|p| !p.is_empty()) {
            builder = builder.preview(preview);
        }

        Ok(builder.build()?)
    }
}

/// Convert a list of track documents, dropping the ones that do not describe a valid track
pub(crate) fn convert_tracks(
    tracks: Vec<TrackDto>,
    album_artwork: Option<&Artwork>,
) -> Vec<Track> {
    tracks
        .into_iter()
        .filter_map(|dto| {
            let id = dto.id;
            match dto.into_track(album_artwork) {
                Ok(track) => Some(track),
                Err(e) => {
                    warn!(track = id, error = %e, "Skipping invalid track");
                    None
                }
            }
        })
        .collect()
}

// =============================================================================
// Client types
// =============================================================================

/// Position of the next page of a paged listing
///
/// Built from the `next` link of a page; only the path below the API root
/// and the query are kept, so following it always targets the configured
/// catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
}

impl PageCursor {
    pub(crate) fn from_next(next: &str, base: &Url) -> Result<Self> {
        let url = Url::parse(next)
            .map_err(|e| CatalogError::Parse(format!("Invalid next link {next:?}: {e}")))?;

        let path = url
            .path()
            .strip_prefix(base.path())
            .unwrap_or_else(|| url.path().trim_start_matches('/'))
            .to_string();
        let query = url.query_pairs().into_owned().collect();

        Ok(Self { path, query })
    }

    /// Offset of the first item of the page this cursor points at
    pub fn index(&self) -> Option<u32> {
        self.query
            .iter()
            .find(|(key, _)| key == "index")
            .and_then(|(_, value)| value.parse().ok())
    }
}

/// One page of a paged listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,

    /// Total number of items across all pages, when reported
    pub total: Option<u64>,

    /// Cursor of the following page; `None` on the last page
    pub next: Option<PageCursor>,
}

impl<T> Page<T> {
    pub fn has_more(&self) -> bool {
        self.next.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistSummary {
    pub artist: ArtistRef,
    pub picture: Artwork,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistSummary {
    pub id: u64,
    pub title: String,
    pub track_count: Option<u32>,
    pub creator: Option<String>,
    pub picture: Artwork,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlbumSummary {
    pub id: u64,
    pub title: String,
    pub artist: Option<ArtistRef>,
    pub cover: Artwork,
}

/// Playlist with its tracks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Playlist {
    pub summary: PlaylistSummary,
    pub description: Option<String>,
    pub tracks: Vec<Track>,
}

/// Album with its tracks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Album {
    pub summary: AlbumSummary,
    pub tracks: Vec<Track>,
}

impl From<ArtistDto> for ArtistSummary {
    fn from(dto: ArtistDto) -> Self {
        Self {
            picture: artwork_of(
                dto.picture_small.clone(),
                dto.picture_medium.clone(),
                dto.picture_big.clone(),
                dto.picture_xl.clone(),
            ),
            artist: dto.into_ref(),
        }
    }
}

impl PlaylistDto {
    pub(crate) fn split(self) -> (PlaylistSummary, Option<String>, Option<PageDto<TrackDto>>) {
        let summary = PlaylistSummary {
            id: self.id,
            title: self.title,
            track_count: self.nb_tracks,
            creator: self.creator.map(|user| user.name),
            picture: artwork_of(
                self.picture_small,
                self.picture_medium,
                self.picture_big,
                self.picture_xl,
            ),
        };
        (summary, self.description, self.tracks)
    }
}

impl From<PlaylistDto> for PlaylistSummary {
    fn from(dto: PlaylistDto) -> Self {
        dto.split().0
    }
}

impl AlbumDto {
    pub(crate) fn split(self) -> (AlbumSummary, Option<PageDto<TrackDto>>) {
        let summary = AlbumSummary {
            id: self.id,
            title: self.title,
            artist: self.artist.map(ArtistDto::into_ref),
            cover: artwork_of(
                self.cover_small,
                self.cover_medium,
                self.cover_big,
                self.cover_xl,
            ),
        };
        (summary, self.tracks)
    }
}

impl From<AlbumDto> for AlbumSummary {
    fn from(dto: AlbumDto) -> Self {
        dto.split().0
    }
}

/// Keep the tracks a platform player can play (those with a preview)
pub fn playable_tracks(tracks: impl IntoIterator<Item = Track>) -> Vec<Track> {
    let mut skipped = 0usize;
    let playable: Vec<Track> = tracks
        .into_iter()
        .filter(|track| {
            let keep = track.has_preview();
            if !keep {
                skipped += 1;
            }
            keep
        })
        .collect();

    if skipped > 0 {
        warn!(skipped, "Tracks without preview left out of the queue");
    }
    playable
}
