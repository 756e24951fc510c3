/// Track domain type
use serde::Serialize;
use std::time::Duration;

use super::{artist::ArtistRef, artwork::Artwork, ids::TrackId};
use crate::error::{CoreError, Result};

/// Playable catalog track
///
/// Immutable once built. Artists are ordered and unique by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Track {
    id: TrackId,
    title: String,
    duration_ms: Option<u64>,
    explicit: bool,
    artists: Vec<ArtistRef>,
    artwork: Artwork,
    preview: String,
}

impl Track {
    /// Start building a track
    pub fn builder(id: TrackId, title: impl Into<String>) -> TrackBuilder {
        TrackBuilder {
            id,
            title: title.into(),
            duration_ms: None,
            explicit: false,
            artists: Vec::new(),
            artwork: Artwork::default(),
            preview: String::new(),
        }
    }

    pub fn id(&self) -> TrackId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Track duration in milliseconds, if known
    pub fn duration_ms(&self) -> Option<u64> {
        self.duration_ms
    }

    /// Get the track duration as a Duration
    pub fn duration(&self) -> Option<Duration> {
        self.duration_ms.map(Duration::from_millis)
    }

    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    /// Credited artists, main artist first
    pub fn artists(&self) -> &[ArtistRef] {
        &self.artists
    }

    pub fn artwork(&self) -> &Artwork {
        &self.artwork
    }

    /// Preview locator (URI of the playable, usually truncated, audio)
    ///
    /// Empty when the catalog has no preview for this track.
    pub fn preview(&self) -> &str {
        &self.preview
    }

    pub fn has_preview(&self) -> bool {
        !self.preview.is_empty()
    }

    /// Artist names joined with `separator`
    pub fn artist_names(&self, separator: &str) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

/// Builder for [`Track`]
#[derive(Debug, Clone)]
pub struct TrackBuilder {
    id: TrackId,
    title: String,
    duration_ms: Option<u64>,
    explicit: bool,
    artists: Vec<ArtistRef>,
    artwork: Artwork,
    preview: String,
}

impl TrackBuilder {
    pub fn duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn explicit(mut self, explicit: bool) -> Self {
        self.explicit = explicit;
        self
    }

    /// Credit an artist; repeated ids are dropped, first occurrence wins
    pub fn artist(mut self, artist: ArtistRef) -> Self {
        if !self.artists.iter().any(|a| a.id == artist.id) {
            self.artists.push(artist);
        }
        self
    }

    pub fn artists(self, artists: impl IntoIterator<Item = ArtistRef>) -> Self {
        artists.into_iter().fold(self, TrackBuilder::artist)
    }

    pub fn artwork(mut self, artwork: Artwork) -> Self {
        self.artwork = artwork;
        self
    }

    pub fn preview(mut self, uri: impl Into<String>) -> Self {
        self.preview = uri.into();
        self
    }

    /// Validate and build the track
    pub fn build(self) -> Result<Track> {
        if self.title.trim().is_empty() {
            return Err(CoreError::EmptyTitle(self.id));
        }

        if self.artists.is_empty() {
            return Err(CoreError::MissingArtist(self.id));
        }

        Ok(Track {
            id: self.id,
            title: self.title,
            duration_ms: self.duration_ms,
            explicit: self.explicit,
            artists: self.artists,
            artwork: self.artwork,
            preview: self.preview,
        })
    }
}
