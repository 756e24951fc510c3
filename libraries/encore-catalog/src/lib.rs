//! Encore - Catalog Client
//!
//! Read-only HTTP+JSON client for the remote music catalog: charts, playlist
//! and album details, tracks, artist top tracks and paged keyword search.
//!
//! Catalog documents are converted into `encore_core::Track`s ready for the
//! playback queue. Tracks without a playable preview can be filtered out with
//! [`playable_tracks`].
//!
//! # Example
//!
//! ```ignore
//! use encore_catalog::{playable_tracks, CatalogClient, CatalogConfig};
//!
//! let client = CatalogClient::new(&CatalogConfig::default())?;
//! let album = client.album(302127).await?;
//! let queue = playable_tracks(album.tracks);
//! ```

mod artwork;
mod client;
mod config;
mod error;
mod types;

pub use artwork::HttpArtworkLoader;
pub use client::CatalogClient;
pub use config::CatalogConfig;
pub use error::{CatalogError, Result};
pub use types::{
    playable_tracks, Album, AlbumSummary, ArtistSummary, Page, PageCursor, Playlist,
    PlaylistSummary,
};
