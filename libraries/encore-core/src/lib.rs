//! Encore Core
//!
//! Platform-agnostic domain types and error handling for Encore.
//!
//! This crate provides the building blocks shared by the playback engine and
//! the catalog client.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `ArtistRef`, `Artwork`
//! - **Identifiers**: `TrackId`, `ArtistId`
//! - **Error Handling**: Unified `CoreError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use encore_core::types::{ArtistRef, Artwork, Track, TrackId};
//!
//! let track = Track::builder(TrackId::new(3135556), "Harder, Better, Faster, Stronger")
//!     .artist(ArtistRef::new(27, "Daft Punk"))
//!     .duration_ms(224_000)
//!     .preview("https://cdn.example.com/preview/3135556.mp3")
//!     .artwork(Artwork::default().with_medium("https://cdn.example.com/cover/250.jpg"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(track.artist_names(", "), "Daft Punk");
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use types::{ArtistId, ArtistRef, Artwork, ArtworkSize, Track, TrackBuilder, TrackId};
