mod artist;
mod artwork;
mod ids;
mod track;

pub use artist::ArtistRef;
pub use artwork::{Artwork, ArtworkSize};
pub use ids::{ArtistId, TrackId};
pub use track::{Track, TrackBuilder};
