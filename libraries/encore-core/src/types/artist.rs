//! Artist types

use serde::{Deserialize, Serialize};

use super::ids::ArtistId;

/// Reference to an artist credited on a track
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: ArtistId,
    pub name: String,
}

impl ArtistRef {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: ArtistId::new(id),
            name: name.into(),
        }
    }
}
