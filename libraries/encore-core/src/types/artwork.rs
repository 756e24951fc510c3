//! Artwork references at several resolutions

use serde::{Deserialize, Serialize};

/// Artwork resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtworkSize {
    /// ~56px thumbnail
    Small,
    /// ~250px
    Medium,
    /// ~500px
    Big,
    /// ~1000px
    Xl,
}

/// Artwork URIs for a track, any of which may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artwork {
    pub small: Option<String>,
    pub medium: Option<String>,
    pub big: Option<String>,
    pub xl: Option<String>,
}

impl Artwork {
    pub fn with_small(mut self, uri: impl Into<String>) -> Self {
        self.small = Some(uri.into());
        self
    }

    pub fn with_medium(mut self, uri: impl Into<String>) -> Self {
        self.medium = Some(uri.into());
        self
    }

    pub fn with_big(mut self, uri: impl Into<String>) -> Self {
        self.big = Some(uri.into());
        self
    }

    pub fn with_xl(mut self, uri: impl Into<String>) -> Self {
        self.xl = Some(uri.into());
        self
    }

    /// URI for an exact size
    pub fn get(&self, size: ArtworkSize) -> Option<&str> {
        match size {
            ArtworkSize::Small => self.small.as_deref(),
            ArtworkSize::Medium => self.medium.as_deref(),
            ArtworkSize::Big => self.big.as_deref(),
            ArtworkSize::Xl => self.xl.as_deref(),
        }
    }

    /// Closest available URI, preferring `size` and then larger images
    ///
    /// Falls back to smaller images when nothing at or above `size` exists.
    pub fn best(&self, size: ArtworkSize) -> Option<&str> {
        const ORDER: [ArtworkSize; 4] = [
            ArtworkSize::Small,
            ArtworkSize::Medium,
            ArtworkSize::Big,
            ArtworkSize::Xl,
        ];

        let start = ORDER.iter().position(|s| *s == size).unwrap_or(0);

        ORDER[start..]
            .iter()
            .chain(ORDER[..start].iter().rev())
            .find_map(|s| self.get(*s))
    }

    pub fn is_empty(&self) -> bool {
        self.small.is_none() && self.medium.is_none() && self.big.is_none() && self.xl.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_prefers_requested_then_larger() {
        let artwork = Artwork::default()
            .with_small("s.jpg")
            .with_xl("xl.jpg");

        assert_eq!(artwork.best(ArtworkSize::Small), Some("s.jpg"));
        assert_eq!(artwork.best(ArtworkSize::Medium), Some("xl.jpg"));
    }

    #[test]
    fn best_falls_back_to_smaller() {
        let artwork = Artwork::default().with_small("s.jpg").with_medium("m.jpg");
        assert_eq!(artwork.best(ArtworkSize::Xl), Some("m.jpg"));
    }

    #[test]
    fn empty_artwork() {
        let artwork = Artwork::default();
        assert!(artwork.is_empty());
        assert_eq!(artwork.best(ArtworkSize::Big), None);
    }
}
