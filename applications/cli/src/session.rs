use async_trait::async_trait;
use encore_playback::{MediaSession, NowPlaying, NowPlayingArtwork, Result};
use tracing::info;

/// Media session that writes now-playing updates to the log
#[derive(Debug, Default)]
pub struct LogSession {
    published: u64,
}

impl LogSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of updates published so far
    pub fn published(&self) -> u64 {
        self.published
    }
}

#[async_trait]
impl MediaSession for LogSession {
    async fn publish(&mut self, now_playing: &NowPlaying) -> Result<()> {
        self.published += 1;

        let artwork = match &now_playing.artwork {
            NowPlayingArtwork::Image(image) => format!("{} ({} bytes)", image.mime_type, image.data.len()),
            NowPlayingArtwork::Placeholder => "placeholder".to_string(),
        };

        info!(
            title = %now_playing.title,
            artist = %now_playing.artist,
            status = ?now_playing.status,
            duration_ms = now_playing.duration_ms,
            explicit = now_playing.explicit,
            artwork = %artwork,
            "Now playing"
        );
        Ok(())
    }

    async fn clear(&mut self) -> Result<()> {
        info!("Now playing cleared");
        Ok(())
    }
}
