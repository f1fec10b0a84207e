use crate::track_info::TrackInfo;
use anyhow::Result;
use async_trait::async_trait;

pub mod plex;
pub mod spotify;

/// A backend that can report what is currently playing. Implementations own
/// their credentials and only ever return tracks in a playing state.
#[async_trait]
pub trait Player: Send + Sync {
    /// Short label used when logging per-tick errors.
    fn name(&self) -> &str;

    async fn get_track_info(&self) -> Result<Vec<TrackInfo>>;
}
