use super::Player;
use crate::track_info::TrackInfo;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const API_BASE_URL: &str = "https://api.spotify.com/v1";

#[derive(Debug, Deserialize)]
pub struct CurrentlyPlaying {
    pub is_playing: bool,
    pub item: Option<FullTrack>,
}

#[derive(Debug, Deserialize)]
pub struct FullTrack {
    pub id: Option<String>, // null for local files
    pub name: String,
    pub album: Album,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub external_ids: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct Album {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Artist {
    pub name: String,
}

pub struct SpotifyPlayer {
    client: reqwest::Client,
    access_token: String,
}

impl SpotifyPlayer {
    pub fn new(access_token: String) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("git-now-playing/0.1.0")
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap();

        Self {
            client,
            access_token,
        }
    }

    async fn currently_playing(&self) -> Result<Option<CurrentlyPlaying>> {
        let response = self
            .client
            .get(format!("{API_BASE_URL}/me/player/currently-playing"))
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        // 204 means no active playback session at all
        if response.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(anyhow!("bad spotify response: {status} - {body}"));
        }

        Ok(Some(response.json().await?))
    }
}

#[async_trait]
impl Player for SpotifyPlayer {
    fn name(&self) -> &str {
        "spotify"
    }

    async fn get_track_info(&self) -> Result<Vec<TrackInfo>> {
        let playing = self.currently_playing().await?;
        Ok(playing.and_then(track_info_from_playing).into_iter().collect())
    }
}

fn track_info_from_playing(playing: CurrentlyPlaying) -> Option<TrackInfo> {
    if !playing.is_playing {
        return None;
    }
    // item is null for ads and podcast episodes
    let track = playing.item?;
    Some(TrackInfo {
        name: track.name,
        artists: track.artists.into_iter().map(|a| a.name).collect(),
        album: Some(track.album.name),
        spotify_id: track.id,
        isrc: track.external_ids.get("isrc").cloned(),
    })
}
