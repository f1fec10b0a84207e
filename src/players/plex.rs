use super::Player;
use crate::track_info::TrackInfo;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use urlencoding::encode;

/// Plex's /status/sessions endpoint lists every active playback session on
/// the server, music or otherwise.
#[derive(Debug, Default, Deserialize)]
pub struct MediaContainer {
    #[serde(rename = "Track", default)]
    pub tracks: Vec<PlexSession>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlexSession {
    #[serde(rename = "@title", default)]
    pub title: String,
    #[serde(rename = "@grandparentTitle", default)]
    pub grandparent_title: String,
    #[serde(rename = "@parentTitle", default)]
    pub parent_title: String,
    // Set when the track artist differs from the album artist
    #[serde(rename = "@originalTitle", default)]
    pub original_title: String,
    #[serde(rename = "@type", default)]
    pub session_type: String,
    #[serde(rename = "Player", default)]
    pub player: SessionPlayer,
    #[serde(rename = "User", default)]
    pub user: SessionUser,
}

#[derive(Debug, Default, Deserialize)]
pub struct SessionPlayer {
    #[serde(rename = "@state", default)]
    pub state: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SessionUser {
    #[serde(rename = "@title", default)]
    pub name: String,
}

pub struct PlexPlayer {
    client: reqwest::Client,
    server: String,
    token: String,
    users: Vec<String>,
}

impl PlexPlayer {
    pub fn new(server: String, token: String, users: Vec<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("git-now-playing/0.1.0")
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap();

        Self {
            client,
            server,
            token,
            users,
        }
    }

    fn sessions_url(&self) -> String {
        format!(
            "{}/status/sessions?X-Plex-Token={}",
            self.server.trim_end_matches('/'),
            encode(&self.token)
        )
    }

    async fn now_playing(&self) -> Result<MediaContainer> {
        let response = self
            .client
            .get(self.sessions_url())
            .send()
            .await
            .map_err(|e| anyhow!("error getting plex streaming status: {e}"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| anyhow!("error reading plex response: {e}"))?;

        if !status.is_success() {
            return Err(anyhow!("bad plex response:\nStatus: {status}\nBody: {body}"));
        }

        quick_xml::de::from_str(&body)
            .map_err(|e| anyhow!("error parsing plex response: {e}\n\nresponse: {body}"))
    }
}

#[async_trait]
impl Player for PlexPlayer {
    fn name(&self) -> &str {
        "plex"
    }

    async fn get_track_info(&self) -> Result<Vec<TrackInfo>> {
        let container = self.now_playing().await?;
        Ok(track_info_from_sessions(container, &self.users))
    }
}

fn track_info_from_sessions(container: MediaContainer, users: &[String]) -> Vec<TrackInfo> {
    let mut results = Vec::new();
    for session in container.tracks {
        if session.session_type != "track" {
            continue;
        }
        if session.player.state != "playing" {
            continue;
        }
        if !users.is_empty() && !users.contains(&session.user.name) {
            log::info!(
                "User {:?} doesn't match any of configured users {:?}, ignoring",
                session.user.name,
                users
            );
            continue;
        }
        let artist = if session.original_title.is_empty() {
            session.grandparent_title
        } else {
            session.original_title
        };
        results.push(TrackInfo {
            name: session.title,
            artists: vec![artist],
            album: Some(session.parent_title),
            ..Default::default()
        });
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> MediaContainer {
        quick_xml::de::from_str(xml).unwrap()
    }

    fn session_xml(state: &str, user: &str) -> String {
        format!(
            r#"<MediaContainer size="1">
                 <Track title="Aerials" grandparentTitle="System of a Down"
                        parentTitle="Toxicity" type="track">
                   <Media container="flac"/>
                   <User id="1" title="{user}"/>
                   <Player state="{state}"/>
                 </Track>
               </MediaContainer>"#
        )
    }

    #[test]
    fn test_parse_sessions_response() {
        let container = parse(&session_xml("playing", "alice"));
        assert_eq!(container.tracks.len(), 1);
        let session = &container.tracks[0];
        assert_eq!(session.title, "Aerials");
        assert_eq!(session.grandparent_title, "System of a Down");
        assert_eq!(session.parent_title, "Toxicity");
        assert_eq!(session.session_type, "track");
        assert_eq!(session.player.state, "playing");
        assert_eq!(session.user.name, "alice");
    }

    #[test]
    fn test_empty_container() {
        let container = parse(r#"<MediaContainer size="0"></MediaContainer>"#);
        assert!(track_info_from_sessions(container, &[]).is_empty());
    }

    #[test]
    fn test_playing_track_maps_to_track_info() {
        let container = parse(&session_xml("playing", "alice"));
        let tracks = track_info_from_sessions(container, &[]);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].name, "Aerials");
        assert_eq!(tracks[0].artists, vec!["System of a Down"]);
        assert_eq!(tracks[0].album, Some("Toxicity".to_string()));
        assert_eq!(tracks[0].spotify_id, None);
    }

    #[test]
    fn test_user_allow_list_match() {
        let container = parse(&session_xml("playing", "alice"));
        let tracks = track_info_from_sessions(container, &["alice".to_string()]);
        assert_eq!(tracks.len(), 1);
    }

    #[test]
    fn test_user_allow_list_mismatch() {
        let container = parse(&session_xml("playing", "alice"));
        let tracks = track_info_from_sessions(container, &["bob".to_string()]);
        assert!(tracks.is_empty());
    }

    #[test]
    fn test_paused_session_skipped() {
        let container = parse(&session_xml("paused", "alice"));
        assert!(track_info_from_sessions(container, &[]).is_empty());
    }

    #[test]
    fn test_non_track_session_skipped() {
        let xml = r#"<MediaContainer size="1">
                       <Track title="Some Movie" type="movie">
                         <User title="alice"/>
                         <Player state="playing"/>
                       </Track>
                     </MediaContainer>"#;
        assert!(track_info_from_sessions(parse(xml), &[]).is_empty());
    }

    #[test]
    fn test_original_title_overrides_artist() {
        let xml = r#"<MediaContainer size="1">
                       <Track title="Numb / Encore" grandparentTitle="Various Artists"
                              parentTitle="Collision Course" originalTitle="Jay-Z/Linkin Park"
                              type="track">
                         <User title="alice"/>
                         <Player state="playing"/>
                       </Track>
                     </MediaContainer>"#;
        let tracks = track_info_from_sessions(parse(xml), &[]);
        assert_eq!(tracks[0].artists, vec!["Jay-Z/Linkin Park"]);
    }

    #[test]
    fn test_multiple_sessions_all_returned() {
        let xml = r#"<MediaContainer size="3">
                       <Track title="One" grandparentTitle="Metallica"
                              parentTitle="...And Justice for All" type="track">
                         <User title="alice"/>
                         <Player state="playing"/>
                       </Track>
                       <Track title="Two" grandparentTitle="Someone"
                              parentTitle="Somewhere" type="track">
                         <User title="bob"/>
                         <Player state="paused"/>
                       </Track>
                       <Track title="Three" grandparentTitle="Else"
                              parentTitle="Elsewhere" type="track">
                         <User title="carol"/>
                         <Player state="playing"/>
                       </Track>
                     </MediaContainer>"#;
        let tracks = track_info_from_sessions(parse(xml), &[]);
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].name, "One");
        assert_eq!(tracks[1].name, "Three");
    }

    #[test]
    fn test_sessions_url_trims_trailing_slash_and_encodes_token() {
        let player = PlexPlayer::new(
            "http://plex.local:32400/".to_string(),
            "a b".to_string(),
            vec![],
        );
        assert_eq!(
            player.sessions_url(),
            "http://plex.local:32400/status/sessions?X-Plex-Token=a%20b"
        );
    }
}
