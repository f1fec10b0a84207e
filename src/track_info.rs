use std::fmt;

/// Everything we know about a currently playing track. Fields that a backend
/// can't provide stay empty and are omitted from the rendering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackInfo {
    pub name: String,
    pub artists: Vec<String>,
    pub album: Option<String>,
    pub spotify_id: Option<String>,
    pub isrc: Option<String>,
}

impl fmt::Display for TrackInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = vec![format!("🎵 Now Playing: {}", self.name)];
        if !self.artists.is_empty() {
            lines.push(format!("🎵 Artist: {}", format_artists(&self.artists)));
        }
        if let Some(album) = non_empty(&self.album) {
            lines.push(format!("🎵 Album: {album}"));
        }
        if let Some(id) = non_empty(&self.spotify_id) {
            lines.push(format!("🎵 SpotifyID: {id}"));
        }
        if let Some(isrc) = non_empty(&self.isrc) {
            lines.push(format!("🎵 ISRC: {isrc}"));
        }
        write!(f, "{}", lines.join("\n"))
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Join artist names for display: "A", "A and B", "A, B, and C".
pub fn format_artists(artists: &[String]) -> String {
    match artists {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first} and {second}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    }
}

/// Render all tracks from one poll, each entry preceded by a blank line so
/// the output sits below whatever the commit template already contains.
pub fn format_results(tracks: &[TrackInfo]) -> String {
    let mut out = String::new();
    for track in tracks {
        out.push_str("\n\n");
        out.push_str(&track.to_string());
    }
    out
}
