use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_OUTPUT: &str = ".config/gitmessage";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub spotify: Option<SpotifyConfig>,
    #[serde(default)]
    pub plex: Vec<PlexConfig>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyConfig {
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlexConfig {
    pub server: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub users: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub path: String,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("error reading config {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("error parsing config {}", path.display()))
    }

    /// Configured output path, or `~/.config/gitmessage` when unset.
    pub fn output_path(&self) -> Result<PathBuf> {
        if let Some(output) = &self.output {
            if !output.path.is_empty() {
                return Ok(PathBuf::from(&output.path));
            }
        }
        let home = std::env::var("HOME").context("error getting home directory")?;
        Ok(Path::new(&home).join(DEFAULT_OUTPUT))
    }
}

impl SpotifyConfig {
    /// Token from the config file, falling back to SPOTIFY_ACCESS_TOKEN.
    pub fn resolve_token(&self) -> Result<String> {
        resolve_token(self.access_token.as_deref(), "SPOTIFY_ACCESS_TOKEN")
            .ok_or_else(|| anyhow!("no spotify access token in config or SPOTIFY_ACCESS_TOKEN"))
    }
}

impl PlexConfig {
    /// Token from the config file, falling back to PLEX_TOKEN. A missing
    /// token is a hard error; an empty token would just get 401s forever.
    pub fn resolve_token(&self) -> Result<String> {
        resolve_token(self.token.as_deref(), "PLEX_TOKEN").ok_or_else(|| {
            anyhow!(
                "no token for plex server {} in config or PLEX_TOKEN",
                self.server
            )
        })
    }
}

fn resolve_token(configured: Option<&str>, env_var: &str) -> Option<String> {
    match configured {
        Some(token) if !token.is_empty() => Some(token.to_string()),
        _ => std::env::var(env_var).ok().filter(|t| !t.is_empty()),
    }
}
