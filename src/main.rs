use anyhow::{bail, Context, Result};
use std::path::Path;
use tokio::sync::watch;

use git_now_playing::{
    config::Config,
    players::{plex::PlexPlayer, spotify::SpotifyPlayer, Player},
    poller::Poller,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args()
        .nth(1)
        .context("usage: git-now-playing /path/to/config")?;
    let config = Config::load(Path::new(&config_path))?;

    let mut players: Vec<Box<dyn Player>> = Vec::new();

    if let Some(spotify) = &config.spotify {
        log::info!("spotify configured");
        players.push(Box::new(SpotifyPlayer::new(spotify.resolve_token()?)));
    }

    for plex in &config.plex {
        log::info!("plex configured: {}", plex.server);
        players.push(Box::new(PlexPlayer::new(
            plex.server.clone(),
            plex.resolve_token()?,
            plex.users.clone(),
        )));
    }

    if players.is_empty() {
        bail!("no players configured in {config_path}");
    }

    let output_path = config.output_path()?;
    log::info!("writing to {}", output_path.display());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    Poller::new(players, output_path).run(shutdown_rx).await;
    Ok(())
}
