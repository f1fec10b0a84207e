use crate::players::Player;
use crate::track_info::{format_results, TrackInfo};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Drives the poll-compare-write cycle. `last_emitted` lives here rather than
/// in a global so the loop can be tested with fake players and a fake clock.
pub struct Poller {
    players: Vec<Box<dyn Player>>,
    output_path: PathBuf,
    interval: Duration,
    last_emitted: String,
}

impl Poller {
    pub fn new(players: Vec<Box<dyn Player>>, output_path: PathBuf) -> Self {
        Self {
            players,
            output_path,
            interval: POLL_INTERVAL,
            last_emitted: String::new(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run until the shutdown signal fires. The first poll happens only after
    /// the first full interval has elapsed.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        let start = time::Instant::now() + self.interval;
        let mut ticker = time::interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.changed() => return,
                _ = ticker.tick() => {}
            }
            self.tick().await;
        }
    }

    /// One poll-compare-write cycle.
    pub async fn tick(&mut self) {
        let results = self.poll_players().await;
        let output = format_results(&results);

        if output == self.last_emitted {
            return;
        }
        match write_output(&self.output_path, &output) {
            // Only remember output we actually managed to write, so a failed
            // write is retried on the next tick
            Ok(()) => self.last_emitted = output,
            Err(e) => log::error!("error writing {}: {e}", self.output_path.display()),
        }
    }

    /// Query every player in configuration order. A failing player is logged
    /// and contributes nothing; it never aborts the tick.
    async fn poll_players(&self) -> Vec<TrackInfo> {
        let mut results = Vec::new();
        for player in &self.players {
            match player.get_track_info().await {
                Ok(tracks) => results.extend(tracks),
                Err(e) => log::error!("{}: {e:#}", player.name()),
            }
        }
        results
    }
}

fn write_output(path: &Path, contents: &str) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(contents.as_bytes())
}
