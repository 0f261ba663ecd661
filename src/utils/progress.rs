use crate::domain::model::Phase;
use crate::domain::ports::{ProgressEvent, ProgressObserver, RetryReason};

/// Prints one line per progress event to stdout unless quiet.
#[derive(Debug, Clone, Default)]
pub struct ConsoleReporter {
    quiet: bool,
}

impl ConsoleReporter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn render(event: &ProgressEvent) -> String {
        match event {
            ProgressEvent::PhaseStarted(phase) => match phase {
                Phase::FetchLineup => "🎸 Fetching the festival lineup".to_string(),
                Phase::ResolveArtists => "🔎 Looking up artists on Spotify".to_string(),
                Phase::CollectTracks => "🎵 Fetching artist top tracks".to_string(),
                Phase::WritePlaylist => "📀 Adding tracks to playlist".to_string(),
            },
            ProgressEvent::LineupFetched { count } => format!("   {} artists on the lineup", count),
            ProgressEvent::ArtistResolved {
                name, index, total, ..
            } => format!("✅ [{}/{}] Found artist: {}", index + 1, total, name),
            ProgressEvent::ArtistRetry {
                name,
                attempt,
                max_retries,
                reason: RetryReason::NoMatch,
            } => format!(
                "⚠️  No artist found for {} - retrying {}/{}",
                name, attempt, max_retries
            ),
            ProgressEvent::ArtistRetry {
                name,
                attempt,
                max_retries,
                reason: RetryReason::SearchFailed(error),
            } => format!(
                "⚠️  Error searching for {} ({}) - retrying {}/{}",
                name, error, attempt, max_retries
            ),
            ProgressEvent::ArtistDropped { name } => format!("❌ Giving up on {}", name),
            ProgressEvent::TracksCollected {
                artist,
                count,
                index,
                total,
            } => format!("   [{}/{}] {} tracks from {}", index + 1, total, count, artist),
            ProgressEvent::ArtistTracksSkipped { artist, error } => {
                format!("⚠️  Skipping {}: {}", artist, error)
            }
            ProgressEvent::BatchWritten { index, total, size } => {
                format!("   [{}/{}] added {} tracks", index + 1, total, size)
            }
        }
    }
}

impl ProgressObserver for ConsoleReporter {
    fn notify(&self, event: &ProgressEvent) {
        if !self.quiet {
            println!("{}", Self::render(event));
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl ProgressObserver for SilentReporter {
    fn notify(&self, _event: &ProgressEvent) {}
}
