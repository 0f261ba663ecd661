use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::utils::error::{PipelineError, Result};

/// Normalized artist display name as scraped from the lineup page.
pub type ArtistName = String;

/// Streaming-service artist identifier, e.g. `spotify:artist:4Z8W4fKeB5YxbusRsdQVPb`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtistId(pub String);

impl ArtistId {
    /// Bare id segment used in REST paths.
    pub fn id(&self) -> &str {
        self.0.rsplit(':').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for ArtistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bare track id (last segment of the track URI).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub String);

impl TrackId {
    /// Keeps only the last `:` separated segment, so URIs and ids both work.
    pub fn from_uri(uri: &str) -> Self {
        Self(uri.rsplit(':').next().unwrap_or(uri).to_string())
    }

    pub fn uri(&self) -> String {
        format!("spotify:track:{}", self.0)
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of an artist's top tracks as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedTrack {
    pub id: TrackId,
    pub popularity: u32,
}

/// Destination playlist. Accepts a bare id, a `spotify:playlist:` URI or an
/// `open.spotify.com/playlist/` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistRef {
    id: String,
}

impl PlaylistRef {
    pub fn parse(reference: &str) -> Result<Self> {
        let reference = reference.trim();
        let invalid = |reason: &str| PipelineError::InvalidConfigValueError {
            field: "playlist_uri".to_string(),
            value: reference.to_string(),
            reason: reason.to_string(),
        };

        let id = if let Some(rest) = reference.strip_prefix("spotify:playlist:") {
            rest.to_string()
        } else if reference.starts_with("http://") || reference.starts_with("https://") {
            let url = url::Url::parse(reference)?;
            let mut segments = url
                .path_segments()
                .ok_or_else(|| invalid("URL has no path"))?;
            match (segments.next(), segments.next()) {
                (Some("playlist"), Some(id)) => id.to_string(),
                _ => return Err(invalid("URL does not point at a playlist")),
            }
        } else if reference.contains(':') || reference.contains('/') {
            return Err(invalid("not a playlist id, URI or URL"));
        } else {
            reference.to_string()
        };

        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(invalid("playlist id must be alphanumeric"));
        }
        Ok(Self { id })
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for PlaylistRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "spotify:playlist:{}", self.id)
    }
}

/// The network-bound stages of a run, each with its own deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    FetchLineup,
    ResolveArtists,
    CollectTracks,
    WritePlaylist,
}

impl Phase {
    /// Flag that sets this phase's deadline, if it has one.
    pub fn timeout_flag(&self) -> Option<&'static str> {
        match self {
            Phase::FetchLineup => Some("--lineup-timeout-secs"),
            Phase::ResolveArtists => Some("--resolve-timeout-secs"),
            Phase::CollectTracks => Some("--tracks-timeout-secs"),
            Phase::WritePlaylist => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::FetchLineup => "lineup fetch",
            Phase::ResolveArtists => "artist resolution",
            Phase::CollectTracks => "top track collection",
            Phase::WritePlaylist => "playlist write",
        };
        f.write_str(label)
    }
}

/// What the aggregator does when one artist's top tracks cannot be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    #[default]
    Abort,
    Skip,
}

/// Immutable knobs for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub country: String,
    pub max_tracks: usize,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub rate_limit_per_sec: u32,
    pub lineup_timeout: Duration,
    pub resolve_timeout: Duration,
    pub tracks_timeout: Duration,
    pub on_track_failure: FailurePolicy,
    pub batch_size: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            country: "DK".to_string(),
            max_tracks: 5,
            max_retries: 8,
            retry_delay: Duration::from_millis(500),
            rate_limit_per_sec: 20,
            lineup_timeout: Duration::from_secs(30),
            resolve_timeout: Duration::from_secs(120),
            tracks_timeout: Duration::from_secs(120),
            on_track_failure: FailurePolicy::Abort,
            batch_size: 100,
        }
    }
}

/// Counts reported after a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub artists_found: usize,
    pub artists_resolved: usize,
    pub tracks_written: usize,
    pub batches_written: usize,
}
