use crate::domain::model::{ArtistId, ArtistName, Phase, PlaylistRef, RankedTrack, TrackId};
use crate::utils::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait LineupSource: Send + Sync {
    /// Unique, normalized, sorted artist names.
    async fn fetch_lineup(&self) -> Result<Vec<ArtistName>>;
}

#[async_trait]
pub trait ArtistSearch: Send + Sync {
    /// Artist ids matching `query`, best match first. An empty list is not an error.
    async fn search_artists(&self, query: &str) -> Result<Vec<ArtistId>>;
}

#[async_trait]
pub trait TopTracksSource: Send + Sync {
    async fn top_tracks(&self, artist: &ArtistId, country: &str) -> Result<Vec<RankedTrack>>;
}

#[async_trait]
pub trait PlaylistStore: Send + Sync {
    async fn clear(&self, playlist: &PlaylistRef) -> Result<()>;
    async fn append(&self, playlist: &PlaylistRef, tracks: &[TrackId]) -> Result<()>;
}

/// Everything the engine needs from the streaming service.
pub trait StreamingService: ArtistSearch + TopTracksSource + PlaylistStore {}

impl<T: ArtistSearch + TopTracksSource + PlaylistStore> StreamingService for T {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryReason {
    NoMatch,
    SearchFailed(String),
}

/// Notable things that happen during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    PhaseStarted(Phase),
    LineupFetched {
        count: usize,
    },
    ArtistResolved {
        name: ArtistName,
        artist: ArtistId,
        index: usize,
        total: usize,
    },
    ArtistRetry {
        name: ArtistName,
        attempt: u32,
        max_retries: u32,
        reason: RetryReason,
    },
    ArtistDropped {
        name: ArtistName,
    },
    TracksCollected {
        artist: ArtistId,
        count: usize,
        index: usize,
        total: usize,
    },
    ArtistTracksSkipped {
        artist: ArtistId,
        error: String,
    },
    BatchWritten {
        index: usize,
        total: usize,
        size: usize,
    },
}

pub trait ProgressObserver: Send + Sync {
    fn notify(&self, event: &ProgressEvent);
}
