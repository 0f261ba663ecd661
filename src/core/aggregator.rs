use crate::domain::model::{ArtistId, FailurePolicy, RankedTrack, TrackId};
use crate::domain::ports::{ProgressEvent, ProgressObserver, TopTracksSource};
use crate::utils::error::Result;

/// Most popular first; equal popularity keeps provider order.
pub fn pick_top(mut tracks: Vec<RankedTrack>, max_tracks: usize) -> Vec<TrackId> {
    tracks.sort_by(|a, b| b.popularity.cmp(&a.popularity));
    tracks
        .into_iter()
        .take(max_tracks)
        .map(|track| track.id)
        .collect()
}

pub struct TrackAggregator<'a, T: ?Sized> {
    source: &'a T,
    country: &'a str,
    max_tracks: usize,
    on_failure: FailurePolicy,
    observer: &'a dyn ProgressObserver,
}

impl<'a, T: TopTracksSource + ?Sized> TrackAggregator<'a, T> {
    pub fn new(
        source: &'a T,
        country: &'a str,
        max_tracks: usize,
        observer: &'a dyn ProgressObserver,
    ) -> Self {
        Self {
            source,
            country,
            max_tracks,
            on_failure: FailurePolicy::Abort,
            observer,
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.on_failure = policy;
        self
    }

    /// Concatenates each artist's top tracks, artists in the given order.
    pub async fn collect(&self, artists: &[ArtistId]) -> Result<Vec<TrackId>> {
        let total = artists.len();
        let mut all_tracks = Vec::new();

        for (index, artist) in artists.iter().enumerate() {
            let tracks = match self.source.top_tracks(artist, self.country).await {
                Ok(tracks) => tracks,
                Err(e) if self.on_failure == FailurePolicy::Skip => {
                    tracing::warn!("Skipping top tracks for {}: {}", artist, e);
                    self.observer.notify(&ProgressEvent::ArtistTracksSkipped {
                        artist: artist.clone(),
                        error: e.to_string(),
                    });
                    continue;
                }
                Err(e) => return Err(e),
            };

            let picked = pick_top(tracks, self.max_tracks);
            tracing::debug!("{}: keeping {} tracks", artist, picked.len());
            self.observer.notify(&ProgressEvent::TracksCollected {
                artist: artist.clone(),
                count: picked.len(),
                index,
                total,
            });
            all_tracks.extend(picked);
        }

        Ok(all_tracks)
    }
}
