use crate::core::aggregator::TrackAggregator;
use crate::core::deadline::with_deadline;
use crate::core::resolver::{ArtistResolver, ResolveOptions};
use crate::core::throttle::Throttled;
use crate::core::writer::replace_playlist;
use crate::domain::model::{ArtistId, ArtistName, Phase, PlaylistRef, RunConfig, RunSummary, TrackId};
use crate::domain::ports::{LineupSource, ProgressEvent, ProgressObserver, StreamingService};
use crate::utils::error::Result;
use crate::utils::progress::SilentReporter;

/// Drives one run: lineup -> artist ids -> top tracks -> playlist.
pub struct PlaylistEngine<L, S> {
    lineup: L,
    service: S,
    playlist: PlaylistRef,
    config: RunConfig,
    observer: Box<dyn ProgressObserver>,
}

impl<L: LineupSource, S: StreamingService> PlaylistEngine<L, S> {
    pub fn new(lineup: L, service: S, playlist: PlaylistRef, config: RunConfig) -> Self {
        Self {
            lineup,
            service,
            playlist,
            config,
            observer: Box::new(SilentReporter),
        }
    }

    pub fn with_observer(mut self, observer: impl ProgressObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub async fn fetch_lineup(&self) -> Result<Vec<ArtistName>> {
        self.observer.notify(&ProgressEvent::PhaseStarted(Phase::FetchLineup));
        let names = with_deadline(
            Phase::FetchLineup,
            self.config.lineup_timeout,
            self.lineup.fetch_lineup(),
        )
        .await?;
        self.observer
            .notify(&ProgressEvent::LineupFetched { count: names.len() });
        Ok(names)
    }

    pub async fn resolve_artists(&self, names: &[ArtistName]) -> Result<Vec<ArtistId>> {
        self.observer
            .notify(&ProgressEvent::PhaseStarted(Phase::ResolveArtists));
        let search = Throttled::per_second(&self.service, self.config.rate_limit_per_sec);
        let options = ResolveOptions {
            max_retries: self.config.max_retries,
            retry_delay: self.config.retry_delay,
        };
        let resolver = ArtistResolver::new(&search, options, self.observer.as_ref());

        with_deadline(Phase::ResolveArtists, self.config.resolve_timeout, async {
            Ok(resolver.resolve(names).await)
        })
        .await
    }

    pub async fn collect_tracks(&self, artists: &[ArtistId]) -> Result<Vec<TrackId>> {
        self.observer
            .notify(&ProgressEvent::PhaseStarted(Phase::CollectTracks));
        let aggregator = TrackAggregator::new(
            &self.service,
            &self.config.country,
            self.config.max_tracks,
            self.observer.as_ref(),
        )
        .with_failure_policy(self.config.on_track_failure);

        with_deadline(
            Phase::CollectTracks,
            self.config.tracks_timeout,
            aggregator.collect(artists),
        )
        .await
    }

    pub async fn write_playlist(&self, tracks: &[TrackId]) -> Result<usize> {
        self.observer
            .notify(&ProgressEvent::PhaseStarted(Phase::WritePlaylist));
        replace_playlist(
            &self.service,
            &self.playlist,
            tracks,
            self.config.batch_size,
            self.observer.as_ref(),
        )
        .await
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Starting playlist run for {}", self.playlist);

        let names = self.fetch_lineup().await?;
        tracing::info!("Lineup has {} artists", names.len());

        let artists = self.resolve_artists(&names).await?;
        tracing::info!("Resolved {}/{} artists", artists.len(), names.len());

        let tracks = self.collect_tracks(&artists).await?;
        tracing::info!("Collected {} tracks", tracks.len());

        let batches = self.write_playlist(&tracks).await?;
        tracing::info!("Wrote {} tracks in {} batches", tracks.len(), batches);

        Ok(RunSummary {
            artists_found: names.len(),
            artists_resolved: artists.len(),
            tracks_written: tracks.len(),
            batches_written: batches,
        })
    }
}
