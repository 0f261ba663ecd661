use crate::domain::model::{PlaylistRef, TrackId};
use crate::domain::ports::{PlaylistStore, ProgressEvent, ProgressObserver};
use crate::utils::error::Result;

/// Largest number of tracks the playlist endpoint accepts per request.
pub const MAX_BATCH_SIZE: usize = 100;

/// Replaces the playlist contents with `tracks`: clear first, then append in
/// order-preserving batches. A failed batch is returned as is; the playlist
/// stays cleared/partially filled. Returns the number of batches written.
pub async fn replace_playlist<W: PlaylistStore + ?Sized>(
    store: &W,
    playlist: &PlaylistRef,
    tracks: &[TrackId],
    batch_size: usize,
    observer: &dyn ProgressObserver,
) -> Result<usize> {
    let batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);

    store.clear(playlist).await?;
    tracing::debug!("Cleared {}", playlist);

    let total = tracks.len().div_ceil(batch_size);
    for (index, batch) in tracks.chunks(batch_size).enumerate() {
        store.append(playlist, batch).await?;
        tracing::debug!("Appended batch {}/{} ({} tracks)", index + 1, total, batch.len());
        observer.notify(&ProgressEvent::BatchWritten {
            index,
            total,
            size: batch.len(),
        });
    }

    Ok(total)
}
