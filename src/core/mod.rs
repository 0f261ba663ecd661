pub mod aggregator;
pub mod deadline;
pub mod engine;
pub mod lineup;
pub mod resolver;
pub mod throttle;
pub mod writer;

pub use crate::domain::model::{ArtistId, ArtistName, PlaylistRef, RunConfig, TrackId};
pub use crate::domain::ports::{
    ArtistSearch, LineupSource, PlaylistStore, ProgressObserver, StreamingService, TopTracksSource,
};
pub use crate::utils::error::Result;
