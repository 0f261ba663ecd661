pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use adapters::lineup_page::HtmlLineupSource;
pub use adapters::spotify::{SpotifyAuth, SpotifyClient};
pub use config::Settings;
pub use core::engine::PlaylistEngine;
pub use utils::error::{PipelineError, Result};
