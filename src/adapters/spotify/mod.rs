pub mod auth;
pub mod client;

pub use auth::{AccessToken, SpotifyAuth};
pub use client::SpotifyClient;
