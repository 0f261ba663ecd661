// Adapters layer: concrete implementations of the domain ports for the
// festival web page and the Spotify Web API.

pub mod lineup_page;
pub mod spotify;
