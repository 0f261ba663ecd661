#[cfg(feature = "cli")]
pub mod cli;
pub mod credentials;

use crate::domain::model::{PlaylistRef, RunConfig};
use crate::utils::error::{PipelineError, Result};
use crate::utils::validation::{
    validate_country_code, validate_non_empty_string, validate_positive_number, validate_range,
    validate_required_field, validate_url, Validate,
};
use std::collections::HashMap;

#[cfg(feature = "cli")]
pub use cli::CliArgs;

/// One source of string settings, keyed by the upper-case names below.
pub type ConfigLayer = HashMap<String, String>;

pub const CLIENT_ID: &str = "CLIENT_ID";
pub const CLIENT_SECRET: &str = "CLIENT_SECRET";
pub const REDIRECT_URI: &str = "REDIRECT_URI";
pub const PLAYLIST_URI: &str = "PLAYLIST_URI";
pub const COUNTRY: &str = "COUNTRY";
pub const N_TRACKS: &str = "N_TRACKS";

/// Keys that may come from the environment or the credentials file.
pub const CREDENTIAL_KEYS: [&str; 4] = [CLIENT_ID, CLIENT_SECRET, REDIRECT_URI, PLAYLIST_URI];

pub const DEFAULT_LINEUP_URL: &str = "https://www.copenhell.dk/program";
pub const DEFAULT_LINEUP_SELECTOR: &str = "span.gc-title";
pub const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1";
pub const DEFAULT_ACCOUNTS_BASE: &str = "https://accounts.spotify.com";

/// Merges layers with fixed precedence: explicit > env > file > defaults.
/// Blank values never override a lower layer.
pub fn resolve_layers(
    defaults: &ConfigLayer,
    file: &ConfigLayer,
    env: &ConfigLayer,
    explicit: &ConfigLayer,
) -> ConfigLayer {
    let mut merged = ConfigLayer::new();
    for layer in [defaults, file, env, explicit] {
        for (key, value) in layer {
            if !value.trim().is_empty() {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
    merged
}

pub fn default_layer() -> ConfigLayer {
    ConfigLayer::from([
        (COUNTRY.to_string(), "DK".to_string()),
        (N_TRACKS.to_string(), "5".to_string()),
    ])
}

/// Credential keys found through `lookup`.
pub fn env_layer_from<F>(lookup: F) -> ConfigLayer
where
    F: Fn(&str) -> Option<String>,
{
    CREDENTIAL_KEYS
        .iter()
        .filter_map(|key| lookup(key).map(|value| (key.to_string(), value)))
        .collect()
}

pub fn env_layer() -> ConfigLayer {
    env_layer_from(|key| std::env::var(key).ok())
}

#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

#[derive(Debug, Clone)]
pub struct LineupSettings {
    pub url: String,
    pub selector: String,
}

impl Default for LineupSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_LINEUP_URL.to_string(),
            selector: DEFAULT_LINEUP_SELECTOR.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpotifyEndpoints {
    pub api_base: String,
    pub accounts_base: String,
}

impl Default for SpotifyEndpoints {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            accounts_base: DEFAULT_ACCOUNTS_BASE.to_string(),
        }
    }
}

/// Everything a run needs, resolved and validated before any network call.
#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: ClientCredentials,
    pub playlist: PlaylistRef,
    pub lineup: LineupSettings,
    pub endpoints: SpotifyEndpoints,
    pub run: RunConfig,
}

fn required(merged: &ConfigLayer, key: &str) -> Result<String> {
    validate_required_field(&key.to_lowercase(), merged.get(key).cloned())
}

impl Settings {
    /// Builds settings from a merged layer. `run` supplies everything the
    /// layer does not carry; its country and track cap are overwritten.
    pub fn from_merged(
        merged: &ConfigLayer,
        mut run: RunConfig,
        lineup: LineupSettings,
        endpoints: SpotifyEndpoints,
    ) -> Result<Self> {
        let credentials = ClientCredentials {
            client_id: required(merged, CLIENT_ID)?,
            client_secret: required(merged, CLIENT_SECRET)?,
            redirect_uri: required(merged, REDIRECT_URI)?,
        };
        let playlist = PlaylistRef::parse(&required(merged, PLAYLIST_URI)?)?;

        if let Some(country) = merged.get(COUNTRY) {
            run.country = country.to_uppercase();
        }
        if let Some(n_tracks) = merged.get(N_TRACKS) {
            run.max_tracks =
                n_tracks
                    .parse()
                    .map_err(|_| PipelineError::InvalidConfigValueError {
                        field: "n_tracks".to_string(),
                        value: n_tracks.clone(),
                        reason: "Expected a whole number".to_string(),
                    })?;
        }

        let settings = Self {
            credentials,
            playlist,
            lineup,
            endpoints,
            run,
        };
        settings.validate()?;
        Ok(settings)
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("client_id", &self.credentials.client_id)?;
        validate_non_empty_string("client_secret", &self.credentials.client_secret)?;
        validate_url("redirect_uri", &self.credentials.redirect_uri)?;
        validate_url("lineup_url", &self.lineup.url)?;
        if scraper::Selector::parse(&self.lineup.selector).is_err() {
            return Err(PipelineError::InvalidConfigValueError {
                field: "lineup_selector".to_string(),
                value: self.lineup.selector.clone(),
                reason: "Not a valid CSS selector".to_string(),
            });
        }
        validate_url("api_base_url", &self.endpoints.api_base)?;
        validate_url("accounts_base_url", &self.endpoints.accounts_base)?;

        validate_country_code("country", &self.run.country)?;
        // The top-tracks endpoint never returns more than 10.
        validate_range("n_tracks", self.run.max_tracks, 1, 10)?;
        validate_positive_number("max_retries", self.run.max_retries as usize, 1)?;
        validate_positive_number("rate_limit", self.run.rate_limit_per_sec as usize, 1)?;
        validate_range("batch_size", self.run.batch_size, 1, 100)?;
        Ok(())
    }
}
