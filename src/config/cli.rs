use crate::config::credentials::load_credentials;
use crate::config::{
    default_layer, env_layer, resolve_layers, ConfigLayer, LineupSettings, Settings,
    SpotifyEndpoints, CLIENT_ID, CLIENT_SECRET, COUNTRY, N_TRACKS, PLAYLIST_URI, REDIRECT_URI,
    DEFAULT_ACCOUNTS_BASE, DEFAULT_API_BASE, DEFAULT_LINEUP_SELECTOR, DEFAULT_LINEUP_URL,
};
use crate::domain::model::{FailurePolicy, RunConfig};
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "lineup-playlist")]
#[command(about = "Fill a Spotify playlist with the top tracks of a festival lineup")]
pub struct CliArgs {
    /// Client id
    #[arg(short = 'i', long, value_name = "CLIENT-ID")]
    pub client_id: Option<String>,

    /// Client secret
    #[arg(short = 's', long, value_name = "CLIENT-SECRET")]
    pub client_secret: Option<String>,

    /// Redirect uri from the Spotify dashboard settings
    #[arg(short = 'r', long, value_name = "REDIRECT-URI")]
    pub redirect_uri: Option<String>,

    /// Playlist id, URI or URL
    #[arg(short = 'p', long, value_name = "PLAYLIST-URI")]
    pub playlist_uri: Option<String>,

    /// Market to take top tracks from [default: DK]
    #[arg(short = 'c', long)]
    pub country: Option<String>,

    /// Maximum number of tracks per artist [default: 5]
    #[arg(short = 'n', long)]
    pub n_tracks: Option<usize>,

    /// Do not print progress
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    /// Flat JSON or TOML file with CLIENT_ID, CLIENT_SECRET, REDIRECT_URI, PLAYLIST_URI
    #[arg(long, default_value = "creds.json")]
    pub credentials: PathBuf,

    /// Search attempts per artist before giving up
    #[arg(long, default_value_t = 8)]
    pub max_retries: u32,

    /// Pause between search attempts
    #[arg(long, default_value_t = 500)]
    pub retry_delay_ms: u64,

    /// Maximum artist searches per second
    #[arg(long, default_value_t = 20)]
    pub rate_limit: u32,

    #[arg(long, default_value = DEFAULT_LINEUP_URL)]
    pub lineup_url: String,

    /// CSS selector matching one artist name each
    #[arg(long, default_value = DEFAULT_LINEUP_SELECTOR)]
    pub lineup_selector: String,

    #[arg(long, default_value_t = 30)]
    pub lineup_timeout_secs: u64,

    #[arg(long, default_value_t = 120)]
    pub resolve_timeout_secs: u64,

    #[arg(long, default_value_t = 120)]
    pub tracks_timeout_secs: u64,

    /// Keep going when an artist's top tracks cannot be fetched
    #[arg(long)]
    pub skip_failed_artists: bool,

    #[arg(long, default_value = DEFAULT_API_BASE, hide = true)]
    pub api_base_url: String,

    #[arg(long, default_value = DEFAULT_ACCOUNTS_BASE, hide = true)]
    pub accounts_base_url: String,
}

impl CliArgs {
    /// Values given on the command line, as a config layer.
    pub fn explicit_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::new();
        let mut put = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                layer.insert(key.to_string(), value);
            }
        };
        put(CLIENT_ID, self.client_id.clone());
        put(CLIENT_SECRET, self.client_secret.clone());
        put(REDIRECT_URI, self.redirect_uri.clone());
        put(PLAYLIST_URI, self.playlist_uri.clone());
        put(COUNTRY, self.country.clone());
        put(N_TRACKS, self.n_tracks.map(|n| n.to_string()));
        layer
    }

    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            rate_limit_per_sec: self.rate_limit,
            lineup_timeout: Duration::from_secs(self.lineup_timeout_secs),
            resolve_timeout: Duration::from_secs(self.resolve_timeout_secs),
            tracks_timeout: Duration::from_secs(self.tracks_timeout_secs),
            on_track_failure: if self.skip_failed_artists {
                FailurePolicy::Skip
            } else {
                FailurePolicy::Abort
            },
            ..RunConfig::default()
        }
    }

    /// Merges flags, environment and credentials file into validated settings.
    pub fn to_settings(&self) -> Result<Settings> {
        let file = load_credentials(&self.credentials)?;
        self.to_settings_with(&file, &env_layer())
    }

    pub fn to_settings_with(&self, file: &ConfigLayer, env: &ConfigLayer) -> Result<Settings> {
        let merged = resolve_layers(&default_layer(), file, env, &self.explicit_layer());
        Settings::from_merged(
            &merged,
            self.run_config(),
            LineupSettings {
                url: self.lineup_url.clone(),
                selector: self.lineup_selector.clone(),
            },
            SpotifyEndpoints {
                api_base: self.api_base_url.trim_end_matches('/').to_string(),
                accounts_base: self.accounts_base_url.trim_end_matches('/').to_string(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::parse_from(std::iter::once("lineup-playlist").chain(args.iter().copied()))
    }

    fn env() -> ConfigLayer {
        ConfigLayer::from([
            (CLIENT_ID.to_string(), "env-id".to_string()),
            (CLIENT_SECRET.to_string(), "env-secret".to_string()),
        ])
    }

    fn file() -> ConfigLayer {
        ConfigLayer::from([
            (CLIENT_ID.to_string(), "file-id".to_string()),
            (REDIRECT_URI.to_string(), "http://localhost:8888/callback".to_string()),
            (PLAYLIST_URI.to_string(), "5ZxTKYJ0Xo7ZxnVJ4sgQP8".to_string()),
        ])
    }

    #[test]
    fn test_flags_override_env_and_file() {
        let args = parse(&["-i", "flag-id", "-n", "3", "-c", "se", "--skip-failed-artists"]);

        let settings = args.to_settings_with(&file(), &env()).unwrap();

        assert_eq!(settings.credentials.client_id, "flag-id");
        assert_eq!(settings.credentials.client_secret, "env-secret");
        assert_eq!(settings.credentials.redirect_uri, "http://localhost:8888/callback");
        assert_eq!(settings.run.max_tracks, 3);
        assert_eq!(settings.run.country, "SE");
        assert_eq!(settings.run.on_track_failure, FailurePolicy::Skip);
    }

    #[test]
    fn test_defaults_apply_without_flags() {
        let settings = parse(&[]).to_settings_with(&file(), &env()).unwrap();

        assert_eq!(settings.credentials.client_id, "env-id");
        assert_eq!(settings.run.country, "DK");
        assert_eq!(settings.run.max_tracks, 5);
        assert_eq!(settings.run.max_retries, 8);
        assert_eq!(settings.run.retry_delay, Duration::from_millis(500));
        assert_eq!(settings.run.rate_limit_per_sec, 20);
        assert_eq!(settings.lineup.selector, DEFAULT_LINEUP_SELECTOR);
    }

    #[test]
    fn test_missing_required_values_fail() {
        let result = parse(&[]).to_settings_with(&ConfigLayer::new(), &env());
        assert!(result.is_err());
    }
}
