use std::time::Duration;
use thiserror::Error;

use crate::domain::model::Phase;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Credentials file is not valid TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Lineup error: {message}")]
    LineupError { message: String },

    #[error("Streaming API returned {status} for {endpoint}: {message}")]
    ApiStatusError {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("Authorization failed: {message}")]
    AuthError { message: String },

    #[error("{phase} timed out after {limit:?}")]
    TimedOut { phase: Phase, limit: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Authentication,
    Timeout,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Transient; rerunning may succeed.
    Medium,
    High,
    Critical,
}

impl PipelineError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::TomlError(_) => ErrorCategory::Configuration,
            Self::HttpError(_) | Self::ApiStatusError { .. } => ErrorCategory::Network,
            Self::AuthError { .. } => ErrorCategory::Authentication,
            Self::TimedOut { .. } => ErrorCategory::Timeout,
            Self::LineupError { .. } | Self::SerializationError(_) | Self::UrlError(_) => {
                ErrorCategory::Data
            }
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::TimedOut { .. } | Self::HttpError(_) => ErrorSeverity::Medium,
            Self::ApiStatusError { status, .. } if *status == 429 || *status >= 500 => {
                ErrorSeverity::Medium
            }
            Self::ApiStatusError { .. }
            | Self::AuthError { .. }
            | Self::LineupError { .. }
            | Self::SerializationError(_)
            | Self::UrlError(_) => ErrorSeverity::High,
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::TomlError(_)
            | Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::MissingConfigError { field } => format!(
                "Pass --{} or set {} in the environment or the credentials file",
                field.replace('_', "-"),
                field.to_uppercase()
            ),
            Self::InvalidConfigValueError { field, .. } => {
                format!("Check the value given for {}", field)
            }
            Self::ConfigError { .. } | Self::TomlError(_) => {
                "Check the credentials file and command line flags".to_string()
            }
            Self::LineupError { .. } => {
                "Check --lineup-url and --lineup-selector against the current lineup page"
                    .to_string()
            }
            Self::TimedOut { phase, .. } => match phase.timeout_flag() {
                Some(flag) => format!("Raise {} or try again later", flag),
                None => "Try again later".to_string(),
            },
            Self::AuthError { .. } => {
                "Verify client id, client secret and the redirect URI registered for the app"
                    .to_string()
            }
            Self::ApiStatusError { status: 401, .. } => {
                "The access token was rejected; run again to re-authorize".to_string()
            }
            Self::ApiStatusError { status: 403, .. } => {
                "Make sure the authorized account may modify the target playlist".to_string()
            }
            Self::ApiStatusError { status: 404, .. } => {
                "Check that the playlist reference exists".to_string()
            }
            Self::ApiStatusError { status: 429, .. } => {
                "Lower --rate-limit and try again later".to_string()
            }
            Self::ApiStatusError { .. } | Self::HttpError(_) => {
                "Check the network connection and try again".to_string()
            }
            Self::SerializationError(_) | Self::UrlError(_) => {
                "The remote service returned unexpected data; try again later".to_string()
            }
            Self::IoError(_) => "Check file permissions and available disk space".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Network => format!("Could not talk to the remote service: {}", self),
            ErrorCategory::Authentication => format!("Could not sign in: {}", self),
            ErrorCategory::Timeout => format!("Gave up waiting: {}", self),
            ErrorCategory::Data => format!("Unexpected data: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
