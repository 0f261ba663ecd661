use crate::config::{ConfigLayer, CREDENTIAL_KEYS};
use crate::utils::error::{PipelineError, Result};
use std::collections::HashMap;
use std::path::Path;

/// Reads the optional local credentials file: a flat mapping of
/// CLIENT_ID, CLIENT_SECRET, REDIRECT_URI and PLAYLIST_URI.
///
/// JSON by default, TOML when the file ends in `.toml`. A missing file is an
/// empty layer. Keys are matched case-insensitively; unknown keys are ignored.
pub fn load_credentials<P: AsRef<Path>>(path: P) -> Result<ConfigLayer> {
    let path = path.as_ref();
    if !path.is_file() {
        tracing::debug!("No credentials file at {}", path.display());
        return Ok(ConfigLayer::new());
    }

    let content = std::fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let layer = if is_toml {
        parse_toml(&content)?
    } else {
        parse_json(&content).map_err(|e| match e {
            PipelineError::SerializationError(e) => PipelineError::ConfigError {
                message: format!("{} is not valid JSON: {}", path.display(), e),
            },
            other => other,
        })?
    };
    tracing::debug!(
        "Loaded {} credential values from {}",
        layer.len(),
        path.display()
    );
    Ok(layer)
}

fn parse_json(content: &str) -> Result<ConfigLayer> {
    let raw: HashMap<String, serde_json::Value> = serde_json::from_str(content)?;
    raw.into_iter()
        .filter_map(|(key, value)| credential_key(&key).map(|key| (key, value)))
        .map(|(key, value)| match value {
            serde_json::Value::String(s) => Ok((key, s)),
            other => Err(non_string(&key, other.to_string())),
        })
        .collect()
}

fn parse_toml(content: &str) -> Result<ConfigLayer> {
    let raw: HashMap<String, toml::Value> = toml::from_str(content)?;
    raw.into_iter()
        .filter_map(|(key, value)| credential_key(&key).map(|key| (key, value)))
        .map(|(key, value)| match value {
            toml::Value::String(s) => Ok((key, s)),
            other => Err(non_string(&key, other.to_string())),
        })
        .collect()
}

fn credential_key(key: &str) -> Option<String> {
    let key = key.to_uppercase();
    CREDENTIAL_KEYS.contains(&key.as_str()).then_some(key)
}

fn non_string(key: &str, value: String) -> PipelineError {
    PipelineError::InvalidConfigValueError {
        field: key.to_lowercase(),
        value,
        reason: "Credentials file values must be strings".to_string(),
    }
}
