//! Authorization-code flow against the Spotify accounts service.
//!
//! Tokens are requested fresh on every run and never written to disk.

use crate::config::ClientCredentials;
use crate::utils::error::{PipelineError, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Only public playlists are modified.
pub const SCOPE: &str = "playlist-modify-public";

#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct TokenError {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

pub struct SpotifyAuth {
    client: Client,
    accounts_base: String,
    credentials: ClientCredentials,
}

impl SpotifyAuth {
    pub fn new(accounts_base: &str, credentials: ClientCredentials) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            accounts_base: accounts_base.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn authorize_url(&self, state: &str) -> Result<Url> {
        let url = Url::parse_with_params(
            &format!("{}/authorize", self.accounts_base),
            &[
                ("client_id", self.credentials.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.credentials.redirect_uri.as_str()),
                ("scope", SCOPE),
                ("state", state),
            ],
        )?;
        Ok(url)
    }

    pub async fn exchange_code(&self, code: &str) -> Result<AccessToken> {
        let endpoint = format!("{}/api/token", self.accounts_base);
        tracing::debug!("Exchanging authorization code at {}", endpoint);

        let response = self
            .client
            .post(&endpoint)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.credentials.redirect_uri.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<TokenError>(&body) {
                Ok(err) => match err.error_description {
                    Some(description) => format!("{}: {}", err.error, description),
                    None => err.error,
                },
                Err(_) => format!("token endpoint returned {}", status),
            };
            return Err(PipelineError::AuthError { message });
        }

        let token: AccessToken = response.json().await?;
        if !token.token_type.eq_ignore_ascii_case("bearer") {
            return Err(PipelineError::AuthError {
                message: format!("unexpected token type {}", token.token_type),
            });
        }
        tracing::debug!("Got access token valid for {}s", token.expires_in);
        Ok(token)
    }

    /// Prints the authorize URL, opens it when possible and waits for the user
    /// to paste the URL they were redirected to.
    pub async fn authorize_interactive(&self) -> Result<AccessToken> {
        use tokio::io::{AsyncBufReadExt, BufReader};

        let state = uuid::Uuid::new_v4().simple().to_string();
        let url = self.authorize_url(&state)?;

        println!("🔑 Authorize access to your playlists:");
        println!("   {}", url);
        open_in_browser(url.as_str());
        println!("Paste the URL you were redirected to:");

        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await?;

        let code = extract_code(&line, &state)?;
        self.exchange_code(&code).await
    }
}

#[cfg(feature = "cli")]
fn open_in_browser(url: &str) {
    if let Err(e) = webbrowser::open(url) {
        tracing::debug!("Could not open a browser: {}", e);
    }
}

#[cfg(not(feature = "cli"))]
fn open_in_browser(_url: &str) {}

/// Pulls the authorization code out of the redirect URL, checking `state`.
pub fn extract_code(redirected: &str, expected_state: &str) -> Result<String> {
    let url = Url::parse(redirected.trim()).map_err(|e| PipelineError::AuthError {
        message: format!("not a redirect URL: {}", e),
    })?;

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "error" => {
                return Err(PipelineError::AuthError {
                    message: format!("authorization denied: {}", value),
                })
            }
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            _ => {}
        }
    }

    if state.as_deref() != Some(expected_state) {
        return Err(PipelineError::AuthError {
            message: "state mismatch in redirect URL".to_string(),
        });
    }
    code.ok_or_else(|| PipelineError::AuthError {
        message: "redirect URL has no code".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> SpotifyAuth {
        SpotifyAuth::new(
            "https://accounts.spotify.com/",
            ClientCredentials {
                client_id: "my-client".to_string(),
                client_secret: "my-secret".to_string(),
                redirect_uri: "http://localhost:8888/callback".to_string(),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_authorize_url_carries_client_and_scope() {
        let url = auth().authorize_url("abc123").unwrap();
        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert_eq!(url.path(), "/authorize");
        assert_eq!(params["client_id"], "my-client");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["redirect_uri"], "http://localhost:8888/callback");
        assert_eq!(params["scope"], SCOPE);
        assert_eq!(params["state"], "abc123");
    }

    #[test]
    fn test_extract_code_checks_state() {
        let code = extract_code(
            "http://localhost:8888/callback?code=AQD-xyz&state=s1\n",
            "s1",
        )
        .unwrap();
        assert_eq!(code, "AQD-xyz");

        assert!(extract_code("http://localhost:8888/callback?code=AQD&state=other", "s1").is_err());
        assert!(extract_code("http://localhost:8888/callback?state=s1", "s1").is_err());
        assert!(extract_code("not a url", "s1").is_err());
    }

    #[test]
    fn test_extract_code_surfaces_denial() {
        let err = extract_code(
            "http://localhost:8888/callback?error=access_denied&state=s1",
            "s1",
        )
        .unwrap_err();
        assert!(err.to_string().contains("access_denied"));
    }
}
