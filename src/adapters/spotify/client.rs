use crate::domain::model::{ArtistId, PlaylistRef, RankedTrack, TrackId};
use crate::domain::ports::{ArtistSearch, PlaylistStore, TopTracksSource};
use crate::utils::error::{PipelineError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How often a 429 answer is waited out before giving up on a request.
const MAX_THROTTLE_RETRIES: u32 = 3;
/// Upper bound on a single Retry-After wait.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct SearchResponse {
    artists: Option<Paging<ArtistObject>>,
}

#[derive(Debug, Deserialize)]
struct Paging<T> {
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ArtistObject {
    uri: String,
}

#[derive(Debug, Deserialize)]
struct TopTracksResponse {
    tracks: Vec<TrackObject>,
}

#[derive(Debug, Deserialize)]
struct TrackObject {
    uri: String,
    #[serde(default)]
    popularity: u32,
}

#[derive(Debug, Serialize)]
struct UrisBody<'a> {
    uris: &'a [String],
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Bearer-token client for the parts of the Web API a run touches.
pub struct SpotifyClient {
    client: Client,
    api_base: String,
    access_token: String,
}

impl SpotifyClient {
    pub fn new(api_base: &str, access_token: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.api_base, path))
            .bearer_auth(&self.access_token)
    }

    /// Sends the request, waiting out 429 answers, and maps failures to
    /// `ApiStatusError` with the message from the error body when present.
    async fn send(&self, path: &str, build: impl Fn() -> RequestBuilder) -> Result<Response> {
        let mut throttled = 0;
        loop {
            let response = build().send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS && throttled < MAX_THROTTLE_RETRIES {
                throttled += 1;
                let wait = retry_after(&response);
                tracing::warn!("{} throttled, retrying in {:?}", path, wait);
                tokio::time::sleep(wait).await;
                continue;
            }

            if status.is_success() {
                return Ok(response);
            }

            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(PipelineError::ApiStatusError {
                endpoint: path.to_string(),
                status: status.as_u16(),
                message,
            });
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let response = self
            .send(path, || self.request(Method::GET, path).query(query))
            .await?;
        Ok(response.json().await?)
    }

    async fn send_uris(&self, method: Method, path: &str, uris: &[String]) -> Result<()> {
        let body = UrisBody { uris };
        self.send(path, || self.request(method.clone(), path).json(&body))
            .await?;
        Ok(())
    }
}

fn retry_after(response: &Response) -> Duration {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(1))
        .min(MAX_RETRY_AFTER)
}

#[async_trait]
impl ArtistSearch for SpotifyClient {
    async fn search_artists(&self, query: &str) -> Result<Vec<ArtistId>> {
        let result: SearchResponse = self
            .get_json(
                "/search",
                &[("q", query), ("type", "artist"), ("limit", "1")],
            )
            .await?;

        Ok(result
            .artists
            .map(|page| page.items)
            .unwrap_or_default()
            .into_iter()
            .map(|artist| ArtistId(artist.uri))
            .collect())
    }
}

#[async_trait]
impl TopTracksSource for SpotifyClient {
    async fn top_tracks(&self, artist: &ArtistId, country: &str) -> Result<Vec<RankedTrack>> {
        let path = format!("/artists/{}/top-tracks", artist.id());
        let result: TopTracksResponse = self.get_json(&path, &[("market", country)]).await?;

        Ok(result
            .tracks
            .into_iter()
            .map(|track| RankedTrack {
                id: TrackId::from_uri(&track.uri),
                popularity: track.popularity,
            })
            .collect())
    }
}

#[async_trait]
impl PlaylistStore for SpotifyClient {
    async fn clear(&self, playlist: &PlaylistRef) -> Result<()> {
        let path = format!("/playlists/{}/tracks", playlist.id());
        self.send_uris(Method::PUT, &path, &[]).await
    }

    async fn append(&self, playlist: &PlaylistRef, tracks: &[TrackId]) -> Result<()> {
        let path = format!("/playlists/{}/tracks", playlist.id());
        let uris: Vec<String> = tracks.iter().map(TrackId::uri).collect();
        self.send_uris(Method::POST, &path, &uris).await
    }
}
