use crate::domain::model::ArtistId;
use crate::domain::ports::ArtistSearch;
use crate::utils::error::Result;
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::time::Duration;

/// Search wrapper that lets at most `calls_per_second` queries through per
/// one-second window. Every call occupies a full 1/R slot, so N calls take at
/// least N/R seconds. The bucket lives as long as the wrapper, so one wrapper
/// per run shares the budget across every name.
pub struct Throttled<'a, S: ?Sized> {
    inner: &'a S,
    limiter: DefaultDirectRateLimiter,
    slot: Duration,
}

impl<'a, S: ArtistSearch + ?Sized> Throttled<'a, S> {
    pub fn per_second(inner: &'a S, calls_per_second: u32) -> Self {
        let calls = NonZeroU32::new(calls_per_second).unwrap_or(NonZeroU32::MIN);
        Self {
            inner,
            limiter: RateLimiter::direct(Quota::per_second(calls).allow_burst(NonZeroU32::MIN)),
            slot: Duration::from_secs(1) / calls.get(),
        }
    }
}

#[async_trait]
impl<'a, S: ArtistSearch + ?Sized> ArtistSearch for Throttled<'a, S> {
    async fn search_artists(&self, query: &str) -> Result<Vec<ArtistId>> {
        if self.limiter.check().is_err() {
            tracing::debug!("Search budget exhausted, waiting for the next slot");
            self.limiter.until_ready().await;
        }
        let slot_end = tokio::time::Instant::now() + self.slot;
        let result = self.inner.search_artists(query).await;
        tokio::time::sleep_until(slot_end).await;
        result
    }
}
