//! Artist name to streaming-service identifier resolution.
//!
//! Names are searched one at a time in lineup order. A name that yields no
//! match (or whose search errors out) is retried after a fixed delay until the
//! retry budget is spent, then dropped. Dropping a name never fails the run.

use crate::domain::model::{ArtistId, ArtistName};
use crate::domain::ports::{ArtistSearch, ProgressEvent, ProgressObserver, RetryReason};
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_retries: 8,
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// Query sent to the search endpoint for one lineup name.
pub fn artist_query(name: &str) -> String {
    format!("artist:{}", name.to_lowercase())
}

pub struct ArtistResolver<'a, S: ?Sized> {
    search: &'a S,
    options: ResolveOptions,
    observer: &'a dyn ProgressObserver,
}

impl<'a, S: ArtistSearch + ?Sized> ArtistResolver<'a, S> {
    pub fn new(search: &'a S, options: ResolveOptions, observer: &'a dyn ProgressObserver) -> Self {
        Self {
            search,
            options,
            observer,
        }
    }

    /// Resolves every name it can, in input order. Unresolved names leave no gap.
    pub async fn resolve(&self, names: &[ArtistName]) -> Vec<ArtistId> {
        let total = names.len();
        let mut resolved = Vec::with_capacity(total);

        for (index, name) in names.iter().enumerate() {
            match self.resolve_one(name).await {
                Some(artist) => {
                    self.observer.notify(&ProgressEvent::ArtistResolved {
                        name: name.clone(),
                        artist: artist.clone(),
                        index,
                        total,
                    });
                    resolved.push(artist);
                }
                None => {
                    tracing::warn!(
                        "No artist found for '{}' after {} attempts, skipping",
                        name,
                        self.options.max_retries
                    );
                    self.observer
                        .notify(&ProgressEvent::ArtistDropped { name: name.clone() });
                }
            }
        }

        tracing::debug!("Resolved {}/{} artists", resolved.len(), total);
        resolved
    }

    async fn resolve_one(&self, name: &str) -> Option<ArtistId> {
        let query = artist_query(name);

        for attempt in 1..=self.options.max_retries {
            let reason = match self.search.search_artists(&query).await {
                Ok(hits) => match hits.into_iter().next() {
                    Some(artist) => {
                        tracing::debug!("'{}' resolved to {}", name, artist);
                        return Some(artist);
                    }
                    None => RetryReason::NoMatch,
                },
                // Transient failures only burn an attempt.
                Err(e) => {
                    tracing::debug!("Search for '{}' failed: {}", name, e);
                    RetryReason::SearchFailed(e.to_string())
                }
            };

            self.observer.notify(&ProgressEvent::ArtistRetry {
                name: name.to_string(),
                attempt,
                max_retries: self.options.max_retries,
                reason,
            });
            tokio::time::sleep(self.options.retry_delay).await;
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::{PipelineError, Result};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Scripted answers per query; once a script runs out the last answer repeats.
    struct ScriptedSearch {
        scripts: Mutex<HashMap<String, Vec<Option<&'static str>>>>,
        queries: Mutex<Vec<String>>,
    }

    impl ScriptedSearch {
        fn new(scripts: &[(&str, Vec<Option<&'static str>>)]) -> Self {
            Self {
                scripts: Mutex::new(
                    scripts
                        .iter()
                        .map(|(query, answers)| (query.to_string(), answers.clone()))
                        .collect(),
                ),
                queries: Mutex::new(Vec::new()),
            }
        }

        fn query_count(&self, query: &str) -> usize {
            self.queries
                .lock()
                .unwrap()
                .iter()
                .filter(|q| q.as_str() == query)
                .count()
        }
    }

    #[async_trait]
    impl ArtistSearch for ScriptedSearch {
        async fn search_artists(&self, query: &str) -> Result<Vec<ArtistId>> {
            self.queries.lock().unwrap().push(query.to_string());
            let mut scripts = self.scripts.lock().unwrap();
            let answer = match scripts.get_mut(query) {
                Some(answers) if answers.len() > 1 => answers.remove(0),
                Some(answers) => answers.first().copied().flatten(),
                None => Some("empty"),
            };
            match answer {
                None => Err(PipelineError::ApiStatusError {
                    endpoint: "/search".to_string(),
                    status: 502,
                    message: "bad gateway".to_string(),
                }),
                Some("empty") => Ok(Vec::new()),
                Some(uri) => Ok(vec![
                    ArtistId(uri.to_string()),
                    ArtistId("spotify:artist:ignored".to_string()),
                ]),
            }
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<ProgressEvent>>,
    }

    impl ProgressObserver for RecordingObserver {
        fn notify(&self, event: &ProgressEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn names(list: &[&str]) -> Vec<ArtistName> {
        list.iter().map(|n| n.to_string()).collect()
    }

    fn options(max_retries: u32) -> ResolveOptions {
        ResolveOptions {
            max_retries,
            retry_delay: Duration::from_millis(500),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolves_in_input_order_and_skips_unknown() {
        let search = ScriptedSearch::new(&[
            ("artist:metallica", vec![Some("spotify:artist:metallica")]),
            ("artist:unknown band", vec![Some("empty")]),
            ("artist:ghost", vec![Some("spotify:artist:ghost")]),
        ]);
        let observer = RecordingObserver::default();
        let resolver = ArtistResolver::new(&search, options(3), &observer);

        let input = names(&["Ghost", "Unknown Band", "Metallica"]);
        let resolved = resolver.resolve(&input).await;

        assert!(resolved.len() <= input.len());
        assert_eq!(
            resolved,
            vec![
                ArtistId("spotify:artist:ghost".to_string()),
                ArtistId("spotify:artist:metallica".to_string()),
            ]
        );
        assert_eq!(search.query_count("artist:unknown band"), 3);

        let events = observer.events.lock().unwrap();
        assert!(events.contains(&ProgressEvent::ArtistDropped {
            name: "Unknown Band".to_string()
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_wait_between_attempts() {
        let search = ScriptedSearch::new(&[("artist:nobody", vec![Some("empty")])]);
        let observer = RecordingObserver::default();
        let resolver = ArtistResolver::new(&search, options(4), &observer);

        let started = tokio::time::Instant::now();
        let resolved = resolver.resolve(&names(&["Nobody"])).await;

        assert!(resolved.is_empty());
        assert!(started.elapsed() >= Duration::from_millis(4 * 500));
        assert_eq!(search.query_count("artist:nobody"), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_match_after_empty_result_retry() {
        let search = ScriptedSearch::new(&[(
            "artist:heilung",
            vec![Some("empty"), Some("empty"), Some("spotify:artist:heilung")],
        )]);
        let observer = RecordingObserver::default();
        let resolver = ArtistResolver::new(&search, options(8), &observer);

        let resolved = resolver.resolve(&names(&["Heilung"])).await;

        assert_eq!(resolved, vec![ArtistId("spotify:artist:heilung".to_string())]);
        assert_eq!(search.query_count("artist:heilung"), 3);
        let retries = observer
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::ArtistRetry { reason: RetryReason::NoMatch, .. }))
            .count();
        assert_eq!(retries, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_errors_consume_retries_without_aborting() {
        let search = ScriptedSearch::new(&[
            ("artist:flaky", vec![None]),
            ("artist:solid", vec![Some("spotify:artist:solid")]),
        ]);
        let observer = RecordingObserver::default();
        let resolver = ArtistResolver::new(&search, options(2), &observer);

        let resolved = resolver.resolve(&names(&["Flaky", "Solid"])).await;

        assert_eq!(resolved, vec![ArtistId("spotify:artist:solid".to_string())]);
        assert_eq!(search.query_count("artist:flaky"), 2);
        let events = observer.events.lock().unwrap();
        assert!(matches!(
            &events[0],
            ProgressEvent::ArtistRetry {
                attempt: 1,
                reason: RetryReason::SearchFailed(_),
                ..
            }
        ));
    }

    #[test]
    fn test_query_is_lowercased() {
        assert_eq!(artist_query("Amon Amarth"), "artist:amon amarth");
    }
}
