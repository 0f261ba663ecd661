use crate::domain::model::Phase;
use crate::utils::error::{PipelineError, Result};
use std::future::Future;
use std::time::Duration;

/// Runs `work` under a wall-clock deadline. When the deadline passes the work
/// is dropped and the phase fails with `TimedOut`; partial results are lost.
pub async fn with_deadline<F, T>(phase: Phase, limit: Duration, work: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, work).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("{} exceeded its {:?} deadline", phase, limit);
            Err(PipelineError::TimedOut { phase, limit })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_slow_phase_times_out() {
        let result: Result<()> = with_deadline(Phase::CollectTracks, Duration::from_secs(5), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;

        match result {
            Err(PipelineError::TimedOut { phase, limit }) => {
                assert_eq!(phase, Phase::CollectTracks);
                assert_eq!(limit, Duration::from_secs(5));
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_phase_passes_result_through() {
        let value = with_deadline(Phase::FetchLineup, Duration::from_secs(5), async { Ok(42) })
            .await
            .unwrap();
        assert_eq!(value, 42);

        let failed: Result<()> = with_deadline(Phase::FetchLineup, Duration::from_secs(5), async {
            Err(PipelineError::LineupError {
                message: "empty".to_string(),
            })
        })
        .await;
        tokio_test::assert_err!(failed);
    }
}
