//! Bounded embedding workers.
//!
//! One item's embedding call is the unit of retry and cancellation:
//! semaphore-bounded concurrency, per-call timeout, exponential backoff,
//! and a per-item verdict that never takes the batch down with it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, warn};

use insight_core::config::RefreshConfig;
use insight_core::errors::AdapterError;
use insight_core::models::Modality;
use insight_core::traits::EmbeddingProvider;

use crate::cancel::CancelToken;

/// One embedding unit of work.
#[derive(Debug, Clone)]
pub struct EmbedJob {
    pub item_id: String,
    pub modality: Modality,
    pub content: String,
    pub content_hash: String,
}

/// Per-item verdict from the worker pool.
pub struct EmbedResult {
    pub job: EmbedJob,
    pub result: Result<Vec<f32>, AdapterError>,
}

/// Run every job through the provider with bounded concurrency.
///
/// Results come back in completion order; each job resolves to either a
/// vector or the error that exhausted its retries.
pub async fn embed_all(
    provider: Arc<dyn EmbeddingProvider>,
    jobs: Vec<EmbedJob>,
    config: &RefreshConfig,
    cancel: &CancelToken,
) -> Vec<EmbedResult> {
    let semaphore = Arc::new(Semaphore::new(config.max_concurrent_embeds.max(1)));
    let mut handles = Vec::with_capacity(jobs.len());

    for job in jobs {
        let provider = provider.clone();
        let semaphore = semaphore.clone();
        let cancel = cancel.clone();
        let config = config.clone();
        handles.push(tokio::spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return EmbedResult {
                    result: Err(AdapterError::Failed {
                        provider: provider.name().to_string(),
                        reason: "worker pool shut down".to_string(),
                    }),
                    job,
                };
            };
            embed_with_retry(provider, job, &config, &cancel).await
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok(result) => results.push(result),
            Err(e) => warn!(error = %e, "embedding worker task failed"),
        }
    }
    results
}

async fn embed_with_retry(
    provider: Arc<dyn EmbeddingProvider>,
    job: EmbedJob,
    config: &RefreshConfig,
    cancel: &CancelToken,
) -> EmbedResult {
    let mut attempt = 0u32;
    loop {
        if cancel.is_cancelled() {
            return EmbedResult {
                result: Err(AdapterError::Failed {
                    provider: provider.name().to_string(),
                    reason: "cycle cancelled".to_string(),
                }),
                job,
            };
        }

        match embed_once(&provider, &job, config.embed_timeout_ms).await {
            Ok(vector) => {
                return EmbedResult {
                    result: Ok(vector),
                    job,
                }
            }
            Err(e) if attempt < config.max_retries && retryable(&e) => {
                let delay = backoff_delay(config.backoff_base_ms, attempt);
                debug!(
                    item_id = %job.item_id,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "embedding call failed, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                return EmbedResult {
                    result: Err(e),
                    job,
                }
            }
        }
    }
}

/// One provider call on the blocking pool, bounded by the configured
/// timeout. Vectors that contradict the provider's own advertised
/// dimensionality are rejected as malformed.
async fn embed_once(
    provider: &Arc<dyn EmbeddingProvider>,
    job: &EmbedJob,
    timeout_ms: u64,
) -> Result<Vec<f32>, AdapterError> {
    let call_provider = provider.clone();
    let content = job.content.clone();
    let modality = job.modality;
    let call = tokio::task::spawn_blocking(move || call_provider.embed(&content, modality));

    match timeout(Duration::from_millis(timeout_ms), call).await {
        Ok(Ok(result)) => {
            let expected = provider.dimensions(job.modality);
            match result {
                Ok(vector) if vector.len() != expected => Err(AdapterError::MalformedVector {
                    provider: provider.name().to_string(),
                    expected,
                    actual: vector.len(),
                }),
                other => other,
            }
        }
        Ok(Err(join_err)) => Err(AdapterError::Failed {
            provider: provider.name().to_string(),
            reason: format!("embedding task aborted: {join_err}"),
        }),
        Err(_) => Err(AdapterError::Timeout {
            provider: provider.name().to_string(),
            after_ms: timeout_ms,
        }),
    }
}

/// A malformed vector will not improve on retry; everything else might.
fn retryable(error: &AdapterError) -> bool {
    !matches!(error, AdapterError::MalformedVector { .. })
}

/// Exponential backoff: `base * 2^attempt`, exponent capped to keep the
/// delay finite.
pub(crate) fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    Duration::from_millis(base_ms.saturating_mul(1u64 << attempt.min(10)))
}
