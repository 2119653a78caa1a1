/// External adapter (embedding / text generation) errors.
///
/// Adapters are unreliable by contract: every variant is retryable from the
/// caller's point of view except `MalformedVector`, which marks the item
/// failed for the cycle.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("{provider} timed out after {after_ms}ms")]
    Timeout { provider: String, after_ms: u64 },

    #[error("{provider} call failed: {reason}")]
    Failed { provider: String, reason: String },

    #[error("{provider} returned a malformed vector: expected {expected} dims, got {actual}")]
    MalformedVector {
        provider: String,
        expected: usize,
        actual: usize,
    },
}
