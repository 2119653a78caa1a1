use crate::errors::AdapterError;
use crate::models::Modality;

/// Embedding generation provider.
///
/// Callers treat it as unreliable: timeouts, rate limits, and
/// over-dimension vectors are all expected failure modes.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single piece of content for the given modality.
    fn embed(&self, content: &str, modality: Modality) -> Result<Vec<f32>, AdapterError>;

    /// The dimensionality this provider produces for a modality.
    fn dimensions(&self, modality: Modality) -> usize;

    /// Human-readable provider name.
    fn name(&self) -> &str;
}
