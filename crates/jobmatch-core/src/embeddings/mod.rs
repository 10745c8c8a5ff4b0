//! Embedding Providers
//!
//! Turns candidate and posting text into fixed-length vectors. A provider is
//! an explicitly constructed value injected into the engine and builder, so
//! tests can swap in deterministic doubles.
//!
//! Backends:
//! - [`HashEmbedder`]: feature hashing, no model, fully deterministic
//! - [`LocalEmbedder`]: fastembed ONNX inference (feature `embeddings`)
//! - [`RemoteEmbedder`]: OpenAI-compatible HTTP endpoint (feature `remote-embeddings`)
//!
//! Every backend returns L2-normalized vectors.

mod hashing;
#[cfg(feature = "embeddings")]
mod local;
#[cfg(feature = "remote-embeddings")]
mod remote;

use std::sync::Arc;

pub use hashing::{HashEmbedder, DEFAULT_HASH_DIMENSIONS};
#[cfg(feature = "embeddings")]
pub use local::LocalEmbedder;
#[cfg(feature = "remote-embeddings")]
pub use remote::RemoteEmbedder;

use crate::config::{EmbeddingBackend, EmbeddingConfig};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Maximum characters passed to a model; longer input is cut at this boundary
pub const MAX_TEXT_LENGTH: usize = 8192;

/// Batch size for local batch inference
pub const BATCH_SIZE: usize = 32;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Embedding failure: bad input or an unavailable backend
///
/// The builder skips the affected posting; online callers may retry.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EmbeddingError {
    /// Empty, whitespace-only or non-text input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The model could not be loaded
    #[error("Model initialization failed: {0}")]
    ModelInit(String),
    /// The backend returned an error or a malformed vector
    #[error("Embedding generation failed: {0}")]
    Backend(String),
    /// The backend did not answer in time
    #[error("Embedding request timed out after {0} ms")]
    Timeout(u64),
}

// ============================================================================
// EMBEDDING TYPE
// ============================================================================

/// A unit-length embedding vector
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    /// The embedding vector
    pub vector: Vec<f32>,
    /// Dimensions of the vector
    pub dimensions: usize,
}

impl Embedding {
    /// Create a new embedding from a vector
    pub fn new(vector: Vec<f32>) -> Self {
        let dimensions = vector.len();
        Self { vector, dimensions }
    }

    /// Check if the embedding is normalized (unit length)
    pub fn is_normalized(&self) -> bool {
        let norm = self.vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        (norm - 1.0).abs() < 0.001
    }

    /// Convert to little-endian bytes for storage
    pub fn to_bytes(&self) -> Vec<u8> {
        self.vector.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Create from little-endian bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() || bytes.len() % 4 != 0 {
            return None;
        }
        let vector: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        Some(Self::new(vector))
    }
}

// ============================================================================
// PROVIDER TRAIT
// ============================================================================

/// Text to vector, constant dimension per instance
///
/// Identical text always yields a bit-identical vector.
pub trait EmbeddingProvider: Send + Sync {
    /// Identifier recorded next to stored embeddings
    fn model_name(&self) -> &str;

    /// Output dimension D
    fn dimensions(&self) -> usize;

    /// Embed one text
    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError>;

    /// Embed several texts; one failure never affects the others
    fn embed_batch(&self, texts: &[&str]) -> Vec<Result<Embedding, EmbeddingError>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

/// Build the provider selected by configuration
pub fn build_provider(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>, EmbeddingError> {
    match &config.backend {
        EmbeddingBackend::Hashing { dimensions } => {
            Ok(Arc::new(HashEmbedder::new(*dimensions).with_max_chars(config.max_text_chars)))
        }
        #[cfg(feature = "embeddings")]
        EmbeddingBackend::Local { model } => Ok(Arc::new(
            LocalEmbedder::new(*model).with_max_chars(config.max_text_chars),
        )),
        #[cfg(not(feature = "embeddings"))]
        EmbeddingBackend::Local { model } => Err(EmbeddingError::ModelInit(format!(
            "local model {} requested but the `embeddings` feature is disabled",
            model.model_id()
        ))),
        #[cfg(feature = "remote-embeddings")]
        EmbeddingBackend::Remote(remote) => Ok(Arc::new(
            RemoteEmbedder::new(remote.clone()).with_max_chars(config.max_text_chars),
        )),
        #[cfg(not(feature = "remote-embeddings"))]
        EmbeddingBackend::Remote(remote) => Err(EmbeddingError::ModelInit(format!(
            "remote endpoint {} requested but the `remote-embeddings` feature is disabled",
            remote.endpoint
        ))),
    }
}

// ============================================================================
// SHARED HELPERS
// ============================================================================

/// Reject unusable input and cut it at `max_chars` characters
///
/// The cut always lands on a char boundary, so the same text is always
/// truncated the same way.
pub fn prepare_input(text: &str, max_chars: usize) -> Result<&str, EmbeddingError> {
    if text.trim().is_empty() {
        return Err(EmbeddingError::InvalidInput("Text cannot be empty".to_string()));
    }
    if text.contains('\0') {
        return Err(EmbeddingError::InvalidInput(
            "Text contains NUL bytes".to_string(),
        ));
    }
    Ok(match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    })
}

/// Check a backend vector and L2-normalize it
pub fn finalize_vector(mut vector: Vec<f32>, expected: usize) -> Result<Embedding, EmbeddingError> {
    if vector.len() != expected {
        return Err(EmbeddingError::Backend(format!(
            "expected {} dimensions, backend returned {}",
            expected,
            vector.len()
        )));
    }
    if vector.iter().any(|x| !x.is_finite()) {
        return Err(EmbeddingError::Backend("vector contains non-finite values".to_string()));
    }
    if !l2_normalize(&mut vector) {
        return Err(EmbeddingError::Backend("backend returned a zero vector".to_string()));
    }
    Ok(Embedding::new(vector))
}

/// Scale to unit length in place; false when the norm is zero
pub fn l2_normalize(vector: &mut [f32]) -> bool {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 && norm.is_finite() {
        for x in vector.iter_mut() {
            *x /= norm;
        }
        true
    } else {
        false
    }
}

/// Dot product; cosine similarity for L2-normalized inputs
#[inline]
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

// ============================================================================
// TESTS
// ============================================================================
