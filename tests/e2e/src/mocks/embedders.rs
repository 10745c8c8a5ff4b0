//! Deterministic embedding providers
//!
//! Real models make similarity values opaque to assertions. These providers
//! produce vectors whose geometry a test can reason about directly.

use std::sync::atomic::{AtomicUsize, Ordering};

use jobmatch_core::{Embedding, EmbeddingError, EmbeddingProvider};

fn normalized(mut vector: Vec<f32>) -> Embedding {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|x| *x /= norm);
    }
    Embedding::new(vector)
}

/// Every text maps to the same unit vector
pub struct ConstantEmbedder {
    dimensions: usize,
    calls: AtomicUsize,
}

impl ConstantEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of texts embedded so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingProvider for ConstantEmbedder {
    fn model_name(&self) -> &str {
        "test/constant"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput("empty text".to_string()));
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(normalized(vec![1.0; self.dimensions]))
    }
}

/// One axis per keyword; a text points along the axes of the keywords it mentions
///
/// The last axis carries a small constant so texts without any keyword still
/// embed to a usable vector.
pub struct KeywordEmbedder {
    keywords: Vec<String>,
}

impl KeywordEmbedder {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(|k| k.into().to_lowercase()).collect(),
        }
    }
}

impl EmbeddingProvider for KeywordEmbedder {
    fn model_name(&self) -> &str {
        "test/keywords"
    }

    fn dimensions(&self) -> usize {
        self.keywords.len() + 1
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput("empty text".to_string()));
        }
        let lower = text.to_lowercase();
        let mut vector: Vec<f32> = self
            .keywords
            .iter()
            .map(|k| if lower.contains(k.as_str()) { 1.0 } else { 0.0 })
            .collect();
        vector.push(0.1);
        Ok(normalized(vector))
    }
}

/// Fails on any text containing the marker; hashes everything else
pub struct FailingEmbedder {
    marker: String,
    dimensions: usize,
}

impl FailingEmbedder {
    pub fn new(marker: impl Into<String>, dimensions: usize) -> Self {
        Self {
            marker: marker.into(),
            dimensions,
        }
    }
}

impl EmbeddingProvider for FailingEmbedder {
    fn model_name(&self) -> &str {
        "test/failing"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        if text.contains(&self.marker) {
            return Err(EmbeddingError::Backend(format!("refused text containing {}", self.marker)));
        }
        let seed = text.len() as f32;
        Ok(normalized(
            (0..self.dimensions).map(|i| ((i as f32 + seed) * 0.37).sin() + 1.5).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_axes() {
        let embedder = KeywordEmbedder::new(["python", "rust"]);
        let python = embedder.embed("Senior Python Engineer").unwrap();
        let rust = embedder.embed("Rust developer").unwrap();
        assert_eq!(python.dimensions, 3);
        assert!(python.is_normalized());
        assert!(python.vector[0] > 0.9);
        assert_eq!(python.vector[1], 0.0);
        assert!(rust.vector[1] > 0.9);
    }

    #[test]
    fn test_failing_marker() {
        let embedder = FailingEmbedder::new("FAIL", 8);
        assert!(embedder.embed("FAIL here").is_err());
        assert!(embedder.embed("fine").unwrap().is_normalized());
    }
}
