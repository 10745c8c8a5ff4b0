//! Feature-hashing embedder
//!
//! Needs no model download. Tokens are hashed into a fixed number of buckets
//! with signed SipHash-1-3 under fixed keys, so vectors are stable across
//! processes, platforms and Rust versions.

use std::hash::{Hash, Hasher};

use siphasher::sip::SipHasher13;

use super::{finalize_vector, prepare_input, Embedding, EmbeddingError, EmbeddingProvider, MAX_TEXT_LENGTH};

/// Default bucket count
pub const DEFAULT_HASH_DIMENSIONS: usize = 256;

// Changing either key changes every stored vector; bump MODEL_NAME with it.
const HASH_SEED_K0: u64 = 0x6a6f_626d_6174_6368;
const HASH_SEED_K1: u64 = 0x7365_6d61_6e74_6963;

const MODEL_NAME: &str = "jobmatch/feature-hash-v1";

/// Weight of adjacent-token bigrams relative to unigrams
const BIGRAM_WEIGHT: f32 = 0.5;

/// Deterministic bag-of-words embedder
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
    max_chars: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_DIMENSIONS)
    }
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
            max_chars: MAX_TEXT_LENGTH,
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars.max(1);
        self
    }

    fn hash(&self, token: &str, salt: u8) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(HASH_SEED_K0, HASH_SEED_K1);
        salt.hash(&mut hasher);
        token.hash(&mut hasher);
        hasher.finish()
    }

    fn accumulate(&self, vector: &mut [f32], token: &str, weight: f32) {
        let bucket = (self.hash(token, 0) % self.dimensions as u64) as usize;
        let sign = if self.hash(token, 1) & 1 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

/// Lowercased alphanumeric runs; `+` and `#` stay attached so C++ and C# survive
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

impl EmbeddingProvider for HashEmbedder {
    fn model_name(&self) -> &str {
        MODEL_NAME
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let text = prepare_input(text, self.max_chars)?;
        let mut vector = vec![0.0f32; self.dimensions];

        let tokens = tokenize(text);
        if tokens.is_empty() {
            // Punctuation-only input still gets a stable, non-zero vector
            self.accumulate(&mut vector, text.trim(), 1.0);
        }
        for token in &tokens {
            self.accumulate(&mut vector, token, 1.0);
        }
        for pair in tokens.windows(2) {
            self.accumulate(&mut vector, &format!("{} {}", pair[0], pair[1]), BIGRAM_WEIGHT);
        }

        // Opposite signs can cancel every bucket for tiny inputs
        if vector.iter().all(|x| *x == 0.0) {
            self.accumulate(&mut vector, text.trim(), 1.0);
        }

        finalize_vector(vector, self.dimensions)
    }
}
