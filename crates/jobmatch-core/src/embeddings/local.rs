//! Local Semantic Embeddings
//!
//! Uses fastembed v5 for local ONNX inference.
//!
//! ## Models
//!
//! - **Default**: Nomic Embed Text v1.5 (768d → 256d Matryoshka, 8192 context)
//! - all-MiniLM-L6-v2 (384d), the model the matching pipeline was tuned on
//! - BGE small en v1.5 (384d)
//!
//! The model is loaded lazily, once per embedder instance.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use super::{finalize_vector, prepare_input, Embedding, EmbeddingError, EmbeddingProvider, BATCH_SIZE, MAX_TEXT_LENGTH};
use crate::config::LocalModel;

/// Get the default cache directory for fastembed models
/// Uses FASTEMBED_CACHE_PATH env var, or falls back to platform cache directory
fn default_cache_dir() -> PathBuf {
    if let Ok(path) = std::env::var("FASTEMBED_CACHE_PATH") {
        return PathBuf::from(path);
    }

    if let Some(proj_dirs) = directories::ProjectDirs::from("com", "jobmatch", "core") {
        return proj_dirs.cache_dir().join("fastembed");
    }

    if let Some(base_dirs) = directories::BaseDirs::new() {
        return base_dirs.home_dir().join(".cache/jobmatch/fastembed");
    }

    PathBuf::from(".fastembed_cache")
}

fn fastembed_model(model: LocalModel) -> EmbeddingModel {
    match model {
        LocalModel::NomicEmbedTextV15 => EmbeddingModel::NomicEmbedTextV15,
        LocalModel::AllMiniLmL6V2 => EmbeddingModel::AllMiniLML6V2,
        LocalModel::BgeSmallEnV15 => EmbeddingModel::BGESmallENV15,
    }
}

/// Apply Matryoshka truncation to the model's output dimension
///
/// Nomic v1.5 is trained so the first N dimensions of its 768-dim output are
/// themselves a valid N-dim embedding. Normalization happens afterwards in
/// `finalize_vector`.
#[inline]
fn matryoshka_truncate(mut vector: Vec<f32>, dimensions: usize) -> Vec<f32> {
    if vector.len() > dimensions {
        vector.truncate(dimensions);
    }
    vector
}

/// fastembed-backed provider
pub struct LocalEmbedder {
    model: LocalModel,
    cache_dir: PathBuf,
    max_chars: usize,
    inner: OnceLock<Result<Mutex<TextEmbedding>, String>>,
}

impl LocalEmbedder {
    pub fn new(model: LocalModel) -> Self {
        Self {
            model,
            cache_dir: default_cache_dir(),
            max_chars: MAX_TEXT_LENGTH,
            inner: OnceLock::new(),
        }
    }

    pub fn with_cache_dir(mut self, cache_dir: PathBuf) -> Self {
        self.cache_dir = cache_dir;
        self
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars.max(1);
        self
    }

    /// Load the model now instead of on first use
    pub fn init(&self) -> Result<(), EmbeddingError> {
        self.model_handle().map(|_| ())
    }

    fn model_handle(&self) -> Result<&Mutex<TextEmbedding>, EmbeddingError> {
        let result = self.inner.get_or_init(|| {
            if let Err(e) = std::fs::create_dir_all(&self.cache_dir) {
                tracing::warn!("Failed to create cache directory {:?}: {}", self.cache_dir, e);
            }

            tracing::info!(model = self.model.model_id(), "Loading embedding model");
            let options = InitOptions::new(fastembed_model(self.model))
                .with_show_download_progress(false)
                .with_cache_dir(self.cache_dir.clone());

            TextEmbedding::try_new(options).map(Mutex::new).map_err(|e| {
                format!(
                    "Failed to initialize {}: {}. \
                    Ensure ONNX runtime is available and model files can be downloaded.",
                    self.model.model_id(),
                    e
                )
            })
        });

        result
            .as_ref()
            .map_err(|err| EmbeddingError::ModelInit(err.clone()))
    }

    fn run(&self, texts: Vec<&str>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let handle = self.model_handle()?;
        let mut model = handle
            .lock()
            .map_err(|e| EmbeddingError::ModelInit(format!("Lock poisoned: {}", e)))?;
        model
            .embed(texts, None)
            .map_err(|e| EmbeddingError::Backend(e.to_string()))
    }
}

impl EmbeddingProvider for LocalEmbedder {
    fn model_name(&self) -> &str {
        self.model.model_id()
    }

    fn dimensions(&self) -> usize {
        self.model.dimensions()
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let text = prepare_input(text, self.max_chars)?;
        let mut output = self.run(vec![text])?;
        let vector = output
            .pop()
            .ok_or_else(|| EmbeddingError::Backend("No embedding generated".to_string()))?;
        finalize_vector(matryoshka_truncate(vector, self.dimensions()), self.dimensions())
    }

    fn embed_batch(&self, texts: &[&str]) -> Vec<Result<Embedding, EmbeddingError>> {
        let mut results: Vec<Result<Embedding, EmbeddingError>> = Vec::with_capacity(texts.len());
        let prepared: Vec<Result<&str, EmbeddingError>> =
            texts.iter().map(|t| prepare_input(t, self.max_chars)).collect();

        for chunk in prepared.chunks(BATCH_SIZE) {
            let valid: Vec<&str> = chunk.iter().filter_map(|p| p.as_ref().ok().copied()).collect();
            let mut vectors = if valid.is_empty() {
                Ok(Vec::new().into_iter())
            } else {
                self.run(valid).map(Vec::into_iter)
            };

            for item in chunk {
                let outcome = match (item, &mut vectors) {
                    (Err(e), _) => Err(e.clone()),
                    (Ok(_), Err(e)) => Err(e.clone()),
                    (Ok(_), Ok(iter)) => match iter.next() {
                        Some(v) => finalize_vector(matryoshka_truncate(v, self.dimensions()), self.dimensions()),
                        None => Err(EmbeddingError::Backend("No embedding generated".to_string())),
                    },
                };
                results.push(outcome);
            }
        }

        results
    }
}
