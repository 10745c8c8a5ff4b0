//! Mock providers and test data

mod embedders;
mod fixtures;

pub use embedders::{ConstantEmbedder, FailingEmbedder, KeywordEmbedder};
pub use fixtures::{senior_python_engineer, PostingFactory};
