//! End-to-end test support for JobMatch
//!
//! - `harness`: services over throwaway data directories
//! - `mocks`: deterministic embedding providers and posting factories

pub mod harness;
pub mod mocks;

pub use harness::TestService;
pub use mocks::{senior_python_engineer, ConstantEmbedder, FailingEmbedder, KeywordEmbedder, PostingFactory};
