//! Data model
//!
//! Candidate profiles, job postings, match results and the closed taxonomies
//! used for hard filtering.

mod candidate;
mod posting;
mod result;
mod taxonomy;

pub use candidate::CandidateProfile;
pub use posting::{JobPosting, SalaryRange};
pub use result::MatchResult;
pub use taxonomy::{EducationLevel, Industry, JobLevel, Region};

/// Input rejected at the model boundary
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// String outside a closed taxonomy
    #[error("unknown {kind}: '{value}'")]
    UnknownVariant { kind: &'static str, value: String },
    /// Required field missing or blank
    #[error("{0} must not be empty")]
    Empty(&'static str),
    /// Numeric field outside its domain
    #[error("{field} is out of range: {reason}")]
    OutOfRange { field: &'static str, reason: String },
}

/// Canonical form used for skill comparison: trimmed, lowercased, inner
/// whitespace collapsed to single spaces
pub fn normalize_skill(skill: &str) -> String {
    skill.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}
