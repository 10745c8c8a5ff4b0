//! Match result

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Explainable score of one posting for one candidate
///
/// Built per request and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub job_id: String,
    /// Weighted total in [0, 100], rounded to a whole number
    pub total_score: f64,
    pub skill_score: f64,
    pub experience_score: f64,
    pub level_score: f64,
    /// Clamped cosine similarity that fed the semantic component
    pub similarity: f64,
    /// Required skills the candidate lacks, in the posting's spelling
    pub missing_skills: BTreeSet<String>,
    pub matched_required_skills: BTreeSet<String>,
    pub matched_preferred_skills: BTreeSet<String>,
}
