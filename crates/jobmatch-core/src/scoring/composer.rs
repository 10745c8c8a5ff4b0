//! Score composition
//!
//! A total function: every input produces a result, out-of-range similarity
//! is clamped.

use std::collections::{BTreeSet, HashSet};

use super::weights::{
    ScoreWeights, ADJACENT_LEVEL_SCORE, DEFAULT_WEIGHTS, PREFERRED_SKILL_WEIGHT, REQUIRED_SKILL_WEIGHT,
};
use crate::model::{normalize_skill, CandidateProfile, JobLevel, JobPosting, MatchResult};

/// Candidate attributes derived once per request
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedCandidate {
    skills: BTreeSet<String>,
    experience_years: f64,
    level: JobLevel,
}

impl PreparedCandidate {
    pub fn new(candidate: &CandidateProfile) -> Self {
        let experience_years = if candidate.experience_years.is_finite() {
            candidate.experience_years.max(0.0)
        } else {
            0.0
        };
        Self {
            skills: candidate.skill_pool(),
            experience_years,
            level: JobLevel::from_experience(experience_years),
        }
    }

    /// Level inferred from years of experience
    pub fn level(&self) -> JobLevel {
        self.level
    }

    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.contains(&normalize_skill(skill))
    }
}

/// Weighted, explainable match scoring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreComposer {
    weights: ScoreWeights,
}

impl Default for ScoreComposer {
    fn default() -> Self {
        Self::new(DEFAULT_WEIGHTS)
    }
}

impl ScoreComposer {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Score `job` for `candidate` given their embedding similarity
    pub fn compose(&self, candidate: &CandidateProfile, job: &JobPosting, similarity: f64) -> MatchResult {
        self.compose_prepared(&PreparedCandidate::new(candidate), job, similarity)
    }

    /// Same as [`ScoreComposer::compose`] with candidate signals computed up front
    pub fn compose_prepared(&self, candidate: &PreparedCandidate, job: &JobPosting, similarity: f64) -> MatchResult {
        let similarity = clamp_unit(similarity);

        let required = skill_names(&job.required_skills);
        let preferred = skill_names(&job.preferred_skills);
        let matched_required: BTreeSet<String> =
            required.iter().filter(|s| candidate.has_skill(s)).cloned().collect();
        let matched_preferred: BTreeSet<String> =
            preferred.iter().filter(|s| candidate.has_skill(s)).cloned().collect();
        let missing: BTreeSet<String> = required.difference(&matched_required).cloned().collect();

        let skill_score = skill_score(
            matched_required.len(),
            required.len(),
            matched_preferred.len(),
            preferred.len(),
        );
        let experience_score = experience_score(candidate.experience_years, job.level);
        let level_score = level_score(candidate.level, job.level);

        let w = &self.weights;
        let total = w.similarity * 100.0 * similarity
            + w.skills * skill_score
            + w.experience * experience_score
            + w.level * level_score;

        MatchResult {
            job_id: job.id.clone(),
            total_score: total.round().clamp(0.0, 100.0),
            skill_score,
            experience_score,
            level_score,
            similarity,
            missing_skills: missing,
            matched_required_skills: matched_required,
            matched_preferred_skills: matched_preferred,
        }
    }
}

/// Non-blank skills, one per normalized name, keeping the first spelling
fn skill_names(skills: &BTreeSet<String>) -> BTreeSet<String> {
    let mut seen = HashSet::new();
    skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && seen.insert(normalize_skill(s)))
        .map(str::to_string)
        .collect()
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

/// Overlap with required skills counted double; 100 when the posting lists none
pub fn skill_score(matched_required: usize, required: usize, matched_preferred: usize, preferred: usize) -> f64 {
    let denominator = REQUIRED_SKILL_WEIGHT * required as f64 + PREFERRED_SKILL_WEIGHT * preferred as f64;
    if denominator == 0.0 {
        return 100.0;
    }
    let numerator =
        REQUIRED_SKILL_WEIGHT * matched_required as f64 + PREFERRED_SKILL_WEIGHT * matched_preferred as f64;
    (100.0 * numerator / denominator).clamp(0.0, 100.0)
}

/// 100 at or above the level minimum, linear down to 0 at zero years
pub fn experience_score(years: f64, level: JobLevel) -> f64 {
    let minimum = level.min_years();
    if minimum <= 0.0 || years >= minimum {
        return 100.0;
    }
    (100.0 * years.max(0.0) / minimum).clamp(0.0, 100.0)
}

/// 100 for the same level, 50 one rung apart, 0 otherwise
pub fn level_score(candidate: JobLevel, job: JobLevel) -> f64 {
    match candidate.distance(job) {
        0 => 100.0,
        1 => ADJACENT_LEVEL_SCORE,
        _ => 0.0,
    }
}

// ============================================================================
// TESTS
// ============================================================================
