//! Candidate profile

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{normalize_skill, EducationLevel, Industry, Region, ValidationError};

/// A candidate as produced by the résumé analysis step
///
/// Passed by shared reference for the whole of a match request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CandidateProfile {
    #[serde(default)]
    pub technical_skills: BTreeSet<String>,
    #[serde(default)]
    pub soft_skills: BTreeSet<String>,
    #[serde(default)]
    pub experience_years: f64,
    #[serde(default)]
    pub education_level: EducationLevel,
    #[serde(default)]
    pub preferred_regions: BTreeSet<Region>,
    #[serde(default)]
    pub preferred_industries: BTreeSet<Industry>,
    /// Desired role, folded into the embedding text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default)]
    pub raw_text: String,
}

impl CandidateProfile {
    /// Create a profile from technical skills and years of experience
    pub fn new<I, S>(technical_skills: I, experience_years: f64) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let profile = Self {
            technical_skills: technical_skills.into_iter().map(Into::into).collect(),
            experience_years,
            ..Self::default()
        };
        profile.validate()?;
        Ok(profile)
    }

    pub fn with_soft_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.soft_skills = skills.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_education(mut self, level: EducationLevel) -> Self {
        self.education_level = level;
        self
    }

    pub fn with_job_title(mut self, title: impl Into<String>) -> Self {
        self.job_title = Some(title.into());
        self
    }

    pub fn with_raw_text(mut self, text: impl Into<String>) -> Self {
        self.raw_text = text.into();
        self
    }

    pub fn prefer_region(mut self, region: Region) -> Self {
        self.preferred_regions.insert(region);
        self
    }

    pub fn prefer_industry(mut self, industry: Industry) -> Self {
        self.preferred_industries.insert(industry);
        self
    }

    /// Check invariants that serde cannot express
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.experience_years.is_finite() || self.experience_years < 0.0 {
            return Err(ValidationError::OutOfRange {
                field: "experience_years",
                reason: format!("expected a finite value >= 0, got {}", self.experience_years),
            });
        }
        Ok(())
    }

    /// Normalized technical and soft skills, the pool matched against postings
    pub fn skill_pool(&self) -> BTreeSet<String> {
        self.technical_skills
            .iter()
            .chain(self.soft_skills.iter())
            .map(|s| normalize_skill(s))
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Text handed to the embedding provider
    ///
    /// Fields are emitted in a fixed order so the same profile always
    /// produces the same text.
    pub fn embedding_text(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        if let Some(title) = self.job_title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            parts.push(title.to_string());
        }
        if !self.technical_skills.is_empty() {
            parts.push(format!("Skills: {}", join(&self.technical_skills)));
        }
        if !self.soft_skills.is_empty() {
            parts.push(format!("Soft skills: {}", join(&self.soft_skills)));
        }
        parts.push(format!("Experience: {} years", self.experience_years));
        if self.education_level != EducationLevel::Unspecified {
            parts.push(format!("Education: {}", self.education_level));
        }
        if !self.preferred_industries.is_empty() {
            let names: Vec<&str> = self.preferred_industries.iter().map(|i| i.as_str()).collect();
            parts.push(format!("Industries: {}", names.join(", ")));
        }
        if !self.preferred_regions.is_empty() {
            let names: Vec<&str> = self.preferred_regions.iter().map(|r| r.as_str()).collect();
            parts.push(format!("Regions: {}", names.join(", ")));
        }
        let raw = self.raw_text.trim();
        if !raw.is_empty() {
            parts.push(raw.to_string());
        }

        parts.join("\n")
    }
}

fn join(set: &BTreeSet<String>) -> String {
    set.iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
