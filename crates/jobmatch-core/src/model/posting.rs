//! Job posting

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Industry, JobLevel, Region, ValidationError};

/// Advertised salary band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: f64,
    pub max: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl SalaryRange {
    pub fn new(min: f64, max: f64, currency: impl Into<String>) -> Result<Self, ValidationError> {
        let range = Self {
            min,
            max,
            currency: currency.into(),
        };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min < 0.0 {
            return Err(ValidationError::OutOfRange {
                field: "salary_range",
                reason: "bounds must be finite and non-negative".to_string(),
            });
        }
        if self.min > self.max {
            return Err(ValidationError::OutOfRange {
                field: "salary_range",
                reason: format!("min {} exceeds max {}", self.min, self.max),
            });
        }
        Ok(())
    }
}

/// A job posting as fed to the index builder
///
/// The embedding is never part of the posting input. It is derived by the
/// builder and stored next to the posting in the index and the job store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub company: String,
    pub region: Region,
    pub industry: Industry,
    pub level: JobLevel,
    #[serde(default)]
    pub required_skills: BTreeSet<String>,
    #[serde(default)]
    pub preferred_skills: BTreeSet<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_range: Option<SalaryRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub remote: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_at: Option<DateTime<Utc>>,
}

impl JobPosting {
    /// Minimal posting; the remaining fields are filled with the `with_*` helpers
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        region: Region,
        industry: Industry,
        level: JobLevel,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            company: String::new(),
            region,
            industry,
            level,
            required_skills: BTreeSet::new(),
            preferred_skills: BTreeSet::new(),
            description: String::new(),
            salary_range: None,
            location: None,
            url: None,
            remote: false,
            posted_at: None,
        }
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = company.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_required_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_skills = skills.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_preferred_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferred_skills = skills.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_salary(mut self, salary: SalaryRange) -> Self {
        self.salary_range = Some(salary);
        self
    }

    pub fn with_location(mut self, location: impl Into<String>, remote: bool) -> Self {
        self.location = Some(location.into());
        self.remote = remote;
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::Empty("id"));
        }
        if self.title.trim().is_empty() {
            return Err(ValidationError::Empty("title"));
        }
        if let Some(salary) = &self.salary_range {
            salary.validate()?;
        }
        Ok(())
    }

    /// Text handed to the embedding provider: title, description, required
    /// skills, preferred skills, in that order
    pub fn embedding_text(&self) -> String {
        let mut parts = vec![self.title.trim().to_string()];
        let description = self.description.trim();
        if !description.is_empty() {
            parts.push(description.to_string());
        }
        if !self.required_skills.is_empty() {
            parts.push(format!("Required skills: {}", join(&self.required_skills)));
        }
        if !self.preferred_skills.is_empty() {
            parts.push(format!("Preferred skills: {}", join(&self.preferred_skills)));
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
