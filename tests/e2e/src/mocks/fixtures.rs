//! Test Data Factory
//!
//! Generates postings for journey tests:
//! - Named scenarios with known scores
//! - Batches with predictable ids for stress and concurrency tests

use jobmatch_core::{Industry, JobLevel, JobPosting, Region};

/// Tech-sector senior role requiring {Python, Django, AWS} and preferring {SQL}
pub fn senior_python_engineer(id: &str) -> JobPosting {
    JobPosting::new(id, "Senior Python Engineer", Region::Mena, Industry::Technology, JobLevel::Senior)
        .with_company("Careem")
        .with_description("Build backend services for a ride-hailing platform")
        .with_required_skills(["Python", "Django", "AWS"])
        .with_preferred_skills(["SQL"])
}

/// Factory for batches of postings
///
/// # Example
///
/// ```rust,ignore
/// let postings = PostingFactory::new("A").count(50).build();
/// assert_eq!(postings[0].id, "A000");
/// ```
#[derive(Debug, Clone)]
pub struct PostingFactory {
    prefix: String,
    count: usize,
    regions: Vec<Region>,
    title: String,
}

impl PostingFactory {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            count: 10,
            regions: vec![Region::Mena],
            title: "Software Engineer".to_string(),
        }
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Assign regions round-robin
    pub fn regions(mut self, regions: impl IntoIterator<Item = Region>) -> Self {
        self.regions = regions.into_iter().collect();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn build(&self) -> Vec<JobPosting> {
        const LEVELS: [JobLevel; 4] = [JobLevel::Junior, JobLevel::Mid, JobLevel::Senior, JobLevel::Lead];
        (0..self.count)
            .map(|i| {
                let region = self.regions[i % self.regions.len().max(1)];
                JobPosting::new(
                    format!("{}{:03}", self.prefix, i),
                    format!("{} {}", self.title, i),
                    region,
                    Industry::Technology,
                    LEVELS[i % LEVELS.len()],
                )
                .with_required_skills(["Python", "SQL"])
                .with_preferred_skills(["Docker"])
            })
            .collect()
    }
}
