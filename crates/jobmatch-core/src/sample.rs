//! Built-in sample catalogue
//!
//! Ten postings across MENA, North Africa and Sub-Saharan Africa, used by
//! `jobmatch seed` and by tests that need a realistic catalogue.

use crate::model::{Industry, JobLevel, JobPosting, Region, SalaryRange};

#[allow(clippy::too_many_arguments)]
fn sample(
    id: &str,
    title: &str,
    company: &str,
    location: &str,
    region: Region,
    industry: Industry,
    level: JobLevel,
    required: &[&str],
    preferred: &[&str],
    description: &str,
    salary: (f64, f64),
    remote: bool,
) -> JobPosting {
    let posting = JobPosting::new(id, title, region, industry, level)
        .with_company(company)
        .with_location(location, remote)
        .with_required_skills(required.iter().copied())
        .with_preferred_skills(preferred.iter().copied())
        .with_description(description);
    match SalaryRange::new(salary.0, salary.1, "USD") {
        Ok(range) => posting.with_salary(range),
        Err(_) => posting,
    }
}

/// The sample postings `JOB001` to `JOB010`
pub fn sample_postings() -> Vec<JobPosting> {
    use Industry::*;
    use JobLevel::*;

    vec![
        sample(
            "JOB001",
            "Senior Software Engineer",
            "TechCorp MENA",
            "Dubai, UAE",
            Region::Mena,
            Technology,
            Senior,
            &["Python", "Django", "React", "PostgreSQL", "AWS", "Docker"],
            &["Kubernetes", "Redis", "CI/CD"],
            "Leading technology company seeking experienced software engineer to build scalable applications.",
            (80_000.0, 120_000.0),
            true,
        ),
        sample(
            "JOB002",
            "Data Scientist",
            "Analytics Middle East",
            "Riyadh, Saudi Arabia",
            Region::Mena,
            Technology,
            Mid,
            &["Python", "Machine Learning", "Pandas", "Scikit-learn", "SQL"],
            &["Deep Learning", "TensorFlow", "Big Data"],
            "Join our data science team to drive insights from large datasets.",
            (60_000.0, 90_000.0),
            false,
        ),
        sample(
            "JOB003",
            "Frontend Developer",
            "Digital Solutions Egypt",
            "Cairo, Egypt",
            Region::NorthAfrica,
            Technology,
            Junior,
            &["JavaScript", "React", "HTML", "CSS", "Git"],
            &["TypeScript", "Redux", "Testing"],
            "Growing startup looking for passionate frontend developers.",
            (30_000.0, 50_000.0),
            true,
        ),
        sample(
            "JOB004",
            "Mobile Developer",
            "Mobile Money Africa",
            "Nairobi, Kenya",
            Region::SubSaharanAfrica,
            Fintech,
            Mid,
            &["Java", "Kotlin", "Android", "Mobile Development", "REST API"],
            &["Flutter", "Firebase", "Agile"],
            "Build next-generation mobile banking solutions for Africa.",
            (40_000.0, 70_000.0),
            false,
        ),
        sample(
            "JOB005",
            "DevOps Engineer",
            "Cloud Services SA",
            "Cape Town, South Africa",
            Region::SubSaharanAfrica,
            Technology,
            Senior,
            &["AWS", "Docker", "Kubernetes", "CI/CD", "Linux", "Python"],
            &["Terraform", "Ansible", "Monitoring"],
            "Scale cloud infrastructure for enterprise clients.",
            (70_000.0, 100_000.0),
            true,
        ),
        sample(
            "JOB006",
            "Full Stack Developer",
            "EdTech Africa",
            "Lagos, Nigeria",
            Region::SubSaharanAfrica,
            Education,
            Mid,
            &["JavaScript", "Node.js", "React", "MongoDB", "Express.js"],
            &["TypeScript", "AWS", "Testing"],
            "Help build educational platforms for African students.",
            (35_000.0, 60_000.0),
            true,
        ),
        sample(
            "JOB007",
            "AI/ML Engineer",
            "AI Innovations MENA",
            "Abu Dhabi, UAE",
            Region::Mena,
            Technology,
            Senior,
            &["Python", "Machine Learning", "Deep Learning", "TensorFlow", "PyTorch", "NLP"],
            &["Computer Vision", "MLOps", "Kubernetes"],
            "Develop cutting-edge AI solutions for government and enterprise.",
            (90_000.0, 140_000.0),
            false,
        ),
        sample(
            "JOB008",
            "Backend Developer",
            "E-Commerce Morocco",
            "Casablanca, Morocco",
            Region::NorthAfrica,
            Retail,
            Junior,
            &["Python", "Django", "PostgreSQL", "REST API", "Git"],
            &["Redis", "Docker", "Celery"],
            "Join growing e-commerce platform serving North Africa.",
            (25_000.0, 45_000.0),
            false,
        ),
        sample(
            "JOB009",
            "Project Manager - IT",
            "Consulting Group Tunisia",
            "Tunis, Tunisia",
            Region::NorthAfrica,
            Consulting,
            Senior,
            &[
                "Project Management",
                "Agile",
                "Scrum",
                "Leadership",
                "Communication",
                "Stakeholder Management",
            ],
            &["PMP", "Technical Background", "French"],
            "Lead digital transformation projects for clients across Africa.",
            (50_000.0, 80_000.0),
            false,
        ),
        sample(
            "JOB010",
            "Cloud Architect",
            "Enterprise Solutions MENA",
            "Doha, Qatar",
            Region::Mena,
            Technology,
            Lead,
            &["AWS", "Azure", "Cloud Architecture", "Microservices", "Security", "DevOps"],
            &["Kubernetes", "Terraform", "Multi-cloud"],
            "Design enterprise cloud solutions for major corporations.",
            (110_000.0, 160_000.0),
            false,
        ),
    ]
}
