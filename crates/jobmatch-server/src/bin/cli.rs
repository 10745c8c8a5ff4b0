//! JobMatch CLI
//!
//! Command-line interface for building the job index and running matches.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use jobmatch_core::{
    sample_postings, BuildReport, CandidateProfile, Config, Health, Industry, JobLevel, JobPosting, MatchFilters,
    MatchService, Priority, Region,
};
use serde::Deserialize;

/// JobMatch - semantic job matching CLI
#[derive(Parser)]
#[command(name = "jobmatch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "CLI for the JobMatch semantic job-matching engine")]
struct Cli {
    /// Directory holding jobmatch.db (overrides JOBMATCH_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace the catalogue with the built-in sample postings
    Seed,

    /// Replace the catalogue with postings from a JSON file
    Rebuild {
        /// JSON array of postings, or {"postings": [...]}
        file: PathBuf,
    },

    /// Insert or replace postings from a JSON file
    Add {
        /// JSON array of postings, or {"postings": [...]}
        file: PathBuf,
    },

    /// Remove a posting by id
    Remove {
        id: String,
    },

    /// Match a candidate profile against the index
    Match {
        /// JSON candidate profile
        candidate: PathBuf,
        /// Region filter (repeatable)
        #[arg(long)]
        region: Vec<String>,
        /// Industry filter (repeatable)
        #[arg(long)]
        industry: Vec<String>,
        /// Level filter (repeatable)
        #[arg(long)]
        level: Vec<String>,
        /// Number of matches to show
        #[arg(long, default_value = "10")]
        top_k: usize,
    },

    /// Show index statistics and health
    Stats,

    /// Show market insights for a region
    Insights {
        region: String,
        /// Skills you already have (comma-separated), for recommendations
        #[arg(long)]
        skills: Option<String>,
    },

    /// Show recent index builds
    Runs {
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PostingsFile {
    List(Vec<JobPosting>),
    Wrapped { postings: Vec<JobPosting> },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if cli.data_dir.is_some() {
        config.data_dir = cli.data_dir;
    }

    match cli.command {
        Commands::Seed => run_rebuild(config, sample_postings()),
        Commands::Rebuild { file } => run_rebuild(config, read_postings(&file)?),
        Commands::Add { file } => run_add(config, read_postings(&file)?),
        Commands::Remove { id } => run_remove(config, &id),
        Commands::Match {
            candidate,
            region,
            industry,
            level,
            top_k,
        } => run_match(config, &candidate, region, industry, level, top_k),
        Commands::Stats => run_stats(config),
        Commands::Insights { region, skills } => run_insights(config, &region, skills),
        Commands::Runs { limit } => run_runs(config, limit),
    }
}

fn read_postings(path: &Path) -> anyhow::Result<Vec<JobPosting>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(match serde_json::from_str::<PostingsFile>(&raw)? {
        PostingsFile::List(postings) | PostingsFile::Wrapped { postings } => postings,
    })
}

fn print_report(title: &str, report: &BuildReport) {
    println!("{}", format!("=== {} ===", title).cyan().bold());
    println!();
    println!("{}: {}", "Submitted".white().bold(), report.submitted);
    println!("{}: {}", "Indexed".white().bold(), report.indexed.to_string().green());
    let failed = if report.failed == 0 {
        report.failed.to_string().green()
    } else {
        report.failed.to_string().red()
    };
    println!("{}: {}", "Failed".white().bold(), failed);
    println!("{}: {} ms", "Duration".white().bold(), report.duration_ms);
    println!("{}: {}", "Run".white().bold(), report.run_id.to_string().dimmed());

    if !report.failures.is_empty() {
        println!();
        println!("{}", "Failures:".yellow().bold());
        for failure in &report.failures {
            println!("  {} {}", failure.id.yellow(), failure.reason);
        }
    }
}

/// Run rebuild (and seed) command
fn run_rebuild(config: Config, postings: Vec<JobPosting>) -> anyhow::Result<()> {
    let service = MatchService::open(config)?;
    let report = service.rebuild(postings)?;
    print_report("Index Rebuilt", &report);
    Ok(())
}

fn run_add(config: Config, postings: Vec<JobPosting>) -> anyhow::Result<()> {
    let service = MatchService::open(config)?;
    let report = service.add(postings)?;
    print_report("Postings Added", &report);
    Ok(())
}

fn run_remove(config: Config, id: &str) -> anyhow::Result<()> {
    let service = MatchService::open(config)?;
    if service.remove(id)? {
        println!("{} {}", "Removed".green().bold(), id);
    } else {
        println!("{} {}", "No posting with id".yellow(), id);
    }
    Ok(())
}

fn run_match(
    config: Config,
    candidate_path: &Path,
    regions: Vec<String>,
    industries: Vec<String>,
    levels: Vec<String>,
    top_k: usize,
) -> anyhow::Result<()> {
    let candidate: CandidateProfile = serde_json::from_str(&std::fs::read_to_string(candidate_path)?)?;
    let filters = MatchFilters {
        regions: regions.iter().map(|s| s.parse::<Region>()).collect::<Result<_, _>>()?,
        industries: industries.iter().map(|s| s.parse::<Industry>()).collect::<Result<_, _>>()?,
        levels: levels.iter().map(|s| s.parse::<JobLevel>()).collect::<Result<_, _>>()?,
    };

    let service = MatchService::open(config)?;
    let outcome = service.find_matches_detailed(&candidate, &filters, top_k)?;

    println!("{}", "=== Job Matches ===".cyan().bold());
    println!();

    if outcome.matches.is_empty() {
        println!("{}", "No matching postings found.".dimmed());
        return Ok(());
    }

    for (rank, m) in outcome.matches.iter().enumerate() {
        let r = &m.result;
        let p = &m.posting;
        let score = format!("{:>3.0}", r.total_score);
        let score = if r.total_score >= 70.0 {
            score.green().bold()
        } else if r.total_score >= 40.0 {
            score.yellow().bold()
        } else {
            score.red().bold()
        };

        println!(
            "{:>2}. {} {} {} {}",
            rank + 1,
            score,
            p.title.white().bold(),
            format!("@ {}", p.company).dimmed(),
            format!("[{}]", p.id).dimmed()
        );
        println!(
            "    {} | {} | {}{}",
            p.region,
            p.industry,
            p.level,
            p.location.as_deref().map(|l| format!(" | {}", l)).unwrap_or_default()
        );
        println!(
            "    similarity {:.2}  skills {:.0}  experience {:.0}  level {:.0}",
            r.similarity, r.skill_score, r.experience_score, r.level_score
        );
        if !r.missing_skills.is_empty() {
            let missing: Vec<&str> = r.missing_skills.iter().map(String::as_str).collect();
            println!("    {}: {}", "Missing".yellow(), missing.join(", "));
        }
    }

    println!();
    println!("{}: {}", "Index Version".white().bold(), outcome.index_version);
    Ok(())
}

fn run_stats(config: Config) -> anyhow::Result<()> {
    let service = MatchService::open(config)?;
    let stats = service.stats();

    println!("{}", "=== JobMatch Index Statistics ===".cyan().bold());
    println!();
    println!("{}: {}", "Postings".white().bold(), stats.index.entries);
    println!("{}: {}", "Dimensions".white().bold(), stats.index.dimensions);
    println!("{}: {}", "Embedding Model".white().bold(), stats.model);
    println!("{}: {}", "Search Strategy".white().bold(), stats.index.strategy);
    println!("{}: {}", "Index Version".white().bold(), stats.index.version);
    if stats.index.graph_entries > 0 {
        println!("{}: {}", "Graph Entries".white().bold(), stats.index.graph_entries);
        println!("{}: {}", "Pending".white().bold(), stats.index.pending);
        println!("{}: {}", "Stale".white().bold(), stats.index.stale);
    }
    println!("{}: {}", "Database".white().bold(), service.store_path().display());

    let status = match &stats.health {
        Health::Ready => "READY".green().bold(),
        Health::Degraded { reason } => {
            println!("{}: {}", "Reason".white().bold(), reason.yellow());
            "DEGRADED".red().bold()
        }
    };
    println!("{}: {}", "Status".white().bold(), status);
    Ok(())
}

fn run_insights(config: Config, region: &str, skills: Option<String>) -> anyhow::Result<()> {
    let region: Region = region.parse()?;
    let service = MatchService::open(config)?;
    let insights = service.regional_insights(region);

    println!("{}", format!("=== {} Job Market ===", region).cyan().bold());
    println!();
    println!("{}: {}", "Open Postings".white().bold(), insights.job_count);
    println!(
        "{}: {:.1} years",
        "Average Minimum Experience".white().bold(),
        insights.average_min_experience
    );

    if !insights.industries.is_empty() {
        println!();
        println!("{}", "Industries:".yellow().bold());
        for (industry, count) in &insights.industries {
            println!("  {:20} {}", industry.to_string(), count);
        }
    }

    if !insights.top_skills.is_empty() {
        println!();
        println!("{}", "Top Skills:".yellow().bold());
        for skill in &insights.top_skills {
            println!("  {:20} {}", skill.skill, skill.count);
        }
    }

    if let Some(skills) = skills {
        let known = skills
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        let recommendations = service.recommend_skills(&known, Some(region));

        println!();
        println!("{}", "=== Recommended Skills ===".magenta().bold());
        if recommendations.is_empty() {
            println!("{}", "Nothing to recommend.".dimmed());
        }
        for rec in recommendations {
            let priority = match rec.priority {
                Priority::High => "high".red().bold(),
                Priority::Medium => "medium".yellow(),
                Priority::Low => "low".dimmed(),
            };
            println!(
                "  {:20} demand {:>4.0}  in {} postings  [{}]",
                rec.skill, rec.demand_score, rec.job_count, priority
            );
        }
    }
    Ok(())
}

fn run_runs(config: Config, limit: usize) -> anyhow::Result<()> {
    let service = MatchService::open(config)?;
    let runs = service.build_runs(limit)?;

    println!("{}", "=== Recent Index Builds ===".cyan().bold());
    println!();
    if runs.is_empty() {
        println!("{}", "No builds recorded.".dimmed());
        return Ok(());
    }
    for run in runs {
        println!(
            "{}  {:11}  indexed {:>5}  failed {:>4}  {:>6} ms  {}",
            run.started_at.format("%Y-%m-%d %H:%M:%S"),
            run.kind.as_str(),
            run.indexed,
            run.failed,
            run.duration_ms,
            run.model.dimmed()
        );
    }
    Ok(())
}
