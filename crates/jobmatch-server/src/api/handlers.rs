//! API endpoint handlers
//!
//! Engine calls are CPU-bound (embedding, scanning) and run on the blocking
//! pool.

use std::collections::BTreeSet;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use jobmatch_core::{
    BuildReport, Health, Industry, JobLevel, JobPosting, MatchError, MatchRequest, MatchResult, RankedMatch,
    Region, SalaryRange,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ApiError;
use super::state::AppState;

/// Run `f` on the blocking pool and map its error
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, MatchError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("worker task failed: {}", e)))?
        .map_err(ApiError::from)
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Internal(e.to_string()))
}

// ============================================================================
// MATCHING
// ============================================================================

/// One match on the wire: the score breakdown plus the posting summary
#[derive(Debug, Serialize)]
struct MatchView<'a> {
    #[serde(flatten)]
    result: &'a MatchResult,
    title: &'a str,
    company: &'a str,
    region: Region,
    industry: Industry,
    level: JobLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<&'a str>,
    remote: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    salary_range: Option<&'a SalaryRange>,
}

impl<'a> From<&'a RankedMatch> for MatchView<'a> {
    fn from(m: &'a RankedMatch) -> Self {
        let p = &m.posting;
        Self {
            result: &m.result,
            title: &p.title,
            company: &p.company,
            region: p.region,
            industry: p.industry,
            level: p.level,
            location: p.location.as_deref(),
            remote: p.remote,
            url: p.url.as_deref(),
            salary_range: p.salary_range.as_ref(),
        }
    }
}

/// Match a candidate against the index
pub async fn match_candidate(
    State(state): State<AppState>,
    body: Result<Json<MatchRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = body?;
    let service = state.service.clone();
    let outcome = blocking(move || service.match_request(&request)).await?;

    let matches: Vec<MatchView<'_>> = outcome.matches.iter().map(MatchView::from).collect();
    Ok(Json(serde_json::json!({
        "total": matches.len(),
        "index_version": outcome.index_version,
        "matches": to_value(&matches)?,
    })))
}

// ============================================================================
// INDEX MANAGEMENT
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostingsBody {
    pub postings: Vec<JobPosting>,
}

fn report_json(report: &BuildReport) -> Result<Json<Value>, ApiError> {
    Ok(Json(serde_json::json!({
        "run_id": report.run_id,
        "indexed_count": report.indexed,
        "failed_count": report.failed,
        "failures": to_value(&report.failures)?,
        "duration_ms": report.duration_ms,
    })))
}

/// Replace the whole catalogue
pub async fn rebuild_index(
    State(state): State<AppState>,
    body: Result<Json<PostingsBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body?;
    let service = state.service.clone();
    let report = blocking(move || service.rebuild(body.postings)).await?;
    report_json(&report)
}

/// Insert or replace postings
pub async fn add_postings(
    State(state): State<AppState>,
    body: Result<Json<PostingsBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body?;
    let service = state.service.clone();
    let report = blocking(move || service.add(body.postings)).await?;
    report_json(&report)
}

/// Fetch a stored posting
pub async fn get_posting(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let service = state.service.clone();
    let posting = blocking(move || service.stored_posting(&id)).await?;
    Ok(Json(to_value(&posting)?))
}

/// Delete a posting
pub async fn remove_posting(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let service = state.service.clone();
    let removed = blocking(move || service.remove(&id)).await?;
    Ok(Json(serde_json::json!({ "removed": removed })))
}

/// Index statistics
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let stats = state.service.stats();
    Ok(Json(to_value(&stats)?))
}

/// Health check: 200 when ready, 503 when degraded
pub async fn health_check(State(state): State<AppState>) -> Response {
    match state.service.health() {
        Health::Ready => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "ready",
                "entries": state.service.index().len(),
                "version": env!("CARGO_PKG_VERSION"),
            })),
        )
            .into_response(),
        Health::Degraded { reason } => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "status": "degraded",
                "reason": reason,
                "version": env!("CARGO_PKG_VERSION"),
            })),
        )
            .into_response(),
    }
}

// ============================================================================
// TAXONOMY & INSIGHTS
// ============================================================================

/// Accepted region, industry and level names
pub async fn get_taxonomy() -> Json<Value> {
    Json(serde_json::json!({
        "regions": Region::ALL.iter().map(Region::as_str).collect::<Vec<_>>(),
        "industries": Industry::ALL.iter().map(Industry::as_str).collect::<Vec<_>>(),
        "levels": JobLevel::ALL.iter().map(JobLevel::as_str).collect::<Vec<_>>(),
    }))
}

/// Market insights for one region
pub async fn region_insights(
    State(state): State<AppState>,
    Path(region): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let region: Region = region.parse().map_err(|e: jobmatch_core::ValidationError| ApiError::Validation(e.to_string()))?;
    let insights = state.service.regional_insights(region);
    Ok(Json(to_value(&insights)?))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SkillsBody {
    #[serde(default)]
    pub skills: BTreeSet<String>,
    #[serde(default)]
    pub region: Option<Region>,
}

/// Skills worth learning, ranked by demand
pub async fn skill_recommendations(
    State(state): State<AppState>,
    body: Result<Json<SkillsBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body?;
    let recommendations = state.service.recommend_skills(&body.skills, body.region);
    Ok(Json(serde_json::json!({
        "total": recommendations.len(),
        "recommendations": to_value(&recommendations)?,
    })))
}
