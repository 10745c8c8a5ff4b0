//! HTTP API
//!
//! JSON endpoints under `/api` over a shared [`MatchService`].

pub mod error;
pub mod handlers;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use jobmatch_core::MatchService;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::info;

pub use error::ApiError;
pub use state::AppState;

/// Maximum requests processed at once
pub const CONCURRENCY_LIMIT: usize = 50;

/// Build the axum router with all API routes
///
/// `origins` lists the browser origins allowed by CORS; origins that are not
/// valid header values are ignored.
pub fn build_router(service: Arc<MatchService>, origins: &[String]) -> Router {
    let state = AppState::new(service);

    let origins: Vec<axum::http::HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse::<axum::http::HeaderValue>().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ]);

    let no_store = SetResponseHeaderLayer::overriding(
        axum::http::header::CACHE_CONTROL,
        axum::http::HeaderValue::from_static("no-store"),
    );

    Router::new()
        // Matching
        .route("/api/match", post(handlers::match_candidate))
        // Index management
        .route("/api/index/rebuild", post(handlers::rebuild_index))
        .route("/api/index/postings", post(handlers::add_postings))
        .route(
            "/api/index/postings/{id}",
            get(handlers::get_posting).delete(handlers::remove_posting),
        )
        .route("/api/index/stats", get(handlers::get_stats))
        // Health
        .route("/api/health", get(handlers::health_check))
        // Taxonomy & insights
        .route("/api/taxonomy", get(handlers::get_taxonomy))
        .route("/api/insights/regions/{region}", get(handlers::region_insights))
        .route("/api/insights/skills", post(handlers::skill_recommendations))
        .layer(
            ServiceBuilder::new()
                .concurrency_limit(CONCURRENCY_LIMIT)
                .layer(cors)
                .layer(no_store),
        )
        .with_state(state)
}

/// Default CORS origins for a server bound to `port`
pub fn local_origins(port: u16) -> Vec<String> {
    vec![
        format!("http://127.0.0.1:{}", port),
        format!("http://localhost:{}", port),
    ]
}

/// Serve the API until ctrl-c
pub async fn serve(service: Arc<MatchService>, addr: SocketAddr, origins: &[String]) -> anyhow::Result<()> {
    let app = build_router(service, origins);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("JobMatch API listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;
    Ok(())
}
