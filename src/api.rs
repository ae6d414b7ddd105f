//! HTTP facade over the dispatcher.

use crate::deals::dispatcher::{DealsOutcome, Dispatcher};
use crate::deals::models::Deal;
use crate::deals::sources::Source;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DealsParams {
    pub q: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AllDealsParams {
    pub q: Option<String>,
    /// Comma-separated source codes; all registered sources when absent.
    pub sources: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DealsResponse {
    pub deals: Vec<Deal>,
}

#[derive(Debug, Serialize)]
pub struct AllDealsResponse {
    pub results: Vec<DealsOutcome>,
}

/// JSON error body: 500 when the selected source fails, 400 for a bad query string.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    pub error: String,
    pub details: String,
}

impl ApiError {
    fn scrape_failed(source: Source, details: impl Into<String>) -> Self {
        let details = details.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: format!("Failed to scrape {}", source),
            details: if details.is_empty() { "unknown error".to_string() } else { details },
        }
    }

    fn bad_query(rejection: QueryRejection) -> Self {
        warn!("Rejected query string: {}", rejection.body_text());
        Self {
            status: StatusCode::BAD_REQUEST,
            error: "Invalid query string".to_string(),
            details: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/deals", get(deals))
        .route("/api/deals/all", get(all_deals))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn deals(
    State(state): State<AppState>,
    params: Result<Query<DealsParams>, QueryRejection>,
) -> Result<Json<DealsResponse>, ApiError> {
    let Query(params) = params.map_err(ApiError::bad_query)?;
    let outcome = state.dispatcher.get_deals(params.q.as_deref(), params.region.as_deref()).await;

    match outcome.failure {
        Some(details) => Err(ApiError::scrape_failed(outcome.source, details)),
        None => Ok(Json(DealsResponse { deals: outcome.deals })),
    }
}

async fn all_deals(
    State(state): State<AppState>,
    params: Result<Query<AllDealsParams>, QueryRejection>,
) -> Result<Json<AllDealsResponse>, ApiError> {
    let Query(params) = params.map_err(ApiError::bad_query)?;
    let sources = match params.sources.as_deref() {
        Some(list) => parse_source_list(list),
        None => state.dispatcher.table().sources(),
    };

    let results = state.dispatcher.get_deals_from(params.q.as_deref(), &sources).await;
    Ok(Json(AllDealsResponse { results }))
}

fn parse_source_list(list: &str) -> Vec<Source> {
    let mut sources = Vec::new();
    for code in list.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        match code.parse::<Source>() {
            Ok(source) if !sources.contains(&source) => sources.push(source),
            Ok(_) => {}
            Err(e) => warn!("Ignoring source in list: {}", e),
        }
    }
    sources
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
