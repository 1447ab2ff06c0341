//! HTTP request handlers for the mock server.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::filter::QueryFilter;
use crate::mock_server::state::MockState;

type SharedState = Arc<RwLock<MockState>>;

/// Body of a query request.
#[derive(Debug, Default, Deserialize)]
pub struct QueryBody {
    #[serde(default)]
    pub filters: Vec<QueryFilter>,
}

/// Query parameters of the changes feed.
#[derive(Debug, Deserialize)]
pub struct ChangesParams {
    pub since: DateTime<Utc>,
}

fn error_response(status: StatusCode, error: &str, message: String) -> Response {
    (
        status,
        Json(serde_json::json!({
            "error": error,
            "message": message,
        })),
    )
        .into_response()
}

/// Check the bearer token and company id against the state.
fn authorize(state: &MockState, headers: &HeaderMap, company: u32) -> Result<(), Response> {
    if let Some(ref required) = state.required_token {
        let provided = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        if provided != Some(required.as_str()) {
            return Err(error_response(
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
                "Invalid or missing API key".to_string(),
            ));
        }
    }

    if company != state.company_id {
        return Err(error_response(
            StatusCode::NOT_FOUND,
            "Company not found",
            format!("No company with id: {company}"),
        ));
    }

    Ok(())
}

/// POST /companies/{company}/query/{entity}
pub async fn query(
    State(state): State<SharedState>,
    Path((company, entity)): Path<(u32, String)>,
    headers: HeaderMap,
    Json(body): Json<QueryBody>,
) -> Response {
    let state = state.read().await;
    if let Err(response) = authorize(&state, &headers, company) {
        return response;
    }

    let rows = state.query(&entity, &body.filters);
    (StatusCode::OK, Json(serde_json::json!({ "rows": rows }))).into_response()
}

/// GET /companies/{company}/cache/{entity}
pub async fn load_cache(
    State(state): State<SharedState>,
    Path((company, entity)): Path<(u32, String)>,
    headers: HeaderMap,
) -> Response {
    let state = state.read().await;
    if let Err(response) = authorize(&state, &headers, company) {
        return response;
    }

    let rows = state.snapshot(&entity);
    (StatusCode::OK, Json(serde_json::json!({ "rows": rows }))).into_response()
}

/// GET /companies/{company}/cache/{entity}/changes?since=...
pub async fn cache_changes(
    State(state): State<SharedState>,
    Path((company, entity)): Path<(u32, String)>,
    headers: HeaderMap,
    Query(params): Query<ChangesParams>,
) -> Response {
    let state = state.read().await;
    if let Err(response) = authorize(&state, &headers, company) {
        return response;
    }

    let changes = state.changes_since(&entity, params.since);
    (StatusCode::OK, Json(changes)).into_response()
}
