//! HTTP route handlers for the relay API.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::audit;

use super::error::{ApiError, ApiJson, ErrorBody};
use super::state::AppState;

/// `OpenAPI` document served at `/api/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Summary API",
        version = "1.0.0",
        description = "Summarizes web pages for a user query and keeps an audit log of the answers"
    ),
    paths(health_check, create_query, create_query_with_context),
    components(schemas(UserQuery, UserQueryWithContext, SummaryResponse, ErrorBody)),
    tags(
        (name = "Summary", description = "Query summarization"),
        (name = "Observability", description = "Service health")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes and the interactive docs.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/query", post(create_query))
        .route("/query_next", post(create_query_with_context))
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up")),
    tag = "Observability"
)]
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "summary-relay",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// First question about a set of pages.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UserQuery {
    /// The user's question.
    pub query: String,
    /// Pages to focus on, forwarded in order.
    pub urls: Vec<String>,
}

/// Follow-up question carrying the previous answer.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UserQueryWithContext {
    /// The user's question.
    pub query: String,
    /// Pages to focus on, forwarded in order.
    pub urls: Vec<String>,
    /// Summary returned for the previous question.
    pub previous_summary: String,
}

/// Successful answer.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SummaryResponse {
    /// Generated summary text.
    pub summary: String,
}

/// Summarize the focus pages for a first question.
#[utoipa::path(
    post,
    path = "/api/query",
    request_body = UserQuery,
    responses(
        (status = 200, description = "Summary generated", body = SummaryResponse),
        (status = 422, description = "Malformed request body", body = ErrorBody),
        (status = 500, description = "Summary generation failed", body = ErrorBody)
    ),
    tag = "Summary"
)]
async fn create_query(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<UserQuery>,
) -> Result<Json<SummaryResponse>, ApiError> {
    summarize_and_log(&state, &request.query, &request.urls, None).await
}

/// Summarize the focus pages for a follow-up question.
#[utoipa::path(
    post,
    path = "/api/query_next",
    request_body = UserQueryWithContext,
    responses(
        (status = 200, description = "Summary generated", body = SummaryResponse),
        (status = 422, description = "Malformed request body", body = ErrorBody),
        (status = 500, description = "Summary generation failed", body = ErrorBody)
    ),
    tag = "Summary"
)]
async fn create_query_with_context(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<UserQueryWithContext>,
) -> Result<Json<SummaryResponse>, ApiError> {
    summarize_and_log(
        &state,
        &request.query,
        &request.urls,
        Some(request.previous_summary.as_str()),
    )
    .await
}

/// Generate the summary, then record it without letting the audit write
/// influence the response.
async fn summarize_and_log(
    state: &AppState,
    query: &str,
    urls: &[String],
    context: Option<&str>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let summary = state
        .summarizer
        .generate_summary(query, urls, context)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Summary generation failed");
            ApiError::Generation(e)
        })?;

    let timestamp = Utc::now();
    audit::best_effort(
        "save_query_log",
        state.logger.log_query(query, &summary, timestamp),
    )
    .await;

    Ok(Json(SummaryResponse { summary }))
}
