//! Liveness and readiness endpoints.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::routes::ApiState;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: Vec<ComponentStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComponentStatus {
    pub component: String,
    pub healthy: bool,
    pub message: Option<String>,
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Process is alive", body = HealthResponse)),
    tag = "health"
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[utoipa::path(
    get,
    path = "/ready",
    responses(
        (status = 200, description = "All components healthy", body = ReadyResponse),
        (status = 503, description = "One or more components unhealthy", body = ReadyResponse)
    ),
    tag = "health"
)]
pub async fn ready(State(state): State<ApiState>) -> (StatusCode, Json<ReadyResponse>) {
    let checks = state.health.check_all().await;

    let components: Vec<ComponentStatus> = checks
        .into_values()
        .map(|check| ComponentStatus {
            component: check.component,
            healthy: check.status.is_healthy(),
            message: check.status.message().map(str::to_string),
        })
        .collect();

    let all_healthy = !components.is_empty() && components.iter().all(|c| c.healthy);

    let (status, label) =
        if all_healthy { (StatusCode::OK, "ready") } else { (StatusCode::SERVICE_UNAVAILABLE, "not_ready") };

    (status, Json(ReadyResponse { status: label, components }))
}
