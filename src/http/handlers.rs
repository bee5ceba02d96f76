//! Request handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::ratelimit::{AdmissionService, ClientId, TimestampMs};

/// Shared state: one admission service per window algorithm.
#[derive(Clone)]
pub struct AppState {
    /// Service behind the fixed window route
    pub fixed: Arc<AdmissionService>,
    /// Service behind the sliding window route
    pub sliding: Arc<AdmissionService>,
}

/// Query string of an admission request.
#[derive(Debug, Deserialize)]
pub struct AdmissionQuery {
    /// Raw client identifier, parsed by the handler
    #[serde(rename = "clientId")]
    pub client_id: Option<String>,
}

/// Body of the health endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the server is answering
    pub status: String,
    /// Clients tracked by the fixed window service
    pub fixed_window_clients: usize,
    /// Clients tracked by the sliding window service
    pub sliding_window_clients: usize,
}

/// Admit or reject a request against the fixed window service.
pub async fn fixed_window(
    State(state): State<AppState>,
    Query(query): Query<AdmissionQuery>,
) -> impl IntoResponse {
    admit(&state.fixed, query)
}

/// Admit or reject a request against the sliding window service.
pub async fn sliding_window(
    State(state): State<AppState>,
    Query(query): Query<AdmissionQuery>,
) -> impl IntoResponse {
    admit(&state.sliding, query)
}

/// Health endpoint reporting how many clients each service tracks.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        fixed_window_clients: state.fixed.tracked_clients(),
        sliding_window_clients: state.sliding.tracked_clients(),
    })
}

fn admit(service: &AdmissionService, query: AdmissionQuery) -> (StatusCode, Html<String>) {
    let Some(client_id) = parse_client_id(query.client_id.as_deref()) else {
        warn!(
            kind = %service.kind(),
            client_id = ?query.client_id,
            "Rejecting request without a valid clientId"
        );
        return page(StatusCode::BAD_REQUEST);
    };

    // Read before the limiter's lock is taken, so concurrent requests from one
    // client may arrive slightly out of order, as may a clock that steps back.
    let timestamp_ms = now_ms();
    let status = if service.evaluate(client_id, timestamp_ms) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    info!(
        kind = %service.kind(),
        timestamp_ms,
        client_id,
        status = status.as_u16(),
        "Admission request handled"
    );

    page(status)
}

fn parse_client_id(raw: Option<&str>) -> Option<ClientId> {
    raw?.trim().parse().ok()
}

fn now_ms() -> TimestampMs {
    timestamp_from_millis(chrono::Utc::now().timestamp_millis())
}

fn timestamp_from_millis(millis: i64) -> TimestampMs {
    TimestampMs::try_from(millis).unwrap_or_else(|_| {
        warn!(millis, "System clock is before the Unix epoch, using timestamp 0");
        0
    })
}

fn page(status: StatusCode) -> (StatusCode, Html<String>) {
    (
        status,
        Html(format!("<HTML><BODY> {} </BODY></HTML>", status.as_u16())),
    )
}
