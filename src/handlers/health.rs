use axum::extract::State;
use axum::http::StatusCode;
use serde_json::json;

use crate::api::envelope::Envelope;
use crate::api::versioning;
use crate::db;
use crate::state::AppState;

/// Liveness probe. Exempt from rate limiting and authentication.
pub async fn healthz(State(state): State<AppState>) -> Envelope {
    if db::health_check(&state.pool).await {
        Envelope::ok(versioning::latest()).data(json!({ "database": "ok" }))
    } else {
        Envelope::error(
            versioning::latest(),
            StatusCode::SERVICE_UNAVAILABLE,
            json!([{ "code": "server-error", "message": "Database unreachable" }]),
        )
    }
}
