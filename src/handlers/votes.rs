use axum::extract::{Path, State};
use axum::Extension;

use crate::api::envelope::Envelope;
use crate::api::versioning::ApiVersion;
use crate::error::ApiError;
use crate::middleware::auth::MaybeCaller;
use crate::models::vote::VoteDirection;
use crate::services::votes;
use crate::state::AppState;

async fn vote(
    state: AppState,
    version: ApiVersion,
    id: i32,
    direction: VoteDirection,
    caller: MaybeCaller,
) -> Result<Envelope, ApiError> {
    let view = votes::vote(
        &state.pool,
        id,
        direction,
        caller.0.as_ref(),
        state.config.auth.track_votes,
    )
    .await?;
    Ok(Envelope::ok(version.0)
        .data(serde_json::to_value(view).map_err(|e| ApiError::Server(e.to_string()))?))
}

pub async fn upvote(
    State(state): State<AppState>,
    Extension(version): Extension<ApiVersion>,
    Path(id): Path<i32>,
    caller: MaybeCaller,
) -> Result<Envelope, ApiError> {
    vote(state, version, id, VoteDirection::Upvote, caller).await
}

pub async fn downvote(
    State(state): State<AppState>,
    Extension(version): Extension<ApiVersion>,
    Path(id): Path<i32>,
    caller: MaybeCaller,
) -> Result<Envelope, ApiError> {
    vote(state, version, id, VoteDirection::Downvote, caller).await
}

/// Click-through counter for outbound links.
pub async fn click(
    State(state): State<AppState>,
    Extension(version): Extension<ApiVersion>,
    Path(id): Path<i32>,
) -> Result<Envelope, ApiError> {
    let view = votes::click(&state.pool, id).await?;
    Ok(Envelope::ok(version.0)
        .data(serde_json::to_value(view).map_err(|e| ApiError::Server(e.to_string()))?))
}
