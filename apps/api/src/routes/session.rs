//! Identity availability signals from the authentication layer.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::state::AppState;
use crate::sync::SyncStatus;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRequest {
    pub identity_id: String,
}

#[derive(Deserialize)]
pub struct SignOutQuery {
    #[serde(default)]
    pub reset: bool,
}

/// POST /api/v1/session/identity
pub async fn handle_sign_in(
    State(state): State<AppState>,
    Json(req): Json<IdentityRequest>,
) -> Result<Json<SyncStatus>, AppError> {
    let identity = req.identity_id.trim();
    if identity.is_empty() {
        return Err(AppError::Validation("identityId must not be empty".to_string()));
    }
    state.session.sign_in(identity).await?;
    Ok(Json(state.session.status().await))
}

/// DELETE /api/v1/session/identity?reset=bool
pub async fn handle_sign_out(
    State(state): State<AppState>,
    Query(params): Query<SignOutQuery>,
) -> StatusCode {
    state.session.sign_out(params.reset).await;
    StatusCode::NO_CONTENT
}
