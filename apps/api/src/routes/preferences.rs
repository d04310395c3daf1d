use axum::{extract::State, Json};

use crate::preferences::UiPreferences;
use crate::state::AppState;

/// GET /api/v1/preferences
pub async fn handle_get_preferences(State(state): State<AppState>) -> Json<UiPreferences> {
    Json(state.preferences.read().await.clone())
}

/// PUT /api/v1/preferences
pub async fn handle_put_preferences(
    State(state): State<AppState>,
    Json(prefs): Json<UiPreferences>,
) -> Json<UiPreferences> {
    let prefs = prefs.clamped();
    *state.preferences.write().await = prefs.clone();
    Json(prefs)
}
