//! Preview, export, template listing and the Enter-key reflow helper.

use axum::{
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::reflow::{on_enter, EnterOutcome};
use crate::render::{listing, render_export, render_preview, TemplateInfo};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterRequest {
    pub buffer: String,
    pub selection_start: usize,
    pub selection_end: usize,
}

#[derive(Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PreviewFormat {
    #[default]
    Json,
    Html,
}

#[derive(Deserialize)]
pub struct PreviewQuery {
    #[serde(default)]
    pub format: PreviewFormat,
}

/// POST /api/v1/reflow/enter
pub async fn handle_enter(Json(req): Json<EnterRequest>) -> Json<EnterOutcome> {
    Json(on_enter(&req.buffer, req.selection_start, req.selection_end))
}

/// GET /api/v1/templates
pub async fn handle_list_templates() -> Json<Vec<TemplateInfo>> {
    Json(listing())
}

/// GET /api/v1/preview?format=json|html
pub async fn handle_preview(
    State(state): State<AppState>,
    Query(params): Query<PreviewQuery>,
) -> Response {
    let locale = state.preferences.read().await.locale;
    let snapshot = state.session.lock().await.render_snapshot();
    let tree = render_preview(&snapshot, locale);
    match params.format {
        PreviewFormat::Json => Json(tree).into_response(),
        PreviewFormat::Html => Html(tree.root.to_html()).into_response(),
    }
}

/// GET /api/v1/export
pub async fn handle_export(State(state): State<AppState>) -> Result<Response, AppError> {
    let locale = state.preferences.read().await.locale;
    let snapshot = state.session.lock().await.document().clone();
    let geometry = state.config.page_geometry;

    let artifact = tokio::task::spawn_blocking(move || render_export(&snapshot, locale, geometry))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;

    let disposition = format!("attachment; filename=\"{}\"", artifact.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.bytes,
    )
        .into_response())
}
