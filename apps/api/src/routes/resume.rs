//! Document editing, media selection and Save.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::{CollectionKind, EntityId, MediaSlot, RecordSection, ResumeDocument, SectionId};
use crate::errors::AppError;
use crate::state::AppState;
use crate::sync::{MediaPayload, SaveReport, SyncStatus};

#[derive(Serialize)]
pub struct ResumeResponse {
    pub document: ResumeDocument,
    pub status: SyncStatus,
}

#[derive(Serialize)]
pub struct ChangeResponse {
    pub changed: bool,
    pub dirty: bool,
}

#[derive(Serialize)]
pub struct CreatedEntity {
    pub id: EntityId,
}

#[derive(Deserialize)]
pub struct FieldUpdate {
    pub field: String,
    pub value: Value,
}

#[derive(Deserialize)]
pub struct SkillLabel {
    pub label: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaSelected {
    pub slot: MediaSlot,
    pub preview_ref: String,
}

/// GET /api/v1/resume
pub async fn handle_get_resume(State(state): State<AppState>) -> Json<ResumeResponse> {
    let sync = state.session.lock().await;
    Json(ResumeResponse {
        document: sync.document().clone(),
        status: sync.status(),
    })
}

/// GET /api/v1/resume/status
pub async fn handle_get_status(State(state): State<AppState>) -> Json<SyncStatus> {
    Json(state.session.status().await)
}

/// PATCH /api/v1/resume/sections/:section
pub async fn handle_update_section(
    State(state): State<AppState>,
    Path(section): Path<String>,
    Json(partial): Json<Map<String, Value>>,
) -> Result<Json<ChangeResponse>, AppError> {
    let section: RecordSection = section.parse()?;
    let mut sync = state.session.lock().await;
    let changed = sync.update_section(section, partial)?;
    Ok(Json(ChangeResponse {
        changed,
        dirty: sync.is_dirty(),
    }))
}

/// POST /api/v1/resume/collections/:collection
pub async fn handle_add_entity(
    State(state): State<AppState>,
    Path(collection): Path<String>,
) -> Result<(StatusCode, Json<CreatedEntity>), AppError> {
    let kind: CollectionKind = collection.parse()?;
    let id = state.session.lock().await.add_entity(kind);
    Ok((StatusCode::CREATED, Json(CreatedEntity { id })))
}

/// PATCH /api/v1/resume/collections/:collection/:id
pub async fn handle_update_entity(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    Json(req): Json<FieldUpdate>,
) -> Result<Json<ChangeResponse>, AppError> {
    let kind: CollectionKind = collection.parse()?;
    let mut sync = state.session.lock().await;
    let id = sync
        .document()
        .find_entity_id(kind, &id)
        .ok_or_else(|| AppError::NotFound(format!("No {kind} entry with id {id}")))?;
    let changed = sync.update_entity(kind, &id, &req.field, req.value)?;
    Ok(Json(ChangeResponse {
        changed,
        dirty: sync.is_dirty(),
    }))
}

/// DELETE /api/v1/resume/collections/:collection/:id
pub async fn handle_remove_entity(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let kind: CollectionKind = collection.parse()?;
    let mut sync = state.session.lock().await;
    if let Some(id) = sync.document().find_entity_id(kind, &id) {
        sync.remove_entity(kind, &id);
    }
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/resume/skills
pub async fn handle_set_skills(
    State(state): State<AppState>,
    Json(skills): Json<Vec<String>>,
) -> Json<ChangeResponse> {
    let mut sync = state.session.lock().await;
    let changed = sync.set_skills(skills);
    Json(ChangeResponse {
        changed,
        dirty: sync.is_dirty(),
    })
}

/// POST /api/v1/resume/skills
pub async fn handle_add_skill(
    State(state): State<AppState>,
    Json(req): Json<SkillLabel>,
) -> Json<ChangeResponse> {
    let mut sync = state.session.lock().await;
    let changed = sync.add_skill(&req.label);
    Json(ChangeResponse {
        changed,
        dirty: sync.is_dirty(),
    })
}

/// DELETE /api/v1/resume/skills/:label
pub async fn handle_remove_skill(
    State(state): State<AppState>,
    Path(label): Path<String>,
) -> StatusCode {
    state.session.lock().await.remove_skill(&label);
    StatusCode::NO_CONTENT
}

/// PUT /api/v1/resume/section-order
pub async fn handle_reorder_sections(
    State(state): State<AppState>,
    Json(order): Json<Vec<String>>,
) -> Result<Json<ChangeResponse>, AppError> {
    let order = order
        .iter()
        .map(|s| s.parse::<SectionId>())
        .collect::<Result<Vec<_>, _>>()?;
    let mut sync = state.session.lock().await;
    let changed = sync.reorder_sections(order)?;
    Ok(Json(ChangeResponse {
        changed,
        dirty: sync.is_dirty(),
    }))
}

/// POST /api/v1/resume/media/:slot (multipart, field `file`)
pub async fn handle_select_media(
    State(state): State<AppState>,
    Path(slot): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<MediaSelected>, AppError> {
    let slot: MediaSlot = slot.parse()?;

    let mut payload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        if !content_type.starts_with("image/") {
            return Err(AppError::Validation(format!(
                "Expected an image, got '{content_type}'"
            )));
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(e.to_string()))?;
        payload = Some(MediaPayload::new(bytes, content_type));
    }
    let payload = payload
        .filter(|p| !p.bytes.is_empty())
        .ok_or_else(|| AppError::Validation("Multipart field 'file' is required".to_string()))?;

    let preview_ref = state.session.lock().await.select_media(slot, payload);
    Ok(Json(MediaSelected { slot, preview_ref }))
}

/// DELETE /api/v1/resume/media/:slot
pub async fn handle_clear_media(
    State(state): State<AppState>,
    Path(slot): Path<String>,
) -> Result<StatusCode, AppError> {
    let slot: MediaSlot = slot.parse()?;
    state.session.lock().await.clear_media(slot);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/resume/save
pub async fn handle_save(State(state): State<AppState>) -> Result<Json<SaveReport>, AppError> {
    Ok(Json(state.session.save().await?))
}

