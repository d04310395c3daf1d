pub mod health;
pub mod preferences;
pub mod render;
pub mod resume;
pub mod session;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Document model
        .route("/api/v1/resume", get(resume::handle_get_resume))
        .route("/api/v1/resume/status", get(resume::handle_get_status))
        .route(
            "/api/v1/resume/sections/:section",
            patch(resume::handle_update_section),
        )
        .route(
            "/api/v1/resume/collections/:collection",
            post(resume::handle_add_entity),
        )
        .route(
            "/api/v1/resume/collections/:collection/:id",
            patch(resume::handle_update_entity).delete(resume::handle_remove_entity),
        )
        .route(
            "/api/v1/resume/skills",
            put(resume::handle_set_skills).post(resume::handle_add_skill),
        )
        .route(
            "/api/v1/resume/skills/:label",
            axum::routing::delete(resume::handle_remove_skill),
        )
        .route(
            "/api/v1/resume/section-order",
            put(resume::handle_reorder_sections),
        )
        .route(
            "/api/v1/resume/media/:slot",
            post(resume::handle_select_media).delete(resume::handle_clear_media),
        )
        .route("/api/v1/resume/save", post(resume::handle_save))
        // Identity
        .route(
            "/api/v1/session/identity",
            post(session::handle_sign_in).delete(session::handle_sign_out),
        )
        // Rendering
        .route("/api/v1/reflow/enter", post(render::handle_enter))
        .route("/api/v1/templates", get(render::handle_list_templates))
        .route("/api/v1/preview", get(render::handle_preview))
        .route("/api/v1/export", get(render::handle_export))
        .route(
            "/api/v1/preferences",
            get(preferences::handle_get_preferences).put(preferences::handle_put_preferences),
        )
        .with_state(state)
}
