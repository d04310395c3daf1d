use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::preferences::UiPreferences;
use crate::sync::EditorSession;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The one editing session this process serves.
    pub session: Arc<EditorSession>,
    pub preferences: Arc<RwLock<UiPreferences>>,
    pub config: Config,
}

impl AppState {
    pub fn new(session: EditorSession, config: Config) -> Self {
        AppState {
            session: Arc::new(session),
            preferences: Arc::new(RwLock::new(UiPreferences::default())),
            config,
        }
    }
}
