//! The Persistence Synchronizer: sole owner of the in-memory document.
//!
//! Connection states:
//!
//! ```text
//!            sign_in                 first snapshot
//!   Local ──────────────► Transitioning ──────────────► Subscribed
//!     ▲                         │                           │
//!     └─────────────────────────┴───────── sign_out ────────┘
//! ```
//!
//! Every successful mutation raises `dirty` and rewrites the local cache on a
//! best-effort basis; only [`Synchronizer::save`] clears `dirty`. A remote snapshot
//! never replaces a dirty document.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::document::{
    default_document, ephemeral_media_ref, load_document, CollectionKind, DocumentError, EntityId,
    MediaSlot, RecordSection, ResumeDocument, SectionId,
};
use crate::sync::local::LocalCache;
use crate::sync::media::{InlineMediaStore, MediaPayload, MediaStore};
use crate::sync::remote::{RemoteSnapshot, RemoteStore, Subscription};
use crate::sync::SyncError;

// ────────────────────────────────────────────────────────────────────────────
// State types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum Connection {
    Local,
    /// Subscribed, waiting for the first snapshot.
    Transitioning { identity: String },
    Subscribed { identity: String },
}

impl Connection {
    pub fn identity(&self) -> Option<&str> {
        match self {
            Connection::Local => None,
            Connection::Transitioning { identity } | Connection::Subscribed { identity } => {
                Some(identity)
            }
        }
    }
}

/// Which tier the in-memory document last came from or was last written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Local,
    Remote,
}

/// What happened to a delivered remote snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SnapshotOutcome {
    /// Replaced the clean in-memory document.
    Applied,
    /// Dropped because local edits are unsaved.
    DiscardedDirty,
    /// Our own write coming back.
    OwnEcho,
    /// Meant for an identity that is no longer current.
    Stale,
    /// Nothing stored remotely yet: the in-memory document is kept for the new account.
    Adopted,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub dirty: bool,
    pub origin: Origin,
    pub connection: Connection,
    pub pending_slots: Vec<MediaSlot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReport {
    /// Slots whose pending payloads were resolved by this save.
    pub resolved: Vec<MediaSlot>,
    pub remote_written: bool,
}

struct PendingUpload {
    payload: MediaPayload,
    /// The ephemeral reference written into `personal` when it was selected.
    preview_ref: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Synchronizer
// ────────────────────────────────────────────────────────────────────────────

pub struct Synchronizer {
    document: ResumeDocument,
    origin: Origin,
    dirty: bool,
    connection: Connection,
    pending: BTreeMap<MediaSlot, PendingUpload>,
    /// Tags this session's remote writes so their echoes can be recognized.
    session_id: Uuid,
    local: Arc<dyn LocalCache>,
    remote: Arc<dyn RemoteStore>,
    uploader: Arc<dyn MediaStore>,
}

impl Synchronizer {
    /// Starts in guest mode from the local cache, or from the default factory when
    /// the cache is empty or unreadable.
    pub fn start(
        local: Arc<dyn LocalCache>,
        remote: Arc<dyn RemoteStore>,
        uploader: Arc<dyn MediaStore>,
    ) -> Self {
        let mut document = match local.read() {
            Ok(Some(raw)) => load_document(raw),
            Ok(None) => default_document(),
            Err(e) => {
                warn!("Local cache unreadable, starting from defaults: {e}");
                default_document()
            }
        };
        document.strip_ephemeral_media();
        let session_id = Uuid::new_v4();
        info!(session = %session_id, "Editing session started in local mode");

        Synchronizer {
            document,
            origin: Origin::Local,
            dirty: false,
            connection: Connection::Local,
            pending: BTreeMap::new(),
            session_id,
            local,
            remote,
            uploader,
        }
    }

    pub fn document(&self) -> &ResumeDocument {
        &self.document
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn status(&self) -> SyncStatus {
        SyncStatus {
            dirty: self.dirty,
            origin: self.origin,
            connection: self.connection.clone(),
            pending_slots: self.pending.keys().copied().collect(),
        }
    }

    /// Snapshot for the renderers: pending media shows as inline data so the preview
    /// reflects a selection before it is saved.
    pub fn render_snapshot(&self) -> ResumeDocument {
        let mut doc = self.document.clone();
        for (slot, pending) in &self.pending {
            let field = doc.personal.media_url_mut(*slot);
            if *field == pending.preview_ref {
                *field = pending.payload.to_data_url();
            }
        }
        doc
    }

    // ── Mutations ──────────────────────────────────────────────────────────

    fn touched(&mut self, changed: bool) -> bool {
        if changed {
            self.dirty = true;
            self.write_local();
        }
        changed
    }

    pub fn update_section(
        &mut self,
        section: RecordSection,
        partial: Map<String, Value>,
    ) -> Result<bool, DocumentError> {
        let changed = self.document.update_section(section, partial)?;
        Ok(self.touched(changed))
    }

    pub fn add_entity(&mut self, kind: CollectionKind) -> EntityId {
        let id = self.document.add_entity(kind);
        self.touched(true);
        id
    }

    /// `Ok(false)` when nothing changed, including when `id` does not exist.
    pub fn update_entity(
        &mut self,
        kind: CollectionKind,
        id: &EntityId,
        field: &str,
        value: Value,
    ) -> Result<bool, DocumentError> {
        let changed = self.document.update_entity(kind, id, field, value)?;
        Ok(self.touched(changed))
    }

    pub fn remove_entity(&mut self, kind: CollectionKind, id: &EntityId) -> bool {
        let changed = self.document.remove_entity(kind, id);
        self.touched(changed)
    }

    pub fn set_skills(&mut self, skills: Vec<String>) -> bool {
        let changed = self.document.set_skills(skills);
        self.touched(changed)
    }

    pub fn add_skill(&mut self, label: &str) -> bool {
        let changed = self.document.add_skill(label);
        self.touched(changed)
    }

    pub fn remove_skill(&mut self, label: &str) -> bool {
        let changed = self.document.remove_skill(label);
        self.touched(changed)
    }

    pub fn reorder_sections(&mut self, order: Vec<SectionId>) -> Result<bool, DocumentError> {
        let changed = self.document.reorder_sections(order)?;
        Ok(self.touched(changed))
    }

    /// Holds `payload` for the next save and points the media field at a fresh
    /// ephemeral reference, which is returned. Replaces any earlier selection.
    pub fn select_media(&mut self, slot: MediaSlot, payload: MediaPayload) -> String {
        let preview_ref = ephemeral_media_ref(slot);
        self.pending.insert(
            slot,
            PendingUpload {
                payload,
                preview_ref: preview_ref.clone(),
            },
        );
        self.document.set_media_url(slot, preview_ref.clone());
        self.touched(true);
        debug!(slot = %slot, "Media selected, upload deferred until save");
        preview_ref
    }

    /// Drops any pending payload for `slot` and blanks its field.
    pub fn clear_media(&mut self, slot: MediaSlot) -> bool {
        let had_pending = self.pending.remove(&slot).is_some();
        let changed = self.document.set_media_url(slot, String::new());
        self.touched(changed || had_pending)
    }

    // ── Identity transitions ───────────────────────────────────────────────

    /// Subscribes to `identity`'s remote document. The caller feeds the returned
    /// subscription's snapshots to [`Synchronizer::apply_remote_snapshot`].
    pub async fn sign_in(&mut self, identity: &str) -> Result<Subscription, SyncError> {
        if self.connection.identity().is_some() {
            self.sign_out(false);
        }
        self.connection = Connection::Transitioning {
            identity: identity.to_string(),
        };
        match self.remote.subscribe(identity).await {
            Ok(subscription) => {
                info!(identity, "Subscribed to remote document");
                Ok(subscription)
            }
            Err(e) => {
                warn!(identity, "Remote subscription failed, staying local: {e}");
                self.connection = Connection::Local;
                Err(e)
            }
        }
    }

    /// Back to local-only operation. With `reset`, the document returns to the
    /// default factory and the local cache is cleared.
    pub fn sign_out(&mut self, reset: bool) {
        if let Some(identity) = self.connection.identity() {
            info!(identity, reset, "Identity lost, returning to local mode");
        }
        self.connection = Connection::Local;
        self.origin = Origin::Local;
        if reset {
            self.document = default_document();
            self.pending.clear();
            self.dirty = false;
            if let Err(e) = self.local.clear() {
                warn!("Failed to clear local cache: {e}");
            }
        }
    }

    pub fn apply_remote_snapshot(&mut self, snapshot: RemoteSnapshot) -> SnapshotOutcome {
        let first = match &self.connection {
            Connection::Transitioning { identity } if *identity == snapshot.identity => true,
            Connection::Subscribed { identity } if *identity == snapshot.identity => false,
            _ => {
                debug!(identity = %snapshot.identity, "Ignoring snapshot for a non-current identity");
                return SnapshotOutcome::Stale;
            }
        };
        self.connection = Connection::Subscribed {
            identity: snapshot.identity.clone(),
        };

        // On the first snapshot our own tag may belong to an earlier sign-in of this
        // session, so it is only treated as an echo once subscribed.
        if !first && snapshot.origin == Some(self.session_id) {
            debug!("Ignoring echo of our own remote write");
            return SnapshotOutcome::OwnEcho;
        }

        let Some(raw) = snapshot.document else {
            if !self.document.is_pristine() {
                self.dirty = true;
            }
            info!(
                identity = %snapshot.identity,
                dirty = self.dirty,
                "No remote document yet, keeping the current one for the new account"
            );
            return SnapshotOutcome::Adopted;
        };

        if self.dirty {
            info!(identity = %snapshot.identity, "Discarding remote snapshot: local edits are unsaved");
            return SnapshotOutcome::DiscardedDirty;
        }

        let mut document = load_document(raw);
        document.strip_ephemeral_media();
        self.document = document;
        self.origin = Origin::Remote;
        self.write_local();
        info!(identity = %snapshot.identity, "Applied remote snapshot");
        SnapshotOutcome::Applied
    }

    // ── Save ───────────────────────────────────────────────────────────────

    /// Resolves pending media, then persists locally and (when signed in) remotely.
    /// Clears `dirty` only if every step succeeded; resolved URLs are kept either way.
    pub async fn save(&mut self) -> Result<SaveReport, SyncError> {
        let identity = self.connection.identity().map(str::to_owned);
        info!(identity = ?identity, pending = self.pending.len(), "Save started");

        let resolved = self.resolve_pending(identity.as_deref()).await?;

        let value = self.document.persisted_value()?;
        if let Err(e) = self.local.write(&value) {
            warn!("Local cache write failed during save: {e}");
        }

        let remote_written = match &identity {
            Some(identity) => {
                if let Err(e) = self.remote.write(identity, self.session_id, &value).await {
                    warn!(identity, "Remote write failed, document stays unsaved: {e}");
                    return Err(e);
                }
                self.origin = Origin::Remote;
                true
            }
            None => false,
        };

        self.dirty = false;
        info!(resolved = resolved.len(), remote_written, "Save finished");
        Ok(SaveReport {
            resolved,
            remote_written,
        })
    }

    /// Runs every pending upload concurrently. Successful slots get their URL and
    /// leave the pending map even when another slot fails.
    async fn resolve_pending(&mut self, identity: Option<&str>) -> Result<Vec<MediaSlot>, SyncError> {
        if self.pending.is_empty() {
            return Ok(Vec::new());
        }
        let store: Arc<dyn MediaStore> = match identity {
            Some(_) => Arc::clone(&self.uploader),
            None => Arc::new(InlineMediaStore),
        };

        let mut uploads = JoinSet::new();
        for (slot, pending) in &self.pending {
            let store = Arc::clone(&store);
            let payload = pending.payload.clone();
            let owner = identity.map(str::to_owned);
            let slot = *slot;
            uploads.spawn(async move { (slot, store.store(owner.as_deref(), slot, &payload).await) });
        }

        let mut resolved = Vec::new();
        let mut failure: Option<SyncError> = None;
        while let Some(joined) = uploads.join_next().await {
            match joined {
                Ok((slot, Ok(url))) => {
                    self.pending.remove(&slot);
                    self.document.set_media_url(slot, url);
                    resolved.push(slot);
                }
                Ok((slot, Err(e))) => {
                    warn!(slot = %slot, "Media upload failed: {e}");
                    failure.get_or_insert(e);
                }
                Err(e) => {
                    warn!("Media upload task failed: {e}");
                    failure.get_or_insert(SyncError::Storage(e.to_string()));
                }
            }
        }
        resolved.sort();

        if let Some(e) = failure {
            // Keep what did resolve across a restart.
            self.write_local();
            return Err(e);
        }
        Ok(resolved)
    }

    /// Best-effort crash backstop; failures are logged, never surfaced.
    fn write_local(&self) {
        let result = self
            .document
            .persisted_value()
            .map_err(SyncError::from)
            .and_then(|value| self.local.write(&value));
        if let Err(e) = result {
            warn!("Local cache write failed: {e}");
        }
    }
}
