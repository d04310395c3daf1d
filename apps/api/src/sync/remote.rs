//! Remote store tier: one document per identity, with push notifications.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgListener;
use sqlx::types::Json;
use sqlx::PgPool;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::sync::SyncError;

/// Notification channel used by [`PgRemoteStore`].
pub const NOTIFY_CHANNEL: &str = "resume_documents";

/// A pushed view of an identity's stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteSnapshot {
    pub identity: String,
    /// Session that wrote this version; `None` for rows written by older clients.
    pub origin: Option<Uuid>,
    /// `None` when nothing has been stored for the identity yet.
    pub document: Option<Value>,
}

/// Live feed of snapshots for one identity. The first snapshot reflects the state
/// at subscription time. Dropping the subscription stops the feed.
pub struct Subscription {
    snapshots: mpsc::UnboundedReceiver<RemoteSnapshot>,
    _feed: AbortOnDrop,
}

impl Subscription {
    pub fn new(snapshots: mpsc::UnboundedReceiver<RemoteSnapshot>, feed: JoinHandle<()>) -> Self {
        Subscription {
            snapshots,
            _feed: AbortOnDrop(feed),
        }
    }

    /// Next snapshot; `None` once the feed has ended.
    pub async fn recv(&mut self) -> Option<RemoteSnapshot> {
        self.snapshots.recv().await
    }
}

struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn subscribe(&self, identity: &str) -> Result<Subscription, SyncError>;

    async fn write(&self, identity: &str, origin: Uuid, document: &Value) -> Result<(), SyncError>;
}

// ────────────────────────────────────────────────────────────────────────────
// PostgreSQL
// ────────────────────────────────────────────────────────────────────────────

pub struct PgRemoteStore {
    pool: PgPool,
}

impl PgRemoteStore {
    pub fn new(pool: PgPool) -> Self {
        PgRemoteStore { pool }
    }
}

async fn read_row(pool: &PgPool, identity: &str) -> Result<RemoteSnapshot, SyncError> {
    let row: Option<(Json<Value>, Option<Uuid>)> =
        sqlx::query_as("SELECT document, origin FROM resume_documents WHERE identity_id = $1")
            .bind(identity)
            .fetch_optional(pool)
            .await?;
    Ok(match row {
        Some((Json(document), origin)) => RemoteSnapshot {
            identity: identity.to_string(),
            origin,
            document: Some(document),
        },
        None => RemoteSnapshot {
            identity: identity.to_string(),
            origin: None,
            document: None,
        },
    })
}

#[async_trait]
impl RemoteStore for PgRemoteStore {
    async fn subscribe(&self, identity: &str) -> Result<Subscription, SyncError> {
        // Listen before the first read so no write can slip between the two.
        let mut listener = PgListener::connect_with(&self.pool)
            .await
            .map_err(|e| SyncError::Subscribe(e.to_string()))?;
        listener
            .listen(NOTIFY_CHANNEL)
            .await
            .map_err(|e| SyncError::Subscribe(e.to_string()))?;

        let (tx, rx) = mpsc::unbounded_channel();
        let initial = read_row(&self.pool, identity)
            .await
            .map_err(|e| SyncError::Subscribe(e.to_string()))?;
        let _ = tx.send(initial);

        let pool = self.pool.clone();
        let identity = identity.to_string();
        let feed = tokio::spawn(async move {
            loop {
                let notification = match listener.recv().await {
                    Ok(n) => n,
                    Err(e) => {
                        warn!(identity = %identity, "Remote listener failed: {e}");
                        break;
                    }
                };
                if notification.payload() != identity {
                    continue;
                }
                match read_row(&pool, &identity).await {
                    Ok(snapshot) => {
                        if tx.send(snapshot).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!(identity = %identity, "Failed to re-read remote document: {e}"),
                }
            }
        });
        Ok(Subscription::new(rx, feed))
    }

    async fn write(&self, identity: &str, origin: Uuid, document: &Value) -> Result<(), SyncError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO resume_documents (identity_id, document, origin, updated_at) \
             VALUES ($1, $2, $3, NOW()) \
             ON CONFLICT (identity_id) DO UPDATE \
             SET document = EXCLUDED.document, origin = EXCLUDED.origin, updated_at = NOW()",
        )
        .bind(identity)
        .bind(Json(document))
        .bind(origin)
        .execute(&mut *tx)
        .await?;
        sqlx::query("SELECT pg_notify($1, $2)")
            .bind(NOTIFY_CHANNEL)
            .bind(identity)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        debug!(identity, "Remote document written");
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-process store
// ────────────────────────────────────────────────────────────────────────────

/// Remote store living in this process. Used when no database is configured and
/// in tests; it can be told to fail writes to exercise retry paths.
pub struct MemoryRemoteStore {
    rows: Arc<Mutex<HashMap<String, (Uuid, Value)>>>,
    changes: broadcast::Sender<RemoteSnapshot>,
    fail_writes: AtomicBool,
}

impl Default for MemoryRemoteStore {
    fn default() -> Self {
        let (changes, _) = broadcast::channel(64);
        MemoryRemoteStore {
            rows: Arc::new(Mutex::new(HashMap::new())),
            changes,
            fail_writes: AtomicBool::new(false),
        }
    }
}

impl MemoryRemoteStore {
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn snapshot(&self, identity: &str) -> RemoteSnapshot {
        read_memory_row(&self.rows, identity)
    }
}

fn read_memory_row(rows: &Mutex<HashMap<String, (Uuid, Value)>>, identity: &str) -> RemoteSnapshot {
    let rows = rows.lock().unwrap_or_else(|e| e.into_inner());
    match rows.get(identity) {
        Some((origin, document)) => RemoteSnapshot {
            identity: identity.to_string(),
            origin: Some(*origin),
            document: Some(document.clone()),
        },
        None => RemoteSnapshot {
            identity: identity.to_string(),
            origin: None,
            document: None,
        },
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn subscribe(&self, identity: &str) -> Result<Subscription, SyncError> {
        let mut changes = self.changes.subscribe();
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(self.snapshot(identity));

        let rows = Arc::clone(&self.rows);
        let identity = identity.to_string();
        let feed = tokio::spawn(async move {
            loop {
                let snapshot = match changes.recv().await {
                    Ok(snapshot) if snapshot.identity == identity => snapshot,
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(_)) => read_memory_row(&rows, &identity),
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                if tx.send(snapshot).is_err() {
                    break;
                }
            }
        });
        Ok(Subscription::new(rx, feed))
    }

    async fn write(&self, identity: &str, origin: Uuid, document: &Value) -> Result<(), SyncError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SyncError::Remote("remote store unavailable".to_string()));
        }
        self.rows
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(identity.to_string(), (origin, document.clone()));
        let _ = self.changes.send(RemoteSnapshot {
            identity: identity.to_string(),
            origin: Some(origin),
            document: Some(document.clone()),
        });
        Ok(())
    }
}
