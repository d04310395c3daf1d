//! Shared handle around one [`Synchronizer`] plus the task that feeds it remote
//! snapshots while signed in.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::sync::remote::Subscription;
use crate::sync::synchronizer::{SaveReport, SyncStatus, Synchronizer};
use crate::sync::SyncError;

pub struct EditorSession {
    sync: Arc<Mutex<Synchronizer>>,
    pump: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl EditorSession {
    pub fn new(sync: Synchronizer) -> Self {
        EditorSession {
            sync: Arc::new(Mutex::new(sync)),
            pump: std::sync::Mutex::new(None),
        }
    }

    /// Exclusive access. Saves run under this lock, so a sign-out waits for an
    /// in-flight save to finish.
    pub async fn lock(&self) -> MutexGuard<'_, Synchronizer> {
        self.sync.lock().await
    }

    pub async fn status(&self) -> SyncStatus {
        self.sync.lock().await.status()
    }

    pub async fn save(&self) -> Result<SaveReport, SyncError> {
        self.sync.lock().await.save().await
    }

    /// Signs in as `identity`. Signing in again as the current identity is a no-op;
    /// a different identity replaces the current subscription.
    pub async fn sign_in(&self, identity: &str) -> Result<(), SyncError> {
        let mut sync = self.sync.lock().await;
        if sync.connection().identity() == Some(identity) {
            debug!(identity, "Already signed in");
            return Ok(());
        }
        self.stop_pump();
        let subscription = sync.sign_in(identity).await?;
        self.start_pump(subscription);
        Ok(())
    }

    pub async fn sign_out(&self, reset: bool) {
        let mut sync = self.sync.lock().await;
        self.stop_pump();
        sync.sign_out(reset);
    }

    fn start_pump(&self, mut subscription: Subscription) {
        let sync = Arc::clone(&self.sync);
        let handle = tokio::spawn(async move {
            while let Some(snapshot) = subscription.recv().await {
                let outcome = sync.lock().await.apply_remote_snapshot(snapshot);
                debug!(?outcome, "Remote snapshot processed");
            }
            info!("Remote snapshot feed ended");
        });
        let mut pump = self.pump.lock().unwrap_or_else(|e| e.into_inner());
        *pump = Some(handle);
    }

    fn stop_pump(&self) {
        let mut pump = self.pump.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = pump.take() {
            handle.abort();
        }
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        self.stop_pump();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::local::MemoryCache;
    use crate::sync::media::InlineMediaStore;
    use crate::sync::remote::{MemoryRemoteStore, RemoteStore};
    use crate::sync::synchronizer::Connection;
    use serde_json::json;
    use std::time::Duration;
    use uuid::Uuid;

    fn session() -> (EditorSession, Arc<MemoryRemoteStore>) {
        let remote = Arc::new(MemoryRemoteStore::default());
        let sync = Synchronizer::start(
            Arc::new(MemoryCache::default()),
            remote.clone(),
            Arc::new(InlineMediaStore),
        );
        (EditorSession::new(sync), remote)
    }

    async fn wait_for<F>(session: &EditorSession, mut check: F)
    where
        F: FnMut(&Synchronizer) -> bool,
    {
        for _ in 0..100 {
            if check(&*session.lock().await) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached");
    }

    #[tokio::test]
    async fn test_sign_in_reaches_subscribed() {
        let (session, _remote) = session();
        session.sign_in("alice").await.unwrap();
        wait_for(&session, |s| matches!(s.connection(), Connection::Subscribed { .. })).await;
    }

    #[tokio::test]
    async fn test_other_device_write_reaches_clean_session() {
        let (session, remote) = session();
        session.sign_in("alice").await.unwrap();
        wait_for(&session, |s| matches!(s.connection(), Connection::Subscribed { .. })).await;

        remote
            .write("alice", Uuid::new_v4(), &json!({"skills": ["From another device"]}))
            .await
            .unwrap();
        wait_for(&session, |s| s.document().skills == vec!["From another device"]).await;
    }

    #[tokio::test]
    async fn test_save_then_own_echo_keeps_document() {
        let (session, _remote) = session();
        session.sign_in("alice").await.unwrap();
        wait_for(&session, |s| matches!(s.connection(), Connection::Subscribed { .. })).await;

        session.lock().await.add_skill("Rust");
        let report = session.save().await.unwrap();
        assert!(report.remote_written);
        tokio::time::sleep(Duration::from_millis(30)).await;
        let sync = session.lock().await;
        assert_eq!(sync.document().skills, vec!["Rust"]);
        assert!(!sync.is_dirty());
    }

    #[tokio::test]
    async fn test_sign_out_stops_feed() {
        let (session, remote) = session();
        session.sign_in("alice").await.unwrap();
        wait_for(&session, |s| matches!(s.connection(), Connection::Subscribed { .. })).await;
        session.sign_out(true).await;

        remote
            .write("alice", Uuid::new_v4(), &json!({"skills": ["Late"]}))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        let sync = session.lock().await;
        assert!(sync.document().skills.is_empty());
        assert_eq!(sync.connection(), &Connection::Local);
    }

    #[tokio::test]
    async fn test_repeat_sign_in_is_noop() {
        let (session, _remote) = session();
        session.sign_in("alice").await.unwrap();
        wait_for(&session, |s| matches!(s.connection(), Connection::Subscribed { .. })).await;
        session.sign_in("alice").await.unwrap();
        assert!(matches!(
            session.lock().await.connection(),
            Connection::Subscribed { .. }
        ));
    }
}
