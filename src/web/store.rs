//! In-memory session store that forgets sessions once they expire.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, ExpiredDeletion, SessionStore};
use tracing::{debug, error};

/// Session records keyed by id, dropped on load once expired and by a periodic purge.
#[derive(Clone, Debug, Default)]
pub(crate) struct ExpiringMemoryStore(Arc<Mutex<HashMap<Id, Record>>>);

fn is_active(record: &Record, now: OffsetDateTime) -> bool {
    record.expiry_date > now
}

impl ExpiringMemoryStore {
    /// Runs [`ExpiredDeletion::delete_expired`] every `period` until the task is aborted.
    pub(crate) fn spawn_purge(&self, period: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // first tick is immediate
            interval.tick().await;
            loop {
                interval.tick().await;
                if let Err(err) = store.delete_expired().await {
                    error!("Failed to purge expired sessions: {}", err);
                }
            }
        })
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.0.lock().await.len()
    }
}

#[async_trait]
impl SessionStore for ExpiringMemoryStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let mut sessions = self.0.lock().await;
        while sessions.contains_key(&record.id) {
            record.id = Id::default();
        }
        sessions.insert(record.id, record.clone());
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.0.lock().await.insert(record.id, record.clone());
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let mut sessions = self.0.lock().await;
        match sessions.get(session_id) {
            Some(record) if is_active(record, OffsetDateTime::now_utc()) => Ok(Some(record.clone())),
            Some(_) => {
                sessions.remove(session_id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.0.lock().await.remove(session_id);
        Ok(())
    }
}

#[async_trait]
impl ExpiredDeletion for ExpiringMemoryStore {
    async fn delete_expired(&self) -> session_store::Result<()> {
        let now = OffsetDateTime::now_utc();
        let mut sessions = self.0.lock().await;
        let before = sessions.len();
        sessions.retain(|_, record| is_active(record, now));
        let purged = before - sessions.len();
        if purged > 0 {
            debug!(purged, "Purged expired sessions");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration as TimeDuration;

    fn record_with_history(expires_in: TimeDuration) -> Record {
        let mut data = HashMap::new();
        data.insert(
            "history".to_string(),
            serde_json::json!({ "entries": [{ "prompt": "a lighthouse" }] }),
        );
        Record {
            id: Id::default(),
            data,
            expiry_date: OffsetDateTime::now_utc() + expires_in,
        }
    }

    #[tokio::test]
    async fn purge_drops_expired_sessions_only() {
        let store = ExpiringMemoryStore::default();
        let mut live = record_with_history(TimeDuration::minutes(30));
        let mut expired = record_with_history(TimeDuration::minutes(-61));
        store.create(&mut live).await.expect("create live");
        store.create(&mut expired).await.expect("create expired");
        assert_eq!(store.len().await, 2);

        store.delete_expired().await.expect("purge");

        assert_eq!(store.len().await, 1);
        assert_eq!(store.load(&live.id).await.expect("load live"), Some(live));
        assert_eq!(store.load(&expired.id).await.expect("load expired"), None);
    }

    #[tokio::test]
    async fn loading_an_expired_session_removes_its_history() {
        let store = ExpiringMemoryStore::default();
        let mut expired = record_with_history(TimeDuration::minutes(-61));
        store.create(&mut expired).await.expect("create");

        assert_eq!(store.load(&expired.id).await.expect("load"), None);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn purge_task_runs_on_its_interval() {
        let store = ExpiringMemoryStore::default();
        let mut expired = record_with_history(TimeDuration::minutes(-61));
        store.create(&mut expired).await.expect("create");

        let task = store.spawn_purge(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(100)).await;
        task.abort();

        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn colliding_ids_are_replaced() {
        let store = ExpiringMemoryStore::default();
        let mut first = record_with_history(TimeDuration::minutes(30));
        store.create(&mut first).await.expect("create first");
        let mut second = record_with_history(TimeDuration::minutes(30));
        second.id = first.id;
        store.create(&mut second).await.expect("create second");
        assert_ne!(first.id, second.id);
        assert_eq!(store.len().await, 2);
    }
}
