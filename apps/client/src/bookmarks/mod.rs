//! Bookmark store: the durable set of saved job listings.
//!
//! One record under `BOOKMARKS_KEY` holds the whole list as JSON. It is read
//! once at startup and rewritten in full on every mutation, before the
//! mutating call returns. The store outlives analysis sessions: `reset` on
//! the orchestrator never touches it.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::job::JobListing;

pub mod kv;

use kv::KeyValueStore;

/// Well-known record name for the saved-jobs list.
pub const BOOKMARKS_KEY: &str = "applyedge_saved";

pub struct BookmarkStore {
    kv: Arc<dyn KeyValueStore>,
    jobs: Mutex<Vec<JobListing>>,
    /// Serializes mutate-then-persist so the stored order matches memory.
    write_lock: tokio::sync::Mutex<()>,
}

impl BookmarkStore {
    /// Loads the saved list. Missing, unreadable or corrupt state yields an empty set.
    pub async fn load(kv: Arc<dyn KeyValueStore>) -> Self {
        let jobs = match kv.get(BOOKMARKS_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<JobListing>>(&raw) {
                Ok(jobs) => dedup_by_id(jobs),
                Err(e) => {
                    warn!("Saved jobs record is corrupt, starting empty: {e}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Saved jobs could not be read, starting empty: {e}");
                Vec::new()
            }
        };
        info!("Loaded {} saved jobs", jobs.len());

        Self {
            kv,
            jobs: Mutex::new(jobs),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Saves a listing. An existing entry with the same id is replaced and
    /// moves to the end of the list.
    pub async fn add(&self, job: JobListing) -> Result<(), AppError> {
        let _write = self.write_lock.lock().await;
        let snapshot = {
            let mut jobs = self.jobs();
            jobs.retain(|j| j.id != job.id);
            jobs.push(job);
            jobs.clone()
        };
        self.persist(&snapshot).await
    }

    /// Removes a listing by id. Unknown ids are a no-op.
    pub async fn remove(&self, id: &str) -> Result<(), AppError> {
        let _write = self.write_lock.lock().await;
        let snapshot = {
            let mut jobs = self.jobs();
            let before = jobs.len();
            jobs.retain(|j| j.id != id);
            if jobs.len() == before {
                return Ok(());
            }
            jobs.clone()
        };
        self.persist(&snapshot).await
    }

    /// Saves the listing if unsaved, otherwise removes it. Returns the new saved state.
    pub async fn toggle(&self, job: JobListing) -> Result<bool, AppError> {
        if self.is_saved(&job.id) {
            self.remove(&job.id).await?;
            Ok(false)
        } else {
            self.add(job).await?;
            Ok(true)
        }
    }

    pub fn is_saved(&self, id: &str) -> bool {
        self.jobs().iter().any(|j| j.id == id)
    }

    /// Saved listings in persisted order.
    pub fn list(&self) -> Vec<JobListing> {
        self.jobs().clone()
    }

    pub fn len(&self) -> usize {
        self.jobs().len()
    }

    fn jobs(&self) -> MutexGuard<'_, Vec<JobListing>> {
        self.jobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Writes the full list. On failure the in-memory change stays in place
    /// and the error is handed back as a warning for the caller to show.
    async fn persist(&self, snapshot: &[JobListing]) -> Result<(), AppError> {
        let encoded = serde_json::to_string(snapshot)
            .map_err(|e| AppError::Persistence(format!("could not encode saved jobs: {e}")))?;
        match self.kv.put(BOOKMARKS_KEY, &encoded).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("Saved jobs write failed; keeping in-memory state: {e}");
                Err(match e {
                    AppError::Persistence(msg) => AppError::Persistence(msg),
                    other => AppError::Persistence(other.to_string()),
                })
            }
        }
    }
}

/// A hand-edited or legacy record may repeat ids; the last occurrence wins.
fn dedup_by_id(jobs: Vec<JobListing>) -> Vec<JobListing> {
    let mut unique: Vec<JobListing> = Vec::with_capacity(jobs.len());
    for job in jobs {
        unique.retain(|j| j.id != job.id);
        unique.push(job);
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::sample_listing;
    use async_trait::async_trait;
    use kv::MemoryStore;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Store whose reads or writes can be made to fail.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_reads: bool,
        fail_writes: AtomicBool,
    }

    #[async_trait]
    impl KeyValueStore for FlakyStore {
        async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
            if self.fail_reads {
                return Err(AppError::Persistence("disk unreadable".to_string()));
            }
            self.inner.get(key).await
        }

        async fn put(&self, key: &str, value: &str) -> Result<(), AppError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(AppError::Persistence("disk full".to_string()));
            }
            self.inner.put(key, value).await
        }
    }

    fn ids(store: &BookmarkStore) -> Vec<String> {
        store.list().into_iter().map(|j| j.id).collect()
    }

    async fn persisted_ids(kv: &dyn KeyValueStore) -> Vec<String> {
        let raw = kv.get(BOOKMARKS_KEY).await.unwrap().unwrap_or_else(|| "[]".to_string());
        serde_json::from_str::<Vec<JobListing>>(&raw)
            .unwrap()
            .into_iter()
            .map(|j| j.id)
            .collect()
    }

    #[tokio::test]
    async fn test_add_then_remove_restores_previous_set() {
        let kv = Arc::new(MemoryStore::new());
        let store = BookmarkStore::load(kv.clone()).await;
        store.add(sample_listing("a")).await.unwrap();
        let before = ids(&store);

        store.add(sample_listing("b")).await.unwrap();
        store.remove("b").await.unwrap();

        assert_eq!(ids(&store), before);
        assert_eq!(persisted_ids(kv.as_ref()).await, before);
    }

    #[tokio::test]
    async fn test_adding_same_id_twice_is_an_upsert() {
        let store = BookmarkStore::load(Arc::new(MemoryStore::new())).await;
        store.add(sample_listing("a")).await.unwrap();
        let mut fresher = sample_listing("a");
        fresher.description = "Updated description".to_string();
        store.add(fresher).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.list()[0].description, "Updated description");
    }

    #[tokio::test]
    async fn test_upsert_moves_entry_to_the_end() {
        let store = BookmarkStore::load(Arc::new(MemoryStore::new())).await;
        for id in ["a", "b", "c"] {
            store.add(sample_listing(id)).await.unwrap();
        }
        store.add(sample_listing("a")).await.unwrap();
        assert_eq!(ids(&store), vec!["b", "c", "a"]);
    }

    #[tokio::test]
    async fn test_removing_unknown_id_is_a_no_op() {
        let store = BookmarkStore::load(Arc::new(MemoryStore::new())).await;
        store.add(sample_listing("a")).await.unwrap();
        store.remove("zzz").await.unwrap();
        assert_eq!(ids(&store), vec!["a"]);
    }

    #[tokio::test]
    async fn test_every_mutation_is_written_through() {
        let kv = Arc::new(MemoryStore::new());
        let store = BookmarkStore::load(kv.clone()).await;

        store.add(sample_listing("a")).await.unwrap();
        assert_eq!(persisted_ids(kv.as_ref()).await, vec!["a"]);
        store.add(sample_listing("b")).await.unwrap();
        assert_eq!(persisted_ids(kv.as_ref()).await, vec!["a", "b"]);
        store.remove("a").await.unwrap();
        assert_eq!(persisted_ids(kv.as_ref()).await, vec!["b"]);
    }

    #[tokio::test]
    async fn test_reload_sees_persisted_list_in_order() {
        let kv = Arc::new(MemoryStore::new());
        {
            let store = BookmarkStore::load(kv.clone()).await;
            for id in ["x", "y", "z"] {
                store.add(sample_listing(id)).await.unwrap();
            }
        }
        let reloaded = BookmarkStore::load(kv).await;
        assert_eq!(ids(&reloaded), vec!["x", "y", "z"]);
        assert!(reloaded.is_saved("y"));
    }

    #[tokio::test]
    async fn test_corrupt_record_loads_as_empty() {
        let kv = Arc::new(MemoryStore::new());
        kv.put(BOOKMARKS_KEY, "{not json").await.unwrap();
        let store = BookmarkStore::load(kv).await;
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_unreadable_store_loads_as_empty() {
        let kv = Arc::new(FlakyStore {
            fail_reads: true,
            ..FlakyStore::default()
        });
        let store = BookmarkStore::load(kv).await;
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_in_memory_state() {
        let kv = Arc::new(FlakyStore::default());
        let store = BookmarkStore::load(kv.clone()).await;
        kv.fail_writes.store(true, Ordering::SeqCst);

        let err = store.add(sample_listing("a")).await.unwrap_err();

        assert!(matches!(err, AppError::Persistence(_)));
        assert!(store.is_saved("a"), "user's change must not be lost");
    }

    #[tokio::test]
    async fn test_toggle_flips_saved_state() {
        let store = BookmarkStore::load(Arc::new(MemoryStore::new())).await;
        assert!(store.toggle(sample_listing("a")).await.unwrap());
        assert!(!store.toggle(sample_listing("a")).await.unwrap());
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_ids_in_record_collapse_on_load() {
        let kv = Arc::new(MemoryStore::new());
        let raw = serde_json::to_string(&vec![
            sample_listing("a"),
            sample_listing("b"),
            sample_listing("a"),
        ])
        .unwrap();
        kv.put(BOOKMARKS_KEY, &raw).await.unwrap();
        let store = BookmarkStore::load(kv).await;
        assert_eq!(ids(&store), vec!["b", "a"]);
    }
}
