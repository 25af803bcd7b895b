//! In-memory store backend.

use super::backend::StoreBackend;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct Entry {
    data: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(data: Vec<u8>, ttl: Option<Duration>) -> Self {
        Self {
            data,
            expires_at: ttl.map(|t| Instant::now() + t),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// Mutex-protected map with lazy expiry.
///
/// All conditional primitives run under the single map lock, which gives the
/// atomicity the lock manager and quota counter rely on. Expired entries are
/// dropped on access plus an occasional full sweep, so a key held only by an
/// expired lock lease is observably absent.
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
    sweep_every: u64,
    op_count: Mutex<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            sweep_every: 256,
            op_count: Mutex::new(0),
        }
    }

    fn lock_entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Entry>>> {
        self.entries
            .lock()
            .map_err(|_| Error::Store("memory store poisoned".into()))
    }

    fn maybe_sweep(&self, entries: &mut HashMap<String, Entry>) {
        let mut count = match self.op_count.lock() {
            Ok(c) => c,
            Err(_) => return,
        };
        *count += 1;
        if *count % self.sweep_every == 0 {
            entries.retain(|_, e| !e.is_expired());
        }
    }

    fn live_value(entries: &mut HashMap<String, Entry>, key: &str) -> Option<Vec<u8>> {
        match entries.get(key) {
            Some(e) if e.is_expired() => {
                entries.remove(key);
                None
            }
            Some(e) => Some(e.data.clone()),
            None => None,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoreBackend for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut entries = self.lock_entries()?;
        self.maybe_sweep(&mut entries);
        Ok(Self::live_value(&mut entries, key))
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut entries = self.lock_entries()?;
        self.maybe_sweep(&mut entries);
        entries.insert(key.to_string(), Entry::new(value.to_vec(), ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut entries = self.lock_entries()?;
        Ok(match entries.remove(key) {
            Some(e) => !e.is_expired(),
            None => false,
        })
    }

    async fn set_if_absent(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<bool> {
        let mut entries = self.lock_entries()?;
        if Self::live_value(&mut entries, key).is_some() {
            return Ok(false);
        }
        entries.insert(key.to_string(), Entry::new(value.to_vec(), ttl));
        Ok(true)
    }

    async fn increment_if_below(
        &self,
        key: &str,
        ceiling: u64,
        ttl: Option<Duration>,
    ) -> Result<Option<u64>> {
        let mut entries = self.lock_entries()?;
        let current = match Self::live_value(&mut entries, key) {
            Some(raw) => String::from_utf8_lossy(&raw)
                .parse::<u64>()
                .map_err(|_| Error::Store(format!("counter at {key} is not numeric")))?,
            None => 0,
        };
        if current >= ceiling {
            return Ok(None);
        }
        let next = current + 1;
        // Keep the original expiry when the counter already exists.
        match entries.get_mut(key) {
            Some(e) => e.data = next.to_string().into_bytes(),
            None => {
                entries.insert(key.to_string(), Entry::new(next.to_string().into_bytes(), ttl));
            }
        }
        Ok(Some(next))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_set_delete_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);
        store.set("k", b"v", None).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(b"v".to_vec()));
        assert!(store.delete("k").await.unwrap());
        assert!(!store.delete("k").await.unwrap());
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let store = MemoryStore::new();
        store
            .set("k", b"v", Some(Duration::from_millis(20)))
            .await
            .unwrap();
        assert!(store.get("k").await.unwrap().is_some());
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_if_absent_rejects_held_key() {
        let store = MemoryStore::new();
        assert!(store.set_if_absent("lock", b"1", None).await.unwrap());
        assert!(!store.set_if_absent("lock", b"1", None).await.unwrap());
        store.delete("lock").await.unwrap();
        assert!(store.set_if_absent("lock", b"1", None).await.unwrap());
    }

    #[tokio::test]
    async fn set_if_absent_succeeds_after_expiry() {
        let store = MemoryStore::new();
        assert!(store
            .set_if_absent("lock", b"1", Some(Duration::from_millis(20)))
            .await
            .unwrap());
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(store.set_if_absent("lock", b"1", None).await.unwrap());
    }

    #[tokio::test]
    async fn increment_stops_at_ceiling() {
        let store = MemoryStore::new();
        assert_eq!(
            store.increment_if_below("c", 2, None).await.unwrap(),
            Some(1)
        );
        assert_eq!(
            store.increment_if_below("c", 2, None).await.unwrap(),
            Some(2)
        );
        assert_eq!(store.increment_if_below("c", 2, None).await.unwrap(), None);
        // Count is readable as decimal ASCII.
        assert_eq!(store.get("c").await.unwrap(), Some(b"2".to_vec()));
    }

    #[tokio::test]
    async fn increment_is_atomic_under_contention() {
        use std::sync::Arc;
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for _ in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.increment_if_below("c", 10, None).await.unwrap()
            }));
        }
        let mut granted = 0;
        for h in handles {
            if h.await.unwrap().is_some() {
                granted += 1;
            }
        }
        assert_eq!(granted, 10);
        assert_eq!(store.get("c").await.unwrap(), Some(b"10".to_vec()));
    }
}
