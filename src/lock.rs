//! Single-flight lock leases.
//!
//! A lease exists only while a request for its fingerprint is in flight.
//! Acquisition is a real compare-and-set on the shared store, so duplicate
//! concurrent requests are rejected rather than queued, across threads and
//! processes alike. If the holder crashes before releasing, the lease
//! self-expires at its TTL; no explicit deadlock recovery is needed.

use crate::fingerprint::Fingerprint;
use crate::orchestrator::Operation;
use crate::store::StoreBackend;
use crate::Result;
use std::sync::Arc;

pub struct LockManager {
    store: Arc<dyn StoreBackend>,
}

impl LockManager {
    pub fn new(store: Arc<dyn StoreBackend>) -> Self {
        Self { store }
    }

    /// Attempts to take the lease for `(op, fingerprint)`. Returns false
    /// when another request already holds it.
    pub async fn acquire(&self, op: Operation, fingerprint: &Fingerprint) -> Result<bool> {
        self.store
            .set_if_absent(&lock_key(op, fingerprint), b"1", Some(op.lock_ttl()))
            .await
    }

    pub async fn release(&self, op: Operation, fingerprint: &Fingerprint) -> Result<()> {
        self.store.delete(&lock_key(op, fingerprint)).await?;
        Ok(())
    }
}

fn lock_key(op: Operation, fingerprint: &Fingerprint) -> String {
    format!("lock:{}:{}", op.slug(), fingerprint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::keyword_fingerprint;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn second_acquire_is_rejected_until_release() {
        let locks = LockManager::new(Arc::new(MemoryStore::new()));
        let fp = keyword_fingerprint("robot vacuum", false);

        assert!(locks.acquire(Operation::KeywordResearch, &fp).await.unwrap());
        assert!(!locks.acquire(Operation::KeywordResearch, &fp).await.unwrap());
        locks.release(Operation::KeywordResearch, &fp).await.unwrap();
        assert!(locks.acquire(Operation::KeywordResearch, &fp).await.unwrap());
    }

    #[tokio::test]
    async fn leases_are_scoped_per_operation_and_fingerprint() {
        let locks = LockManager::new(Arc::new(MemoryStore::new()));
        let fp_a = keyword_fingerprint("robot vacuum", false);
        let fp_b = keyword_fingerprint("air fryer", false);

        assert!(locks.acquire(Operation::KeywordResearch, &fp_a).await.unwrap());
        // Different fingerprint and different operation do not conflict.
        assert!(locks.acquire(Operation::KeywordResearch, &fp_b).await.unwrap());
        assert!(locks.acquire(Operation::ContentIdeas, &fp_a).await.unwrap());
    }
}
