//! Result cache.
//!
//! Stores the *normalized* envelope of successful calls, keyed by request
//! fingerprint under `cache:{op}:{fingerprint}`. A hit bypasses quota
//! consumption and the transport entirely. Entry lifecycle is independent of
//! both the quota counters and the ideas history.

use crate::fingerprint::Fingerprint;
use crate::orchestrator::Operation;
use crate::store::StoreBackend;
use crate::Result;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub struct ResultCache {
    store: Arc<dyn StoreBackend>,
}

impl ResultCache {
    pub fn new(store: Arc<dyn StoreBackend>) -> Self {
        Self { store }
    }

    pub async fn get(&self, op: Operation, fingerprint: &Fingerprint) -> Result<Option<Value>> {
        let key = cache_key(op, fingerprint);
        match self.store.get(&key).await? {
            Some(raw) => match serde_json::from_slice(&raw) {
                Ok(value) => {
                    debug!(operation = %op, %fingerprint, "cache hit");
                    Ok(Some(value))
                }
                // Unreadable entry: treat as a miss and drop it.
                Err(_) => {
                    self.store.delete(&key).await?;
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    pub async fn set(
        &self,
        op: Operation,
        fingerprint: &Fingerprint,
        payload: &Value,
        ttl: Duration,
    ) -> Result<()> {
        let raw = serde_json::to_vec(payload)?;
        self.store
            .set(&cache_key(op, fingerprint), &raw, Some(ttl))
            .await
    }
}

fn cache_key(op: Operation, fingerprint: &Fingerprint) -> String {
    format!("cache:{}:{}", op.slug(), fingerprint)
}
