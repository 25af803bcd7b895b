//! Bounded history of past ideas sessions.
//!
//! A single store key holds the last [`MAX_HISTORY`] successful content-idea
//! sessions, newest first; the oldest entry is silently evicted. The list
//! never expires, its lifecycle is independent of the result cache TTL.

use crate::store::StoreBackend;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

pub const MAX_HISTORY: usize = 20;

const HISTORY_KEY: &str = "history:ideas";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub strategy_notes: String,
    pub ideas: Vec<Value>,
    #[serde(default)]
    pub meta: Value,
}

pub struct HistoryLog {
    store: Arc<dyn StoreBackend>,
}

impl HistoryLog {
    pub fn new(store: Arc<dyn StoreBackend>) -> Self {
        Self { store }
    }

    /// Prepends a session built from a normalized ideas envelope and evicts
    /// anything past the cap.
    pub async fn record(&self, envelope: &Value) -> Result<HistoryEntry> {
        let entry = HistoryEntry {
            session_id: format!("ideas_{}", Uuid::new_v4().simple()),
            timestamp: Utc::now(),
            strategy_notes: envelope
                .get("strategy_notes")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            ideas: envelope
                .get("ideas")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            meta: envelope.get("meta").cloned().unwrap_or(Value::Null),
        };

        let mut entries = self.entries().await?;
        entries.insert(0, entry.clone());
        entries.truncate(MAX_HISTORY);
        self.store
            .set(HISTORY_KEY, &serde_json::to_vec(&entries)?, None)
            .await?;
        Ok(entry)
    }

    /// Past sessions, newest first.
    pub async fn entries(&self) -> Result<Vec<HistoryEntry>> {
        match self.store.get(HISTORY_KEY).await? {
            Some(raw) => Ok(serde_json::from_slice(&raw)?),
            None => Ok(Vec::new()),
        }
    }
}
