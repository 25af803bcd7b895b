//! Content-ideas orchestrator.

use super::{Engine, Operation};
use crate::envelope::IdeaSet;
use crate::fingerprint::{self, context_fingerprint};
use crate::history::{HistoryEntry, HistoryLog};
use crate::{Error, Result};
use serde_json::json;
use std::sync::Arc;

pub struct IdeasOrchestrator {
    engine: Arc<Engine>,
    history: HistoryLog,
}

impl IdeasOrchestrator {
    pub(crate) fn new(engine: Arc<Engine>, history: HistoryLog) -> Self {
        Self { engine, history }
    }

    /// Generates content ideas from a site-context description.
    ///
    /// The context is normalized and truncated before fingerprinting and in
    /// the outbound payload, so over-long variants of the same text hit the
    /// same cache entry. Successful sessions are appended to the bounded
    /// history, independent of the cache.
    pub async fn generate_ideas(&self, context: &str) -> Result<IdeaSet> {
        let normalized = fingerprint::normalize_text(context);
        if normalized.is_empty() {
            return Err(Error::invalid_input(
                "site context must not be empty, analyze and save it first",
            ));
        }
        let truncated = fingerprint::truncate_context(&normalized);

        let settings = self.engine.settings().snapshot();
        let payload = json!({
            "context": truncated,
            "language": settings.language,
            "location": settings.location,
        });

        let fp = context_fingerprint(context);
        let envelope = self
            .engine
            .execute(Operation::ContentIdeas, &fp, payload, Some(&self.history))
            .await?;
        serde_json::from_value(envelope)
            .map_err(|e| Error::validation(format!("ideas payload has unexpected shape: {e}")))
    }

    /// Past successful sessions, newest first, capped at
    /// [`crate::history::MAX_HISTORY`].
    pub async fn history(&self) -> Result<Vec<HistoryEntry>> {
        self.history.entries().await
    }
}
