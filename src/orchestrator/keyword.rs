//! Keyword research orchestrator.

use super::{Engine, Operation};
use crate::envelope::KeywordList;
use crate::fingerprint::{self, keyword_fingerprint};
use crate::{Error, Result};
use serde_json::json;
use std::sync::Arc;

/// Source of the free-form site description forwarded to the research
/// workflow when the caller opts into automatic context. External
/// collaborator; the content side of the application owns the data.
pub trait SiteContextSource: Send + Sync {
    fn site_context(&self) -> String;
}

/// Provider used when no site context is wired up.
pub struct NoSiteContext;

impl SiteContextSource for NoSiteContext {
    fn site_context(&self) -> String {
        String::new()
    }
}

pub struct KeywordOrchestrator {
    engine: Arc<Engine>,
    context: Arc<dyn SiteContextSource>,
}

impl KeywordOrchestrator {
    pub(crate) fn new(engine: Arc<Engine>, context: Arc<dyn SiteContextSource>) -> Self {
        Self { engine, context }
    }

    /// Researches keyword suggestions for a seed keyword.
    ///
    /// The fingerprint covers the normalized seed plus the context flag, so
    /// `("robot vacuum", true)` and `("robot vacuum", false)` are separate
    /// cache and lock entries.
    pub async fn research(&self, seed: &str, use_context: bool) -> Result<KeywordList> {
        let seed = fingerprint::normalize_text(seed);
        if seed.is_empty() {
            return Err(Error::invalid_input("seed keyword must not be empty"));
        }

        let settings = self.engine.settings().snapshot();
        let context = if use_context {
            fingerprint::truncate_context(&self.context.site_context()).to_string()
        } else {
            String::new()
        };
        let payload = json!({
            "keyword_seed": seed,
            "context": context,
            "language": settings.language,
            "location": settings.location,
        });

        let fp = keyword_fingerprint(&seed, use_context);
        let envelope = self
            .engine
            .execute(Operation::KeywordResearch, &fp, payload, None)
            .await?;
        serde_json::from_value(envelope).map_err(|e| {
            Error::validation(format!("keyword payload has unexpected shape: {e}"))
        })
    }
}
