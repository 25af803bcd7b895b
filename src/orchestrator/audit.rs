//! SEO audit orchestrator.

use super::{Engine, Operation};
use crate::envelope::AuditReport;
use crate::fingerprint::payload_fingerprint;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Extracted content of one post or product, as the audit workflow expects
/// it. Field names are part of the wire contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditContent {
    pub content_id: u64,
    pub content_type: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    pub slug: String,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub keyword_focus: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub images: Vec<ImageRef>,
    #[serde(default)]
    pub internal_links: u32,
    #[serde(default)]
    pub external_links: u32,
    #[serde(default)]
    pub word_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub src: String,
    #[serde(default)]
    pub alt: String,
}

/// Content extraction is an external collaborator: the content-management
/// side of the application resolves an id into an [`AuditContent`].
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn collect(&self, content_id: u64) -> Result<AuditContent>;
}

/// Source used when auditing is not wired up.
pub struct NoContentSource;

#[async_trait]
impl ContentSource for NoContentSource {
    async fn collect(&self, _content_id: u64) -> Result<AuditContent> {
        Err(Error::configuration("no content source configured"))
    }
}

pub struct AuditOrchestrator {
    engine: Arc<Engine>,
    content: Arc<dyn ContentSource>,
}

impl AuditOrchestrator {
    pub(crate) fn new(engine: Arc<Engine>, content: Arc<dyn ContentSource>) -> Self {
        Self { engine, content }
    }

    /// Audits one piece of content.
    ///
    /// The fingerprint covers the collected payload, so editing the content
    /// produces a fresh audit while an unchanged piece reuses the cached
    /// report for the (short) audit cache window.
    pub async fn audit(&self, content_id: u64) -> Result<AuditReport> {
        if content_id == 0 {
            return Err(Error::invalid_input("content id must be non-zero"));
        }

        let content = self.content.collect(content_id).await?;
        let fp = payload_fingerprint(&content)?;
        let payload = serde_json::to_value(&content)?;

        let envelope = self
            .engine
            .execute(Operation::SeoAudit, &fp, payload, None)
            .await?;
        serde_json::from_value(envelope)
            .map_err(|e| Error::validation(format!("audit payload has unexpected shape: {e}")))
    }
}
