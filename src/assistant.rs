//! Top-level facade and builder.

use crate::cache::ResultCache;
use crate::config::{Settings, SettingsProvider, SwapSettings};
use crate::envelope::{AuditReport, IdeaSet, KeywordList};
use crate::history::{HistoryEntry, HistoryLog};
use crate::lock::LockManager;
use crate::orchestrator::{
    AuditOrchestrator, ContentSource, Engine, IdeasOrchestrator, KeywordOrchestrator,
    NoContentSource, NoSiteContext, Operation, SiteContextSource, UsageSnapshot,
};
use crate::quota::{Clock, DayBoundary, QuotaCounter, SystemClock};
use crate::store::{MemoryStore, StoreBackend};
use crate::transport::WorkflowTransport;
use crate::Result;
use std::sync::Arc;

/// Unified entry point for the three mediated operations.
///
/// Owns the shared store, the live settings handle, the retry transport and
/// the three orchestrators. Cheap to share behind an `Arc`; every inbound
/// call runs independently and coordinates with concurrent callers only
/// through the store.
pub struct SeoAssistant {
    engine: Arc<Engine>,
    keyword: KeywordOrchestrator,
    ideas: IdeasOrchestrator,
    audit: AuditOrchestrator,
}

impl SeoAssistant {
    pub fn builder() -> SeoAssistantBuilder {
        SeoAssistantBuilder::new()
    }

    /// Keyword research for a seed keyword, optionally enriched with the
    /// configured site context.
    pub async fn research(&self, seed: &str, use_context: bool) -> Result<KeywordList> {
        self.keyword.research(seed, use_context).await
    }

    /// Content-idea generation from a site-context description.
    pub async fn generate_ideas(&self, context: &str) -> Result<IdeaSet> {
        self.ideas.generate_ideas(context).await
    }

    /// SEO audit of one piece of content, resolved through the injected
    /// [`ContentSource`].
    pub async fn audit(&self, content_id: u64) -> Result<AuditReport> {
        self.audit.audit(content_id).await
    }

    /// Today's usage for one operation.
    pub async fn usage_stats(&self, op: Operation) -> Result<UsageSnapshot> {
        self.engine.usage(op).await
    }

    /// Past ideas sessions, newest first.
    pub async fn ideas_history(&self) -> Result<Vec<HistoryEntry>> {
        self.ideas.history().await
    }

    /// Reachability check against the workflow engine's test webhook.
    pub async fn test_connection(&self) -> Result<()> {
        self.engine.transport().ping().await
    }
}

/// Builder wiring the collaborators together.
///
/// Everything has a working default except the settings: with none supplied
/// the assistant builds fine but every outbound call fails with a
/// configuration error, mirroring an unconfigured installation.
pub struct SeoAssistantBuilder {
    settings: Option<Arc<dyn SettingsProvider>>,
    store: Option<Arc<dyn StoreBackend>>,
    site_context: Arc<dyn SiteContextSource>,
    content_source: Arc<dyn ContentSource>,
    day_boundary: DayBoundary,
    clock: Option<Arc<dyn Clock>>,
}

impl SeoAssistantBuilder {
    pub fn new() -> Self {
        Self {
            settings: None,
            store: None,
            site_context: Arc::new(NoSiteContext),
            content_source: Arc::new(NoContentSource),
            day_boundary: DayBoundary::Utc,
            clock: None,
        }
    }

    /// Fixed settings, wrapped in a [`SwapSettings`] handle.
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(Arc::new(SwapSettings::new(settings)));
        self
    }

    /// Custom live settings provider (e.g. one backed by an admin UI).
    pub fn settings_provider(mut self, provider: Arc<dyn SettingsProvider>) -> Self {
        self.settings = Some(provider);
        self
    }

    /// Shared store backing locks, quotas, cache and history. Defaults to a
    /// process-local [`MemoryStore`]; multi-process deployments must supply
    /// a shared backend.
    pub fn store(mut self, store: Arc<dyn StoreBackend>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn site_context(mut self, source: Arc<dyn SiteContextSource>) -> Self {
        self.site_context = source;
        self
    }

    pub fn content_source(mut self, source: Arc<dyn ContentSource>) -> Self {
        self.content_source = source;
        self
    }

    /// Where daily quota rollover happens. Defaults to midnight UTC.
    pub fn day_boundary(mut self, boundary: DayBoundary) -> Self {
        self.day_boundary = boundary;
        self
    }

    /// Overrides the quota clock; used by tests to exercise date rollover.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<SeoAssistant> {
        let settings: Arc<dyn SettingsProvider> = self
            .settings
            .unwrap_or_else(|| Arc::new(SwapSettings::new(Settings::default())));
        let store: Arc<dyn StoreBackend> =
            self.store.unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let clock: Arc<dyn Clock> = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock::new(self.day_boundary)));

        let transport = Arc::new(WorkflowTransport::new(settings.clone())?);
        let engine = Arc::new(Engine::new(
            LockManager::new(store.clone()),
            QuotaCounter::new(store.clone(), clock),
            ResultCache::new(store.clone()),
            transport,
            settings,
        ));

        Ok(SeoAssistant {
            keyword: KeywordOrchestrator::new(engine.clone(), self.site_context),
            ideas: IdeasOrchestrator::new(engine.clone(), HistoryLog::new(store)),
            audit: AuditOrchestrator::new(engine.clone(), self.content_source),
            engine,
        })
    }
}

impl Default for SeoAssistantBuilder {
    fn default() -> Self {
        Self::new()
    }
}
