//! Shared orchestration engine.
//!
//! Runs the one sequence every operation follows and guarantees that any
//! lease taken is released before an outcome, success or rejection, is
//! surfaced to the caller.

use crate::cache::ResultCache;
use crate::config::SettingsProvider;
use crate::envelope;
use crate::fingerprint::Fingerprint;
use crate::history::HistoryLog;
use crate::lock::LockManager;
use crate::orchestrator::{Operation, UsageSnapshot};
use crate::quota::QuotaCounter;
use crate::transport::WorkflowTransport;
use crate::{Error, Result};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

pub(crate) struct Engine {
    locks: LockManager,
    quota: QuotaCounter,
    cache: ResultCache,
    transport: Arc<WorkflowTransport>,
    settings: Arc<dyn SettingsProvider>,
}

impl Engine {
    pub(crate) fn new(
        locks: LockManager,
        quota: QuotaCounter,
        cache: ResultCache,
        transport: Arc<WorkflowTransport>,
        settings: Arc<dyn SettingsProvider>,
    ) -> Self {
        Self {
            locks,
            quota,
            cache,
            transport,
            settings,
        }
    }

    pub(crate) fn settings(&self) -> &Arc<dyn SettingsProvider> {
        &self.settings
    }

    pub(crate) fn transport(&self) -> &Arc<WorkflowTransport> {
        &self.transport
    }

    /// Lock attempt → cache check → quota → transport → normalize →
    /// cache write → history write → release.
    ///
    /// Busy and exceeded conditions reject immediately; the caller may try
    /// again on a later request, nothing is ever queued here.
    pub(crate) async fn execute(
        &self,
        op: Operation,
        fingerprint: &Fingerprint,
        payload: Value,
        history: Option<&HistoryLog>,
    ) -> Result<Value> {
        let started = Instant::now();

        if !self.locks.acquire(op, fingerprint).await? {
            warn!(
                operation = %op,
                fingerprint = %fingerprint,
                "duplicate in-flight request rejected"
            );
            return Err(Error::Busy { operation: op });
        }

        let result = self.run_locked(op, fingerprint, payload, history).await;

        // Release on every path. A failed release is not fatal: the lease
        // self-expires at its TTL.
        if let Err(release_err) = self.locks.release(op, fingerprint).await {
            warn!(
                operation = %op,
                error = %release_err,
                "lock release failed, lease will self-expire"
            );
        }

        let duration_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => info!(
                operation = %op,
                endpoint = op.endpoint(),
                duration_ms,
                success = true,
                "operation completed"
            ),
            Err(e) => warn!(
                operation = %op,
                endpoint = op.endpoint(),
                duration_ms,
                success = false,
                code = e.code(),
                "operation failed"
            ),
        }
        result
    }

    async fn run_locked(
        &self,
        op: Operation,
        fingerprint: &Fingerprint,
        payload: Value,
        history: Option<&HistoryLog>,
    ) -> Result<Value> {
        // A cache hit consumes no quota and never touches the transport.
        if let Some(cached) = self.cache.get(op, fingerprint).await? {
            return Ok(cached);
        }

        let limit = op.daily_limit(&self.settings.snapshot());
        if !self.quota.check_and_increment(op, limit).await? {
            return Err(Error::QuotaExceeded {
                operation: op,
                limit,
            });
        }

        let raw = self
            .transport
            .post(op.endpoint(), &payload, op.overall_timeout())
            .await?;
        let normalized = envelope::normalize(&raw.body, op.required_keys())?;

        self.cache
            .set(op, fingerprint, &normalized, op.cache_ttl())
            .await?;
        if let Some(history) = history {
            history.record(&normalized).await?;
        }
        Ok(normalized)
    }

    pub(crate) async fn usage(&self, op: Operation) -> Result<UsageSnapshot> {
        let limit = op.daily_limit(&self.settings.snapshot());
        self.quota.usage(op, limit).await
    }
}
