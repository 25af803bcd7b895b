//! Day-scoped usage counters.
//!
//! Each operation has one counter per day, keyed `quota:{op}:{date}`; the
//! date being part of the key is what makes the counter roll over, yesterday's
//! key simply becomes unreachable. The increment itself is atomic with a
//! ceiling, so the configured limit can never be overrun even under
//! concurrent load.
//!
//! Which clock defines "today" is an explicit configuration choice, see
//! [`DayBoundary`]. The default is UTC midnight.

use crate::orchestrator::{Operation, UsageSnapshot};
use crate::store::StoreBackend;
use crate::Result;
use chrono::{FixedOffset, NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Hygiene TTL applied when a counter key is first created. Correctness
/// comes from the dated key; this only drains stale keys from the store.
const COUNTER_TTL: Duration = Duration::from_secs(48 * 60 * 60);

/// Where the daily rollover happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayBoundary {
    /// Midnight UTC, matching the original backend's accounting.
    Utc,
    /// Midnight at a fixed offset (e.g. server-local time).
    Offset(FixedOffset),
}

impl Default for DayBoundary {
    fn default() -> Self {
        DayBoundary::Utc
    }
}

/// Source of the current date. Injectable so rollover is testable.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

pub struct SystemClock {
    boundary: DayBoundary,
}

impl SystemClock {
    pub fn new(boundary: DayBoundary) -> Self {
        Self { boundary }
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        match self.boundary {
            DayBoundary::Utc => Utc::now().date_naive(),
            DayBoundary::Offset(offset) => Utc::now().with_timezone(&offset).date_naive(),
        }
    }
}

pub struct QuotaCounter {
    store: Arc<dyn StoreBackend>,
    clock: Arc<dyn Clock>,
}

impl QuotaCounter {
    pub fn new(store: Arc<dyn StoreBackend>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Consumes one unit of today's budget if any remains. Returns false
    /// (without incrementing) when the counter is at the limit.
    pub async fn check_and_increment(&self, op: Operation, limit: u32) -> Result<bool> {
        if limit == 0 {
            return Ok(false);
        }
        let key = self.key(op);
        let granted = self
            .store
            .increment_if_below(&key, u64::from(limit), Some(COUNTER_TTL))
            .await?;
        Ok(granted.is_some())
    }

    /// Current usage for reporting. Never increments.
    pub async fn usage(&self, op: Operation, limit: u32) -> Result<UsageSnapshot> {
        let date = self.date_key();
        let count = match self.store.get(&self.key(op)).await? {
            Some(raw) => String::from_utf8_lossy(&raw).parse::<u64>().unwrap_or(0),
            None => 0,
        };
        Ok(UsageSnapshot {
            operation: op,
            count,
            limit,
            date,
        })
    }

    fn date_key(&self) -> String {
        self.clock.today().format("%Y-%m-%d").to_string()
    }

    fn key(&self, op: Operation) -> String {
        format!("quota:{}:{}", op.slug(), self.date_key())
    }
}
