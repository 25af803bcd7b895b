use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Pluggable backend for the shared TTL key-value store.
///
/// Implementations must be safe under arbitrary concurrent use; the two
/// conditional primitives must be atomic with respect to each other and to
/// plain writes on the same key. `ttl: None` means the entry never expires.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Returns true if the key existed.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Atomically stores `value` only if `key` is absent (or expired).
    /// Returns true when the write happened, false when the key was held.
    async fn set_if_absent(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<bool>;

    /// Atomically increments the counter at `key` if its current value is
    /// below `ceiling`. Returns the new count, or `None` when the counter
    /// is already at or above the ceiling (no increment performed).
    ///
    /// A missing or expired key counts as zero. The TTL is applied when the
    /// counter is first created and left untouched afterwards.
    async fn increment_if_below(
        &self,
        key: &str,
        ceiling: u64,
        ttl: Option<Duration>,
    ) -> Result<Option<u64>>;

    fn name(&self) -> &'static str;
}
