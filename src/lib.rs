//! # seo-orchestrator
//!
//! Request-orchestration layer for an n8n-style SEO workflow backend.
//!
//! The backend performs the actual keyword research, content-idea generation
//! and SEO auditing; it is slow (individual workflows can take minutes),
//! rate-limited and occasionally unreliable. This crate mediates every call
//! to it and guarantees:
//!
//! - **Single-flight**: no two identical in-flight requests ever hit the
//!   backend concurrently; duplicates are rejected, never queued
//! - **Daily budgets**: per-operation usage never exceeds a configured limit
//! - **Result reuse**: successful responses are cached for a per-operation
//!   time window instead of re-invoking the backend
//! - **Bounded retries**: transient network and 5xx failures are retried
//!   within a fixed attempt budget, with no backoff
//! - **One envelope shape**: heterogeneous backend responses are normalized
//!   and validated before any caller sees them
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use seo_orchestrator::{SeoAssistantBuilder, Settings};
//! use seo_orchestrator::store::MemoryStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> seo_orchestrator::Result<()> {
//!     let assistant = SeoAssistantBuilder::new()
//!         .settings(Settings::new("https://n8n.example.com", "secret-token"))
//!         .store(Arc::new(MemoryStore::new()))
//!         .build()?;
//!
//!     let keywords = assistant.research("robot vacuum", false).await?;
//!     println!("{} suggestions", keywords.keywords.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`store`] | Shared TTL key-value store backing locks, quotas and cache |
//! | [`fingerprint`] | Deterministic hashing of normalized request inputs |
//! | [`lock`] | Single-flight lock leases keyed by fingerprint |
//! | [`quota`] | Day-scoped usage counters with atomic ceilings |
//! | [`cache`] | TTL cache of normalized successful responses |
//! | [`transport`] | Bounded-retry HTTP POST client |
//! | [`envelope`] | Response envelope normalization and validation |
//! | [`history`] | Bounded FIFO log of past ideas sessions |
//! | [`config`] | Live-editable settings surface |
//! | [`orchestrator`] | The three operation orchestrators and their engine |

pub mod cache;
pub mod config;
pub mod envelope;
pub mod fingerprint;
pub mod history;
pub mod lock;
pub mod orchestrator;
pub mod quota;
pub mod store;
pub mod transport;

mod assistant;

// Re-export main types for convenience
pub use assistant::{SeoAssistant, SeoAssistantBuilder};
pub use config::{Settings, SettingsProvider, SwapSettings};
pub use envelope::{AuditReport, IdeaSet, KeywordList};
pub use history::HistoryEntry;
pub use orchestrator::{
    AuditContent, ContentSource, Operation, SiteContextSource, UsageSnapshot,
};
pub use quota::DayBoundary;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::Error;
