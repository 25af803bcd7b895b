//! Operation orchestrators.
//!
//! Each orchestrator is a thin composition over the shared engine: it
//! validates and normalizes its input, computes a fingerprint, and hands the
//! engine an operation profile (endpoint, lock TTL, cache TTL, overall
//! timeout, required payload keys). The engine runs the single sequence
//! every operation follows:
//!
//! lock attempt → cache check → quota check-and-increment → transport →
//! normalize → cache write → history write (ideas only) → lock release
//!
//! Busy and exceeded conditions are rejected immediately, never queued; the
//! caller may simply try again later. Every rejection path releases the held
//! lock before surfacing its error.

mod audit;
mod engine;
mod ideas;
mod keyword;

pub use audit::{AuditContent, AuditOrchestrator, ContentSource, ImageRef, NoContentSource};
pub use ideas::IdeasOrchestrator;
pub use keyword::{KeywordOrchestrator, NoSiteContext, SiteContextSource};

pub(crate) use engine::Engine;

use crate::config::Settings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The three backend operations this layer mediates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    KeywordResearch,
    ContentIdeas,
    SeoAudit,
}

impl Operation {
    /// Short key-namespace slug (`cache:{slug}:…`, `lock:{slug}:…`,
    /// `quota:{slug}:…`).
    pub fn slug(&self) -> &'static str {
        match self {
            Operation::KeywordResearch => "keyword",
            Operation::ContentIdeas => "ideas",
            Operation::SeoAudit => "audit",
        }
    }

    /// Webhook path on the workflow engine.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Operation::KeywordResearch => "/webhook/seo-keyword-research",
            Operation::ContentIdeas => "/webhook/seo-content-ideas",
            Operation::SeoAudit => "/webhook/seo-audit",
        }
    }

    /// Lock lease duration, sized to exceed the operation's worst-case
    /// backend latency so a crashed holder cannot block retries for long.
    pub fn lock_ttl(&self) -> Duration {
        match self {
            Operation::KeywordResearch => Duration::from_secs(60),
            Operation::ContentIdeas => Duration::from_secs(120),
            Operation::SeoAudit => Duration::from_secs(180),
        }
    }

    /// How long a successful normalized result is reused.
    pub fn cache_ttl(&self) -> Duration {
        match self {
            Operation::KeywordResearch => Duration::from_secs(24 * 60 * 60),
            Operation::ContentIdeas => Duration::from_secs(7 * 24 * 60 * 60),
            Operation::SeoAudit => Duration::from_secs(60 * 60),
        }
    }

    /// Overall transport budget per call. Audit workflows can run for up to
    /// two minutes on the backend side.
    pub fn overall_timeout(&self) -> Duration {
        match self {
            Operation::KeywordResearch => Duration::from_secs(40),
            Operation::ContentIdeas => Duration::from_secs(60),
            Operation::SeoAudit => Duration::from_secs(120),
        }
    }

    /// Payload keys the normalized envelope must carry.
    pub fn required_keys(&self) -> &'static [&'static str] {
        match self {
            Operation::KeywordResearch => &["keywords"],
            Operation::ContentIdeas => &["ideas"],
            Operation::SeoAudit => &["score", "recommendations"],
        }
    }

    /// Configured daily budget, read from a live settings snapshot.
    pub fn daily_limit(&self, settings: &Settings) -> u32 {
        match self {
            Operation::KeywordResearch => settings.daily_keyword_limit,
            Operation::ContentIdeas => settings.daily_ideas_limit,
            Operation::SeoAudit => settings.daily_audit_limit,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::KeywordResearch => "keyword research",
            Operation::ContentIdeas => "content ideas",
            Operation::SeoAudit => "SEO audit",
        };
        write!(f, "{name}")
    }
}

/// Point-in-time usage report for one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    pub operation: Operation,
    pub count: u64,
    pub limit: u32,
    /// The day the count belongs to, as `YYYY-MM-DD` under the configured
    /// day boundary.
    pub date: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_and_endpoints_line_up() {
        assert_eq!(Operation::KeywordResearch.slug(), "keyword");
        assert_eq!(
            Operation::KeywordResearch.endpoint(),
            "/webhook/seo-keyword-research"
        );
        assert_eq!(Operation::SeoAudit.required_keys(), ["score", "recommendations"]);
    }

    #[test]
    fn lock_ttls_cover_worst_case_latency() {
        for op in [
            Operation::KeywordResearch,
            Operation::ContentIdeas,
            Operation::SeoAudit,
        ] {
            assert!(op.lock_ttl() >= op.overall_timeout());
        }
    }

    #[test]
    fn daily_limits_come_from_settings() {
        let settings = Settings::new("https://n8n.example.com", "t")
            .with_daily_keyword_limit(7)
            .with_daily_ideas_limit(2)
            .with_daily_audit_limit(11);
        assert_eq!(Operation::KeywordResearch.daily_limit(&settings), 7);
        assert_eq!(Operation::ContentIdeas.daily_limit(&settings), 2);
        assert_eq!(Operation::SeoAudit.daily_limit(&settings), 11);
    }
}
