//! Request fingerprinting.
//!
//! A fingerprint is a deterministic SHA-256 over the *normalized* inputs of
//! an operation, and is the shared key suffix for both the result cache and
//! the single-flight lock. Normalization happens before hashing so that
//! semantically-equal requests (extra whitespace, over-long context text)
//! collapse onto the same fingerprint.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Maximum characters of free-form context text that take part in a
/// fingerprint or an outbound payload. Sized for AI token limits upstream.
pub const MAX_CONTEXT_CHARS: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Collapses runs of whitespace to single spaces and trims the ends.
pub fn normalize_text(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncates to [`MAX_CONTEXT_CHARS`] on a character boundary.
pub fn truncate_context(input: &str) -> &str {
    match input.char_indices().nth(MAX_CONTEXT_CHARS) {
        Some((idx, _)) => &input[..idx],
        None => input,
    }
}

/// Fingerprint for a keyword research request: normalized seed keyword plus
/// the context flag.
pub fn keyword_fingerprint(seed: &str, use_context: bool) -> Fingerprint {
    let mut parts: BTreeMap<&str, String> = BTreeMap::new();
    parts.insert("seed", normalize_text(seed));
    parts.insert("use_context", use_context.to_string());
    hash_parts(&parts)
}

/// Fingerprint for an ideas request: normalized, truncated context text.
pub fn context_fingerprint(context: &str) -> Fingerprint {
    let normalized = normalize_text(context);
    let mut parts: BTreeMap<&str, String> = BTreeMap::new();
    parts.insert("context", truncate_context(&normalized).to_string());
    hash_parts(&parts)
}

/// Fingerprint over an arbitrary serializable payload (audit content).
/// Serde_json serializes struct fields in declaration order, so equal
/// payloads canonicalize identically.
pub fn payload_fingerprint<T: Serialize>(payload: &T) -> crate::Result<Fingerprint> {
    let canonical = serde_json::to_string(payload)?;
    Ok(hash_str(&canonical))
}

fn hash_parts(parts: &BTreeMap<&str, String>) -> Fingerprint {
    let canonical = serde_json::to_string(parts).unwrap_or_default();
    hash_str(&canonical)
}

fn hash_str(canonical: &str) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let hex: String = hasher.finalize().iter().map(|b| format!("{:02x}", b)).collect();
    Fingerprint(hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_differences_collapse() {
        assert_eq!(
            keyword_fingerprint("robot vacuum", false),
            keyword_fingerprint("  robot   vacuum ", false)
        );
    }

    #[test]
    fn context_flag_changes_fingerprint() {
        assert_ne!(
            keyword_fingerprint("robot vacuum", false),
            keyword_fingerprint("robot vacuum", true)
        );
    }

    #[test]
    fn overlong_context_truncates_before_hashing() {
        let base = "negozio di aspirapolvere ".repeat(200);
        let longer = format!("{base}{}", "extra tail beyond the cap");
        assert!(base.chars().count() > MAX_CONTEXT_CHARS);
        assert_eq!(context_fingerprint(&base), context_fingerprint(&longer));
    }

    #[test]
    fn short_contexts_stay_distinct() {
        assert_ne!(
            context_fingerprint("negozio di scarpe"),
            context_fingerprint("negozio di borse")
        );
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "è".repeat(MAX_CONTEXT_CHARS + 10);
        assert_eq!(truncate_context(&s).chars().count(), MAX_CONTEXT_CHARS);
    }
}
