use thiserror::Error;

use crate::orchestrator::Operation;

/// Unified error type for the orchestration layer.
///
/// Every variant carries a stable machine-readable code (see [`Error::code`])
/// plus a human-readable message. Rejections raised while a single-flight
/// lock is held are only surfaced after the lock has been released.
#[derive(Debug, Error)]
pub enum Error {
    /// Workflow backend is not configured (missing base URL or token).
    /// Fatal for the current call; never retried.
    #[error("workflow backend not configured: {message}")]
    Configuration { message: String },

    /// Caller-supplied input rejected before any coordination work.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// A request with the same fingerprint is already in flight.
    /// Duplicates are rejected outright, never queued.
    #[error("{operation} already in progress for this input, wait for it to complete")]
    Busy { operation: Operation },

    /// Daily budget for the operation is exhausted. Resolves only at date
    /// rollover; the configured limit is embedded for reporting.
    #[error("daily limit of {limit} {operation} requests reached, try again tomorrow")]
    QuotaExceeded { operation: Operation, limit: u32 },

    /// Network-level failure after exhausting all retry attempts.
    #[error("could not reach workflow backend after {attempts} attempts: {message}")]
    Transport { attempts: u32, message: String },

    /// Non-2xx HTTP status from the backend. 4xx surfaces on the first
    /// occurrence, 5xx only after retries are exhausted.
    #[error("workflow backend responded with HTTP {status}: {message}")]
    UpstreamHttp { status: u16, message: String },

    /// Response body is not valid JSON. Carries a bounded preview of the
    /// raw body for diagnostics.
    #[error("workflow response is not valid JSON, body preview: {preview}")]
    Envelope { preview: String },

    /// Well-formed JSON lacking the required success flag or payload keys.
    #[error("invalid response envelope: {message}")]
    Validation { message: String },

    /// Shared key-value store failure.
    #[error("store error: {0}")]
    Store(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Stable code for each variant, suitable for programmatic handling
    /// and wire-level error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Configuration { .. } => "not_configured",
            Error::InvalidInput { .. } => "invalid_input",
            Error::Busy { .. } => "in_progress",
            Error::QuotaExceeded { .. } => "daily_limit_reached",
            Error::Transport { .. } => "connection_error",
            Error::UpstreamHttp { .. } => "http_error",
            Error::Envelope { .. } => "invalid_json",
            Error::Validation { .. } => "invalid_response",
            Error::Store(_) => "store_error",
            Error::Serialization(_) => "serialization_error",
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn envelope_preview(body: &str) -> Self {
        Error::Envelope {
            preview: bounded_preview(body, ENVELOPE_PREVIEW_CHARS),
        }
    }
}

/// Maximum characters of a raw body included in an [`Error::Envelope`].
pub const ENVELOPE_PREVIEW_CHARS: usize = 300;

fn bounded_preview(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => body[..idx].to_string(),
        None => body.to_string(),
    }
}
