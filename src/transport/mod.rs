//! Bounded-retry HTTP transport to the workflow engine.
//!
//! One POST per operation, up to [`MAX_ATTEMPTS`](http::MAX_ATTEMPTS)
//! attempts with a shrunken per-attempt timeout so the total wall time stays
//! bounded regardless of how attempts fail. Transport failures and 5xx
//! retry immediately; 4xx is a configuration or request defect and surfaces
//! at once. Every attempt is logged with endpoint, payload size and
//! duration, never the payload itself.

mod http;

pub use http::{RawResponse, WorkflowTransport, ATTEMPT_TIMEOUT, DEFAULT_TIMEOUT, MAX_ATTEMPTS};
