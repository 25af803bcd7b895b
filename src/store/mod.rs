//! Shared TTL key-value store.
//!
//! The store is the *only* cross-request coordination mechanism in this
//! crate: locks, quota counters, the result cache and the ideas history all
//! live behind [`StoreBackend`]. The hosting environment may dispatch
//! concurrent requests to separate threads or processes, so every primitive
//! that matters for correctness is atomic at the backend:
//!
//! - [`StoreBackend::set_if_absent`] — a real compare-and-set, used for
//!   single-flight lock leases
//! - [`StoreBackend::increment_if_below`] — increment-with-ceiling, used for
//!   daily quota counters
//!
//! Values are raw bytes; serialization happens at the edges (see [`crate::cache`]).
//! Counters are stored as decimal ASCII so a Redis-style backend can map
//! them onto a native atomic INCR.

mod backend;
mod memory;

pub use backend::StoreBackend;
pub use memory::MemoryStore;
