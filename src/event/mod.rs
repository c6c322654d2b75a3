//! Minimal pub/sub primitives used to signal cancellation into background loop threads.

pub mod cancellation;
pub mod channel;
