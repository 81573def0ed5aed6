// src/stream/mod.rs

//! Event encoding and per-connection streaming sessions.
//!
//! - [`encoder`] maps `RunEvent`s to their JSON wire envelopes.
//! - [`session`] owns the outbound SSE connection for the duration of one
//!   orchestration and delivers every envelope in emission order.

pub mod encoder;
pub mod session;

pub use encoder::{Envelope, encode};
pub use session::sse_response;
