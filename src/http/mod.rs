// src/http/mod.rs

//! HTTP surface: route table and the stateless filesystem/git helpers it
//! leans on.
//!
//! One streamed operation per connection. Preconditions (missing params,
//! bad paths) are rejected with plain error responses before a stream
//! starts; once a stream is open, every failure is reported inside it as a
//! terminal event.

pub mod fsops;
pub mod routes;

pub use routes::router;
