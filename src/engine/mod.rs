// src/engine/mod.rs

//! Command-orchestration engine for opsdeck.
//!
//! This module ties together:
//! - the [`RunEvent`] stream produced by running operations
//! - the step sequencer that drives compound workflows with
//!   short-circuit-on-failure semantics
//! - the canned git workflows used by the HTTP endpoints
//!
//! One session drives at most one process at a time; steps are strictly
//! sequential, never parallel. Sessions share no mutable state, so any
//! number of them can run concurrently.

pub mod event;
pub mod sequencer;
pub mod workflows;

pub use event::{Origin, RunEvent};
pub use sequencer::{Step, Workflow, WorkflowResult, run_workflow, spawn_workflow};
