// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running external commands, using
//! `tokio::process::Command`, and surfacing their output and termination as
//! a stream of `RunEvent`s.
//!
//! - [`operation`] defines the [`Operation`] value describing one invocation.
//! - [`runner`] owns the child process for its duration and pumps its pipes.

pub mod operation;
pub mod runner;

pub use operation::Operation;
pub use runner::{run_operation, spawn_operation};
