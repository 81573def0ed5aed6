// src/config/mod.rs

//! Configuration loading and validation for opsdeck.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants like tool-binary sanity (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_or_default};
pub use model::{
    AssistantSection, Config, ConvertSection, DeploySection, ReposSection, ServerSection,
};
pub use validate::validate_config;
