// src/config/mod.rs

//! Configuration loading.
//!
//! - [`model`] holds the raw TOML mapping and the validated [`ImpressConfig`].
//! - [`loader`] reads files from disk.
//! - [`validate`] turns a [`RawConfigFile`] into an [`ImpressConfig`].

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{
    DEFAULT_BINARY, DEFAULT_EXEC_TIMEOUT, DEFAULT_JOB_TIMEOUT, DEFAULT_MAX_CONTENT_LENGTH,
    DEFAULT_SCRIPT, EngineSection, ImpressConfig, JobSection, MIN_INVOKE_INTERVAL, RawConfigFile,
};
