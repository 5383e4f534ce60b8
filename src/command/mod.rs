// src/command/mod.rs

//! Command line construction for the external rendering engine.
//!
//! - [`args`] normalises configured flags into an ordered [`ArgMap`].
//! - [`builder`] turns a config and a target URL into a [`CommandLine`].

pub mod args;
pub mod builder;

pub use args::{ArgMap, canonical_flag};
pub use builder::{CommandLine, URL_BASE64_FLAG, build};
