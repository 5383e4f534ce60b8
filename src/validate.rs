// src/validate.rs

//! Cheap structural check that engine output looks like a whole document.
//!
//! This is not HTML parsing. It only rejects output that is obviously
//! truncated or not a document at all, so such a result counts as a failed
//! attempt instead of a delivered success.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static ROOT_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(<html|<!doctype)").expect("static regex"));
static ROOT_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)/html\s*>\s*$").expect("static regex"));

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("could not find html tag or doctype declaration")]
    MissingRootMarker,

    #[error("could not find closing html tag")]
    UnclosedRootMarker,
}

pub fn validate(content: &str) -> Result<(), ValidationError> {
    if !ROOT_OPEN.is_match(content) {
        return Err(ValidationError::MissingRootMarker);
    }
    if !ROOT_CLOSE.is_match(content) {
        return Err(ValidationError::UnclosedRootMarker);
    }
    Ok(())
}
