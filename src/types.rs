// src/types.rs

//! Small shared value types used by the configuration layer and the command
//! builder.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Deserialize;

/// A single value for an engine flag as it may appear in TOML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Str(s) => f.write_str(s),
            ArgValue::Bool(b) => write!(f, "{b}"),
            ArgValue::Int(i) => write!(f, "{i}"),
            ArgValue::Float(x) => write!(f, "{x}"),
        }
    }
}

/// Extra engine flags in any of the accepted shapes.
///
/// ```toml
/// args = { "--load-images" = false }
/// args = ["--foo=1", "bar=2"]
/// args = "--foo=1 bar = 2"
/// ```
///
/// All three are normalised by [`crate::command::ArgMap::merge_extra`].
/// Table keys come out of TOML sorted, so the mapping form is applied in key
/// order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ExtraArgs {
    Line(String),
    List(Vec<String>),
    Map(BTreeMap<String, ArgValue>),
}

/// Parse a duration such as `"250ms"`, `"20s"`, `"1m"` or `"2h"`.
///
/// Used for config values and `--timeout`. Whitespace between the number and
/// the unit is allowed; values that overflow a millisecond count are errors.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| format!("duration '{s}' is missing a unit (ms, s, m or h)"))?;
    let (digits, unit) = s.split_at(split);
    let value: u64 = digits
        .parse()
        .map_err(|e| format!("invalid duration number '{digits}': {e}"))?;

    let millis_per_unit: u64 = match unit.trim().to_ascii_lowercase().as_str() {
        "ms" => 1,
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        other => {
            return Err(format!(
                "unsupported duration unit '{other}'; expected ms, s, m or h"
            ));
        }
    };

    value
        .checked_mul(millis_per_unit)
        .map(Duration::from_millis)
        .ok_or_else(|| format!("duration '{s}' is too large"))
}
