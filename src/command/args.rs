// src/command/args.rs

use std::sync::LazyLock;

use regex::Regex;

use crate::types::ExtraArgs;

/// Flags every invocation carries unless overridden by configured args.
pub const DEFAULT_ENGINE_ARGS: [(&str, &str); 2] = [
    ("--ignore-ssl-errors", "true"),
    ("--ssl-protocol", "tlsv1"),
];

static SPACES_AROUND_EQ: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*=\s*").expect("static regex"));

/// Ordered flag → value mapping.
///
/// Re-inserting an existing flag replaces its value but keeps its original
/// position; new flags are appended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgMap {
    entries: Vec<(String, String)>,
}

impl ArgMap {
    /// Empty map, no default flags.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map seeded with [`DEFAULT_ENGINE_ARGS`].
    pub fn with_defaults() -> Self {
        let mut map = Self::new();
        for (key, value) in DEFAULT_ENGINE_ARGS {
            map.insert(key, value);
        }
        map
    }

    /// Insert a flag, canonicalising its name first.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        let key = canonical_flag(key);
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Merge extra args in any accepted shape on top of the current entries.
    pub fn merge_extra(&mut self, extra: &ExtraArgs) {
        for (key, value) in normalize_extra(extra) {
            self.insert(&key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        let key = canonical_flag(key);
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `--flag=value` tokens in order.
    pub fn to_tokens(&self) -> Vec<String> {
        self.iter().map(|(k, v)| format!("{k}={v}")).collect()
    }
}

/// Canonicalise a flag name to the `--name` form.
///
/// Names already matching `--x` (two dashes then a non-dash) are left alone;
/// otherwise a single leading dash is stripped and `--` is prepended.
pub fn canonical_flag(key: &str) -> String {
    let conforming = key
        .strip_prefix("--")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c != '-');
    if conforming {
        return key.to_string();
    }
    let bare = key.strip_prefix('-').unwrap_or(key);
    format!("--{bare}")
}

/// Flatten any [`ExtraArgs`] shape into ordered `(key, value)` pairs.
fn normalize_extra(extra: &ExtraArgs) -> Vec<(String, String)> {
    match extra {
        ExtraArgs::Map(map) => map
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect(),
        ExtraArgs::List(items) => items.iter().map(|item| split_pair(item)).collect(),
        ExtraArgs::Line(line) => {
            let collapsed = SPACES_AROUND_EQ.replace_all(line, "=");
            collapsed.split_whitespace().map(split_pair).collect()
        }
    }
}

/// Split `key=value` at the first `=`. Everything after it is the value, so
/// `--proxy-auth=user=pw` keeps `user=pw` rather than truncating at the
/// second `=`. A bare `key` gets an empty value.
fn split_pair(arg: &str) -> (String, String) {
    match arg.split_once('=') {
        Some((k, v)) => (k.to_string(), v.to_string()),
        None => (arg.to_string(), String::new()),
    }
}
