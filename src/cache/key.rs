//! Cache key generation
//!
//! Keys are derived from a resource path plus the *defined* query parameters.
//! Parameters are kept in a `BTreeMap`, so insertion order never changes the key,
//! and `None` values are dropped before they ever reach the map.

use std::collections::BTreeMap;
use std::fmt::Display;

/// Normalized query parameters for a request
///
/// The same `Params` value is used both to build the cache key and the HTTP
/// query string, so the two can never disagree about which filters were set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: BTreeMap<String, String>,
}

impl Params {
    /// Creates an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter that is always present
    pub fn with(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.entries.insert(name.into(), value.to_string());
        self
    }

    /// Adds a parameter only when `value` is `Some`
    ///
    /// Passing `None` is indistinguishable from never calling this method.
    pub fn opt<V: Display>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(name, value),
            None => self,
        }
    }

    /// Returns true if no parameter is defined
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Name/value pairs sorted by name, ready for `RequestBuilder::query`
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

/// Builds the cache key for a resource path and its parameters
///
/// Without parameters the key is the bare path (`bo/info`). Otherwise the sorted
/// parameters are appended as canonical JSON (`bo/concentrateurs?{"etat":"pose"}`),
/// which keeps distinct parameter sets distinct even when values contain `&` or `=`.
pub fn generate_key(resource_path: &str, params: &Params) -> String {
    if params.is_empty() {
        return resource_path.to_string();
    }

    // A BTreeMap<String, String> always serializes.
    let canonical = serde_json::to_string(&params.entries).unwrap_or_default();
    format!("{}?{}", resource_path, canonical)
}
