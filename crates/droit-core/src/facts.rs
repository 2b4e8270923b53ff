//! # Facts and Fact Access
//!
//! A [`Facts`] bag is an open JSON object describing the scenario under
//! evaluation. Values are untyped at rest; they acquire a type only when a
//! condition compares them.
//!
//! [`Facts::resolve`] walks a dotted path (`"instrument.type"`) through nested
//! objects. Absence is a first-class result: a missing key, or an
//! intermediate value that is not an object, yields `None`. Resolution never
//! fails.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An open key-value mapping of scenario facts.
///
/// Unknown keys are carried along and ignored by evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Facts(Map<String, Value>);

impl Facts {
    /// An empty fact bag.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build a fact bag from a JSON value. Returns `None` unless the value
    /// is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Insert a top-level fact, returning `self` for chaining.
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Resolve a dotted path against the fact bag.
    ///
    /// Descends segment by segment through nested objects. When nested
    /// descent fails, a top-level key spelled exactly as the whole path is
    /// accepted, so flat bags like `{"instrument.type": "bond"}` resolve too.
    pub fn resolve(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return None;
        }
        resolve_nested(&self.0, path).or_else(|| self.0.get(path))
    }

    /// Whether the path resolves to a value (including an explicit null).
    pub fn contains(&self, path: &str) -> bool {
        self.resolve(path).is_some()
    }

    /// Number of top-level keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the bag has no top-level keys.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Facts {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for Facts {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn resolve_nested<'a>(root: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = root.get(first)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            _ => return None,
        };
    }
    Some(current)
}
