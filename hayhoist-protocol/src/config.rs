//! Configuration snapshots and their values

use core::fmt::Display;

use alloc::string::String;
use alloc::vec::Vec;

use crate::keys::{Key, resolve};

/// A single configuration value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Numeric setting, in the unit of its key
    Number(u16),
    /// Text field, only used for the firmware version
    Text(String),
}

impl Value {
    pub fn as_number(&self) -> Option<u16> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(_) => None,
        }
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Value::Number(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Configuration snapshot
///
/// Maps key strings to values, keeping the order keys were inserted in.
/// Snapshots read from the controller only hold canonical names, snapshots
/// built by a caller may use any alias. Equality ignores the order.
#[derive(Debug, Clone, Default)]
pub struct Config {
    entries: Vec<(String, Value)>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing an existing entry for the same key in place
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Value stored under exactly `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Value stored for `key` under any of its spellings
    pub fn get_key(&self, key: Key) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| resolve(k) == key.name())
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for Config {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl Eq for Config {}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Config {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut config = Config::new();
        for (k, v) in iter {
            config.insert(k, v);
        }
        config
    }
}
