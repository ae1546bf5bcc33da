//! order-preserving map with located keys
use crate::error::{Error, Result};
use crate::value::{Location, Value};

/// A key/value pair of a [Mapping]
///
/// The key is a string [Value] so it can remember where it was written.
#[derive(Debug, Clone, PartialEq)]
pub struct Pair {
    pub key: Value,
    pub value: Value,
}

/// Ordered association of unique string keys to values
///
/// Insertion order is kept and is the order used for output. Replacing the value of an existing
/// key keeps the key (and its location) where it was.
#[derive(Debug, Clone, Default)]
pub struct Mapping {
    pairs: indexmap::IndexMap<String, Pair>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pairs: indexmap::IndexMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = &Pair> {
        self.pairs.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pairs.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.pairs.values().map(|pair| &pair.value)
    }

    pub fn get_pair(&self, key: &str) -> Option<&Pair> {
        self.pairs.get(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.pairs.get(key).map(|pair| &pair.value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.contains_key(key)
    }

    /// Insert or replace the value for `key`
    ///
    /// The key must be a string value.
    pub fn insert(&mut self, key: Value, value: Value) -> Result<()> {
        let Some(k) = key.as_str() else {
            return Err(Error::InvalidKey { found: key.kind() });
        };

        if let Some(existing) = self.pairs.get_mut(k) {
            existing.value = value;
            return Ok(());
        }

        self.pairs.insert(k.to_string(), Pair { key, value });
        Ok(())
    }

    /// [Mapping::insert] for a key known to be a string
    pub(crate) fn insert_str(&mut self, key: String, key_locations: Vec<Location>, value: Value) {
        match self.pairs.entry(key) {
            indexmap::map::Entry::Occupied(mut entry) => entry.get_mut().value = value,
            indexmap::map::Entry::Vacant(entry) => {
                let key = Value::new(entry.key().as_str(), key_locations);
                entry.insert(Pair { key, value });
            }
        }
    }

    /// Insert every pair of `other`, replacing values of keys that already exist
    pub fn merge_from(&mut self, other: &Mapping) {
        for (k, pair) in &other.pairs {
            match self.pairs.get_mut(k) {
                Some(existing) => existing.value = pair.value.clone(),
                None => {
                    self.pairs.insert(k.clone(), pair.clone());
                }
            }
        }
    }
}

// order matters, unlike IndexMap's own PartialEq
impl PartialEq for Mapping {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.pairs().eq(other.pairs())
    }
}

impl FromIterator<(String, Value)> for Mapping {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        let mut m = Mapping::new();
        for (k, v) in iter {
            m.insert_str(k, vec![], v);
        }
        m
    }
}
