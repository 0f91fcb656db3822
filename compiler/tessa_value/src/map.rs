//! Associative maps (struct values).

use rustc_hash::FxHashMap;

use crate::Value;

/// Field map of a struct value. Each field is itself a copy-on-write
/// [`Value`], so updating a nested field only clones the path to it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValueMap {
    fields: FxHashMap<String, Value>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    /// Field `name`, inserting an undefined value if absent.
    pub fn entry(&mut self, name: &str) -> &mut Value {
        self.fields.entry(name.to_string()).or_default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(name.into(), value)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in sorted order, for stable printing.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Fields in sorted name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.keys()
            .into_iter()
            .filter_map(|k| self.fields.get_key_value(k))
            .map(|(k, v)| (k.as_str(), v))
    }
}

impl<S: Into<String>> FromIterator<(S, Value)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (S, Value)>>(iter: I) -> Self {
        ValueMap {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
