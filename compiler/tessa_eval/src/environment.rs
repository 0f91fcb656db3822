//! Variable storage.
//!
//! A single flat scope mapping names to values. Values are handles, so
//! reading a variable is a reference-count bump; [`Environment::take`]
//! lets the evaluator hold the only handle while it updates a variable
//! in place.

use rustc_hash::FxHashMap;
use tessa_value::Value;

#[derive(Default, Debug)]
pub struct Environment {
    vars: FxHashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Bind `name`, returning the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.vars.insert(name.into(), value)
    }

    /// Remove and return the binding.
    pub fn take(&mut self, name: &str) -> Option<Value> {
        self.vars.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Bound names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.vars.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn clear(&mut self) {
        self.vars.clear();
    }
}
