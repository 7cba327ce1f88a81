//! Named parameter bindings kept alongside a statement.
//!
//! Bindings are independent of the expression tree: nothing in a rendered
//! statement refers to them automatically. Callers decide per value whether
//! to quote it inline (via [`crate::value`]) or bind it by name here.

use crate::error::{SqlError, SqlResult};
use crate::value::Value;
use indexmap::IndexMap;

/// An insertion-ordered `name -> value` map.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bindings {
    values: IndexMap<String, Value>,
}

impl Bindings {
    /// Create an empty binding map.
    pub fn new() -> Self {
        Self {
            values: IndexMap::new(),
        }
    }

    /// Bind `value` under `name`, replacing any previous value.
    ///
    /// Fails with [`SqlError::InvalidArgument`] when `name` is empty or blank.
    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<Value>) -> SqlResult<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SqlError::invalid_argument("binding name cannot be empty"));
        }
        self.values.insert(name, value.into());
        Ok(())
    }

    /// Bind a JSON value, rejecting arrays and objects.
    pub fn bind_json(&mut self, name: impl Into<String>, value: serde_json::Value) -> SqlResult<()> {
        let value = Value::try_from(value)?;
        self.bind(name, value)
    }

    /// Get the value bound under `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Check whether `name` is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Remove and return the value bound under `name`.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.shift_remove(name)
    }

    /// Remove every binding.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate bindings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}
