//! Dynamic row record

use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use super::Value;

/// A single row of tabular data.
///
/// Items hold field values as a `HashMap<String, Value>`, allowing dynamic
/// access to any field by name. The schema is defined by the caller; the
/// pipeline only ever reads fields named by column definitions.
///
/// # Example
///
/// ```
/// use gridsource_lib::model::Item;
///
/// let item = Item::new()
///     .set("name", "Contoso")
///     .set("revenue", 1_000_000i64);
///
/// assert_eq!(item.get("name").and_then(|v| v.as_str()), Some("Contoso"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item {
    fields: HashMap<String, Value>,
}

impl Item {
    /// Creates a new empty item.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns the text coercion of a field; missing fields read as empty.
    pub fn text(&self, field: &str) -> String {
        self.fields.get(field).map(Value::to_text).unwrap_or_default()
    }

    /// Returns `true` if the item contains the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns a reference to all fields.
    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }

    /// Sets a field value (builder pattern).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Inserts a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Removes a field and returns its value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the item has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Item
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
