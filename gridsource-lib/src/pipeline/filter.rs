//! Column filter stage.

use crate::model::Item;

/// A substring filter on a single field.
///
/// A row passes when the field's text coercion contains the filter text.
/// Matching is case-sensitive and unanchored. A filter with empty text
/// places no constraint on any row.
///
/// # Example
///
/// ```
/// use gridsource_lib::model::Item;
/// use gridsource_lib::pipeline::Filter;
///
/// let filter = Filter::contains("name", "Corp");
/// assert!(filter.matches(&Item::new().set("name", "Contoso Corp")));
/// assert!(!filter.matches(&Item::new().set("name", "contoso corp")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    field: String,
    text: String,
}

impl Filter {
    /// Creates a contains filter: the field's text must include `text`.
    pub fn contains(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            text: text.into(),
        }
    }

    /// Returns the filtered field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns the filter text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns `true` if this filter constrains nothing.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns `true` if the item passes this filter.
    pub fn matches(&self, item: &Item) -> bool {
        self.is_empty() || item.text(&self.field).contains(self.text.as_str())
    }
}

/// Keeps the items that pass every filter, preserving their order.
pub fn filter_items(items: &[Item], filters: &[Filter]) -> Vec<Item> {
    let active: Vec<&Filter> = filters.iter().filter(|f| !f.is_empty()).collect();
    if active.is_empty() {
        return items.to_vec();
    }

    items
        .iter()
        .filter(|item| active.iter().all(|f| f.matches(item)))
        .cloned()
        .collect()
}
