//! Multi-column sort stage.

use std::cmp::Ordering;

use serde::Serialize;

use crate::model::Item;
use crate::model::Sorting;
use crate::model::Value;

/// Sort direction for ordering results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending order (A-Z, 0-9).
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

impl Direction {
    /// Maps a column sort state to a direction; `None` has no direction.
    pub fn from_sorting(sorting: Sorting) -> Option<Self> {
        match sorting {
            Sorting::None => None,
            Sorting::Asc => Some(Direction::Asc),
            Sorting::Desc => Some(Direction::Desc),
        }
    }
}

/// One key of a sort order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortKey {
    /// Item field to compare.
    pub field: String,
    /// Direction for this field.
    pub direction: Direction,
}

/// Specifies the ordering of rows.
///
/// Multiple fields can be chained together for secondary, tertiary, etc.
/// sorting. Earlier fields take priority; later fields only break ties.
///
/// # Example
///
/// ```
/// use gridsource_lib::pipeline::OrderBy;
///
/// // Single field ordering
/// let order = OrderBy::desc("revenue");
///
/// // Multiple field ordering
/// let order = OrderBy::desc("revenue")
///     .then_asc("name");
/// assert_eq!(order.keys().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderBy {
    keys: Vec<SortKey>,
}

impl OrderBy {
    /// Creates an ascending order on a field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self::default().then_asc(field)
    }

    /// Creates a descending order on a field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self::default().then_desc(field)
    }

    /// Adds a lower-priority ascending order on a field.
    pub fn then_asc(self, field: impl Into<String>) -> Self {
        self.then(field, Direction::Asc)
    }

    /// Adds a lower-priority descending order on a field.
    pub fn then_desc(self, field: impl Into<String>) -> Self {
        self.then(field, Direction::Desc)
    }

    /// Adds a lower-priority order on a field.
    pub fn then(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.keys.push(SortKey {
            field: field.into(),
            direction,
        });
        self
    }

    /// Returns the sort keys in priority order.
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Returns `true` if no keys are set.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Compares two items key by key, falling through on ties.
    pub fn compare(&self, a: &Item, b: &Item) -> Ordering {
        for key in &self.keys {
            let left = a.get(&key.field).unwrap_or(&Value::Null);
            let right = b.get(&key.field).unwrap_or(&Value::Null);
            let ord = match key.direction {
                Direction::Asc => left.natural_cmp(right),
                Direction::Desc => right.natural_cmp(left),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

impl FromIterator<SortKey> for OrderBy {
    fn from_iter<I: IntoIterator<Item = SortKey>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

/// Stable-sorts items in place. An empty order leaves the items untouched.
pub fn sort_items(items: &mut [Item], order: &OrderBy) {
    if order.is_empty() {
        return;
    }
    items.sort_by(|a, b| order.compare(a, b));
}
