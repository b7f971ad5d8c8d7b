//! Column definitions and live column state

use serde::Deserialize;
use serde::Serialize;

/// Immutable display definition of a grid column.
///
/// The definition names the item field the column reads. Filter and sort
/// state live separately in [`ColumnState`] so the definition can be shared
/// with the host's rendering layer unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Item field this column reads.
    pub field: String,
    /// Header text, if any.
    #[serde(default)]
    pub title: Option<String>,
}

impl ColumnDef {
    /// Creates a column reading the given field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            title: None,
        }
    }

    /// Sets the header text.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Sort state of a single column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sorting {
    /// Column does not contribute to the sort order.
    #[default]
    None,
    /// Ascending order (A-Z, 0-9).
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

impl Sorting {
    /// Returns the next state in the header click cycle: none, asc, desc, none.
    pub fn next(self) -> Self {
        match self {
            Sorting::None => Sorting::Asc,
            Sorting::Asc => Sorting::Desc,
            Sorting::Desc => Sorting::None,
        }
    }

    /// Returns `true` unless this is [`Sorting::None`].
    pub fn is_active(self) -> bool {
        self != Sorting::None
    }
}

/// Mutable filter and sort state of a column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnState {
    /// Substring filter; empty means no constraint.
    pub filter_value: String,
    /// Current sort direction.
    pub sorting: Sorting,
}
