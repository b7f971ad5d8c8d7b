//! Multi-column sort state tracking.

use crate::model::ColumnDef;
use crate::model::ColumnState;
use crate::model::Sorting;
use crate::pipeline::Direction;
use crate::pipeline::OrderBy;
use crate::pipeline::SortKey;

/// Ordered list of columns currently contributing to the sort.
///
/// Entries are column indices; the first entry is the primary sort. A
/// column appears at most once, and its position reflects the last time it
/// was added. Toggling a column that is already stacked moves it to the back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortStack {
    columns: Vec<usize>,
}

impl SortStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stacked column indices in priority order.
    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    /// Returns `true` if no column is sorted.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the number of stacked columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the column is in the stack.
    pub fn contains(&self, column: usize) -> bool {
        self.columns.contains(&column)
    }

    /// Advances `column` through the none → asc → desc → none cycle.
    ///
    /// Without `additive`, every other column loses its sort state first, so
    /// only `column` can remain stacked. The column is always removed from
    /// its current position and, unless its new state is `None`, pushed to
    /// the back.
    ///
    /// Returns the column's new state, or `None` if the index is out of
    /// range for `states`.
    pub fn toggle(
        &mut self,
        states: &mut [ColumnState],
        column: usize,
        additive: bool,
    ) -> Option<Sorting> {
        let next = states.get(column)?.sorting.next();

        if !additive {
            for (index, state) in states.iter_mut().enumerate() {
                if index != column {
                    state.sorting = Sorting::None;
                }
            }
            self.columns.retain(|&c| c == column);
        }

        self.columns.retain(|&c| c != column);
        states[column].sorting = next;
        if next.is_active() {
            self.columns.push(column);
        }

        Some(next)
    }

    /// Clears every column's sort state and empties the stack.
    pub fn clear(&mut self, states: &mut [ColumnState]) {
        for state in states.iter_mut() {
            state.sorting = Sorting::None;
        }
        self.columns.clear();
    }

    /// Resolves the stack into sort keys against the column definitions.
    ///
    /// Entries whose column is missing or no longer active are skipped.
    pub fn keys(&self, columns: &[ColumnDef], states: &[ColumnState]) -> Vec<SortKey> {
        self.columns
            .iter()
            .filter_map(|&index| {
                let def = columns.get(index)?;
                let direction = Direction::from_sorting(states.get(index)?.sorting)?;
                Some(SortKey {
                    field: def.field.clone(),
                    direction,
                })
            })
            .collect()
    }

    /// Builds the sort order for the pipeline.
    pub fn order(&self, columns: &[ColumnDef], states: &[ColumnState]) -> OrderBy {
        self.keys(columns, states).into_iter().collect()
    }
}
