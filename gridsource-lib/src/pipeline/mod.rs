//! The filter → sort → page pipeline.
//!
//! This module holds the three stages applied to the full in-memory item set
//! on every refresh, in this fixed order:
//!
//! - [`Filter`] / [`filter_items`] - per-column substring filters, ANDed
//! - [`OrderBy`] / [`sort_items`] - stable multi-column sort
//! - [`PageWindow`] / [`page_items`] - 1-based page slicing
//!
//! [`Pipeline`] chains them and produces a [`Page`]. A stage left unset is
//! skipped.

mod filter;
mod order;
mod page;

pub use filter::Filter;
pub use filter::filter_items;
pub use order::Direction;
pub use order::OrderBy;
pub use order::SortKey;
pub use order::sort_items;
pub use page::Page;
pub use page::PageWindow;
pub use page::page_items;

use crate::model::Item;

/// A configured filter → sort → page chain.
///
/// # Example
///
/// ```
/// use gridsource_lib::model::Item;
/// use gridsource_lib::pipeline::{Filter, OrderBy, PageWindow, Pipeline};
///
/// let rows: Vec<Item> = (0..30).map(|i| Item::new().set("n", i)).collect();
/// let page = Pipeline::new()
///     .filter(Filter::contains("n", "1"))
///     .order(OrderBy::desc("n"))
///     .window(PageWindow::new(1, 5))
///     .run(&rows);
///
/// assert_eq!(page.total_count(), 12);
/// assert_eq!(page.len(), 5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    filters: Vec<Filter>,
    order: OrderBy,
    window: Option<PageWindow>,
}

impl Pipeline {
    /// Creates a pipeline with every stage passing rows through.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter; all filters must match.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Replaces the filter set.
    pub fn filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.filters = filters.into_iter().collect();
        self
    }

    /// Sets the sort order.
    pub fn order(mut self, order: OrderBy) -> Self {
        self.order = order;
        self
    }

    /// Enables paging with the given window.
    pub fn window(mut self, window: PageWindow) -> Self {
        self.window = Some(window);
        self
    }

    /// Runs the stages over `items`.
    pub fn run(&self, items: &[Item]) -> Page {
        let mut rows = filter_items(items, &self.filters);
        log::trace!("pipeline: {} of {} rows passed filters", rows.len(), items.len());

        sort_items(&mut rows, &self.order);

        let total_count = rows.len();
        let rows = match self.window {
            Some(window) => page_items(rows, window),
            None => rows,
        };
        log::trace!("pipeline: publishing {} rows of {}", rows.len(), total_count);

        Page::new(rows, total_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<Item> {
        vec![
            Item::new().set("name", "c").set("n", 3),
            Item::new().set("name", "a").set("n", 1),
            Item::new().set("name", "b").set("n", 2),
            Item::new().set("name", "ab").set("n", 4),
        ]
    }

    #[test]
    fn test_passthrough_by_default() {
        let page = Pipeline::new().run(&rows());
        assert_eq!(page.items(), rows().as_slice());
        assert_eq!(page.total_count(), 4);
    }

    #[test]
    fn test_filter_then_sort_then_page() {
        let page = Pipeline::new()
            .filter(Filter::contains("name", "a"))
            .order(OrderBy::desc("n"))
            .window(PageWindow::new(2, 1))
            .run(&rows());
        assert_eq!(page.total_count(), 2);
        assert_eq!(page.items(), &[rows()[1].clone()]);
    }

    #[test]
    fn test_count_is_pre_page_total() {
        let page = Pipeline::new().window(PageWindow::new(9, 2)).run(&rows());
        assert!(page.is_empty());
        assert_eq!(page.total_count(), 4);
    }
}
