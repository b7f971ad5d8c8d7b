//! Page slicing stage and the page result type.

use serde::Serialize;

use crate::model::Item;

/// A window into the filtered and sorted rows.
///
/// Pages are 1-based. The window is never clamped to the available data:
/// a page past the end yields an empty slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// 1-based page number.
    pub page: usize,
    /// Rows per page.
    pub page_size: usize,
}

impl PageWindow {
    /// Creates a window for the given page and size.
    pub fn new(page: usize, page_size: usize) -> Self {
        Self { page, page_size }
    }

    /// Index of the first row on this page.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Returns the row index range of this page within `len` rows.
    pub fn range(&self, len: usize) -> std::ops::Range<usize> {
        let start = self.offset().min(len);
        let end = start.saturating_add(self.page_size).min(len);
        start..end
    }
}

/// Slices one page out of `items`.
pub fn page_items(mut items: Vec<Item>, window: PageWindow) -> Vec<Item> {
    let range = window.range(items.len());
    items.truncate(range.end);
    items.drain(..range.start);
    items
}

/// One page of pipeline output.
///
/// `total_count` is the number of rows that survived filtering, before the
/// page slice was taken. It drives the page count, not the page length.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    items: Vec<Item>,
    total_count: usize,
}

impl Page {
    /// Creates a page with its items and the pre-slice total.
    pub fn new(items: Vec<Item>, total_count: usize) -> Self {
        Self { items, total_count }
    }

    /// Returns a reference to the items in this page.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Consumes the page and returns the items.
    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    /// Returns the filtered total across all pages.
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Returns `true` if this page has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }
}
