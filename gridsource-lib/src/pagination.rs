//! Pagination state and the external pager seam.

use serde::Serialize;

use crate::pipeline::PageWindow;

/// Page size used when none is configured or a size of zero is set.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// An external page-number / page-size control.
///
/// The data source reads the pager's page-size list once on attach and
/// calls [`Pager::refresh`] after every pipeline run so the control can
/// redraw its page count.
pub trait Pager: Send + Sync {
    /// Page sizes offered by the control; the first one is the initial size.
    fn page_sizes(&self) -> Vec<usize> {
        vec![DEFAULT_PAGE_SIZE]
    }

    /// Called with the current pagination after data was published.
    fn refresh(&self, pagination: &Pagination);
}

/// Current page, page size and the counts derived from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    page: usize,
    page_size: usize,
    count: usize,
    page_count: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            count: 0,
            page_count: 0,
        }
    }
}

impl Pagination {
    /// Creates pagination on page 1 with the given size.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    /// 1-based current page.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Rows per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Rows that passed filtering, across all pages.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Number of pages needed for `count` rows.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Sets the current page. Page 0 is treated as page 1.
    ///
    /// The page is not clamped to `page_count`; pages past the end publish
    /// no rows.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Sets the page size. Zero is accepted here and coerced on the next
    /// [`update_count`](Self::update_count).
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size;
    }

    /// Records a new total and recomputes the page count.
    pub fn update_count(&mut self, count: usize) {
        if self.page_size == 0 {
            self.page_size = DEFAULT_PAGE_SIZE;
        }
        self.count = count;
        self.page_count = count.div_ceil(self.page_size);
    }

    /// Window for the pipeline's page stage.
    pub fn window(&self) -> PageWindow {
        let page_size = if self.page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.page_size
        };
        PageWindow::new(self.page, page_size)
    }
}
