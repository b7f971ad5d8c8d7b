//! The grid data source

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::Weak;

use serde::Serialize;

use crate::config::DataSourceOptions;
use crate::error::ConfigError;
use crate::error::Error;
use crate::error::FetchError;
use crate::fetch::RawData;
use crate::fetch::ReadErrorFn;
use crate::fetch::ReadFn;
use crate::fetch::ReadRequest;
use crate::fetch::SourceData;
use crate::fetch::SourceRead;
use crate::fetch::TransformFn;
use crate::fetch::normalize;
use crate::model::ColumnDef;
use crate::model::ColumnState;
use crate::model::Item;
use crate::model::Sorting;
use crate::observe::ObservableItems;
use crate::observe::Subscription;
use crate::pagination::Pager;
use crate::pagination::Pagination;
use crate::pipeline::Filter;
use crate::pipeline::Pipeline;
use crate::pipeline::SortKey;
use crate::sort::SortStack;

/// In-memory filter, sort and paging engine behind one grid.
///
/// A data source reads the full dataset through an injected read function,
/// runs it through the [`Pipeline`] and publishes the visible page together
/// with the pagination counts. It re-runs itself whenever the cached
/// collection reports a mutation.
///
/// The data source is cheap to clone (uses `Arc` internally); clones drive
/// the same state.
///
/// # Example
///
/// ```
/// use gridsource_lib::{DataSource, DataSourceOptions};
/// use gridsource_lib::fetch::SourceRead;
/// use gridsource_lib::model::{ColumnDef, Item};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let source = DataSource::builder()
///     .read(|_request| {
///         let rows: Vec<Item> = (0..25).map(|i| Item::new().set("id", i)).collect();
///         SourceRead::ready(rows)
///     })
///     .column(ColumnDef::new("id"))
///     .options(DataSourceOptions::default())
///     .build()
///     .unwrap();
///
/// source.attached().await;
///
/// assert_eq!(source.count(), 25);
/// assert_eq!(source.page_count(), 3);
/// assert_eq!(source.items().len(), 10);
/// # }
/// ```
#[derive(Clone)]
pub struct DataSource {
    inner: Arc<DataSourceInner>,
}

struct DataSourceInner {
    read: ReadFn,
    read_error: Option<ReadErrorFn>,
    transform: Option<TransformFn>,
    pager: Option<Arc<dyn Pager>>,
    columns: Vec<ColumnDef>,
    options: DataSourceOptions,
    state: Mutex<SourceState>,
}

struct SourceState {
    column_states: Vec<ColumnState>,
    sort: SortStack,
    pagination: Pagination,
    /// Full dataset from the last successful read.
    all_items: Vec<Item>,
    /// Observation subject for the last successful read.
    cache: ObservableItems,
    /// Published page.
    items: Vec<Item>,
    loading: bool,
    subscription: Option<Subscription>,
    unbinding: bool,
}

/// Published state of a data source at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceSnapshot {
    /// 1-based current page.
    pub page: usize,
    /// Rows per page.
    pub page_size: usize,
    /// Rows that passed filtering.
    pub count: usize,
    /// Number of pages for `count`.
    pub page_count: usize,
    /// Whether a read is in flight.
    pub loading: bool,
    /// Active sort keys in priority order.
    pub sorting: Vec<SortKey>,
    /// The visible page.
    pub items: Vec<Item>,
}

impl DataSource {
    /// Creates a new builder for constructing a data source.
    pub fn builder() -> DataSourceBuilder {
        DataSourceBuilder::new()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Binds the data source to its widget.
    ///
    /// Resets to page 1, takes the page size from the pager's first entry
    /// (falling back to the configured size), and refreshes if
    /// `auto_load` is set.
    pub async fn attached(&self) {
        let page_size = self
            .inner
            .pager
            .as_ref()
            .and_then(|pager| pager.page_sizes().first().copied())
            .unwrap_or(self.inner.options.page_size);

        {
            let mut state = self.state();
            state.unbinding = false;
            state.pagination.set_page(1);
            state.pagination.set_page_size(page_size);
        }
        log::debug!("data source attached with page size {}", page_size);

        if self.inner.options.auto_load {
            self.refresh().await;
        }
    }

    /// Stops watching the cached collection.
    ///
    /// Reads still in flight may publish their data, but no new change
    /// subscription is made until the next [`attached`](Self::attached).
    pub fn unbind(&self) {
        let subscription = {
            let mut state = self.state();
            state.unbinding = true;
            state.subscription.take()
        };
        if let Some(mut subscription) = subscription {
            subscription.dispose();
        }
        log::debug!("data source unbound");
    }

    /// Reads the data and republishes the current page.
    ///
    /// Never fails: a rejected read is logged, handed to the error callback
    /// and leaves the published items untouched. Overlapping refreshes are
    /// not cancelled; whichever read resolves last is published.
    pub async fn refresh(&self) {
        let request = {
            let mut state = self.state();
            state.loading = true;
            ReadRequest {
                page: state.pagination.page(),
                page_size: state.pagination.page_size(),
            }
        };
        log::debug!(
            "refresh: reading page {} (size {})",
            request.page,
            request.page_size
        );

        match (self.inner.read)(request) {
            SourceRead::Ready(raw) => self.data_loaded(raw),
            SourceRead::Pending(future) => match future.await {
                Ok(raw) => self.data_loaded(raw),
                Err(err) => self.read_failed(err),
            },
        }
    }

    // =========================================================================
    // Hooks
    // =========================================================================

    /// Handles a click on a sortable column header.
    ///
    /// Advances the column through none → asc → desc → none. Without
    /// `additive` every other column is unsorted first; with it the column
    /// is stacked behind the existing sort keys. Refreshes afterwards and
    /// returns the column's new sort state.
    pub async fn sort_changed(&self, column: usize, additive: bool) -> Result<Sorting, Error> {
        let sorting = {
            let mut guard = self.state();
            let state = &mut *guard;
            let len = state.column_states.len();
            state
                .sort
                .toggle(&mut state.column_states, column, additive)
                .ok_or(Error::unknown_column(column, len))?
        };
        log::debug!("column {} sorting is now {:?}", column, sorting);

        self.refresh().await;
        Ok(sorting)
    }

    /// Sets a column's filter text and refreshes. Empty text clears it.
    pub async fn filter_changed(&self, column: usize, text: impl Into<String>) -> Result<(), Error> {
        {
            let mut state = self.state();
            let len = state.column_states.len();
            let column_state = state
                .column_states
                .get_mut(column)
                .ok_or(Error::unknown_column(column, len))?;
            column_state.filter_value = text.into();
        }

        self.refresh().await;
        Ok(())
    }

    /// Moves to another page and refreshes. Page 0 is treated as page 1.
    pub async fn page_changed(&self, page: usize) {
        self.state().pagination.set_page(page);
        self.refresh().await;
    }

    /// Changes the page size and refreshes. Zero falls back to the default.
    pub async fn page_size_changed(&self, page_size: usize) {
        self.state().pagination.set_page_size(page_size);
        self.refresh().await;
    }

    // =========================================================================
    // Published state
    // =========================================================================

    /// Rows that passed filtering, across all pages.
    pub fn count(&self) -> usize {
        self.state().pagination.count()
    }

    /// The visible page.
    pub fn items(&self) -> Vec<Item> {
        self.state().items.clone()
    }

    /// The full dataset from the last successful read.
    pub fn all_items(&self) -> Vec<Item> {
        self.state().all_items.clone()
    }

    /// Whether a read is in flight.
    pub fn loading(&self) -> bool {
        self.state().loading
    }

    /// 1-based current page.
    pub fn page(&self) -> usize {
        self.state().pagination.page()
    }

    /// Rows per page.
    pub fn page_size(&self) -> usize {
        self.state().pagination.page_size()
    }

    /// Number of pages for the current count.
    pub fn page_count(&self) -> usize {
        self.state().pagination.page_count()
    }

    /// Current pagination values.
    pub fn pagination(&self) -> Pagination {
        self.state().pagination
    }

    /// Active sort keys in priority order.
    pub fn sorting(&self) -> Vec<SortKey> {
        let state = self.state();
        state.sort.keys(&self.inner.columns, &state.column_states)
    }

    /// Column definitions.
    pub fn columns(&self) -> &[ColumnDef] {
        &self.inner.columns
    }

    /// Live filter and sort state of a column.
    pub fn column_state(&self, column: usize) -> Option<ColumnState> {
        self.state().column_states.get(column).cloned()
    }

    /// The collection being watched for mutations.
    ///
    /// Mutating it triggers a refresh while the data source is bound.
    pub fn cache(&self) -> ObservableItems {
        self.state().cache.clone()
    }

    /// Returns `true` while a change subscription is armed.
    pub fn is_observing(&self) -> bool {
        self.state()
            .subscription
            .as_ref()
            .is_some_and(Subscription::is_active)
    }

    /// Captures the published state.
    pub fn snapshot(&self) -> DataSourceSnapshot {
        let state = self.state();
        DataSourceSnapshot {
            page: state.pagination.page(),
            page_size: state.pagination.page_size(),
            count: state.pagination.count(),
            page_count: state.pagination.page_count(),
            loading: state.loading,
            sorting: state.sort.keys(&self.inner.columns, &state.column_states),
            items: state.items.clone(),
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn state(&self) -> MutexGuard<'_, SourceState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pipeline(&self, state: &SourceState) -> Pipeline {
        let options = &self.inner.options;
        let mut pipeline = Pipeline::new();

        if options.columns_can_filter {
            pipeline = pipeline.filters(
                self.inner
                    .columns
                    .iter()
                    .zip(&state.column_states)
                    .filter(|(_, column)| !column.filter_value.is_empty())
                    .map(|(def, column)| Filter::contains(&def.field, &column.filter_value)),
            );
        }
        if options.columns_can_sort {
            pipeline = pipeline.order(state.sort.order(&self.inner.columns, &state.column_states));
        }
        if options.pagination_enabled {
            pipeline = pipeline.window(state.pagination.window());
        }
        pipeline
    }

    fn data_loaded(&self, raw: RawData) {
        let Some(normalized) = normalize(raw, self.inner.transform.as_ref()) else {
            log::debug!("refresh: transform returned no data, keeping published items");
            self.state().loading = false;
            return;
        };

        let weak = Arc::downgrade(&self.inner);
        let (pagination, published) = {
            let mut state = self.state();
            let page = self.pipeline(&state).run(&normalized.data.data);

            state.pagination.update_count(page.total_count());
            state.all_items = normalized.data.data;
            state.items = page.into_items();
            state.cache = normalized.cache;
            state.loading = false;

            if let Some(mut previous) = state.subscription.take() {
                previous.dispose();
            }
            if !state.unbinding {
                let subscription = state.cache.subscribe(move || schedule_refresh(&weak));
                state.subscription = Some(subscription);
            }
            (state.pagination, state.items.len())
        };

        log::debug!(
            "refresh: published {} of {} rows on page {}/{}",
            published,
            pagination.count(),
            pagination.page(),
            pagination.page_count()
        );

        if let Some(pager) = &self.inner.pager {
            pager.refresh(&pagination);
        }
    }

    fn read_failed(&self, err: FetchError) {
        log::warn!("refresh: {}", err);
        self.state().loading = false;
        if let Some(callback) = &self.inner.read_error {
            callback(&err);
        }
    }
}

/// Change callback: refreshes the data source if it is still alive and bound.
fn schedule_refresh(inner: &Weak<DataSourceInner>) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let source = DataSource { inner };
    if source.state().unbinding {
        return;
    }

    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            log::debug!("cached collection changed, scheduling refresh");
            handle.spawn(async move { source.refresh().await });
        }
        Err(_) => log::warn!("cached collection changed outside a tokio runtime, refresh dropped"),
    }
}

impl std::fmt::Debug for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("DataSource")
            .field("columns", &self.inner.columns.len())
            .field("pagination", &state.pagination)
            .field("loading", &state.loading)
            .field("observing", &state.subscription.is_some())
            .finish()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for constructing a [`DataSource`].
///
/// # Required Fields
///
/// - `read` - the function that supplies the data
///
/// # Example
///
/// ```
/// use gridsource_lib::DataSource;
/// use gridsource_lib::error::ConfigError;
///
/// let err = DataSource::builder().build().unwrap_err();
/// assert!(matches!(err, ConfigError::MissingReadFunction));
/// ```
#[derive(Default)]
pub struct DataSourceBuilder {
    read: Option<ReadFn>,
    read_error: Option<ReadErrorFn>,
    transform: Option<TransformFn>,
    pager: Option<Arc<dyn Pager>>,
    columns: Vec<ColumnDef>,
    options: DataSourceOptions,
}

impl DataSourceBuilder {
    /// Creates a builder with default options and no columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the read function.
    pub fn read<F>(mut self, read: F) -> Self
    where
        F: Fn(ReadRequest) -> SourceRead + Send + Sync + 'static,
    {
        self.read = Some(Arc::new(read));
        self
    }

    /// Sets the callback for failed reads.
    pub fn read_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&FetchError) + Send + Sync + 'static,
    {
        self.read_error = Some(Arc::new(callback));
        self
    }

    /// Sets the function that shapes bare sequences into `{count, data}`.
    pub fn transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(Vec<Item>) -> Option<SourceData> + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Sets the pager control kept in sync with the page count.
    pub fn pager(mut self, pager: Arc<dyn Pager>) -> Self {
        self.pager = Some(pager);
        self
    }

    /// Adds a column.
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    /// Adds several columns.
    pub fn columns(mut self, columns: impl IntoIterator<Item = ColumnDef>) -> Self {
        self.columns.extend(columns);
        self
    }

    /// Sets the options.
    pub fn options(mut self, options: DataSourceOptions) -> Self {
        self.options = options;
        self
    }

    /// Builds the data source.
    ///
    /// Fails with [`ConfigError::MissingReadFunction`] if no read function
    /// was set.
    pub fn build(self) -> Result<DataSource, ConfigError> {
        let read = self.read.ok_or(ConfigError::MissingReadFunction)?;
        let state = SourceState {
            column_states: vec![ColumnState::default(); self.columns.len()],
            sort: SortStack::new(),
            pagination: Pagination::new(self.options.page_size),
            all_items: Vec::new(),
            cache: ObservableItems::default(),
            items: Vec::new(),
            loading: false,
            subscription: None,
            unbinding: false,
        };

        Ok(DataSource {
            inner: Arc::new(DataSourceInner {
                read,
                read_error: self.read_error,
                transform: self.transform,
                pager: self.pager,
                columns: self.columns,
                options: self.options,
                state: Mutex::new(state),
            }),
        })
    }
}
