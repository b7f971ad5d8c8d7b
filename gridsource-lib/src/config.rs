//! Data source configuration

use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigError;
use crate::pagination::DEFAULT_PAGE_SIZE;

/// Behavior switches for a [`DataSource`](crate::DataSource).
///
/// Each pipeline stage can be turned off independently. Options deserialize
/// from camelCase JSON and every key is optional.
///
/// # Example
///
/// ```
/// use gridsource_lib::DataSourceOptions;
///
/// let options = DataSourceOptions::default()
///     .with_auto_load(false)
///     .with_page_size(25);
///
/// let parsed = DataSourceOptions::from_json(r#"{"autoLoad": false, "pageSize": 25}"#).unwrap();
/// assert_eq!(options, parsed);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataSourceOptions {
    /// Refresh as soon as the data source is attached.
    ///
    /// Default: true
    pub auto_load: bool,

    /// Apply column filters.
    ///
    /// Default: true
    pub columns_can_filter: bool,

    /// Apply the sort stack.
    ///
    /// Default: true
    pub columns_can_sort: bool,

    /// Slice the result into pages.
    ///
    /// Default: true
    pub pagination_enabled: bool,

    /// Page size used when no pager supplies one.
    ///
    /// Default: 10
    pub page_size: usize,
}

impl Default for DataSourceOptions {
    fn default() -> Self {
        Self {
            auto_load: true,
            columns_can_filter: true,
            columns_can_sort: true,
            pagination_enabled: true,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl DataSourceOptions {
    /// Creates options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses options from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets whether attaching triggers a refresh.
    pub fn with_auto_load(mut self, auto_load: bool) -> Self {
        self.auto_load = auto_load;
        self
    }

    /// Sets whether column filters apply.
    pub fn with_filtering(mut self, enabled: bool) -> Self {
        self.columns_can_filter = enabled;
        self
    }

    /// Sets whether the sort stack applies.
    pub fn with_sorting(mut self, enabled: bool) -> Self {
        self.columns_can_sort = enabled;
        self
    }

    /// Sets whether results are paged.
    pub fn with_pagination(mut self, enabled: bool) -> Self {
        self.pagination_enabled = enabled;
        self
    }

    /// Sets the fallback page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}
