//! Read function contract and result normalization.

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Deserialize;
use serde::Serialize;

use crate::error::FetchError;
use crate::model::Item;
use crate::observe::ObservableItems;

/// Arguments passed to the read function on every refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadRequest {
    /// 1-based current page.
    pub page: usize,
    /// Rows per page.
    pub page_size: usize,
}

/// A full dataset with its item count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceData {
    /// Number of items the source reports.
    pub count: usize,
    /// The items.
    pub data: Vec<Item>,
}

impl From<Vec<Item>> for SourceData {
    fn from(data: Vec<Item>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }
}

/// What a read produced, before normalization.
#[derive(Debug, Clone)]
pub enum RawData {
    /// A bare sequence of items.
    Items(Vec<Item>),
    /// A shared collection the host keeps mutating.
    ///
    /// The handle itself becomes the change-observation subject.
    Observed(ObservableItems),
    /// An already shaped `{count, data}` result.
    Shaped(SourceData),
}

impl From<Vec<Item>> for RawData {
    fn from(items: Vec<Item>) -> Self {
        RawData::Items(items)
    }
}

impl From<ObservableItems> for RawData {
    fn from(items: ObservableItems) -> Self {
        RawData::Observed(items)
    }
}

impl From<SourceData> for RawData {
    fn from(data: SourceData) -> Self {
        RawData::Shaped(data)
    }
}

/// The value returned by a read function.
///
/// A read either has its data at hand or hands back a future resolving to
/// it. The data source applies the pipeline right away in the first case
/// and after the future resolves in the second.
pub enum SourceRead {
    /// Data available synchronously.
    Ready(RawData),
    /// Data arriving later; a failure leaves the published state untouched.
    Pending(BoxFuture<'static, Result<RawData, FetchError>>),
}

impl SourceRead {
    /// Wraps synchronously available data.
    pub fn ready(data: impl Into<RawData>) -> Self {
        SourceRead::Ready(data.into())
    }

    /// Wraps a future resolving to the data.
    pub fn pending<F, D>(future: F) -> Self
    where
        F: Future<Output = Result<D, FetchError>> + Send + 'static,
        D: Into<RawData>,
    {
        SourceRead::Pending(future.map(|result| result.map(Into::into)).boxed())
    }
}

impl std::fmt::Debug for SourceRead {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceRead::Ready(data) => f.debug_tuple("Ready").field(data).finish(),
            SourceRead::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Required read function.
pub type ReadFn = Arc<dyn Fn(ReadRequest) -> SourceRead + Send + Sync>;

/// Optional callback for failed reads.
pub type ReadErrorFn = Arc<dyn Fn(&FetchError) + Send + Sync>;

/// Optional override for shaping a bare sequence into `{count, data}`.
///
/// Returning `None` skips the update entirely.
pub type TransformFn = Arc<dyn Fn(Vec<Item>) -> Option<SourceData> + Send + Sync>;

/// A read result in canonical form, together with the collection to observe.
#[derive(Debug, Clone)]
pub struct Normalized {
    /// Shaped data for the pipeline.
    pub data: SourceData,
    /// Subject of change observation.
    pub cache: ObservableItems,
}

/// Brings a raw read result into canonical `{count, data}` shape.
///
/// Sequences are wrapped with their length as count unless `transform` is
/// given, in which case it decides; shaped results pass through as-is.
/// Returns `None` when the transform yields nothing.
pub fn normalize(raw: RawData, transform: Option<&TransformFn>) -> Option<Normalized> {
    let (data, cache) = match raw {
        RawData::Shaped(data) => {
            let cache = ObservableItems::new(data.data.clone());
            (data, cache)
        }
        RawData::Items(items) => {
            let cache = ObservableItems::new(items.clone());
            (shape(items, transform)?, cache)
        }
        RawData::Observed(cache) => (shape(cache.snapshot(), transform)?, cache),
    };
    Some(Normalized { data, cache })
}

fn shape(items: Vec<Item>, transform: Option<&TransformFn>) -> Option<SourceData> {
    match transform {
        Some(transform) => transform(items),
        None => Some(SourceData::from(items)),
    }
}
