//! Grid data source library
//!
//! An in-memory paging engine for tabular widgets: reads a dataset through an
//! injected read function, applies column filters, a multi-column sort and
//! page slicing, and republishes the visible page with its pagination counts.

pub mod error;
pub mod fetch;
pub mod model;
pub mod observe;
pub mod pagination;
pub mod pipeline;
pub mod sort;

mod config;
mod source;

pub use config::*;
pub use source::*;
