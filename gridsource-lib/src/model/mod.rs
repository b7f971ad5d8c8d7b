//! Row and column models

mod column;
mod item;
mod value;

pub use column::*;
pub use item::*;
pub use value::*;
