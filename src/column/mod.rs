//! Typed columns backing a [`Dataset`](crate::dataset::Dataset)

mod boolean_column;
mod common;
mod float64_column;
mod int64_column;
mod string_column;

pub use boolean_column::BooleanColumn;
pub use common::{format_number, utils, Column, ColumnType};
pub use float64_column::Float64Column;
pub use int64_column::Int64Column;
pub use string_column::StringColumn;
