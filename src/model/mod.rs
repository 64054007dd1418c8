//! Data model: cell values, column metadata and the table store

mod schema;
pub(crate) mod table;
mod value;

use std::fmt::Debug;

pub use schema::{Column, ColumnKey, Schema};
pub use table::{Table, TableRows};
pub use value::CellValue;

/// Element types the query layer can filter, join and order
pub trait Element: Clone + Default + Ord + Debug + 'static {}

impl<T> Element for T where T: Clone + Default + Ord + Debug + 'static {}
