//! Selection layer: build a query, evaluate it, read the result

mod builder;
mod executor;
mod predicate;
mod result;
mod selection;
mod source;

pub use builder::Query;
pub use predicate::{JoinOn, JoinSpec, RowFilter};
pub use result::{ColumnRef, QueryResult, ResultRows, RowRef};
pub use selection::{Direction, OrderKey, Projection, Selection};
pub use source::Source;
