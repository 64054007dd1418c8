//! tabulon - In-memory tables with live views and a small query engine
//!
//! A [`Table`] is a growable grid of cells. [`View`]s remap its rows and
//! columns without copying, [`Query`] builds selections with filters,
//! nested-loop joins and ordering, and [`BeanRowAdapter`] exposes rows as
//! record proxies. Loaders and renderers for CSV and JSON back the CLI.

pub mod bean;
pub mod collab;
pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod parser;
pub mod query;
pub mod runner;
pub mod view;

pub use bean::{Accessor, BeanBinding, BeanRowAdapter, BindingCache, RowBean, RowProxy};
pub use collab::{Cache, ElementConverter, Factory, HashCache, ParamFactory};
pub use config::Config;
pub use error::{Result, TableError};
pub use model::{CellValue, Column, ColumnKey, Element, Schema, Table};
pub use query::{Direction, JoinOn, Query, QueryResult, Selection, Source};
pub use view::{IndexMap, View, ViewTarget};
