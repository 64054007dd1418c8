//! Record-type bindings and live row proxies
//!
//! A record type declares its accessors through [`RowBean`]. The binding
//! from accessor to column name is computed once per record type and kept
//! in a [`Cache`]; column positions are resolved against the target when an
//! adapter is built, so an accessor with no column fails right there. Rows
//! are addressed live: an adapter over a table sees rows appended later.

use std::marker::PhantomData;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::collab::{Cache, HashCache};
use crate::error::{Result, TableError};
use crate::model::{CellValue, Element};
use crate::query::Source;

/// One declared accessor of a record type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessor {
    /// `getName`, `setName` or `isName`, bound to the column `name`
    Named(&'static str),
    /// Accessor bound to an explicitly named column
    Bound {
        accessor: &'static str,
        column: &'static str,
    },
}

/// A record type whose fields live in table columns
pub trait RowBean {
    /// Cache key for the binding table
    const TYPE_NAME: &'static str;

    fn accessors() -> Vec<Accessor>;
}

/// Property named by an accessor: the prefix `get`, `set` or `is` is
/// stripped and the rest decapitalized, except that a rest starting with two
/// capitals is kept as is (`getURL` names `URL`).
pub fn property_name(accessor: &str) -> Option<String> {
    let rest = ["get", "set", "is"]
        .iter()
        .find_map(|prefix| accessor.strip_prefix(prefix))
        .filter(|rest| !rest.is_empty())?;
    Some(decapitalize(rest))
}

fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let second_upper = chars.clone().next().is_some_and(char::is_uppercase);
    if first.is_uppercase() && second_upper {
        return name.to_string();
    }
    first.to_lowercase().chain(chars).collect()
}

/// Accessor-to-column table of one record type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeanBinding {
    record: String,
    /// `None` when the accessor does not name a property
    columns: IndexMap<String, Option<String>>,
}

impl BeanBinding {
    pub fn of<B: RowBean>() -> Self {
        let columns = B::accessors()
            .into_iter()
            .map(|accessor| match accessor {
                Accessor::Named(name) => (name.to_string(), property_name(name)),
                Accessor::Bound { accessor, column } => {
                    (accessor.to_string(), Some(column.to_string()))
                }
            })
            .collect();
        Self {
            record: B::TYPE_NAME.to_string(),
            columns,
        }
    }

    pub fn record(&self) -> &str {
        &self.record
    }

    /// Column bound to a declared accessor
    pub fn column_for(&self, accessor: &str) -> Option<&str> {
        self.columns.get(accessor).and_then(|c| c.as_deref())
    }

    pub fn accessors(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    fn unmappable(&self, accessor: &str) -> TableError {
        TableError::UnmappableAccessor {
            record: self.record.clone(),
            accessor: accessor.to_string(),
        }
    }
}

/// Cache of binding tables keyed by record type name
pub type BindingCache = HashCache<String, Rc<BeanBinding>>;

/// Exposes the rows of a table, view or result as live record proxies
pub struct BeanRowAdapter<B, T = CellValue> {
    target: Source<T>,
    binding: Rc<BeanBinding>,
    /// Column name -> target column
    positions: FxHashMap<String, usize>,
    _record: PhantomData<fn() -> B>,
}

impl<B: RowBean, T: Element> BeanRowAdapter<B, T> {
    /// Bind `B` to `target`, failing on the first accessor without a column
    pub fn new(
        target: impl Into<Source<T>>,
        cache: &dyn Cache<String, Rc<BeanBinding>>,
    ) -> Result<Self> {
        let binding = cache.get_or_create(B::TYPE_NAME.to_string(), &|| {
            Rc::new(BeanBinding::of::<B>())
        });
        let target = target.into();
        let schema = target.schema()?;

        let mut positions = FxHashMap::default();
        for (accessor, column) in &binding.columns {
            let index = column
                .as_deref()
                .and_then(|name| schema.index_of(name).map(|index| (name, index)));
            match index {
                Some((name, index)) => {
                    positions.insert(name.to_string(), index);
                }
                None => return Err(binding.unmappable(accessor)),
            }
        }
        tracing::debug!(record = B::TYPE_NAME, columns = positions.len(), "bound record type");

        Ok(Self {
            target,
            binding,
            positions,
            _record: PhantomData,
        })
    }

    pub fn binding(&self) -> &BeanBinding {
        &self.binding
    }

    pub fn row_count(&self) -> usize {
        self.target.row_count()
    }

    /// Live proxy for one row
    pub fn row(&self, index: usize) -> Result<RowProxy<'_, T>> {
        if index >= self.target.row_count() {
            return Err(TableError::out_of_range(index, 0));
        }
        Ok(self.proxy(index))
    }

    pub fn rows(&self) -> impl Iterator<Item = RowProxy<'_, T>> + '_ {
        (0..self.target.row_count()).map(move |index| self.proxy(index))
    }

    fn proxy(&self, row: usize) -> RowProxy<'_, T> {
        RowProxy {
            target: &self.target,
            binding: &self.binding,
            positions: &self.positions,
            row,
        }
    }
}

/// A row seen through a record binding. Not a snapshot: every call reads
/// or writes the underlying cell.
pub struct RowProxy<'a, T> {
    target: &'a Source<T>,
    binding: &'a BeanBinding,
    positions: &'a FxHashMap<String, usize>,
    row: usize,
}

impl<T: Element> RowProxy<'_, T> {
    pub fn index(&self) -> usize {
        self.row
    }

    /// Column for an accessor: its declared binding, else the property it names
    fn position(&self, accessor: &str) -> Result<usize> {
        let column = match self.binding.column_for(accessor) {
            Some(column) => Some(column.to_string()),
            None => property_name(accessor),
        };
        column
            .and_then(|c| self.positions.get(&c).copied())
            .ok_or_else(|| self.binding.unmappable(accessor))
    }

    fn property_position(&self, property: &str) -> Result<usize> {
        self.positions
            .get(property)
            .copied()
            .ok_or_else(|| self.binding.unmappable(property))
    }

    /// Invoke a getter, e.g. `get("getName")`
    pub fn get(&self, accessor: &str) -> Result<T> {
        self.target.get(self.row, self.position(accessor)?)
    }

    /// Invoke a setter, e.g. `set("setName", value)`
    pub fn set(&self, accessor: &str, value: T) -> Result<()> {
        self.target.set(self.row, self.position(accessor)?, value)
    }

    pub fn get_property(&self, property: &str) -> Result<T> {
        self.target.get(self.row, self.property_position(property)?)
    }

    pub fn set_property(&self, property: &str, value: T) -> Result<()> {
        self.target
            .set(self.row, self.property_position(property)?, value)
    }
}
