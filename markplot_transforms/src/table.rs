// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Owned columnar table of [`Value`]s.

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::Value;

/// Shared, immutable table. Two marks share data iff their `Data` is [`Arc::ptr_eq`].
pub type Data = Arc<Table>;

/// Errors returned when building a [`Table`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// A column's length differs from the table's row count.
    #[error("column `{column}` has {found} rows, expected {expected}")]
    LengthMismatch {
        /// Offending column.
        column: String,
        /// Row count of the table.
        expected: usize,
        /// Row count of the column.
        found: usize,
    },
    /// Two columns share a name.
    #[error("duplicate column `{0}`")]
    DuplicateColumn(String),
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Values, one per row.
    pub values: Vec<Value>,
}

/// A columnar table with named columns of equal length.
///
/// Tuple data (rows of positional values) is stored with columns named `"0"`, `"1"`, …;
/// a bare list of values is stored as one column with an empty name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    /// Build a table from named columns.
    pub fn from_columns<N, I>(columns: I) -> Result<Self, TableError>
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Vec<Value>)>,
    {
        let mut table = Self::default();
        for (i, (name, values)) in columns.into_iter().enumerate() {
            let name = name.into();
            if i == 0 {
                table.rows = values.len();
            }
            table.push_column(name, values)?;
        }
        Ok(table)
    }

    /// Build a table from tuple rows. Short rows are padded with [`Value::Null`].
    pub fn from_rows(rows: impl IntoIterator<Item = Vec<Value>>) -> Self {
        let rows: Vec<Vec<Value>> = rows.into_iter().collect();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut columns: Vec<Column> = (0..width)
            .map(|i| Column {
                name: i.to_string(),
                values: Vec::with_capacity(rows.len()),
            })
            .collect();
        for row in &rows {
            for (i, col) in columns.iter_mut().enumerate() {
                col.values.push(row.get(i).cloned().unwrap_or_default());
            }
        }
        Self {
            columns,
            rows: rows.len(),
        }
    }

    /// Build a single-column table from bare values.
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        let values: Vec<Value> = values.into_iter().collect();
        Self {
            rows: values.len(),
            columns: alloc::vec![Column {
                name: String::new(),
                values,
            }],
        }
    }

    /// Wrap this table as shared [`Data`].
    pub fn into_data(self) -> Data {
        Arc::new(self)
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Returns the columns in declaration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns a column's values by name.
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Returns a column's values by position.
    pub fn column_at(&self, i: usize) -> Option<&[Value]> {
        self.columns.get(i).map(|c| c.values.as_slice())
    }

    /// Returns the value at `row` of column `name`.
    pub fn get(&self, row: usize, name: &str) -> Option<&Value> {
        self.column(name)?.get(row)
    }

    /// Returns the whole datum of a single-column table, else `None`.
    pub fn datum(&self, row: usize) -> Option<&Value> {
        match self.columns.as_slice() {
            [only] => only.values.get(row),
            _ => None,
        }
    }

    /// Append a column, or replace an existing one with the same name.
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        values: Vec<Value>,
    ) -> Result<Self, TableError> {
        let name = name.into();
        if self.columns.is_empty() {
            self.rows = values.len();
        }
        if values.len() != self.rows {
            return Err(TableError::LengthMismatch {
                column: name,
                expected: self.rows,
                found: values.len(),
            });
        }
        if let Some(col) = self.columns.iter_mut().find(|c| c.name == name) {
            col.values = values;
        } else {
            self.columns.push(Column { name, values });
        }
        Ok(self)
    }

    /// Returns a new table holding `indices` rows, in that order.
    pub fn take(&self, indices: &[usize]) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: indices
                    .iter()
                    .map(|&i| c.values.get(i).cloned().unwrap_or_default())
                    .collect(),
            })
            .collect();
        Self {
            columns,
            rows: indices.len(),
        }
    }

    fn push_column(&mut self, name: String, values: Vec<Value>) -> Result<(), TableError> {
        if self.columns.iter().any(|c| c.name == name) {
            return Err(TableError::DuplicateColumn(name));
        }
        if values.len() != self.rows {
            return Err(TableError::LengthMismatch {
                column: name,
                expected: self.rows,
                found: values.len(),
            });
        }
        self.columns.push(Column { name, values });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    #[test]
    fn from_columns_checks_lengths() {
        let err = Table::from_columns([
            ("a", vec![Value::from(1), Value::from(2)]),
            ("b", vec![Value::from(1)]),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            TableError::LengthMismatch {
                column: "b".into(),
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn from_rows_names_columns_by_position() {
        let t = Table::from_rows([
            vec![Value::from(1), Value::from("a")],
            vec![Value::from(2)],
        ]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.get(0, "1"), Some(&Value::from("a")));
        assert_eq!(t.get(1, "1"), Some(&Value::Null));
        assert_eq!(t.column_at(0), t.column("0"));
    }

    #[test]
    fn datum_only_for_single_column() {
        let bare = Table::from_values([Value::from(3), Value::from(4)]);
        assert_eq!(bare.datum(1), Some(&Value::from(4)));
        let tuples = Table::from_rows([vec![Value::from(1), Value::from(2)]]);
        assert_eq!(tuples.datum(0), None);
    }

    #[test]
    fn take_reorders_rows() {
        let t = Table::from_columns([("v", vec![Value::from(1), Value::from(2), Value::from(3)])])
            .unwrap();
        let t = t.take(&[2, 0]);
        assert_eq!(t.column("v"), Some(&[Value::from(3), Value::from(1)][..]));
    }
}
