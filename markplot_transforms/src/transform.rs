// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Facet-aware data transforms.
//!
//! A transform maps `(data, facets)` to `(data', facets')`. Index transforms (filter, sort,
//! reverse) keep the data and rewrite every facet's index; derived transforms (bin) build a
//! new table and a fresh set of facet indexes into it, one group of rows per input facet.

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;

use hashbrown::HashMap;
use ordered_float::OrderedFloat;

use crate::{Data, Table, Value};

/// Row indices into a table, in drawing order.
pub type Index = Vec<usize>;

/// One [`Index`] per facet. Unfaceted marks carry a single facet covering every row.
pub type Facets = Arc<[Index]>;

/// Output column holding a bin's lower bound.
pub const BIN_START: &str = "x1";
/// Output column holding a bin's upper bound.
pub const BIN_END: &str = "x2";
/// Output column holding a bin's row count.
pub const BIN_COUNT: &str = "count";

/// Errors returned by [`Transform::apply`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    /// A transform references a column the data does not have.
    #[error("missing column `{0}`")]
    MissingColumn(String),
    /// A bin step is not a finite positive number.
    #[error("invalid bin step {0}")]
    InvalidStep(f64),
    /// A transform was asked to run without data.
    #[error("transform requires data")]
    MissingData,
    /// A custom transform failed.
    #[error("{0}")]
    Custom(String),
}

/// Sorting order for [`Transform::Sort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

/// Comparison operators for predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `==`
    Eq,
    /// `!=`
    Ne,
}

/// A row predicate used by [`Transform::Filter`]: `row[field] <op> value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Column to read.
    pub field: String,
    /// Comparison operator.
    pub op: CompareOp,
    /// Right-hand constant.
    pub value: Value,
}

impl Predicate {
    /// Create a predicate.
    pub fn new(field: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Evaluate the predicate for a value.
    ///
    /// Quantitative operands compare numerically (so `NaN` fails every ordering); other
    /// operands use the total [`Value`] order.
    pub fn eval(&self, v: &Value) -> bool {
        let ord = match (v.as_f64(), self.value.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => Some(v.cmp(&self.value)),
        };
        match self.op {
            CompareOp::Eq => *v == self.value,
            CompareOp::Ne => *v != self.value,
            CompareOp::Lt => ord == Some(Ordering::Less),
            CompareOp::Le => matches!(ord, Some(Ordering::Less | Ordering::Equal)),
            CompareOp::Gt => ord == Some(Ordering::Greater),
            CompareOp::Ge => matches!(ord, Some(Ordering::Greater | Ordering::Equal)),
        }
    }
}

/// Signature of a user-supplied transform.
pub type CustomTransform =
    dyn Fn(Option<&Data>, &Facets) -> Result<(Option<Data>, Facets), TransformError> + Send + Sync;

/// A data transform applied by a mark before its channels are materialized.
#[derive(Clone)]
pub enum Transform {
    /// Keep rows for which the predicate holds.
    Filter(Predicate),
    /// Stable-sort every facet by a column.
    Sort {
        /// Sort key column.
        by: String,
        /// Sort order.
        order: SortOrder,
    },
    /// Reverse every facet.
    Reverse,
    /// Count rows per bin of `field`, per facet.
    ///
    /// Produces a new table with columns [`BIN_START`], [`BIN_END`] and [`BIN_COUNT`]. Bins are
    /// anchored at 0 and floored to multiples of `step`; undefined values are skipped.
    Bin {
        /// Input column.
        field: String,
        /// Bin width.
        step: f64,
    },
    /// A user-supplied transform.
    Custom(Arc<CustomTransform>),
    /// Apply transforms left to right.
    Chain(Vec<Transform>),
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filter(p) => f.debug_tuple("Filter").field(p).finish(),
            Self::Sort { by, order } => f
                .debug_struct("Sort")
                .field("by", by)
                .field("order", order)
                .finish(),
            Self::Reverse => f.write_str("Reverse"),
            Self::Bin { field, step } => f
                .debug_struct("Bin")
                .field("field", field)
                .field("step", step)
                .finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
            Self::Chain(ts) => f.debug_tuple("Chain").field(ts).finish(),
        }
    }
}

impl Transform {
    /// Wrap a closure as a [`Transform::Custom`].
    pub fn custom(
        f: impl Fn(Option<&Data>, &Facets) -> Result<(Option<Data>, Facets), TransformError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self::Custom(Arc::new(f))
    }

    /// Apply this transform to `data` partitioned by `facets`.
    pub fn apply(
        &self,
        data: Option<Data>,
        facets: Facets,
    ) -> Result<(Option<Data>, Facets), TransformError> {
        match self {
            Self::Filter(predicate) => {
                let table = require(data.as_ref())?;
                let col = column(table, &predicate.field)?;
                let facets = map_facets(&facets, |index| {
                    index
                        .iter()
                        .copied()
                        .filter(|&i| col.get(i).is_some_and(|v| predicate.eval(v)))
                        .collect()
                });
                Ok((data, facets))
            }
            Self::Sort { by, order } => {
                let table = require(data.as_ref())?;
                let col = column(table, by)?;
                let facets = map_facets(&facets, |index| {
                    let mut index = index.clone();
                    // Rows past the end of the column sort last in either order.
                    index.sort_by(|&a, &b| match (col.get(a), col.get(b)) {
                        (Some(a), Some(b)) => match order {
                            SortOrder::Asc => a.cmp(b),
                            SortOrder::Desc => b.cmp(a),
                        },
                        (Some(_), None) => Ordering::Less,
                        (None, Some(_)) => Ordering::Greater,
                        (None, None) => Ordering::Equal,
                    });
                    index
                });
                Ok((data, facets))
            }
            Self::Reverse => {
                let facets = map_facets(&facets, |index| index.iter().rev().copied().collect());
                Ok((data, facets))
            }
            Self::Bin { field, step } => {
                let table = require(data.as_ref())?;
                let (table, facets) = bin(table, &facets, field, *step)?;
                Ok((Some(Arc::new(table)), facets))
            }
            Self::Custom(f) => f(data.as_ref(), &facets),
            Self::Chain(transforms) => transforms
                .iter()
                .try_fold((data, facets), |(d, fs), t| t.apply(d, fs)),
        }
    }
}

fn require(data: Option<&Data>) -> Result<&Table, TransformError> {
    data.map(|d| &**d).ok_or(TransformError::MissingData)
}

fn column<'a>(table: &'a Table, name: &str) -> Result<&'a [Value], TransformError> {
    table
        .column(name)
        .ok_or_else(|| TransformError::MissingColumn(name.into()))
}

fn map_facets(facets: &Facets, f: impl FnMut(&Index) -> Index) -> Facets {
    facets.iter().map(f).collect()
}

fn bin(
    table: &Table,
    facets: &Facets,
    field: &str,
    step: f64,
) -> Result<(Table, Facets), TransformError> {
    if !step.is_finite() || step <= 0.0 {
        return Err(TransformError::InvalidStep(step));
    }
    let col = column(table, field)?;

    let mut starts = Vec::new();
    let mut counts: Vec<f64> = Vec::new();
    let mut out_facets = Vec::with_capacity(facets.len());
    for index in facets.iter() {
        // Bin start -> output row, local to this facet.
        let mut rows: HashMap<OrderedFloat<f64>, usize> = HashMap::new();
        let mut out_index = Vec::new();
        for &i in index {
            let Some(v) = col.get(i).and_then(Value::as_f64).filter(|v| v.is_finite()) else {
                continue;
            };
            let start = floor_f64(v / step) * step;
            let row = *rows.entry(OrderedFloat(start)).or_insert_with(|| {
                starts.push(start);
                counts.push(0.0);
                out_index.push(starts.len() - 1);
                starts.len() - 1
            });
            counts[row] += 1.0;
        }
        out_index.sort_by(|&a, &b| OrderedFloat(starts[a]).cmp(&OrderedFloat(starts[b])));
        out_facets.push(out_index);
    }

    let table = Table::from_columns([
        (BIN_START, starts.iter().map(|&s| Value::Number(s)).collect()),
        (
            BIN_END,
            starts.iter().map(|&s| Value::Number(s + step)).collect(),
        ),
        (BIN_COUNT, counts.into_iter().map(Value::Number).collect()),
    ])
    .map_err(|e| TransformError::Custom(format!("{e}")))?;
    Ok((table, out_facets.into()))
}

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("markplot_transforms requires either the `std` or `libm` feature for floating-point math");

fn floor_f64(x: f64) -> f64 {
    #[cfg(feature = "std")]
    {
        x.floor()
    }
    #[cfg(all(not(feature = "std"), feature = "libm"))]
    {
        libm::floor(x)
    }
    #[cfg(all(not(feature = "std"), not(feature = "libm")))]
    {
        let _ = x;
        unreachable!("compile_error should have prevented this configuration");
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    fn sample() -> Data {
        Table::from_columns([
            (
                "v",
                vec![
                    Value::from(3.7),
                    Value::from(6.2),
                    Value::from(5.9),
                    Value::from(8.0),
                    Value::Null,
                ],
            ),
            (
                "k",
                vec![
                    Value::from("a"),
                    Value::from("b"),
                    Value::from("a"),
                    Value::from("b"),
                    Value::from("a"),
                ],
            ),
        ])
        .unwrap()
        .into_data()
    }

    fn facets(parts: &[&[usize]]) -> Facets {
        parts.iter().map(|p| p.to_vec()).collect()
    }

    #[test]
    fn filter_rewrites_each_facet_and_keeps_data() {
        let data = sample();
        let t = Transform::Filter(Predicate::new("v", CompareOp::Gt, 5.0));
        let (out, fs) = t
            .apply(Some(data.clone()), facets(&[&[0, 2, 4], &[1, 3]]))
            .unwrap();
        assert!(Arc::ptr_eq(&out.unwrap(), &data));
        assert_eq!(&*fs, &[vec![2], vec![1, 3]]);
    }

    #[test]
    fn sort_is_stable_and_respects_order() {
        let t = Transform::Sort {
            by: "k".into(),
            order: SortOrder::Desc,
        };
        let (_, fs) = t.apply(Some(sample()), facets(&[&[0, 1, 2, 3]])).unwrap();
        assert_eq!(fs[0], vec![1, 3, 0, 2]);
    }

    #[test]
    fn sort_puts_rows_past_the_table_last() {
        // Facet indexes borrowed from a longer facet dataset.
        let index: &[usize] = &[7, 2, 0, 5];
        let sorted = |order| {
            let t = Transform::Sort {
                by: "v".into(),
                order,
            };
            let (_, fs) = t.apply(Some(sample()), facets(&[index])).unwrap();
            fs[0].clone()
        };
        assert_eq!(sorted(SortOrder::Asc), vec![0, 2, 7, 5]);
        assert_eq!(sorted(SortOrder::Desc), vec![2, 0, 7, 5]);
    }

    #[test]
    fn missing_column_is_an_error() {
        let t = Transform::Sort {
            by: "nope".into(),
            order: SortOrder::Asc,
        };
        let err = t.apply(Some(sample()), facets(&[&[0]])).unwrap_err();
        assert_eq!(err, TransformError::MissingColumn("nope".into()));
    }

    #[test]
    fn bin_counts_per_facet() {
        let t = Transform::Bin {
            field: "v".into(),
            step: 2.0,
        };
        let (out, fs) = t
            .apply(Some(sample()), facets(&[&[0, 2, 4], &[1, 3]]))
            .unwrap();
        let out = out.unwrap();
        assert_eq!(fs.len(), 2);
        let starts = |f: &Index| -> Vec<f64> {
            f.iter()
                .filter_map(|&i| out.get(i, BIN_START).and_then(Value::as_f64))
                .collect()
        };
        let counts = |f: &Index| -> Vec<f64> {
            f.iter()
                .filter_map(|&i| out.get(i, BIN_COUNT).and_then(Value::as_f64))
                .collect()
        };
        assert_eq!(starts(&fs[0]), vec![2.0, 4.0]);
        assert_eq!(counts(&fs[0]), vec![1.0, 1.0]);
        assert_eq!(starts(&fs[1]), vec![6.0, 8.0]);
        assert_eq!(out.get(fs[1][1], BIN_END), Some(&Value::from(10.0)));
    }

    #[test]
    fn bin_rejects_bad_step() {
        let t = Transform::Bin {
            field: "v".into(),
            step: 0.0,
        };
        assert_eq!(
            t.apply(Some(sample()), facets(&[&[0]])).unwrap_err(),
            TransformError::InvalidStep(0.0)
        );
    }

    #[test]
    fn chain_applies_left_to_right() {
        let t = Transform::Chain(vec![
            Transform::Filter(Predicate::new("k", CompareOp::Eq, "a")),
            Transform::Reverse,
        ]);
        let (_, fs) = t.apply(Some(sample()), facets(&[&[0, 1, 2, 3, 4]])).unwrap();
        assert_eq!(fs[0], vec![4, 2, 0]);
    }

    #[test]
    fn custom_transform_can_replace_data() {
        let t = Transform::custom(|_, facets| {
            let data = Table::from_values([Value::from(1)]).into_data();
            Ok((Some(data), facets.clone()))
        });
        let (out, _) = t.apply(None, facets(&[&[0]])).unwrap();
        assert_eq!(out.unwrap().len(), 1);
    }
}
