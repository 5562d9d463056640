// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Data model and facet-aware transforms for markplot.
//!
//! This crate provides:
//! - [`Value`], a dynamically typed datum with value equality, hashing and a total order,
//! - [`Table`], an owned columnar table shared as [`Data`] (`Arc<Table>`), and
//! - [`Transform`], which maps `(data, facets)` to `(data', facets')`.
//!
//! Index transforms keep the data and rewrite every facet index; derived transforms build a
//! new table and new per-facet indexes into it.

#![no_std]

extern crate alloc;

mod table;
mod transform;
mod value;

pub use table::{Column, Data, Table, TableError};
pub use transform::{
    BIN_COUNT, BIN_END, BIN_START, CompareOp, CustomTransform, Facets, Index, Predicate,
    SortOrder, Transform, TransformError,
};
pub use value::Value;
