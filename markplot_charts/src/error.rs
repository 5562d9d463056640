// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Configuration errors.

extern crate alloc;

use alloc::string::String;

use markplot_transforms::TransformError;

/// A fatal configuration error. No partial figure is produced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A required channel was declared without a value.
    #[error("missing channel value: {0}")]
    MissingChannelValue(String),
    /// A channel was declared with an empty name.
    #[error("missing channel name")]
    MissingChannelName,
    /// Two channels of one mark share a name.
    #[error("duplicate channel: {0}")]
    DuplicateChannel(String),
    /// A channel uses a reserved name.
    #[error("illegal channel name: {0}")]
    IllegalChannelName(String),
    /// The same mark instance was passed to `plot` twice.
    #[error("duplicate mark")]
    DuplicateMark,
    /// A mark's transform failed.
    #[error(transparent)]
    Transform(#[from] TransformError),
}
