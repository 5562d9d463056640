// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Non-fatal diagnostics collected during one `plot` call.

use core::cell::Cell;
use core::fmt;

/// A per-call warning counter.
///
/// Each [`Warnings::warn`] logs the message through [`log::warn!`] and bumps the count; the
/// driver reads and resets it once with [`Warnings::consume`].
#[derive(Debug, Default)]
pub struct Warnings {
    count: Cell<usize>,
}

impl Warnings {
    /// Creates an empty counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a warning.
    pub fn warn(&self, message: impl fmt::Display) {
        log::warn!("{message}");
        self.count.set(self.count.get() + 1);
    }

    /// Returns the number of warnings recorded since the last [`Warnings::consume`].
    pub fn count(&self) -> usize {
        self.count.get()
    }

    /// Returns the count and resets it to zero.
    pub fn consume(&self) -> usize {
        self.count.replace(0)
    }
}
