// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A mark that is only a render callback.

extern crate alloc;

use alloc::sync::Arc;
use core::fmt;

use markplot_core::Node;

use crate::channel::Values;
use crate::layout::Dimensions;
use crate::mark::{Mark, MarkCore, MarkOptions, RenderFn};
use crate::scales::ScaleFunctions;
use crate::style::StyleDefaults;

/// Wraps a [`RenderFn`]; it has no data and no channels.
pub struct RenderMark {
    core: MarkCore,
    render: Arc<RenderFn>,
}

impl fmt::Debug for RenderMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderMark")
            .field("core", &self.core)
            .field("render", &"..")
            .finish()
    }
}

impl RenderMark {
    /// Wraps `render`.
    pub fn new(render: Arc<RenderFn>) -> Self {
        Self {
            core: MarkCore::without_channels(MarkOptions::new(), &StyleDefaults::filled("render")),
            render,
        }
    }
}

impl Mark for RenderMark {
    fn core(&self) -> &MarkCore {
        &self.core
    }

    fn render(
        &self,
        index: Option<&[usize]>,
        scales: &ScaleFunctions,
        values: &Values,
        dimensions: &Dimensions,
    ) -> Option<Node> {
        (self.render)(index, scales, values, dimensions)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec::Vec;

    use super::*;
    use crate::warnings::Warnings;

    #[test]
    fn delegates_to_the_closure_without_an_index() {
        let mark = RenderMark::new(Arc::new(
            |index: Option<&[usize]>, _: &ScaleFunctions, _: &Values, _: &Dimensions| {
                assert!(index.is_none());
                Some(Node::group().with_attr("aria-label", "custom"))
            },
        ));
        let state = mark.initialize(None, None, &Warnings::new()).unwrap();
        assert!(state.facets.is_none());
        assert!(state.channels.is_empty());
        let node = mark.render(
            state.facets.as_ref().and_then(|f| f.first()).map(Vec::as_slice),
            &ScaleFunctions::new(),
            &Values::default(),
            &Dimensions::default(),
        );
        assert_eq!(node.unwrap().attr("aria-label"), Some("custom"));
    }
}
