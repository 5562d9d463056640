// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Initializers: channels derived once scales exist.

extern crate alloc;

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use markplot_transforms::{Facets, Value};

use crate::channel::{Channel, ChannelMap};
use crate::mark::{Initializer, Reinitialized};
use crate::scales::ScaleFunctions;
use crate::warnings::Warnings;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

/// Splits the pixel range of `source`'s scale into `buckets` equal slices and adds a
/// `fill` channel, on the `color` scale, holding each element's slice number.
pub fn quantize_fill(source: impl Into<String>, buckets: usize) -> Arc<Initializer> {
    let source = source.into();
    let buckets = buckets.max(1) as f64;
    Arc::new(
        move |_: Option<&Facets>,
              channels: &ChannelMap,
              scales: &ScaleFunctions,
              warnings: &Warnings| {
            let Some(channel) = channels.get(&source) else {
                warnings.warn(format_args!("quantize_fill: no channel named {source}"));
                return Reinitialized::default();
            };
            let Some((scale, (r0, r1))) = channel
                .scale
                .as_deref()
                .and_then(|s| scales.get(s))
                .and_then(|f| Some((f, f.range_extent()?)))
            else {
                return Reinitialized::default();
            };
            let (lo, width) = (r0.min(r1), (r1 - r0).abs() / buckets);
            let fill: Vec<Value> = channel
                .value
                .iter()
                .map(|v| match scale.apply(v).as_f64() {
                    Some(p) if p.is_finite() && width > 0.0 => {
                        Value::Number(((p - lo) / width).floor().clamp(0.0, buckets - 1.0))
                    }
                    _ => Value::Null,
                })
                .collect();
            Reinitialized {
                facets: None,
                channels: Some(
                    [Channel::new("fill", fill).with_scale("color")]
                        .into_iter()
                        .collect(),
                ),
            }
        },
    )
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;
    use crate::scales::{Domain, Range, ScaleDescriptor, ScaleFunction, ScaleType};

    #[test]
    fn buckets_follow_pixel_positions() {
        let descriptor = ScaleDescriptor {
            name: "x".into(),
            kind: ScaleType::Linear,
            domain: Domain::Continuous(0.0, 100.0),
            range: Some(Range::Continuous(0.0, 100.0)),
            label: None,
            label_anchor: None,
            tick_count: None,
            percent: false,
            padding: None,
            legend: false,
        };
        let mut scales = ScaleFunctions::new();
        scales.insert("x".into(), ScaleFunction::new(&descriptor));
        let channels: ChannelMap = [Channel::new(
            "x",
            vec![Value::from(5), Value::from(55), Value::from(100), Value::Null],
        )
        .with_scale("x")]
        .into_iter()
        .collect();

        let f = quantize_fill("x", 2);
        let out = f(None, &channels, &scales, &Warnings::new());
        let fill = out.channels.unwrap();
        let fill = fill.get("fill").unwrap();
        assert_eq!(fill.scale.as_deref(), Some("color"));
        assert_eq!(
            fill.value,
            [Value::from(0), Value::from(1), Value::from(1), Value::Null]
        );
    }

    #[test]
    fn unknown_source_warns() {
        let warnings = Warnings::new();
        let f = quantize_fill("size", 4);
        let out = f(None, &ChannelMap::new(), &ScaleFunctions::new(), &warnings);
        assert!(out.channels.is_none());
        assert_eq!(warnings.count(), 1);
    }
}
