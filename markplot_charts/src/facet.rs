// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Top-level faceting.
//!
//! The facet data is grouped once by its `fx`/`fy` values. Marks then borrow that partition
//! ([`FacetMode::Include`]), its per-group complement ([`FacetMode::Exclude`]) or nothing.
//! Panels are enumerated in scale-domain order, not in group order.

extern crate alloc;

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::OnceCell;

use hashbrown::HashMap;
use markplot_transforms::{Data, Facets, Index, Value};

use crate::channel::{ChannelMap, ChannelSpec};
use crate::mark::FacetMode;
use crate::options::FacetOptions;
use crate::scales::LabelAnchor;

/// The facet values of one panel.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FacetKey {
    /// Faceted along one of `fx` or `fy`.
    One(Value),
    /// Faceted along `fx` (first) and `fy`.
    Two(Value, Value),
}

/// Facet key to group position.
#[derive(Clone, Debug)]
pub(crate) enum FacetMap {
    One(HashMap<Value, usize>),
    Two(HashMap<Value, HashMap<Value, usize>>),
}

impl FacetMap {
    fn new(two: bool) -> Self {
        if two {
            Self::Two(HashMap::new())
        } else {
            Self::One(HashMap::new())
        }
    }

    fn get(&self, key: &FacetKey) -> Option<usize> {
        match (self, key) {
            (Self::One(map), FacetKey::One(k)) => map.get(k).copied(),
            (Self::Two(map), FacetKey::Two(x, y)) => map.get(x)?.get(y).copied(),
            _ => None,
        }
    }

    fn insert(&mut self, key: FacetKey, position: usize) {
        match (self, key) {
            (Self::One(map), FacetKey::One(k)) => {
                map.insert(k, position);
            }
            (Self::Two(map), FacetKey::Two(x, y)) => {
                map.entry(x).or_default().insert(y, position);
            }
            _ => {}
        }
    }
}

/// The partition of the facet data.
#[derive(Debug)]
pub(crate) struct Faceting {
    data: Data,
    channels: ChannelMap,
    keys: Vec<FacetKey>,
    map: FacetMap,
    facets: Facets,
    exclude: OnceCell<Facets>,
}

impl Faceting {
    /// Groups `options.data` by `fx` then `fy`, in first-appearance order. `None` without
    /// any facet binding.
    pub(crate) fn new(options: &FacetOptions) -> Option<Self> {
        if options.x.is_none() && options.y.is_none() {
            return None;
        }
        let data = options.data.clone();
        let channels: ChannelMap = [("fx", &options.x), ("fy", &options.y)]
            .into_iter()
            .filter_map(|(name, value)| {
                ChannelSpec::new(name, value.clone())
                    .with_scale(name)
                    .with_band()
                    .materialize(Some(&data))
            })
            .collect();
        let fx = channels.get("fx").map(|c| c.value.as_slice());
        let fy = channels.get("fy").map(|c| c.value.as_slice());

        let mut map = FacetMap::new(fx.is_some() && fy.is_some());
        let mut keys = Vec::new();
        let mut groups: Vec<Index> = Vec::new();
        for i in 0..data.len() {
            let key = key_of(fx, fy, i);
            let position = match map.get(&key) {
                Some(p) => p,
                None => {
                    map.insert(key.clone(), keys.len());
                    keys.push(key);
                    groups.push(Index::new());
                    keys.len() - 1
                }
            };
            groups[position].push(i);
        }
        log::debug!("faceting {} rows into {} groups", data.len(), keys.len());
        Some(Self {
            data,
            channels,
            keys,
            map,
            facets: groups.into(),
            exclude: OnceCell::new(),
        })
    }

    /// The materialized `fx`/`fy` channels.
    pub(crate) fn channels(&self) -> &ChannelMap {
        &self.channels
    }

    /// Group keys in first-appearance order.
    pub(crate) fn keys(&self) -> &[FacetKey] {
        &self.keys
    }

    /// Group position of `key`.
    pub(crate) fn position(&self, key: &FacetKey) -> Option<usize> {
        self.map.get(key)
    }

    /// The partition, one index per group.
    pub(crate) fn facets(&self) -> &Facets {
        &self.facets
    }

    /// Per-group complements against every row, computed once.
    pub(crate) fn exclude(&self) -> Facets {
        self.exclude
            .get_or_init(|| {
                let n = self.data.len();
                let mut member = alloc::vec![false; n];
                self.facets
                    .iter()
                    .map(|group| {
                        for &i in group {
                            member[i] = true;
                        }
                        let complement: Index = (0..n).filter(|&i| !member[i]).collect();
                        for &i in group {
                            member[i] = false;
                        }
                        complement
                    })
                    .collect()
            })
            .clone()
    }

    /// The facets a mark uses, or `None` if it is not faceted.
    pub(crate) fn resolve(&self, mode: Option<FacetMode>, data: Option<&Data>) -> Option<Facets> {
        match mode? {
            FacetMode::Auto => data
                .is_some_and(|d| Arc::ptr_eq(d, &self.data))
                .then(|| self.facets.clone()),
            FacetMode::Include => Some(self.facets.clone()),
            FacetMode::Exclude => Some(self.exclude()),
        }
    }
}

fn key_of(fx: Option<&[Value]>, fy: Option<&[Value]>, i: usize) -> FacetKey {
    let at = |c: Option<&[Value]>| c.and_then(|c| c.get(i)).cloned().unwrap_or_default();
    match (fx, fy) {
        (Some(_), Some(_)) => FacetKey::Two(at(fx), at(fy)),
        (Some(_), None) => FacetKey::One(at(fx)),
        _ => FacetKey::One(at(fy)),
    }
}

/// Panel keys in scale-domain order: the cross product of the `fx` and `fy` domains.
pub(crate) fn facet_keys(fx: Option<&[Value]>, fy: Option<&[Value]>) -> Vec<FacetKey> {
    match (fx, fy) {
        (Some(xs), Some(ys)) => xs
            .iter()
            .flat_map(|x| ys.iter().map(move |y| FacetKey::Two(x.clone(), y.clone())))
            .collect(),
        (Some(vs), None) | (None, Some(vs)) => vs.iter().cloned().map(FacetKey::One).collect(),
        (None, None) => Vec::new(),
    }
}

/// Which of `len` facet rows (or columns) carries the axis label.
pub(crate) fn label_panel(len: usize, anchor: LabelAnchor, vertical: bool) -> usize {
    let last = len.saturating_sub(1);
    match (anchor, vertical) {
        (LabelAnchor::Bottom, true) | (LabelAnchor::Right, false) => last,
        (LabelAnchor::Center, _) => len >> 1,
        _ => 0,
    }
}

/// The index a mark renders in panel `position`.
///
/// A mark uses its own facet at the panel's group position and falls back to its first
/// facet when it has none there (typically a mark with one facet: not faceted).
pub(crate) fn panel_index(facets: Option<&Facets>, position: usize) -> Option<&[usize]> {
    let facets = facets?;
    Some(
        facets
            .get(position)
            .or_else(|| facets.first())
            .map_or(&[][..], Vec::as_slice),
    )
}
