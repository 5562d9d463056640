// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Channels: named bindings from a mark's data index to values.
//!
//! A [`ChannelSpec`] is what a mark declares at construction. [`MarkCore::initialize`]
//! resolves every spec against the (transformed) data into a [`Channel`] whose `value` is
//! aligned with the data's row index. The driver then maps each scaled channel through its
//! scale function into [`Values`].
//!
//! [`MarkCore::initialize`]: crate::MarkCore::initialize

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;

use markplot_transforms::{Facets, Index, SortOrder, Table, Value};
use smallvec::SmallVec;

use crate::scales::ScaleFunctions;

/// Reads one value from a row of a table.
pub type Accessor = dyn Fn(&Table, usize) -> Value + Send + Sync;

/// How a channel obtains its values.
#[derive(Clone)]
pub enum ChannelValue {
    /// A named column.
    Field(String),
    /// A column by position; tuple rows store element `i` in column `i`.
    Position(usize),
    /// The row index itself (`0, 1, 2, …`).
    Index,
    /// The whole datum of a single-column table.
    Identity,
    /// The same value for every row.
    Constant(Value),
    /// A pre-materialized sequence, used as given.
    Values(Arc<[Value]>),
    /// A function of the row.
    Accessor(Arc<Accessor>),
}

impl fmt::Debug for ChannelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.debug_tuple("Field").field(name).finish(),
            Self::Position(i) => f.debug_tuple("Position").field(i).finish(),
            Self::Index => f.write_str("Index"),
            Self::Identity => f.write_str("Identity"),
            Self::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            Self::Values(vs) => f.debug_tuple("Values").field(&vs.len()).finish(),
            Self::Accessor(_) => f.write_str("Accessor(..)"),
        }
    }
}

impl ChannelValue {
    /// A named column.
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    /// A pre-materialized sequence.
    pub fn values(values: impl IntoIterator<Item = Value>) -> Self {
        Self::Values(values.into_iter().collect())
    }

    /// A function of the row.
    pub fn accessor(f: impl Fn(&Table, usize) -> Value + Send + Sync + 'static) -> Self {
        Self::Accessor(Arc::new(f))
    }

    /// The default axis label implied by this value: the field name, if any.
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Field(name) => Some(name),
            _ => None,
        }
    }

    /// Resolve against `data` into one value per row.
    ///
    /// Without data only [`ChannelValue::Values`] produce anything.
    pub fn resolve(&self, data: Option<&Table>) -> Vec<Value> {
        let n = data.map_or(0, Table::len);
        match self {
            Self::Values(vs) => vs.to_vec(),
            Self::Index => (0..n).map(|i| Value::Number(i as f64)).collect(),
            Self::Constant(v) => alloc::vec![v.clone(); n],
            Self::Field(name) => column_or_null(data.and_then(|d| d.column(name)), n),
            Self::Position(i) => column_or_null(data.and_then(|d| d.column_at(*i)), n),
            Self::Identity => match data {
                Some(d) => (0..n).map(|i| d.datum(i).cloned().unwrap_or_default()).collect(),
                None => Vec::new(),
            },
            Self::Accessor(f) => match data {
                Some(d) => (0..n).map(|i| f(d, i)).collect(),
                None => Vec::new(),
            },
        }
    }
}

fn column_or_null(column: Option<&[Value]>, n: usize) -> Vec<Value> {
    column.map_or_else(|| alloc::vec![Value::Null; n], <[Value]>::to_vec)
}

impl From<&str> for ChannelValue {
    fn from(name: &str) -> Self {
        Self::Field(name.into())
    }
}

impl From<Value> for ChannelValue {
    fn from(v: Value) -> Self {
        Self::Constant(v)
    }
}

impl From<f64> for ChannelValue {
    fn from(v: f64) -> Self {
        Self::Constant(Value::Number(v))
    }
}

/// Splits tuple rows into `x` (element 0) and `y` (element 1) when neither is given.
pub(crate) fn split_tuple(
    x: Option<ChannelValue>,
    y: Option<ChannelValue>,
) -> (Option<ChannelValue>, Option<ChannelValue>) {
    match (x, y) {
        (None, None) => (
            Some(ChannelValue::Position(0)),
            Some(ChannelValue::Position(1)),
        ),
        other => other,
    }
}

/// Which indices the default [`Mark::filter`](crate::Mark::filter) keeps for a channel.
#[derive(Clone, Default)]
pub enum ChannelFilter {
    /// Keep indices whose scaled value is defined (not null, not `NaN`).
    #[default]
    Defined,
    /// Keep every index.
    None,
    /// Keep indices whose scaled value satisfies the predicate.
    Custom(Arc<dyn Fn(&Value) -> bool + Send + Sync>),
}

impl fmt::Debug for ChannelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Defined => f.write_str("Defined"),
            Self::None => f.write_str("None"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl ChannelFilter {
    /// Returns `true` if `v` passes this filter.
    pub fn accepts(&self, v: &Value) -> bool {
        match self {
            Self::Defined => v.is_defined(),
            Self::None => true,
            Self::Custom(f) => f(v),
        }
    }
}

/// A channel as declared by a mark.
#[derive(Clone, Debug)]
pub struct ChannelSpec {
    /// Channel name, unique within a mark.
    pub name: String,
    /// Value source; `None` is an error unless the channel is optional.
    pub value: Option<ChannelValue>,
    /// Scale this channel is encoded with; `None` means unscaled.
    pub scale: Option<String>,
    /// Drop the channel silently when `value` is `None`.
    pub optional: bool,
    /// Index filter applied to the scaled values.
    pub filter: ChannelFilter,
    /// Ask for a band scale when the scale's type is inferred from discrete values.
    pub band: bool,
}

impl ChannelSpec {
    /// Creates an unscaled, required channel.
    pub fn new(name: impl Into<String>, value: Option<ChannelValue>) -> Self {
        Self {
            name: name.into(),
            value,
            scale: None,
            optional: false,
            filter: ChannelFilter::Defined,
            band: false,
        }
    }

    /// Binds the channel to a scale.
    pub fn with_scale(mut self, scale: impl Into<String>) -> Self {
        self.scale = Some(scale.into());
        self
    }

    /// Marks the channel optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Sets the index filter.
    pub fn with_filter(mut self, filter: ChannelFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Prefers a band scale for discrete values.
    pub fn with_band(mut self) -> Self {
        self.band = true;
        self
    }

    /// Resolves this spec against `data`; `None` if it has no value.
    pub(crate) fn materialize(&self, data: Option<&Table>) -> Option<Channel> {
        let value = self.value.as_ref()?;
        Some(Channel {
            name: self.name.clone(),
            scale: self.scale.clone(),
            filter: self.filter.clone(),
            label: value.label().map(ToString::to_string),
            band: self.band,
            value: value.resolve(data),
        })
    }
}

/// A materialized channel: one value per row of the mark's (transformed) data.
#[derive(Clone, Debug)]
pub struct Channel {
    /// Channel name.
    pub name: String,
    /// Scale name, if scaled.
    pub scale: Option<String>,
    /// Index filter.
    pub filter: ChannelFilter,
    /// Default label for the scale's axis or legend.
    pub label: Option<String>,
    /// Band preference for discrete scale inference.
    pub band: bool,
    /// Raw (unscaled) values.
    pub value: Vec<Value>,
}

impl Channel {
    /// Creates an unscaled channel from values.
    pub fn new(name: impl Into<String>, value: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            scale: None,
            filter: ChannelFilter::Defined,
            label: None,
            band: false,
            value,
        }
    }

    /// Binds the channel to a scale.
    pub fn with_scale(mut self, scale: impl Into<String>) -> Self {
        self.scale = Some(scale.into());
        self
    }
}

/// Channels keyed by name, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct ChannelMap {
    entries: Vec<Channel>,
}

impl ChannelMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a channel by name.
    pub fn get(&self, name: &str) -> Option<&Channel> {
        self.entries.iter().find(|c| c.name == name)
    }

    /// Returns a mutable channel by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Channel> {
        self.entries.iter_mut().find(|c| c.name == name)
    }

    /// Returns `true` if a channel named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Inserts a channel, replacing one with the same name in place.
    pub fn insert(&mut self, channel: Channel) {
        match self.get_mut(&channel.name) {
            Some(slot) => *slot = channel,
            None => self.entries.push(channel),
        }
    }

    /// Inserts every channel of `other`, later names overriding earlier ones.
    pub fn merge(&mut self, other: Self) {
        for channel in other.entries {
            self.insert(channel);
        }
    }

    /// Iterates channels in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Channel> {
        self.entries.iter()
    }

    /// Iterates channels mutably in declaration order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Channel> {
        self.entries.iter_mut()
    }

    /// Channel names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|c| c.name.as_str())
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no channels.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Channel> for ChannelMap {
    fn from_iter<T: IntoIterator<Item = Channel>>(iter: T) -> Self {
        let mut map = Self::new();
        for channel in iter {
            map.insert(channel);
        }
        map
    }
}

/// Scaled channel values, keyed by channel name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Values {
    entries: Vec<(String, Vec<Value>)>,
}

impl Values {
    /// Applies each channel's scale function; unscaled channels (and channels whose scale
    /// does not exist) pass through unchanged.
    pub fn from_channels(channels: &ChannelMap, scales: &ScaleFunctions) -> Self {
        let entries = channels
            .iter()
            .map(|c| {
                let scaled = match c.scale.as_deref().and_then(|s| scales.get(s)) {
                    Some(f) => c.value.iter().map(|v| f.apply(v)).collect(),
                    None => c.value.clone(),
                };
                (c.name.clone(), scaled)
            })
            .collect();
        Self { entries }
    }

    /// Returns the values of a channel.
    pub fn get(&self, name: &str) -> Option<&[Value]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Returns the value of channel `name` at row `i`.
    pub fn value(&self, name: &str, i: usize) -> Option<&Value> {
        self.get(name)?.get(i)
    }

    /// Returns the numeric value of channel `name` at row `i`.
    pub fn number(&self, name: &str, i: usize) -> Option<f64> {
        self.value(name, i)?.as_f64()
    }

    /// Inserts or replaces a channel's values.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<Value>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = values,
            None => self.entries.push((name, values)),
        }
    }
}

/// One key of a mark's sort specification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortKey {
    /// Channel to sort by: one of the mark's channels, or a facet channel (`fx`, `fy`).
    pub channel: String,
    /// Sort order.
    pub order: SortOrder,
}

impl SortKey {
    /// Ascending by `channel`.
    pub fn ascending(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            order: SortOrder::Asc,
        }
    }

    /// Descending by `channel`.
    pub fn descending(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            order: SortOrder::Desc,
        }
    }
}

/// Sort keys in priority order.
pub type SortSpec = SmallVec<[SortKey; 2]>;

/// Stably reorders every facet index by `keys`.
///
/// Keys are compared in priority order; undefined values sort last whatever the order, and
/// full ties keep the given order. Keys naming no channel are skipped.
pub(crate) fn sort_facets(
    facets: &Facets,
    keys: &[SortKey],
    channels: &ChannelMap,
    facet_channels: Option<&ChannelMap>,
) -> Facets {
    let columns: SmallVec<[(&[Value], SortOrder); 2]> = keys
        .iter()
        .filter_map(|k| {
            let channel = channels
                .get(&k.channel)
                .or_else(|| facet_channels.and_then(|f| f.get(&k.channel)))?;
            Some((channel.value.as_slice(), k.order))
        })
        .collect();
    facets
        .iter()
        .map(|index| {
            let mut index: Index = index.clone();
            index.sort_by(|&a, &b| {
                columns
                    .iter()
                    .map(|(values, order)| compare_defined(values.get(a), values.get(b), *order))
                    .find(|o| *o != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
            index
        })
        .collect()
}

fn compare_defined(a: Option<&Value>, b: Option<&Value>, order: SortOrder) -> Ordering {
    let a = a.filter(|v| v.is_defined());
    let b = b.filter(|v| v.is_defined());
    match (a, b) {
        (Some(a), Some(b)) => match order {
            SortOrder::Asc => a.cmp(b),
            SortOrder::Desc => b.cmp(a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    fn tuples() -> Table {
        Table::from_rows([
            vec![Value::from(1), Value::from(2)],
            vec![Value::from(3), Value::from(4)],
        ])
    }

    #[test]
    fn resolve_positions_index_and_constants() {
        let t = tuples();
        assert_eq!(
            ChannelValue::Position(1).resolve(Some(&t)),
            vec![Value::from(2), Value::from(4)]
        );
        assert_eq!(
            ChannelValue::Index.resolve(Some(&t)),
            vec![Value::from(0), Value::from(1)]
        );
        assert_eq!(
            ChannelValue::from(7.0).resolve(Some(&t)),
            vec![Value::from(7.0); 2]
        );
        assert!(ChannelValue::Index.resolve(None).is_empty());
    }

    #[test]
    fn missing_field_resolves_to_nulls() {
        let t = tuples();
        assert_eq!(
            ChannelValue::field("nope").resolve(Some(&t)),
            vec![Value::Null, Value::Null]
        );
    }

    #[test]
    fn accessor_reads_rows() {
        let t = tuples();
        let sum = ChannelValue::accessor(|t, i| {
            let a = t.get(i, "0").and_then(Value::as_f64).unwrap_or(0.0);
            let b = t.get(i, "1").and_then(Value::as_f64).unwrap_or(0.0);
            Value::Number(a + b)
        });
        assert_eq!(sum.resolve(Some(&t)), vec![Value::from(3), Value::from(7)]);
    }

    #[test]
    fn channel_map_insert_replaces_in_place() {
        let mut map: ChannelMap = [
            Channel::new("x", vec![]),
            Channel::new("y", vec![]),
        ]
        .into_iter()
        .collect();
        map.insert(Channel::new("x", vec![Value::from(1)]));
        map.insert(Channel::new("z", vec![]));
        let names: Vec<_> = map.names().collect();
        assert_eq!(names, ["x", "y", "z"]);
        assert_eq!(map.get("x").map(|c| c.value.len()), Some(1));
    }

    #[test]
    fn sort_uses_keys_in_priority_order_and_is_stable() {
        let channels: ChannelMap = [
            Channel::new("a", vec![Value::from(1), Value::from(0), Value::from(1), Value::from(0)]),
            Channel::new(
                "b",
                vec![Value::from(5), Value::from(5), Value::from(2), Value::Null],
            ),
        ]
        .into_iter()
        .collect();
        let facets: Facets = vec![vec![0, 1, 2, 3]].into();
        let sorted = sort_facets(
            &facets,
            &[SortKey::ascending("a"), SortKey::descending("b")],
            &channels,
            None,
        );
        assert_eq!(sorted[0], vec![1, 3, 0, 2]);

        let by_b = sort_facets(&facets, &[SortKey::ascending("b")], &channels, None);
        assert_eq!(by_b[0], vec![2, 0, 1, 3]);
    }

    #[test]
    fn default_filter_rejects_undefined() {
        let f = ChannelFilter::default();
        assert!(f.accepts(&Value::from(1)));
        assert!(!f.accepts(&Value::Number(f64::NAN)));
        assert!(ChannelFilter::None.accepts(&Value::Null));
    }
}
