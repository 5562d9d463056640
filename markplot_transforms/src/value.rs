// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dynamically typed datum.

extern crate alloc;

use alloc::string::String;
use alloc::sync::Arc;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};

use chrono::DateTime;
use ordered_float::OrderedFloat;

/// A single datum in a [`Table`](crate::Table).
///
/// Values compare, hash and order by value: numbers use a normalized bit pattern (so `NaN`
/// equals `NaN` and `-0.0` equals `0.0` when used as keys), dates compare by timestamp.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// Missing datum.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A number.
    Number(f64),
    /// A string.
    Text(Arc<str>),
    /// A point in time, in milliseconds since the Unix epoch (UTC).
    Date(i64),
    /// A straight RGBA8 color.
    Color([u8; 4]),
}

impl Value {
    /// Returns `false` for [`Value::Null`] and for `NaN` numbers.
    pub fn is_defined(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Number(n) => !n.is_nan(),
            _ => true,
        }
    }

    /// Numeric view of the value: numbers, dates (milliseconds) and booleans (`0`/`1`).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Date(ms) => Some(*ms as f64),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Returns the string slice for text values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns `true` for text that parses as a finite number, such as `"42"` read from CSV.
    pub fn looks_numeric(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().parse::<f64>().is_ok_and(f64::is_finite),
            _ => false,
        }
    }

    /// Returns `true` for numbers and dates, the values a continuous scale accepts.
    pub fn is_quantitative(&self) -> bool {
        matches!(self, Self::Number(_) | Self::Date(_))
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Number(_) => 2,
            Self::Date(_) => 3,
            Self::Text(_) => 4,
            Self::Color(_) => 5,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => OrderedFloat(*a) == OrderedFloat(*b),
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Color(a), Self::Color(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Self::Null => {}
            Self::Bool(b) => b.hash(state),
            Self::Number(n) => OrderedFloat(*n).hash(state),
            Self::Text(s) => s.hash(state),
            Self::Date(ms) => ms.hash(state),
            Self::Color(c) => c.hash(state),
        }
    }
}

impl Ord for Value {
    /// Values of different kinds order by kind (null, bool, number, date, text, color);
    /// numbers order with `NaN` last.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => OrderedFloat(*a).cmp(&OrderedFloat(*b)),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Color(a), Self::Color(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Date(ms) => match DateTime::from_timestamp_millis(*ms) {
                Some(dt) if *ms % 86_400_000 == 0 => write!(f, "{}", dt.format("%Y-%m-%d")),
                Some(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%SZ")),
                None => write!(f, "{ms}"),
            },
            Self::Color([r, g, b, 255]) => write!(f, "#{r:02x}{g:02x}{b:02x}"),
            Self::Color([r, g, b, a]) => write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}"),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s.into())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;

    use hashbrown::HashSet;

    use super::*;

    #[test]
    fn nan_and_signed_zero_are_equal_keys() {
        let mut set = HashSet::new();
        set.insert(Value::Number(f64::NAN));
        set.insert(Value::Number(f64::NAN));
        set.insert(Value::Number(0.0));
        set.insert(Value::Number(-0.0));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn defined_excludes_null_and_nan() {
        assert!(!Value::Null.is_defined());
        assert!(!Value::Number(f64::NAN).is_defined());
        assert!(Value::Number(0.0).is_defined());
        assert!(Value::from("").is_defined());
    }

    #[test]
    fn total_order_groups_kinds() {
        let mut v = vec![
            Value::from("b"),
            Value::Number(2.0),
            Value::Null,
            Value::from("a"),
            Value::Number(f64::NAN),
            Value::Number(-1.0),
        ];
        v.sort();
        let shown: Vec<_> = v.iter().map(ToString::to_string).collect();
        assert_eq!(shown, ["", "-1", "2", "NaN", "a", "b"]);
    }

    #[test]
    fn numeric_looking_text() {
        assert!(Value::from(" 42 ").looks_numeric());
        assert!(!Value::from("abc").looks_numeric());
        assert!(!Value::from("").looks_numeric());
        assert!(!Value::Number(1.0).looks_numeric());
    }

    #[test]
    fn dates_display_as_iso() {
        assert_eq!(Value::Date(0).to_string(), "1970-01-01");
        assert_eq!(Value::Date(3_600_000).to_string(), "1970-01-01T01:00:00Z");
        assert_eq!(Value::Color([255, 0, 16, 255]).to_string(), "#ff0010");
    }
}
