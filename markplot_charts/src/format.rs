// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tick and warning-count formatting.

extern crate alloc;

use alloc::string::{String, ToString};

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

/// Formats a numeric tick with just enough decimals to distinguish multiples of `step`.
pub(crate) fn format_tick_with_step(v: f64, step: f64) -> String {
    if !v.is_finite() {
        return v.to_string();
    }

    let decimals = decimals_for_step(step);
    let v = round_to_decimals(v, decimals);
    // `-0.0`
    let v = if v == 0.0 { 0.0 } else { v };

    if decimals == 0 {
        alloc::format!("{v:.0}")
    } else {
        alloc::format!("{v:.decimals$}")
    }
}

/// Formats a count with comma thousands separators.
pub(crate) fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn decimals_for_step(step: f64) -> usize {
    let step = step.abs();
    if step == 0.0 || !step.is_finite() {
        return 0;
    }

    // Smallest precision that makes `step * 10^d` integral.
    for decimals in 0..=6 {
        let factor = 10_f64.powi(i32::try_from(decimals).unwrap_or(i32::MAX));
        if is_approx_integer(step * factor) {
            return decimals;
        }
    }

    6
}

fn is_approx_integer(x: f64) -> bool {
    if !x.is_finite() {
        return false;
    }
    let nearest = x.round();
    (x - nearest).abs() <= 1e-9 * x.abs().max(1.0)
}

fn round_to_decimals(x: f64, decimals: usize) -> f64 {
    if decimals == 0 {
        return x.round();
    }
    let factor = 10_f64.powi(i32::try_from(decimals.min(9)).unwrap_or(i32::MAX));
    if !factor.is_finite() || factor == 0.0 {
        return x;
    }
    (x * factor).round() / factor
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn formats_integer_steps_without_decimals() {
        assert_eq!(format_tick_with_step(0.0, 2.0), "0");
        assert_eq!(format_tick_with_step(10.0, 2.0), "10");
    }

    #[test]
    fn formats_fractional_steps_consistently() {
        assert_eq!(format_tick_with_step(5.0, 2.5), "5.0");
        assert_eq!(format_tick_with_step(0.25, 0.25), "0.25");
        assert_eq!(format_tick_with_step(-0.0, 0.2), "0.0");
    }

    #[test]
    fn counts_use_thousands_separators() {
        assert_eq!(format_count(7), "7");
        assert_eq!(format_count(1234), "1,234");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }
}
