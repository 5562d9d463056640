// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time tick generation and formatting.
//!
//! Time is an `f64` of epoch **milliseconds** (the same unit as
//! [`Value::Date`](markplot_transforms::Value::Date)). Steps run from one second to one
//! year; month and year steps are approximated by fixed durations and snapped to UTC
//! midnight.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use chrono::DateTime;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

const SECOND: f64 = 1_000.0;
const MINUTE: f64 = 60.0 * SECOND;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;
const MONTH: f64 = 30.0 * DAY;
const YEAR: f64 = 365.0 * DAY;

const STEPS: &[f64] = &[
    SECOND,
    5.0 * SECOND,
    15.0 * SECOND,
    30.0 * SECOND,
    MINUTE,
    5.0 * MINUTE,
    15.0 * MINUTE,
    30.0 * MINUTE,
    HOUR,
    3.0 * HOUR,
    6.0 * HOUR,
    12.0 * HOUR,
    DAY,
    2.0 * DAY,
    7.0 * DAY,
    MONTH,
    3.0 * MONTH,
    YEAR,
];

/// Returns tick timestamps covering `[min, max]` at roughly `count` intervals.
pub fn nice_time_ticks_ms(mut min: f64, mut max: f64, count: usize) -> Vec<f64> {
    if count == 0 || !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    if min == max {
        return alloc::vec![min];
    }
    if min > max {
        core::mem::swap(&mut min, &mut max);
    }

    let step = nice_time_step_ms((max - min) / count as f64);
    if step == 0.0 {
        return alloc::vec![min, max];
    }

    let start = (min / step).ceil() * step;
    let n_f = ((max - start) / step).floor();
    let n = if n_f.is_finite() && n_f >= 0.0 {
        let n_f = n_f.min(10_000.0);
        #[allow(
            clippy::cast_possible_truncation,
            reason = "guarded by finite/non-negative checks and capped at 10k"
        )]
        {
            n_f as u64
        }
    } else {
        0
    };
    (0..=n).map(|i| start + step * i as f64).collect()
}

/// Returns the smallest time step at least `step` milliseconds long.
pub fn nice_time_step_ms(step: f64) -> f64 {
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }
    for &s in STEPS {
        if s >= step {
            return s;
        }
    }
    (step / YEAR).ceil().max(1.0) * YEAR
}

/// Formats a timestamp for a tick whose spacing is `step` milliseconds.
///
/// Sub-day steps show the time of day, day and month steps show the date, year steps show
/// only the year.
pub fn format_time_ms(t: f64, step: f64) -> String {
    if !t.is_finite() {
        return alloc::format!("{t}");
    }
    let ms = {
        let f = t.round().clamp(i64::MIN as f64, i64::MAX as f64);
        #[allow(clippy::cast_possible_truncation, reason = "clamped to the i64 range")]
        {
            f as i64
        }
    };
    let Some(dt) = DateTime::from_timestamp_millis(ms) else {
        return alloc::format!("{t}");
    };
    let step = step.abs();
    let pattern = if step >= YEAR {
        "%Y"
    } else if step >= MONTH {
        "%Y-%m"
    } else if step >= DAY {
        "%Y-%m-%d"
    } else if step >= MINUTE {
        "%H:%M"
    } else {
        "%H:%M:%S"
    };
    alloc::format!("{}", dt.format(pattern))
}
