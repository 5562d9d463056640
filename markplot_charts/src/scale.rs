// Copyright 2025 the Markplot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scale math.
//!
//! These are plain domain-to-range functions with no knowledge of channels or marks. The
//! scale registry ([`crate::scales`]) decides which of them to instantiate for a scale name.

extern crate alloc;

use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use peniko::Color;

use crate::time;

/// A continuous scale instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScaleContinuous {
    /// Linear scale.
    Linear(ScaleLinear),
    /// Log scale.
    Log(ScaleLog),
    /// Time scale over epoch milliseconds.
    Time(ScaleTime),
}

impl ScaleContinuous {
    /// Maps a value from domain space into range space.
    pub fn map(&self, x: f64) -> f64 {
        match self {
            Self::Linear(s) => s.map(x),
            Self::Log(s) => s.map(x),
            Self::Time(s) => s.map(x),
        }
    }

    /// Returns tick values.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        match self {
            Self::Linear(s) => s.ticks(count),
            Self::Log(s) => s.ticks(count),
            Self::Time(s) => s.ticks(count),
        }
    }

    /// Returns the configured domain.
    pub fn domain(&self) -> (f64, f64) {
        match self {
            Self::Linear(s) => s.domain,
            Self::Log(s) => s.domain,
            Self::Time(s) => s.inner.domain,
        }
    }

    /// Returns the configured range.
    pub fn range(&self) -> (f64, f64) {
        match self {
            Self::Linear(s) => s.range,
            Self::Log(s) => s.range,
            Self::Time(s) => s.inner.range,
        }
    }
}

/// A linear mapping from a continuous domain to a continuous range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleLinear {
    domain: (f64, f64),
    range: (f64, f64),
}

impl ScaleLinear {
    /// Creates a new scale mapping `domain` values to `range` values.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Maps a value from domain space into range space.
    pub fn map(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let denom = d1 - d0;
        if denom == 0.0 {
            return (r0 + r1) * 0.5;
        }
        let t = (x - d0) / denom;
        r0 + t * (r1 - r0)
    }

    /// Returns round tick values within the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (lo, hi) = ordered(self.domain);
        linear_ticks(lo, hi, count)
    }
}

fn ordered((a, b): (f64, f64)) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}

/// The tick spacing for `[lo, hi]` at roughly `count` ticks: 1, 2 or 5 times a power of ten.
///
/// Positive values are the step itself; negative values are `-1 / step`, which keeps
/// sub-unit steps exact when ticks are computed as `i / inc`.
fn tick_increment(lo: f64, hi: f64, count: usize) -> f64 {
    const E10: f64 = 7.071_067_811_865_475_5; // sqrt(50)
    const E5: f64 = 3.162_277_660_168_379_5; // sqrt(10)
    const E2: f64 = core::f64::consts::SQRT_2;

    let step = (hi - lo) / count.max(1) as f64;
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }
    let power = step.log10().floor();
    let error = step / 10_f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };
    if power >= 0.0 {
        factor * 10_f64.powf(power)
    } else {
        -(10_f64.powf(-power) / factor)
    }
}

fn linear_ticks(lo: f64, hi: f64, count: usize) -> Vec<f64> {
    if count == 0 || !lo.is_finite() || !hi.is_finite() {
        return Vec::new();
    }
    if lo == hi {
        return alloc::vec![lo];
    }
    let inc = tick_increment(lo, hi, count);
    let (scaled_lo, scaled_hi) = if inc > 0.0 {
        (lo / inc, hi / inc)
    } else if inc < 0.0 {
        (lo * -inc, hi * -inc)
    } else {
        return Vec::new();
    };
    let (first, last) = (scaled_lo.ceil(), scaled_hi.floor());
    if last < first {
        return Vec::new();
    }
    let n = {
        let n = (last - first).min(10_000.0);
        #[allow(clippy::cast_possible_truncation, reason = "non-negative and capped at 10k")]
        {
            n as u64
        }
    };
    (0..=n)
        .map(|i| {
            let k = first + i as f64;
            if inc > 0.0 { k * inc } else { k / -inc }
        })
        .collect()
}

/// Extends `domain` outward to tick-step multiples.
///
/// Widening can change the step, so this repeats until the step settles.
pub fn nice_domain(domain: (f64, f64), tick_count: usize) -> (f64, f64) {
    let reversed = domain.0 > domain.1;
    let (mut lo, mut hi) = ordered(domain);
    if !lo.is_finite() || !hi.is_finite() || tick_count == 0 {
        return domain;
    }
    let mut previous = None;
    for _ in 0..10 {
        let inc = tick_increment(lo, hi, tick_count);
        if inc == 0.0 || previous == Some(inc) {
            break;
        }
        if inc > 0.0 {
            lo = (lo / inc).floor() * inc;
            hi = (hi / inc).ceil() * inc;
        } else {
            lo = (lo * -inc).floor() / -inc;
            hi = (hi * -inc).ceil() / -inc;
        }
        previous = Some(inc);
    }
    if reversed { (hi, lo) } else { (lo, hi) }
}

/// Evenly spaced slots over a range, shared by [`ScaleBand`] and [`ScalePoint`].
///
/// Paddings are fractions of one step. Leftover space is split evenly on both ends.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Slots {
    range: (f64, f64),
    count: usize,
    inner: f64,
    outer: f64,
}

impl Slots {
    fn step(&self) -> f64 {
        let (lo, hi) = ordered(self.range);
        let slots = (self.count as f64 - self.inner + 2.0 * self.outer).max(1.0);
        (hi - lo) / slots
    }

    fn start(&self, index: usize) -> f64 {
        let (lo, hi) = ordered(self.range);
        let step = self.step();
        let used = step * (self.count as f64 - self.inner);
        lo + (hi - lo - used) * 0.5 + step * index as f64
    }
}

/// A discrete band scale: `count` equal bands with padding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleBand {
    slots: Slots,
}

impl ScaleBand {
    /// Creates a band scale covering `count` bands over `range`, with 0.1 padding.
    pub fn new(range: (f64, f64), count: usize) -> Self {
        Self {
            slots: Slots {
                range,
                count,
                inner: 0.1,
                outer: 0.1,
            },
        }
    }

    /// Sets inner padding (clamped to `[0, 1]`) and outer padding, as fractions of a step.
    pub fn with_padding(mut self, inner: f64, outer: f64) -> Self {
        self.slots.inner = inner.clamp(0.0, 1.0);
        self.slots.outer = outer.max(0.0);
        self
    }

    /// Returns the configured range.
    pub fn range(&self) -> (f64, f64) {
        self.slots.range
    }

    /// Returns the computed band width.
    pub fn band_width(&self) -> f64 {
        if self.slots.count == 0 {
            return 0.0;
        }
        self.slots.step() * (1.0 - self.slots.inner)
    }

    /// Returns the start of band `index`, measured from the lower end of the range.
    pub fn x(&self, index: usize) -> f64 {
        self.slots.start(index)
    }
}

/// A discrete point scale: a band scale with zero-width bands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScalePoint {
    slots: Slots,
}

impl ScalePoint {
    /// Creates a point scale with half a step of outer padding.
    pub fn new(range: (f64, f64), count: usize) -> Self {
        Self {
            slots: Slots {
                range,
                count,
                inner: 1.0,
                outer: 0.5,
            },
        }
    }

    /// Sets the outer padding in point steps.
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.slots.outer = padding.max(0.0);
        self
    }

    /// Returns the configured range.
    pub fn range(&self) -> (f64, f64) {
        self.slots.range
    }

    /// Returns the position of point `index`.
    pub fn x(&self, index: usize) -> f64 {
        self.slots.start(index)
    }
}

/// A log-scale mapping from a positive domain to a range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleLog {
    domain: (f64, f64),
    range: (f64, f64),
    base: f64,
}

impl ScaleLog {
    /// Creates a base-10 log scale.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            domain,
            range,
            base: 10.0,
        }
    }

    fn log_base(&self, x: f64) -> f64 {
        x.ln() / self.base.ln()
    }

    /// Maps a value from domain space into range space; non-positive inputs are `NaN`.
    pub fn map(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if x <= 0.0 || d0 <= 0.0 || d1 <= 0.0 {
            return f64::NAN;
        }
        let ld0 = self.log_base(d0);
        let ld1 = self.log_base(d1);
        let denom = ld1 - ld0;
        if denom == 0.0 {
            return r0;
        }
        let t = (self.log_base(x) - ld0) / denom;
        r0 + t * (r1 - r0)
    }

    /// Returns the powers of the base that fall within the domain, capped by `count`.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (min, max) = ordered(self.domain);
        if min <= 0.0 || !min.is_finite() || !max.is_finite() {
            return Vec::new();
        }
        let exponent = |v: f64| {
            let e = v.clamp(f64::from(i32::MIN), f64::from(i32::MAX));
            #[allow(clippy::cast_possible_truncation, reason = "clamped to the i32 range")]
            {
                e as i32
            }
        };
        let min_e = exponent(self.log_base(min).ceil());
        let max_e = exponent(self.log_base(max).floor());
        let mut out = Vec::new();
        for e in min_e..=max_e {
            out.push(self.base.powi(e));
            if count != 0 && out.len() >= count {
                break;
            }
        }
        out
    }
}

/// A time scale: a linear scale over epoch milliseconds with calendar-aware ticks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleTime {
    inner: ScaleLinear,
}

impl ScaleTime {
    /// Creates a new time scale.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            inner: ScaleLinear::new(domain, range),
        }
    }

    /// Maps a timestamp into range space.
    pub fn map(&self, t: f64) -> f64 {
        self.inner.map(t)
    }

    /// Returns tick timestamps at a nice time step.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (lo, hi) = ordered(self.inner.domain);
        time::nice_time_ticks_ms(lo, hi, count)
            .into_iter()
            .filter(|t| *t >= lo && *t <= hi)
            .collect()
    }
}

/// The default categorical palette (Tableau 10).
pub const CATEGORY10: [Color; 10] = [
    Color::from_rgb8(0x4e, 0x79, 0xa7),
    Color::from_rgb8(0xf2, 0x8e, 0x2c),
    Color::from_rgb8(0xe1, 0x57, 0x59),
    Color::from_rgb8(0x76, 0xb7, 0xb2),
    Color::from_rgb8(0x59, 0xa1, 0x4f),
    Color::from_rgb8(0xed, 0xc9, 0x49),
    Color::from_rgb8(0xaf, 0x7a, 0xa1),
    Color::from_rgb8(0xff, 0x9d, 0xa7),
    Color::from_rgb8(0x9c, 0x75, 0x5f),
    Color::from_rgb8(0xba, 0xb0, 0xab),
];

/// The default sequential ramp endpoints.
pub const SEQUENTIAL: [Color; 2] = [
    Color::from_rgb8(0xe8, 0xf1, 0xfa),
    Color::from_rgb8(0x08, 0x30, 0x6b),
];

/// Piecewise-linear interpolation through `colors` at `t` in `[0, 1]` (clamped).
pub fn interpolate_colors(colors: &[Color], t: f64) -> Option<Color> {
    match colors {
        [] => None,
        [only] => Some(*only),
        _ => {
            let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
            let segments = (colors.len() - 1) as f64;
            let pos = t * segments;
            let i = {
                let f = pos.floor().min(segments - 1.0);
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "clamped to the palette length"
                )]
                {
                    f as usize
                }
            };
            let local = pos - i as f64;
            let a = colors[i].to_rgba8();
            let b = colors[i + 1].to_rgba8();
            let mix = |x: u8, y: u8| {
                let v = (f64::from(x) + (f64::from(y) - f64::from(x)) * local).round();
                #[allow(clippy::cast_possible_truncation, reason = "bounded by two u8 values")]
                {
                    v.clamp(0.0, 255.0) as u8
                }
            };
            Some(Color::from_rgba8(
                mix(a.r, b.r),
                mix(a.g, b.g),
                mix(a.b, b.b),
                mix(a.a, b.a),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn point_scale_positions_are_monotonic() {
        let scale = ScalePoint::new((0.0, 100.0), 5);
        assert!(scale.x(0) < scale.x(1));
        assert!(scale.x(1) < scale.x(2));
    }

    #[test]
    fn band_scale_starts_after_outer_padding() {
        let band = ScaleBand::new((0.0, 100.0), 2).with_padding(0.0, 0.0);
        assert_eq!(band.band_width(), 50.0);
        assert_eq!(band.x(1), 50.0);

        // Steps of 90 / (4 - 0.5 + 1) with half a step of inner gap.
        let padded = ScaleBand::new((0.0, 90.0), 4).with_padding(0.5, 0.5);
        assert_eq!(padded.band_width(), 10.0);
        assert_eq!(padded.x(0), 10.0);
        assert_eq!(padded.x(3), 70.0);
    }

    #[test]
    fn single_point_sits_in_the_middle() {
        assert_eq!(ScalePoint::new((0.0, 100.0), 1).x(0), 50.0);
        assert_eq!(ScalePoint::new((0.0, 100.0), 3).with_padding(0.0).x(2), 100.0);
    }

    #[test]
    fn log_scale_maps_endpoints_to_range() {
        let s = ScaleLog::new((1.0, 100.0), (0.0, 10.0));
        assert!((s.map(1.0) - 0.0).abs() < 1e-9);
        assert!((s.map(100.0) - 10.0).abs() < 1e-9);
        assert!(s.map(0.0).is_nan());
        assert_eq!(s.ticks(10), [1.0, 10.0, 100.0]);
    }

    #[test]
    fn nice_domain_extends_to_ticks() {
        assert_eq!(nice_domain((0.3, 9.7), 10), (0.0, 10.0));
        assert_eq!(nice_domain((9.7, 0.3), 10), (10.0, 0.0));
    }

    #[test]
    fn linear_ticks_stay_inside_domain() {
        let s = ScaleLinear::new((0.5, 2.0), (0.0, 1.0));
        let ticks = s.ticks(5);
        assert!(ticks.iter().all(|t| (0.5..=2.0).contains(t)));
        assert!(ticks.contains(&1.0));
    }

    #[test]
    fn color_interpolation_hits_endpoints() {
        let [a, b] = SEQUENTIAL;
        assert_eq!(interpolate_colors(&SEQUENTIAL, 0.0), Some(a));
        assert_eq!(interpolate_colors(&SEQUENTIAL, 1.0), Some(b));
        assert_eq!(interpolate_colors(&[], 0.5), None);
    }
}
