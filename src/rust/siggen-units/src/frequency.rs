// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::ops::RangeInclusive;

/// Relative tolerance applied when comparing a frequency against a bound.
///
/// A value entered on the logarithmic scale goes through `10^v`, which does
/// not reproduce a bound bit-for-bit even when `v` is exactly `log10(bound)`.
pub const BOUND_TOLERANCE: f64 = 1e-9;

/// A frequency in hertz.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Frequency(f64);

pub const fn hertz(value: f64) -> Frequency {
    Frequency(value)
}

impl Frequency {
    /// Frequency from its value on the logarithmic (UI) scale, `10^v` hertz.
    pub fn from_log10(v: f64) -> Self {
        Frequency(10f64.powf(v))
    }

    pub const fn value(self) -> f64 {
        self.0
    }

    /// Value on the logarithmic (UI) scale.
    pub fn log10(self) -> f64 {
        self.0.log10()
    }

    /// Check this frequency against `range`, snapping to a bound it matches within
    /// [`BOUND_TOLERANCE`]. Returns `None` when the frequency lies outside the range.
    pub fn clamp_to_bounds(self, range: &RangeInclusive<Frequency>) -> Option<Frequency> {
        if !self.0.is_finite() || self.0 <= 0.0 {
            return None;
        }
        let (min, max) = (range.start().0, range.end().0);
        if (self.0 - min).abs() <= min * BOUND_TOLERANCE {
            return Some(Frequency(min));
        }
        if (self.0 - max).abs() <= max * BOUND_TOLERANCE {
            return Some(Frequency(max));
        }
        range.contains(&self).then_some(self)
    }
}

pub(crate) fn round_to_significant_digits(x: f64, n: u32) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        let order = x.abs().log10().floor();
        let scale = 10f64.powf((n as f64) - 1.0 - order);
        (x * scale).round() / scale
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.0;
        if !value.is_finite() {
            return write!(f, "{value} Hz");
        }
        let (scaled, prefix) = match value.abs() {
            v if v >= 1e6 => (value / 1e6, "M"),
            v if v >= 1e3 => (value / 1e3, "k"),
            v if v >= 1.0 || v == 0.0 => (value, ""),
            _ => (value * 1e3, "m"),
        };
        write!(f, "{} {prefix}Hz", round_to_significant_digits(scaled, 6))
    }
}
