// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

pub mod fixed;
pub mod frequency;

use std::fmt;
use std::num::Wrapping;

use num_traits::{AsPrimitive, Float, FromPrimitive, PrimInt, Signed};

pub use frequency::{Frequency, hertz};

/// A phase angle represented as a fixed-point fraction of a full turn.
///
/// The full range of the integer type maps to one turn, so the raw value is
/// exactly the phase word a phase accumulator of the same width expects.
/// Arithmetic wraps, which makes out-of-range angles unrepresentable.
///
/// # Type Parameter
/// - `T`: The underlying signed integer type; its width is the phase word width
///
/// # Examples
/// ```rust
/// use siggen_units::Angle32;
///
/// let quarter = Angle32::from_degrees(90.0);
/// assert_eq!(quarter.phase_word(), 1 << 30);
/// let wrapped = Angle32::from_degrees(450.0); // Same as 90°
/// assert_eq!(quarter, wrapped);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Angle<T>(Wrapping<T>)
where
    T: PrimInt + Signed;

impl<T> Angle<T>
where
    T: PrimInt + Signed + 'static,
{
    fn period<F: Float + FromPrimitive>() -> F {
        let bit_size = T::zero().count_zeros();
        F::from_u128(1 << bit_size).unwrap_or_else(F::max_value)
    }

    /// Wrap a fraction of a turn into [-0.5, 0.5).
    fn normalize<F: Float>(turns: F) -> F {
        let normalized = turns.fract();
        if normalized + normalized >= F::one() {
            return normalized - F::one();
        }
        if normalized + normalized < -F::one() {
            return normalized + F::one();
        }
        normalized
    }

    /// Creates an angle from degrees. Any finite value is accepted and wrapped.
    pub fn from_degrees<F>(degrees: F) -> Self
    where
        F: Float + AsPrimitive<T> + FromPrimitive,
    {
        let full_turn = F::from_u16(360).unwrap_or_else(F::one);
        let scaled = Self::normalize(degrees / full_turn) * Self::period();
        Self(Wrapping(scaled.round().as_()))
    }

    /// Returns the angle in degrees within [0, 360).
    pub fn to_degrees<F: Float + FromPrimitive>(self) -> F {
        let full_turn = F::from_u16(360).unwrap_or_else(F::one);
        let value = F::from(self.0.0).unwrap_or_else(F::zero);
        let degrees = value / Self::period::<F>() * full_turn;
        if degrees < F::zero() {
            degrees + full_turn
        } else {
            degrees
        }
    }
}

impl Angle<i32> {
    /// The unsigned 32-bit phase word of this angle (0 = 0°, 2^31 = 180°).
    pub const fn phase_word(self) -> u32 {
        self.0.0 as u32
    }

    pub const fn from_phase_word(word: u32) -> Self {
        Angle(Wrapping(word as i32))
    }
}

impl<T> fmt::Display for Angle<T>
where
    T: PrimInt + Signed + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}°", self.to_degrees::<f64>())
    }
}

pub type Angle32 = Angle<i32>;
