// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Pure table synthesis. Identical inputs always produce identical tables.

use std::f64::consts::TAU;

use crate::shape::WaveformShape;
use crate::table::WaveformTable;

fn phases(len: usize) -> impl Iterator<Item = f64> {
    (0..len).map(move |i| i as f64 / len as f64)
}

/// One period of a sine.
pub fn sine(len: usize) -> WaveformTable {
    let samples = phases(len).map(|phase| (TAU * phase).sin()).collect();
    WaveformTable::new(WaveformShape::Sine, None, samples)
}

/// One period of a rectangle, high for the first `duty` fraction of the period.
pub fn square(duty: f64, len: usize) -> WaveformTable {
    let duty = duty.clamp(0.0, 1.0);
    let samples = phases(len)
        .map(|phase| if phase < duty { 1.0 } else { -1.0 })
        .collect();
    WaveformTable::new(WaveformShape::Square, Some(duty), samples)
}

/// One period of a ramp rising from -1 to +1 during the first `duty` fraction of
/// the period and falling back during the rest. A duty of 0.5 gives a triangle.
pub fn sawtooth(duty: f64, len: usize) -> WaveformTable {
    let duty = duty.clamp(0.0, 1.0);
    let samples = phases(len)
        .map(|phase| {
            if phase < duty {
                -1.0 + 2.0 * phase / duty
            } else {
                1.0 - 2.0 * (phase - duty) / (1.0 - duty)
            }
        })
        .collect();
    WaveformTable::new(WaveformShape::Sawtooth, Some(duty), samples)
}

pub fn synthesize(shape: WaveformShape, duty: f64, len: usize) -> WaveformTable {
    match shape {
        WaveformShape::Sine => sine(len),
        WaveformShape::Square => square(duty, len),
        WaveformShape::Sawtooth => sawtooth(duty, len),
    }
}
