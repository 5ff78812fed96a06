// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use crate::shape::WaveformShape;

/// A synthesized waveform buffer with normalized samples in [-1, +1].
///
/// Samples are shared, so handing a table to the hardware layer or keeping it
/// in the cache does not copy the buffer.
#[derive(Debug, Clone)]
pub struct WaveformTable {
    shape: WaveformShape,
    duty: Option<f64>,
    samples: Arc<[f64]>,
}

impl WaveformTable {
    pub(crate) fn new(shape: WaveformShape, duty: Option<f64>, samples: Vec<f64>) -> Self {
        WaveformTable {
            shape,
            duty,
            samples: samples.into(),
        }
    }

    pub fn shape(&self) -> WaveformShape {
        self.shape
    }

    /// Duty cycle the table was synthesized with, `None` for shapes without one.
    pub fn duty(&self) -> Option<f64> {
        self.duty
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Whether both tables share the same sample buffer.
    pub fn ptr_eq(&self, other: &WaveformTable) -> bool {
        Arc::ptr_eq(&self.samples, &other.samples)
    }
}

impl PartialEq for WaveformTable {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.samples == other.samples
    }
}
