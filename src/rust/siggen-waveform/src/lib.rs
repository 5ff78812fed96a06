// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Waveform tables for the generator's sample buffer.
//!
//! A table is a pure function of `(shape, duty, length)`; [`WaveformCache`]
//! memoizes recently used tables so that sweeping the duty cycle back and forth
//! does not resynthesize the full buffer on every step.

pub mod cache;
pub mod shape;
pub mod synth;
pub mod table;

pub use cache::WaveformCache;
pub use shape::WaveformShape;
pub use synth::{sawtooth, sine, square, synthesize};
pub use table::WaveformTable;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown waveform shape '{0}', expected one of: sine, square, sawtooth")]
    UnknownShape(String),
}
