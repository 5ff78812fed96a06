// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Capabilities the controller drives: an overlay that binds channels, and the
//! register-level primitives of one bound channel.

use std::fmt;
use std::ops::RangeInclusive;

use siggen_common::DeviceKind;
use siggen_units::Frequency;
use siggen_waveform::WaveformTable;

use crate::Result;

/// Register-level primitive of a [`HardwareChannel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HardwareOp {
    Reset,
    WaveformTable,
    Amplitude,
    Offset,
    Frequency,
    Phase,
    Start,
    Stop,
    Trigger,
}

impl fmt::Display for HardwareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HardwareOp::Reset => "reset",
            HardwareOp::WaveformTable => "waveform table",
            HardwareOp::Amplitude => "amplitude",
            HardwareOp::Offset => "offset",
            HardwareOp::Frequency => "frequency",
            HardwareOp::Phase => "phase",
            HardwareOp::Start => "start",
            HardwareOp::Stop => "stop",
            HardwareOp::Trigger => "trigger",
        };
        f.write_str(name)
    }
}

/// A failed register write. Not retried by the controller.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Hardware write '{operation}' on channel {channel} failed: {reason}")]
pub struct HardwareIoError {
    pub channel: u8,
    pub operation: HardwareOp,
    pub reason: String,
}

impl HardwareIoError {
    pub fn new(channel: u8, operation: HardwareOp, reason: impl Into<String>) -> Self {
        HardwareIoError {
            channel,
            operation,
            reason: reason.into(),
        }
    }
}

pub type HardwareResult<T = ()> = std::result::Result<T, HardwareIoError>;

/// Register-level primitives of one generator channel.
///
/// Implementations are bound to a single channel index by [`Overlay::configure`]
/// and must only touch that channel's registers and selector bits.
pub trait HardwareChannel {
    fn channel_index(&self) -> u8;

    /// Number of samples the waveform buffer holds.
    fn table_len(&self) -> usize;

    fn frequency_min(&self) -> Frequency;

    fn frequency_max(&self) -> Frequency;

    fn default_frequency(&self) -> Frequency;

    fn frequency_range(&self) -> RangeInclusive<Frequency> {
        self.frequency_min()..=self.frequency_max()
    }

    fn reset(&mut self) -> HardwareResult;

    fn set_waveform_table(&mut self, table: &WaveformTable) -> HardwareResult;

    /// Output amplitude, normalized to [-1, +1].
    fn set_amplitude(&mut self, amplitude: f64) -> HardwareResult;

    /// Output offset, normalized to [-1, +1].
    fn set_offset(&mut self, offset: f64) -> HardwareResult;

    fn set_frequency(&mut self, frequency: Frequency) -> HardwareResult;

    /// Phase in degrees, [0, 360).
    fn set_phase(&mut self, phase: f64) -> HardwareResult;

    fn start(&mut self) -> HardwareResult;

    fn stop(&mut self) -> HardwareResult;

    fn trigger(&mut self) -> HardwareResult;
}

impl<H: HardwareChannel + ?Sized> HardwareChannel for Box<H> {
    fn channel_index(&self) -> u8 {
        (**self).channel_index()
    }

    fn table_len(&self) -> usize {
        (**self).table_len()
    }

    fn frequency_min(&self) -> Frequency {
        (**self).frequency_min()
    }

    fn frequency_max(&self) -> Frequency {
        (**self).frequency_max()
    }

    fn default_frequency(&self) -> Frequency {
        (**self).default_frequency()
    }

    fn reset(&mut self) -> HardwareResult {
        (**self).reset()
    }

    fn set_waveform_table(&mut self, table: &WaveformTable) -> HardwareResult {
        (**self).set_waveform_table(table)
    }

    fn set_amplitude(&mut self, amplitude: f64) -> HardwareResult {
        (**self).set_amplitude(amplitude)
    }

    fn set_offset(&mut self, offset: f64) -> HardwareResult {
        (**self).set_offset(offset)
    }

    fn set_frequency(&mut self, frequency: Frequency) -> HardwareResult {
        (**self).set_frequency(frequency)
    }

    fn set_phase(&mut self, phase: f64) -> HardwareResult {
        (**self).set_phase(phase)
    }

    fn start(&mut self) -> HardwareResult {
        (**self).start()
    }

    fn stop(&mut self) -> HardwareResult {
        (**self).stop()
    }

    fn trigger(&mut self) -> HardwareResult {
        (**self).trigger()
    }
}

/// Outcome of loading the generator bitstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Loaded,
    /// The bitstream was already present; the existing overlay is reused.
    AlreadyLoaded,
}

/// A loaded generator overlay that hands out bound channels.
pub trait Overlay {
    type Channel: HardwareChannel;

    fn device_kind(&self) -> DeviceKind;

    fn load_status(&self) -> LoadStatus;

    /// Bind the channel with the given index.
    ///
    /// Fails with [`crate::Error::Configuration`] if the index is outside the
    /// device's range or already bound.
    fn configure(&self, channel_index: u8) -> Result<Self::Channel>;
}
