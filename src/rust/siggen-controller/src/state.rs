// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;
use siggen_common::ChannelMask;
use siggen_units::Frequency;
use siggen_waveform::WaveformShape;

use crate::params::DEFAULT_DUTY;

/// Parameter state of one generator channel.
///
/// Only [`crate::ChannelController`] mutates it. `amplitude` and `offset` are the
/// requested levels; the hardware sees them only while the channel is enabled.
/// The backups keep the levels to restore when a disabled channel is enabled
/// again.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelState {
    pub(crate) channel_index: u8,
    pub(crate) mask: ChannelMask,
    pub(crate) enabled: bool,
    pub(crate) shape: WaveformShape,
    pub(crate) duty: f64,
    pub(crate) amplitude: f64,
    pub(crate) offset: f64,
    pub(crate) backup_amplitude: f64,
    pub(crate) backup_offset: f64,
    pub(crate) frequency: Frequency,
    pub(crate) phase: f64,
}

impl ChannelState {
    pub(crate) fn new(channel_index: u8, mask: ChannelMask, frequency: Frequency) -> Self {
        ChannelState {
            channel_index,
            mask,
            enabled: false,
            shape: WaveformShape::Sine,
            duty: DEFAULT_DUTY,
            amplitude: 0.0,
            offset: 0.0,
            backup_amplitude: 0.0,
            backup_offset: 0.0,
            frequency,
            phase: 0.0,
        }
    }

    pub fn channel_index(&self) -> u8 {
        self.channel_index
    }

    pub fn mask(&self) -> ChannelMask {
        self.mask
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn shape(&self) -> WaveformShape {
        self.shape
    }

    pub fn duty(&self) -> f64 {
        self.duty
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn backup_amplitude(&self) -> f64 {
        self.backup_amplitude
    }

    pub fn backup_offset(&self) -> f64 {
        self.backup_offset
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Amplitude the hardware is driven with; zero while disabled.
    pub fn output_amplitude(&self) -> f64 {
        if self.enabled { self.amplitude } else { 0.0 }
    }

    /// Offset the hardware is driven with; zero while disabled.
    pub fn output_offset(&self) -> f64 {
        if self.enabled { self.offset } else { 0.0 }
    }
}

/// Read-only view of a channel for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSnapshot {
    pub channel: u8,
    pub mask: [u32; 3],
    pub enabled: bool,
    pub waveform: WaveformShape,
    pub duty: f64,
    pub amplitude: f64,
    pub offset: f64,
    pub backup_amplitude: f64,
    pub backup_offset: f64,
    pub output_amplitude: f64,
    pub output_offset: f64,
    pub frequency_hz: f64,
    /// Frequency on the logarithmic UI scale
    pub frequency_log10: f64,
    pub phase: f64,
    pub table_len: usize,
}

impl ChannelSnapshot {
    pub(crate) fn new(state: &ChannelState, table_len: usize) -> Self {
        ChannelSnapshot {
            channel: state.channel_index,
            mask: state.mask.as_array(),
            enabled: state.enabled,
            waveform: state.shape,
            duty: state.duty,
            amplitude: state.amplitude,
            offset: state.offset,
            backup_amplitude: state.backup_amplitude,
            backup_offset: state.backup_offset,
            output_amplitude: state.output_amplitude(),
            output_offset: state.output_offset(),
            frequency_hz: state.frequency.value(),
            frequency_log10: state.frequency.log10(),
            phase: state.phase,
            table_len,
        }
    }
}
