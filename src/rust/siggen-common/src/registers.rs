// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Register map of the generator overlay.

/// Shared control register holding every channel's reset/start/trigger bits
pub const CTRL: usize = 0x0000;

/// Base address of channel 0's parameter block
pub const CHANNEL_BASE: usize = 0x0100;
/// Address distance between channel parameter blocks
pub const CHANNEL_STRIDE: usize = 0x0040;

/// Parameter registers, relative to the channel block
pub mod channel {
    /// Output amplitude, signed fixed point
    pub const AMPLITUDE: usize = 0x00;
    /// Output offset, signed fixed point
    pub const OFFSET: usize = 0x04;
    /// Phase accumulator increment per clock
    pub const PHASE_STEP: usize = 0x08;
    /// Phase accumulator start offset
    pub const PHASE_OFFSET: usize = 0x0C;
    /// Number of valid samples in the waveform buffer
    pub const TABLE_LEN: usize = 0x10;
}

/// Absolute address of a channel parameter register.
pub const fn channel_register(channel_index: u8, offset: usize) -> usize {
    CHANNEL_BASE + CHANNEL_STRIDE * channel_index as usize + offset
}
