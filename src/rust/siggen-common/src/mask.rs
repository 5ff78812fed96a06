// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Per-channel selector bits in the shared control register.

/// Bit distance between the selector groups of neighbouring channels.
pub const MASK_STRIDE: u32 = 5;

/// The selector bits reserved for one channel.
///
/// Channel `i` owns `{0x1, 0x2, 0x4} << 5 * i`; the groups of distinct channels
/// never share a bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelMask {
    pub reset: u32,
    pub start: u32,
    pub trigger: u32,
}

impl ChannelMask {
    /// Highest channel index whose selector bits fit the 32-bit control register.
    pub const MAX_CHANNEL: u8 = 5;

    /// Returns `None` if the channel's bits do not fit the control register.
    pub const fn for_channel(channel_index: u8) -> Option<Self> {
        if channel_index > Self::MAX_CHANNEL {
            return None;
        }
        let shift = MASK_STRIDE * channel_index as u32;
        Some(ChannelMask {
            reset: 0x1 << shift,
            start: 0x2 << shift,
            trigger: 0x4 << shift,
        })
    }

    pub const fn bits(&self) -> u32 {
        self.reset | self.start | self.trigger
    }

    pub const fn as_array(&self) -> [u32; 3] {
        [self.reset, self.start, self.trigger]
    }

    pub const fn overlaps(&self, other: &ChannelMask) -> bool {
        self.bits() & other.bits() != 0
    }
}
