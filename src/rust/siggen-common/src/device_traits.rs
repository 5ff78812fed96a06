// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::ops::RangeInclusive;

use crate::types::DeviceKind;
use siggen_units::{Frequency, hertz};

/// Hardware properties of a generator overlay.
pub struct DeviceTraits {
    pub channel_count: u8,
    pub sampling_rate: f64,
    /// Number of samples in a channel's waveform buffer
    pub table_len: usize,
    /// Width of the signed amplitude, offset and sample words
    pub amplitude_bits: u32,
    /// Fractional bits of the phase accumulator below one table sample
    pub frequency_fraction_bits: u32,
}

impl DeviceTraits {
    pub fn from_device_kind(kind: &DeviceKind) -> &'static Self {
        match kind {
            DeviceKind::Mercury => &MERCURY_TRAITS,
            DeviceKind::MercuryQuad => &MERCURY_QUAD_TRAITS,
        }
    }

    /// Frequency at which the waveform buffer is played back one sample per clock.
    pub fn frequency_one(&self) -> Frequency {
        hertz(self.sampling_rate / self.table_len as f64)
    }

    pub fn min_frequency(&self) -> Frequency {
        let resolution = (1u64 << self.frequency_fraction_bits) as f64;
        hertz(self.frequency_one().value() / resolution)
    }

    pub fn max_frequency(&self) -> Frequency {
        hertz(self.sampling_rate / 2.0)
    }

    pub fn frequency_range(&self) -> RangeInclusive<Frequency> {
        self.min_frequency()..=self.max_frequency()
    }

    pub fn default_frequency(&self) -> Frequency {
        self.frequency_one()
    }

    pub fn supports_channel(&self, channel_index: u8) -> bool {
        channel_index < self.channel_count
    }
}

pub const MERCURY_TRAITS: DeviceTraits = DeviceTraits {
    channel_count: 2,
    sampling_rate: 125e6,
    table_len: 1 << 14,
    amplitude_bits: 14,
    frequency_fraction_bits: 16,
};

pub const MERCURY_QUAD_TRAITS: DeviceTraits = DeviceTraits {
    channel_count: 4,
    sampling_rate: 125e6,
    table_len: 1 << 14,
    amplitude_bits: 14,
    frequency_fraction_bits: 16,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mercury_frequency_bounds() {
        let traits = DeviceKind::Mercury.traits();
        assert_eq!(traits.frequency_one(), hertz(7629.39453125));
        assert_eq!(traits.max_frequency(), hertz(62.5e6));
        assert!(traits.min_frequency() < hertz(0.2));
        assert!(traits.frequency_range().contains(&traits.default_frequency()));
    }

    #[test]
    fn test_channel_support() {
        assert!(MERCURY_TRAITS.supports_channel(1));
        assert!(!MERCURY_TRAITS.supports_channel(2));
        assert!(MERCURY_QUAD_TRAITS.supports_channel(3));
    }
}
