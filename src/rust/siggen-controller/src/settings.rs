// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Settings of a generator session.
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use siggen_common::{ChannelMask, DeviceTraits};
use siggen_units::hertz;

use crate::controller::{ControllerOptions, DEFAULT_CACHE_CAPACITY};
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct SanitizationChange {
    pub field: &'static str,
    pub original: String,
    pub sanitized: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorSettings {
    pub channels: Vec<u8>,
    pub waveform_cache_capacity: usize,
    pub default_frequency_hz: Option<f64>,
    pub diagnostics: bool,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        GeneratorSettings {
            channels: vec![0, 1],
            waveform_cache_capacity: DEFAULT_CACHE_CAPACITY,
            default_frequency_hz: None,
            diagnostics: false,
        }
    }
}

impl GeneratorSettings {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|err| Error::configuration(format!("Invalid generator settings: {err}")))
    }

    /// Correct what can be corrected and reject what cannot for the given device.
    pub fn sanitize(&mut self, traits: &DeviceTraits) -> Result<Vec<SanitizationChange>> {
        let mut changes = vec![];

        let mut seen = HashSet::new();
        for &channel in &self.channels {
            if !seen.insert(channel) {
                return Err(Error::configuration(format!(
                    "Channel {channel} is configured more than once"
                )));
            }
            if !traits.supports_channel(channel) || ChannelMask::for_channel(channel).is_none() {
                return Err(Error::configuration(format!(
                    "Channel {channel} is not available, the device has {} channels",
                    traits.channel_count
                )));
            }
        }
        if !self.channels.is_sorted() {
            let original = format!("{:?}", self.channels);
            self.channels.sort_unstable();
            changes.push(SanitizationChange {
                field: "channels",
                original,
                sanitized: format!("{:?}", self.channels),
                reason: "Channels are opened in ascending order.".to_string(),
            });
        }

        if self.waveform_cache_capacity == 0 {
            changes.push(SanitizationChange {
                field: "waveform_cache_capacity",
                original: "0".to_string(),
                sanitized: "1".to_string(),
                reason: "At least the loaded table is kept.".to_string(),
            });
            self.waveform_cache_capacity = 1;
        }

        let out_of_bounds = self
            .default_frequency_hz
            .filter(|&f| hertz(f).clamp_to_bounds(&traits.frequency_range()).is_none());
        if let Some(frequency) = out_of_bounds {
            return Err(Error::configuration(format!(
                "Default frequency {} is outside [{}, {}]",
                hertz(frequency),
                traits.min_frequency(),
                traits.max_frequency()
            )));
        }
        Ok(changes)
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            cache_capacity: self.waveform_cache_capacity,
            default_frequency: self.default_frequency_hz.map(hertz),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siggen_common::device_traits::{MERCURY_QUAD_TRAITS, MERCURY_TRAITS};

    #[test]
    fn test_defaults_open_both_channels() {
        let mut settings = GeneratorSettings::default();
        assert_eq!(settings.channels, vec![0, 1]);
        assert!(settings.sanitize(&MERCURY_TRAITS).unwrap().is_empty());
    }

    #[test]
    fn test_from_json_partial() {
        let settings = GeneratorSettings::from_json(r#"{"channels": [1]}"#).unwrap();
        assert_eq!(settings.channels, vec![1]);
        assert_eq!(settings.waveform_cache_capacity, DEFAULT_CACHE_CAPACITY);
        assert!(GeneratorSettings::from_json(r#"{"chanels": [1]}"#).is_err());
    }

    #[test]
    fn test_sanitize_corrections() {
        let mut settings = GeneratorSettings {
            channels: vec![3, 0, 2],
            waveform_cache_capacity: 0,
            ..Default::default()
        };
        let changes = settings.sanitize(&MERCURY_QUAD_TRAITS).unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].field, "channels");
        assert_eq!(changes[0].sanitized, "[0, 2, 3]");
        assert_eq!(settings.waveform_cache_capacity, 1);
    }

    #[test]
    fn test_sanitize_rejections() {
        let mut duplicate = GeneratorSettings {
            channels: vec![0, 0],
            ..Default::default()
        };
        assert!(matches!(
            duplicate.sanitize(&MERCURY_TRAITS),
            Err(Error::Configuration(_))
        ));

        let mut out_of_range = GeneratorSettings {
            channels: vec![2],
            ..Default::default()
        };
        assert!(out_of_range.sanitize(&MERCURY_TRAITS).is_err());

        let mut too_fast = GeneratorSettings {
            default_frequency_hz: Some(100e6),
            ..Default::default()
        };
        assert!(too_fast.sanitize(&MERCURY_TRAITS).is_err());
    }
}
