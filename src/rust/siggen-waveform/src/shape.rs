// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveformShape {
    #[default]
    Sine,
    Square,
    Sawtooth,
}

impl WaveformShape {
    pub const ALL: [WaveformShape; 3] = [
        WaveformShape::Sine,
        WaveformShape::Square,
        WaveformShape::Sawtooth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WaveformShape::Sine => "sine",
            WaveformShape::Square => "square",
            WaveformShape::Sawtooth => "sawtooth",
        }
    }

    /// Whether the duty cycle changes the table of this shape.
    pub fn uses_duty_cycle(&self) -> bool {
        match self {
            WaveformShape::Sine => false,
            WaveformShape::Square | WaveformShape::Sawtooth => true,
        }
    }
}

impl fmt::Display for WaveformShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WaveformShape {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WaveformShape::ALL
            .into_iter()
            .find(|shape| shape.as_str() == s)
            .ok_or_else(|| Error::UnknownShape(s.to_string()))
    }
}
