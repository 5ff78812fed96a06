// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! The seven channel parameters, their accepted ranges and the control
//! descriptors a front-end builds its widgets from.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use siggen_units::Frequency;
use siggen_waveform::WaveformShape;

use crate::{Error, Result};

pub const DUTY_RANGE: RangeInclusive<f64> = 0.0..=1.0;
pub const DUTY_STEP: f64 = 0.01;
pub const DEFAULT_DUTY: f64 = 0.5;

/// Range of both amplitude and offset.
pub const LEVEL_RANGE: RangeInclusive<f64> = -1.0..=1.0;
pub const LEVEL_STEP: f64 = 0.02;

/// Phase is accepted in [0, 360) degrees.
pub const PHASE_PERIOD: f64 = 360.0;
pub const PHASE_STEP: f64 = 1.0;

/// Slider step on the logarithmic frequency scale.
pub const FREQUENCY_LOG_STEP: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parameter {
    Enable,
    Waveform,
    Duty,
    Amplitude,
    Offset,
    Frequency,
    Phase,
}

impl Parameter {
    pub const ALL: [Parameter; 7] = [
        Parameter::Enable,
        Parameter::Waveform,
        Parameter::Duty,
        Parameter::Amplitude,
        Parameter::Offset,
        Parameter::Frequency,
        Parameter::Phase,
    ];

    /// Event name of the parameter.
    pub fn name(&self) -> &'static str {
        match self {
            Parameter::Enable => "enable",
            Parameter::Waveform => "waveform",
            Parameter::Duty => "duty",
            Parameter::Amplitude => "amplitude",
            Parameter::Offset => "offset",
            Parameter::Frequency => "frequency",
            Parameter::Phase => "phase",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Parameter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Parameter::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| Error::UnknownParameter(s.to_string()))
    }
}

/// Reject non-finite values and values outside `range`.
pub(crate) fn check_range(
    parameter: Parameter,
    value: f64,
    range: &RangeInclusive<f64>,
) -> Result<f64> {
    if !value.is_finite() {
        return Err(Error::invalid_parameter(parameter, value, "not a finite number"));
    }
    if !range.contains(&value) {
        return Err(Error::invalid_parameter(
            parameter,
            value,
            format!("outside [{}, {}]", range.start(), range.end()),
        ));
    }
    Ok(value)
}

pub(crate) fn check_phase(phase: f64) -> Result<f64> {
    if !phase.is_finite() {
        return Err(Error::invalid_parameter(Parameter::Phase, phase, "not a finite number"));
    }
    if !(0.0..PHASE_PERIOD).contains(&phase) {
        return Err(Error::invalid_parameter(
            Parameter::Phase,
            phase,
            format!("outside [0, {PHASE_PERIOD})"),
        ));
    }
    Ok(phase)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ControlKind {
    Toggle {
        default: bool,
    },
    Choice {
        options: Vec<WaveformShape>,
        default: WaveformShape,
    },
    Slider {
        min: f64,
        max: f64,
        step: f64,
        default: f64,
    },
}

/// How a front-end should present one parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlDescriptor {
    pub parameter: Parameter,
    #[serde(flatten)]
    pub kind: ControlKind,
}

/// Descriptors for all parameters, in event-table order.
///
/// The frequency slider works on the logarithmic scale, so its bounds are the
/// base-10 logarithms of the hardware bounds.
pub fn control_descriptors(
    frequency_range: &RangeInclusive<Frequency>,
    default_frequency: Frequency,
) -> Vec<ControlDescriptor> {
    Parameter::ALL
        .into_iter()
        .map(|parameter| {
            let kind = match parameter {
                Parameter::Enable => ControlKind::Toggle { default: false },
                Parameter::Waveform => ControlKind::Choice {
                    options: WaveformShape::ALL.to_vec(),
                    default: WaveformShape::default(),
                },
                Parameter::Duty => ControlKind::Slider {
                    min: *DUTY_RANGE.start(),
                    max: *DUTY_RANGE.end(),
                    step: DUTY_STEP,
                    default: DEFAULT_DUTY,
                },
                Parameter::Amplitude | Parameter::Offset => ControlKind::Slider {
                    min: *LEVEL_RANGE.start(),
                    max: *LEVEL_RANGE.end(),
                    step: LEVEL_STEP,
                    default: 0.0,
                },
                Parameter::Frequency => ControlKind::Slider {
                    min: frequency_range.start().log10(),
                    max: frequency_range.end().log10(),
                    step: FREQUENCY_LOG_STEP,
                    default: default_frequency.log10(),
                },
                Parameter::Phase => ControlKind::Slider {
                    min: 0.0,
                    max: PHASE_PERIOD,
                    step: PHASE_STEP,
                    default: 0.0,
                },
            };
            ControlDescriptor { parameter, kind }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use siggen_units::hertz;

    #[test]
    fn test_parameter_names() {
        for parameter in Parameter::ALL {
            assert_eq!(parameter.name().parse::<Parameter>().unwrap(), parameter);
        }
        assert!(matches!(
            "volume".parse::<Parameter>(),
            Err(Error::UnknownParameter(name)) if name == "volume"
        ));
    }

    #[test]
    fn test_check_range() {
        assert_eq!(check_range(Parameter::Duty, 1.0, &DUTY_RANGE).unwrap(), 1.0);
        assert!(check_range(Parameter::Duty, 1.01, &DUTY_RANGE).is_err());
        assert!(check_range(Parameter::Amplitude, f64::NAN, &LEVEL_RANGE).is_err());
    }

    #[test]
    fn test_phase_is_half_open() {
        assert!(check_phase(0.0).is_ok());
        assert!(check_phase(359.9).is_ok());
        assert!(check_phase(360.0).is_err());
        assert!(check_phase(-1.0).is_err());
    }

    #[test]
    fn test_descriptors_serialize() {
        let descriptors = control_descriptors(&(hertz(0.1)..=hertz(1e6)), hertz(1e3));
        assert_eq!(descriptors.len(), Parameter::ALL.len());
        let json = serde_json::to_value(&descriptors[2]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "parameter": "duty",
                "kind": "slider",
                "min": 0.0,
                "max": 1.0,
                "step": 0.01,
                "default": 0.5,
            })
        );
        let json = serde_json::to_value(&descriptors[1]).unwrap();
        assert_eq!(json["options"], serde_json::json!(["sine", "square", "sawtooth"]));
        match descriptors[5].kind {
            ControlKind::Slider { min, max, default, .. } => {
                assert!((min + 1.0).abs() < 1e-12);
                assert!((max - 6.0).abs() < 1e-12);
                assert!((default - 3.0).abs() < 1e-12);
            }
            _ => panic!("frequency must be a slider"),
        }
    }
}
