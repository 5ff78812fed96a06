// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Channel control for a multi-channel signal generator.
//!
//! A [`ChannelController`] owns the parameter state of one generator output and
//! keeps the hardware in sync with it through the [`HardwareChannel`]
//! capability. Parameter changes arrive as named events (see [`EventTable`]) and
//! a [`Generator`] session routes them to the controller of each channel.

pub mod controller;
pub mod events;
pub mod hardware;
pub mod params;
pub mod recording;
pub mod session;
pub mod settings;
pub mod sim;
pub mod state;

pub use controller::{ChannelController, ControllerOptions};
pub use events::{ChannelEvent, EventTable, ParameterEvent};
pub use hardware::{HardwareChannel, HardwareIoError, HardwareOp, LoadStatus, Overlay};
pub use params::{ControlDescriptor, ControlKind, Parameter};
pub use session::Generator;
pub use settings::{GeneratorSettings, SanitizationChange};
pub use sim::{SimulatedChannel, SimulatedOverlay};
pub use state::{ChannelSnapshot, ChannelState};

pub use siggen_waveform::WaveformShape;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid value {value} for parameter '{parameter}': {reason}")]
    InvalidParameter {
        parameter: Parameter,
        value: String,
        reason: String,
    },

    #[error("Unknown parameter '{0}'")]
    UnknownParameter(String),

    #[error(transparent)]
    HardwareIo(#[from] HardwareIoError),
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    pub fn invalid_parameter(
        parameter: Parameter,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidParameter {
            parameter,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the channel that reported this error keeps accepting events.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::Configuration(_))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
