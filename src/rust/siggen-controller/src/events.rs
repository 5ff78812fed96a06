// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Routing of named parameter-change events to controller operations.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use siggen_waveform::WaveformShape;

use crate::controller::ChannelController;
use crate::hardware::HardwareChannel;
use crate::params::Parameter;
use crate::{Error, Result};

/// A parameter change as delivered by a front-end: the parameter's event name
/// and its new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterEvent {
    pub parameter: String,
    pub value: Value,
}

impl ParameterEvent {
    pub fn new(parameter: impl Into<String>, value: impl Into<Value>) -> Self {
        ParameterEvent {
            parameter: parameter.into(),
            value: value.into(),
        }
    }
}

/// A [`ParameterEvent`] addressed to one channel of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelEvent {
    pub channel: u8,
    #[serde(flatten)]
    pub event: ParameterEvent,
}

pub type Handler<C> = fn(&mut C, &Value) -> Result<()>;

/// Maps event names to handler functions of a target type.
pub struct EventTable<C> {
    handlers: IndexMap<&'static str, Handler<C>>,
}

impl<C> Default for EventTable<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> EventTable<C> {
    pub fn new() -> Self {
        EventTable {
            handlers: IndexMap::new(),
        }
    }

    /// Register `handler` for `name`, returning the handler it replaces.
    pub fn register(&mut self, name: &'static str, handler: Handler<C>) -> Option<Handler<C>> {
        self.handlers.insert(name, handler)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }

    pub fn dispatch(&self, target: &mut C, event: &ParameterEvent) -> Result<()> {
        let handler = self
            .handlers
            .get(event.parameter.as_str())
            .ok_or_else(|| Error::UnknownParameter(event.parameter.clone()))?;
        handler(target, &event.value)
    }
}

fn as_bool(parameter: Parameter, value: &Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| Error::invalid_parameter(parameter, value, "expected a boolean"))
}

fn as_number(parameter: Parameter, value: &Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| Error::invalid_parameter(parameter, value, "expected a number"))
}

fn as_shape(value: &Value) -> Result<WaveformShape> {
    let name = value.as_str().ok_or_else(|| {
        Error::invalid_parameter(Parameter::Waveform, value, "expected a waveform name")
    })?;
    name.parse().map_err(|err: siggen_waveform::Error| {
        Error::invalid_parameter(Parameter::Waveform, value, err.to_string())
    })
}

impl<H: HardwareChannel> EventTable<ChannelController<H>> {
    /// The table of the seven channel parameters.
    pub fn for_channel() -> Self {
        let mut table: Self = EventTable::new();
        table.register(Parameter::Enable.name(), |c, v| {
            c.set_enabled(as_bool(Parameter::Enable, v)?)
        });
        table.register(Parameter::Waveform.name(), |c, v| {
            c.set_waveform_shape(as_shape(v)?)
        });
        table.register(Parameter::Duty.name(), |c, v| {
            c.set_duty_cycle(as_number(Parameter::Duty, v)?)
        });
        table.register(Parameter::Amplitude.name(), |c, v| {
            c.set_amplitude(as_number(Parameter::Amplitude, v)?)
        });
        table.register(Parameter::Offset.name(), |c, v| {
            c.set_offset(as_number(Parameter::Offset, v)?)
        });
        table.register(Parameter::Frequency.name(), |c, v| {
            c.set_frequency(as_number(Parameter::Frequency, v)?)
        });
        table.register(Parameter::Phase.name(), |c, v| {
            c.set_phase(as_number(Parameter::Phase, v)?)
        });
        table
    }
}
