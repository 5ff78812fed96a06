// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use siggen_common::ChannelMask;
use siggen_units::Frequency;
use siggen_waveform::{WaveformCache, WaveformShape, WaveformTable};

use crate::hardware::HardwareChannel;
use crate::params::{DUTY_RANGE, LEVEL_RANGE, Parameter, check_phase, check_range};
use crate::state::{ChannelSnapshot, ChannelState};
use crate::{Error, Result};

pub const DEFAULT_CACHE_CAPACITY: usize = 8;

#[derive(Debug, Clone, Default)]
pub struct ControllerOptions {
    /// Number of waveform tables memoized per channel. Zero uses the default.
    pub cache_capacity: usize,
    /// Start-up frequency, the hardware default if unset.
    pub default_frequency: Option<Frequency>,
}

/// Owner of one generator channel.
///
/// Every operation updates [`ChannelState`] first and then writes the affected
/// registers. A failed write is returned to the caller but the state keeps the
/// requested value, so repeating the operation resends it.
///
/// Dropping the controller silences and stops the channel before the hardware
/// capability is released.
pub struct ChannelController<H: HardwareChannel> {
    state: ChannelState,
    table: WaveformTable,
    cache: WaveformCache,
    hardware: H,
    shut_down: bool,
}

impl<H: HardwareChannel> ChannelController<H> {
    pub fn new(channel_index: u8, hardware: H) -> Result<Self> {
        Self::with_options(channel_index, hardware, &ControllerOptions::default())
    }

    /// Take ownership of `hardware` and bring the channel into its silent
    /// default state: disabled sine output with zero amplitude and offset,
    /// started and triggered.
    pub fn with_options(
        channel_index: u8,
        hardware: H,
        options: &ControllerOptions,
    ) -> Result<Self> {
        if hardware.channel_index() != channel_index {
            return Err(Error::configuration(format!(
                "Hardware channel {} cannot be driven as channel {channel_index}",
                hardware.channel_index()
            )));
        }
        let mask = ChannelMask::for_channel(channel_index).ok_or_else(|| {
            Error::configuration(format!(
                "Channel {channel_index} has no selector bits in the control register"
            ))
        })?;
        let frequency = match options.default_frequency {
            Some(frequency) => frequency
                .clamp_to_bounds(&hardware.frequency_range())
                .ok_or_else(|| {
                    Error::configuration(format!(
                        "Default frequency {frequency} is outside [{}, {}]",
                        hardware.frequency_min(),
                        hardware.frequency_max()
                    ))
                })?,
            None => hardware.default_frequency(),
        };
        let capacity = match options.cache_capacity {
            0 => DEFAULT_CACHE_CAPACITY,
            capacity => capacity,
        };

        let state = ChannelState::new(channel_index, mask, frequency);
        let mut cache = WaveformCache::new(hardware.table_len(), capacity);
        let table = cache.get_or_synthesize(state.shape, state.duty);
        let mut controller = ChannelController {
            state,
            table,
            cache,
            hardware,
            shut_down: false,
        };
        // On failure the controller is dropped here, which silences the channel again.
        controller.initialize_hardware()?;
        siggen_log::info!(
            "Channel {} ready: {} at {}",
            channel_index,
            controller.state.shape,
            controller.state.frequency
        );
        Ok(controller)
    }

    fn initialize_hardware(&mut self) -> Result<()> {
        self.hardware.reset()?;
        self.hardware.set_waveform_table(&self.table)?;
        self.push_output()?;
        self.hardware.set_frequency(self.state.frequency)?;
        self.hardware.set_phase(self.state.phase)?;
        self.hardware.start()?;
        self.hardware.trigger()?;
        Ok(())
    }

    pub fn channel_index(&self) -> u8 {
        self.state.channel_index
    }

    pub fn state(&self) -> &ChannelState {
        &self.state
    }

    pub fn snapshot(&self) -> ChannelSnapshot {
        ChannelSnapshot::new(&self.state, self.table.len())
    }

    /// Table currently loaded into the waveform buffer.
    pub fn waveform_table(&self) -> &WaveformTable {
        &self.table
    }

    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    /// Enable or disable the output.
    ///
    /// Disabling saves the current levels as backups and drives the hardware
    /// to zero; enabling restores the backups. Repeating the current state
    /// rewrites the output levels without touching the backups.
    pub fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        if enabled != self.state.enabled {
            if enabled {
                self.state.amplitude = self.state.backup_amplitude;
                self.state.offset = self.state.backup_offset;
            } else {
                self.state.backup_amplitude = self.state.amplitude;
                self.state.backup_offset = self.state.offset;
            }
            self.state.enabled = enabled;
            siggen_log::info!(
                "Channel {} output {}",
                self.state.channel_index,
                if enabled { "enabled" } else { "disabled" }
            );
        }
        self.push_output()
    }

    pub fn set_waveform_shape(&mut self, shape: WaveformShape) -> Result<()> {
        self.state.shape = shape;
        self.refresh_table()
    }

    /// The duty cycle does not change a sine table; the unchanged table is
    /// still written.
    pub fn set_duty_cycle(&mut self, duty: f64) -> Result<()> {
        let duty = self.validate(check_range(Parameter::Duty, duty, &DUTY_RANGE))?;
        self.state.duty = duty;
        self.refresh_table()
    }

    /// While disabled the new amplitude is only stored; it becomes the level
    /// restored on the next enable and the hardware stays at zero.
    pub fn set_amplitude(&mut self, amplitude: f64) -> Result<()> {
        let amplitude = self.validate(check_range(Parameter::Amplitude, amplitude, &LEVEL_RANGE))?;
        self.state.amplitude = amplitude;
        if self.state.enabled {
            self.hardware.set_amplitude(amplitude)?;
        } else {
            self.state.backup_amplitude = amplitude;
        }
        Ok(())
    }

    pub fn set_offset(&mut self, offset: f64) -> Result<()> {
        let offset = self.validate(check_range(Parameter::Offset, offset, &LEVEL_RANGE))?;
        self.state.offset = offset;
        if self.state.enabled {
            self.hardware.set_offset(offset)?;
        } else {
            self.state.backup_offset = offset;
        }
        Ok(())
    }

    /// Set the frequency from its logarithmic UI value `v`, i.e. to `10^v` Hz.
    pub fn set_frequency(&mut self, v: f64) -> Result<()> {
        if !v.is_finite() {
            return self.validate(Err(Error::invalid_parameter(
                Parameter::Frequency,
                v,
                "not a finite number",
            )));
        }
        self.apply_frequency(Frequency::from_log10(v), v)
    }

    /// Set the frequency from a linear value in hertz.
    pub fn set_frequency_hz(&mut self, hertz: f64) -> Result<()> {
        self.apply_frequency(siggen_units::hertz(hertz), hertz)
    }

    fn apply_frequency(&mut self, frequency: Frequency, requested: f64) -> Result<()> {
        let range = self.hardware.frequency_range();
        let frequency = match frequency.clamp_to_bounds(&range) {
            Some(frequency) => frequency,
            None => {
                return self.validate(Err(Error::invalid_parameter(
                    Parameter::Frequency,
                    requested,
                    format!("{frequency} is outside [{}, {}]", range.start(), range.end()),
                )));
            }
        };
        self.state.frequency = frequency;
        self.hardware.set_frequency(frequency)?;
        Ok(())
    }

    /// Phase in degrees, [0, 360).
    pub fn set_phase(&mut self, phase: f64) -> Result<()> {
        let phase = self.validate(check_phase(phase))?;
        self.state.phase = phase;
        self.hardware.set_phase(phase)?;
        Ok(())
    }

    /// Silence and stop the channel, reporting a failed write.
    ///
    /// Dropping the controller does the same but can only log failures.
    pub fn shutdown(mut self) -> Result<()> {
        self.shut_down = true;
        self.silence()
    }

    fn silence(&mut self) -> Result<()> {
        if self.state.enabled {
            self.state.backup_amplitude = self.state.amplitude;
            self.state.backup_offset = self.state.offset;
            self.state.enabled = false;
        }
        self.push_output()?;
        self.hardware.stop()?;
        siggen_log::info!("Channel {} shut down", self.state.channel_index);
        Ok(())
    }

    /// Write the hardware-visible levels.
    fn push_output(&mut self) -> Result<()> {
        self.hardware.set_amplitude(self.state.output_amplitude())?;
        self.hardware.set_offset(self.state.output_offset())?;
        Ok(())
    }

    fn refresh_table(&mut self) -> Result<()> {
        self.table = self
            .cache
            .get_or_synthesize(self.state.shape, self.state.duty);
        siggen_log::diagnostic!(
            "Channel {}: loading {} table (duty {})",
            self.state.channel_index,
            self.state.shape,
            self.state.duty
        );
        self.hardware.set_waveform_table(&self.table)?;
        Ok(())
    }

    fn validate<T>(&self, checked: Result<T>) -> Result<T> {
        if let Err(err) = &checked {
            siggen_log::warn!("Channel {}: {}", self.state.channel_index, err);
        }
        checked
    }
}

impl<H: HardwareChannel> Drop for ChannelController<H> {
    fn drop(&mut self) {
        if self.shut_down {
            return;
        }
        if let Err(err) = self.silence() {
            siggen_log::warn!(
                "Channel {} could not be silenced on release: {}",
                self.state.channel_index,
                err
            );
        }
    }
}
