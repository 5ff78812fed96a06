// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Register-file simulation of the generator overlay.
//!
//! Lets the controller run without hardware. Values are encoded into the
//! register words the programmable logic expects, so tests observe the same
//! quantization and the same shared control register as on the device.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use siggen_common::registers::{self, channel};
use siggen_common::{ChannelMask, DeviceKind, DeviceTraits};
use siggen_units::fixed::{dequantize_signed, from_register, quantize_signed, to_register};
use siggen_units::{Angle32, Frequency, hertz};
use siggen_waveform::WaveformTable;

use crate::hardware::{
    HardwareChannel, HardwareIoError, HardwareOp, HardwareResult, LoadStatus, Overlay,
};
use crate::{Error, Result};

#[derive(Default)]
struct RegisterFile {
    registers: HashMap<usize, u32>,
    tables: HashMap<u8, Vec<i32>>,
    bound: HashSet<u8>,
    faults: HashSet<(u8, HardwareOp)>,
    trigger_counts: HashMap<u8, u32>,
}

impl RegisterFile {
    fn read(&self, address: usize) -> u32 {
        self.registers.get(&address).copied().unwrap_or(0)
    }

    fn write(&mut self, address: usize, value: u32) {
        siggen_log::diagnostic!("Register {:#06x} <- {:#010x}", address, value);
        self.registers.insert(address, value);
    }

    /// Read-modify-write of the shared control register, limited to `bits`.
    fn update_control(&mut self, bits: u32, set: bool) {
        let current = self.read(registers::CTRL);
        let value = if set { current | bits } else { current & !bits };
        self.write(registers::CTRL, value);
    }
}

fn lock(file: &Mutex<RegisterFile>) -> MutexGuard<'_, RegisterFile> {
    file.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A simulated generator overlay.
pub struct SimulatedOverlay {
    kind: DeviceKind,
    load_status: LoadStatus,
    registers: Arc<Mutex<RegisterFile>>,
}

impl SimulatedOverlay {
    pub fn new(kind: DeviceKind) -> Self {
        SimulatedOverlay {
            kind,
            load_status: LoadStatus::Loaded,
            registers: Arc::default(),
        }
    }

    /// An overlay whose bitstream was found already loaded.
    pub fn already_loaded(kind: DeviceKind) -> Self {
        SimulatedOverlay {
            load_status: LoadStatus::AlreadyLoaded,
            ..Self::new(kind)
        }
    }

    pub fn traits(&self) -> &'static DeviceTraits {
        self.kind.traits()
    }

    pub fn read_register(&self, address: usize) -> u32 {
        lock(&self.registers).read(address)
    }

    pub fn control_register(&self) -> u32 {
        self.read_register(registers::CTRL)
    }

    fn channel_register(&self, channel_index: u8, offset: usize) -> u32 {
        self.read_register(registers::channel_register(channel_index, offset))
    }

    pub fn output_amplitude(&self, channel_index: u8) -> f64 {
        let bits = self.traits().amplitude_bits;
        let word = from_register(self.channel_register(channel_index, channel::AMPLITUDE), bits);
        dequantize_signed(word, bits)
    }

    pub fn output_offset(&self, channel_index: u8) -> f64 {
        let bits = self.traits().amplitude_bits;
        let word = from_register(self.channel_register(channel_index, channel::OFFSET), bits);
        dequantize_signed(word, bits)
    }

    /// Frequency encoded in the channel's phase increment register.
    pub fn frequency(&self, channel_index: u8) -> Frequency {
        let step = self.channel_register(channel_index, channel::PHASE_STEP);
        hertz(step as f64 / phase_steps_per_hertz(self.traits()))
    }

    /// Phase offset in degrees.
    pub fn phase(&self, channel_index: u8) -> f64 {
        let word = self.channel_register(channel_index, channel::PHASE_OFFSET);
        Angle32::from_phase_word(word).to_degrees()
    }

    /// Quantized samples of the channel's waveform buffer.
    pub fn table(&self, channel_index: u8) -> Option<Vec<i32>> {
        lock(&self.registers).tables.get(&channel_index).cloned()
    }

    pub fn is_running(&self, channel_index: u8) -> bool {
        ChannelMask::for_channel(channel_index)
            .is_some_and(|mask| self.control_register() & mask.start != 0)
    }

    pub fn trigger_count(&self, channel_index: u8) -> u32 {
        lock(&self.registers)
            .trigger_counts
            .get(&channel_index)
            .copied()
            .unwrap_or(0)
    }

    pub fn is_bound(&self, channel_index: u8) -> bool {
        lock(&self.registers).bound.contains(&channel_index)
    }

    /// Make every `operation` on the channel fail until [`Self::clear_faults`].
    pub fn inject_fault(&self, channel_index: u8, operation: HardwareOp) {
        lock(&self.registers)
            .faults
            .insert((channel_index, operation));
    }

    pub fn clear_faults(&self) {
        lock(&self.registers).faults.clear();
    }
}

impl Overlay for SimulatedOverlay {
    type Channel = SimulatedChannel;

    fn device_kind(&self) -> DeviceKind {
        self.kind
    }

    fn load_status(&self) -> LoadStatus {
        self.load_status
    }

    fn configure(&self, channel_index: u8) -> Result<SimulatedChannel> {
        let traits = self.traits();
        let mask = ChannelMask::for_channel(channel_index)
            .filter(|_| traits.supports_channel(channel_index))
            .ok_or_else(|| {
                Error::configuration(format!(
                    "Channel {channel_index} does not exist on {} ({} channels)",
                    self.kind, traits.channel_count
                ))
            })?;
        if !lock(&self.registers).bound.insert(channel_index) {
            return Err(Error::configuration(format!(
                "Channel {channel_index} is already bound"
            )));
        }
        Ok(SimulatedChannel {
            channel_index,
            mask,
            traits,
            registers: Arc::clone(&self.registers),
        })
    }
}

fn phase_steps_per_hertz(traits: &DeviceTraits) -> f64 {
    let resolution = (1u64 << traits.frequency_fraction_bits) as f64;
    traits.table_len as f64 * resolution / traits.sampling_rate
}

/// One bound channel of a [`SimulatedOverlay`]. Releases its binding on drop.
pub struct SimulatedChannel {
    channel_index: u8,
    mask: ChannelMask,
    traits: &'static DeviceTraits,
    registers: Arc<Mutex<RegisterFile>>,
}

impl SimulatedChannel {
    fn access(&self, operation: HardwareOp) -> HardwareResult<MutexGuard<'_, RegisterFile>> {
        let file = self.registers.lock().map_err(|_| {
            HardwareIoError::new(self.channel_index, operation, "register file poisoned")
        })?;
        if file.faults.contains(&(self.channel_index, operation)) {
            return Err(HardwareIoError::new(
                self.channel_index,
                operation,
                "simulated bus fault",
            ));
        }
        Ok(file)
    }

    fn write_channel(&self, operation: HardwareOp, offset: usize, value: u32) -> HardwareResult {
        let mut file = self.access(operation)?;
        file.write(registers::channel_register(self.channel_index, offset), value);
        Ok(())
    }

    fn write_level(&self, operation: HardwareOp, offset: usize, level: f64) -> HardwareResult {
        let bits = self.traits.amplitude_bits;
        self.write_channel(operation, offset, to_register(quantize_signed(level, bits), bits))
    }
}

impl HardwareChannel for SimulatedChannel {
    fn channel_index(&self) -> u8 {
        self.channel_index
    }

    fn table_len(&self) -> usize {
        self.traits.table_len
    }

    fn frequency_min(&self) -> Frequency {
        self.traits.min_frequency()
    }

    fn frequency_max(&self) -> Frequency {
        self.traits.max_frequency()
    }

    fn default_frequency(&self) -> Frequency {
        self.traits.default_frequency()
    }

    fn reset(&mut self) -> HardwareResult {
        let mut file = self.access(HardwareOp::Reset)?;
        file.update_control(self.mask.reset, true);
        let cleared = [
            channel::AMPLITUDE,
            channel::OFFSET,
            channel::PHASE_STEP,
            channel::PHASE_OFFSET,
        ];
        for offset in cleared {
            file.write(registers::channel_register(self.channel_index, offset), 0);
        }
        file.update_control(self.mask.reset | self.mask.start, false);
        Ok(())
    }

    fn set_waveform_table(&mut self, table: &WaveformTable) -> HardwareResult {
        if table.len() != self.traits.table_len {
            return Err(HardwareIoError::new(
                self.channel_index,
                HardwareOp::WaveformTable,
                format!(
                    "table holds {} samples, the buffer {}",
                    table.len(),
                    self.traits.table_len
                ),
            ));
        }
        let bits = self.traits.amplitude_bits;
        let samples = table
            .samples()
            .iter()
            .map(|&s| quantize_signed(s, bits))
            .collect();
        let mut file = self.access(HardwareOp::WaveformTable)?;
        file.tables.insert(self.channel_index, samples);
        file.write(
            registers::channel_register(self.channel_index, channel::TABLE_LEN),
            table.len() as u32,
        );
        Ok(())
    }

    fn set_amplitude(&mut self, amplitude: f64) -> HardwareResult {
        self.write_level(HardwareOp::Amplitude, channel::AMPLITUDE, amplitude)
    }

    fn set_offset(&mut self, offset: f64) -> HardwareResult {
        self.write_level(HardwareOp::Offset, channel::OFFSET, offset)
    }

    fn set_frequency(&mut self, frequency: Frequency) -> HardwareResult {
        let step = (frequency.value() * phase_steps_per_hertz(self.traits)).round() as u32;
        self.write_channel(HardwareOp::Frequency, channel::PHASE_STEP, step)
    }

    fn set_phase(&mut self, phase: f64) -> HardwareResult {
        let angle = Angle32::from_degrees(phase);
        siggen_log::diagnostic!("Channel {}: phase offset {}", self.channel_index, angle);
        let word = angle.phase_word();
        self.write_channel(HardwareOp::Phase, channel::PHASE_OFFSET, word)
    }

    fn start(&mut self) -> HardwareResult {
        self.access(HardwareOp::Start)?
            .update_control(self.mask.start, true);
        Ok(())
    }

    fn stop(&mut self) -> HardwareResult {
        self.access(HardwareOp::Stop)?
            .update_control(self.mask.start, false);
        Ok(())
    }

    fn trigger(&mut self) -> HardwareResult {
        let mut file = self.access(HardwareOp::Trigger)?;
        file.update_control(self.mask.trigger, true);
        file.update_control(self.mask.trigger, false);
        *file.trigger_counts.entry(self.channel_index).or_default() += 1;
        Ok(())
    }
}

impl Drop for SimulatedChannel {
    fn drop(&mut self) {
        lock(&self.registers).bound.remove(&self.channel_index);
    }
}
