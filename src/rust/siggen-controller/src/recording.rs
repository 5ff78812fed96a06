// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! A [`HardwareChannel`] test double that records every primitive call.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use siggen_common::device_traits::MERCURY_TRAITS;
use siggen_units::Frequency;
use siggen_waveform::WaveformTable;

use crate::hardware::{HardwareChannel, HardwareIoError, HardwareOp, HardwareResult};

/// One call received by a [`RecordingChannel`].
#[derive(Debug, Clone, PartialEq)]
pub enum HardwareCall {
    Reset,
    WaveformTable(WaveformTable),
    Amplitude(f64),
    Offset(f64),
    Frequency(Frequency),
    Phase(f64),
    Start,
    Stop,
    Trigger,
}

#[derive(Default)]
struct Recording {
    calls: Vec<HardwareCall>,
    fail_next: HashSet<HardwareOp>,
}

/// Records calls instead of writing registers.
///
/// Clones share the same recording, so a test keeps a clone as a recorder after
/// handing the channel to a controller. Failed calls are not recorded.
#[derive(Clone)]
pub struct RecordingChannel {
    channel_index: u8,
    table_len: usize,
    recording: Rc<RefCell<Recording>>,
}

impl RecordingChannel {
    pub fn new(channel_index: u8, table_len: usize) -> Self {
        RecordingChannel {
            channel_index,
            table_len,
            recording: Rc::default(),
        }
    }

    pub fn calls(&self) -> Vec<HardwareCall> {
        self.recording.borrow().calls.clone()
    }

    pub fn clear(&self) {
        self.recording.borrow_mut().calls.clear();
    }

    /// Make the next call of `operation` fail.
    pub fn fail_next(&self, operation: HardwareOp) {
        self.recording.borrow_mut().fail_next.insert(operation);
    }

    fn record(&self, operation: HardwareOp, call: HardwareCall) -> HardwareResult {
        let mut recording = self.recording.borrow_mut();
        if recording.fail_next.remove(&operation) {
            return Err(HardwareIoError::new(
                self.channel_index,
                operation,
                "injected failure",
            ));
        }
        recording.calls.push(call);
        Ok(())
    }
}

impl HardwareChannel for RecordingChannel {
    fn channel_index(&self) -> u8 {
        self.channel_index
    }

    fn table_len(&self) -> usize {
        self.table_len
    }

    fn frequency_min(&self) -> Frequency {
        MERCURY_TRAITS.min_frequency()
    }

    fn frequency_max(&self) -> Frequency {
        MERCURY_TRAITS.max_frequency()
    }

    fn default_frequency(&self) -> Frequency {
        MERCURY_TRAITS.default_frequency()
    }

    fn reset(&mut self) -> HardwareResult {
        self.record(HardwareOp::Reset, HardwareCall::Reset)
    }

    fn set_waveform_table(&mut self, table: &WaveformTable) -> HardwareResult {
        self.record(
            HardwareOp::WaveformTable,
            HardwareCall::WaveformTable(table.clone()),
        )
    }

    fn set_amplitude(&mut self, amplitude: f64) -> HardwareResult {
        self.record(HardwareOp::Amplitude, HardwareCall::Amplitude(amplitude))
    }

    fn set_offset(&mut self, offset: f64) -> HardwareResult {
        self.record(HardwareOp::Offset, HardwareCall::Offset(offset))
    }

    fn set_frequency(&mut self, frequency: Frequency) -> HardwareResult {
        self.record(HardwareOp::Frequency, HardwareCall::Frequency(frequency))
    }

    fn set_phase(&mut self, phase: f64) -> HardwareResult {
        self.record(HardwareOp::Phase, HardwareCall::Phase(phase))
    }

    fn start(&mut self) -> HardwareResult {
        self.record(HardwareOp::Start, HardwareCall::Start)
    }

    fn stop(&mut self) -> HardwareResult {
        self.record(HardwareOp::Stop, HardwareCall::Stop)
    }

    fn trigger(&mut self) -> HardwareResult {
        self.record(HardwareOp::Trigger, HardwareCall::Trigger)
    }
}
