// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use proptest::prelude::*;
use siggen_common::DeviceKind;
use siggen_controller::recording::RecordingChannel;
use siggen_controller::{
    ChannelController, Error, Generator, GeneratorSettings, HardwareChannel, HardwareOp, Overlay,
    Parameter, ParameterEvent, SimulatedOverlay, WaveformShape,
};
use siggen_units::fixed::quantize_signed;
use siggen_waveform::{sine, square};

const AMPLITUDE_BITS: u32 = 14;

fn quantized(samples: &[f64]) -> Vec<i32> {
    samples
        .iter()
        .map(|&s| quantize_signed(s, AMPLITUDE_BITS))
        .collect()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-3
}

#[test]
fn construct_channel_zero_in_silent_default_state() {
    let overlay = SimulatedOverlay::new(DeviceKind::Mercury);
    let controller = ChannelController::new(0, overlay.configure(0).unwrap()).unwrap();

    let state = controller.state();
    assert!(!state.enabled());
    assert_eq!(state.shape(), WaveformShape::Sine);
    assert_eq!(state.duty(), 0.5);
    assert_eq!(state.amplitude(), 0.0);
    assert_eq!(state.offset(), 0.0);

    let len = overlay.traits().table_len;
    assert_eq!(overlay.table(0), Some(quantized(sine(len).samples())));
    assert_eq!(overlay.output_amplitude(0), 0.0);
    assert_eq!(overlay.output_offset(0), 0.0);
    assert!(overlay.is_running(0));
    assert_eq!(overlay.trigger_count(0), 1);
}

#[test]
fn disable_enable_cycle_restores_amplitude() {
    let overlay = SimulatedOverlay::new(DeviceKind::Mercury);
    let mut controller = ChannelController::new(0, overlay.configure(0).unwrap()).unwrap();

    controller.set_enabled(true).unwrap();
    controller.set_amplitude(0.5).unwrap();
    controller.set_offset(-0.25).unwrap();
    assert!(close(overlay.output_amplitude(0), 0.5));

    controller.set_enabled(false).unwrap();
    assert_eq!(overlay.output_amplitude(0), 0.0);
    assert_eq!(overlay.output_offset(0), 0.0);

    controller.set_enabled(true).unwrap();
    assert!(close(overlay.output_amplitude(0), 0.5));
    assert!(close(overlay.output_offset(0), -0.25));
}

#[test]
fn square_duty_sweep_reloads_table() {
    let overlay = SimulatedOverlay::new(DeviceKind::Mercury);
    let len = overlay.traits().table_len;
    let mut controller = ChannelController::new(1, overlay.configure(1).unwrap()).unwrap();

    controller.set_waveform_shape(WaveformShape::Square).unwrap();
    controller.set_duty_cycle(0.25).unwrap();
    assert_eq!(*controller.waveform_table(), square(0.25, len));
    assert_eq!(overlay.table(1), Some(quantized(square(0.25, len).samples())));

    controller.set_duty_cycle(0.75).unwrap();
    assert_eq!(*controller.waveform_table(), square(0.75, len));
    assert_eq!(overlay.table(1), Some(quantized(square(0.75, len).samples())));
}

#[test]
fn sine_table_ignores_duty() {
    let overlay = SimulatedOverlay::new(DeviceKind::Mercury);
    let mut controller = ChannelController::new(0, overlay.configure(0).unwrap()).unwrap();
    let loaded = overlay.table(0);

    for duty in [0.0, 0.1, 0.9, 1.0] {
        controller.set_duty_cycle(duty).unwrap();
        assert_eq!(overlay.table(0), loaded);
    }
}

#[test]
fn frequency_bounds_on_simulated_hardware() {
    let overlay = SimulatedOverlay::new(DeviceKind::Mercury);
    let mut controller = ChannelController::new(0, overlay.configure(0).unwrap()).unwrap();
    let min = overlay.traits().min_frequency();
    let max = overlay.traits().max_frequency();

    controller.set_frequency(min.log10()).unwrap();
    assert_eq!(controller.state().frequency(), min);
    controller.set_frequency(max.log10()).unwrap();
    assert_eq!(controller.state().frequency(), max);
    assert!(close(overlay.frequency(0).value() / max.value(), 1.0));

    let err = controller.set_frequency(max.log10() + 0.02).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidParameter {
            parameter: Parameter::Frequency,
            ..
        }
    ));
    assert!(controller.set_frequency(min.log10() - 0.02).is_err());
    assert_eq!(controller.state().frequency(), max);
}

#[test]
fn hardware_fault_is_reported_and_retry_succeeds() {
    let overlay = SimulatedOverlay::new(DeviceKind::Mercury);
    let mut controller = ChannelController::new(0, overlay.configure(0).unwrap()).unwrap();
    controller.set_enabled(true).unwrap();
    controller.set_amplitude(0.5).unwrap();

    overlay.inject_fault(0, HardwareOp::Amplitude);
    let err = controller.set_enabled(false).unwrap_err();
    assert!(matches!(err, Error::HardwareIo(ref io) if io.operation == HardwareOp::Amplitude));
    assert!(err.is_recoverable());
    assert!(!controller.state().enabled());

    overlay.clear_faults();
    controller.set_enabled(false).unwrap();
    assert_eq!(overlay.output_amplitude(0), 0.0);
    controller.set_enabled(true).unwrap();
    assert!(close(overlay.output_amplitude(0), 0.5));
}

#[test]
fn channels_share_control_register_without_interference() {
    let overlay = SimulatedOverlay::new(DeviceKind::MercuryQuad);
    let controllers: Vec<_> = (0..4)
        .map(|i| ChannelController::new(i, overlay.configure(i).unwrap()).unwrap())
        .collect();
    let running = controllers
        .iter()
        .fold(0, |bits, c| bits | c.state().mask().start);
    assert_eq!(overlay.control_register(), running);

    drop(controllers);
    assert_eq!(overlay.control_register(), 0);
    assert!((0..4).all(|i| !overlay.is_bound(i)));
}

#[test]
fn session_replays_events_and_tears_down() {
    let mut generator = Generator::new(
        SimulatedOverlay::new(DeviceKind::Mercury),
        &GeneratorSettings::from_json(r#"{"channels": [0, 1], "waveform_cache_capacity": 2}"#)
            .unwrap(),
    )
    .unwrap();

    for event in [
        ParameterEvent::new("waveform", "sawtooth"),
        ParameterEvent::new("duty", 0.3),
        ParameterEvent::new("frequency", 4.0),
        ParameterEvent::new("enable", true),
        ParameterEvent::new("amplitude", 0.7),
    ] {
        generator.dispatch(1, &event).unwrap();
    }
    let snapshot = &generator.snapshots()[1];
    assert_eq!(snapshot.channel, 1);
    assert!(snapshot.enabled);
    assert!(close(generator.overlay().output_amplitude(1), 0.7));
    assert!(close(generator.overlay().frequency(1).value() / 1e4, 1.0));

    assert!(matches!(
        generator.dispatch(1, &ParameterEvent::new("volume", 1.0)),
        Err(Error::UnknownParameter(_))
    ));

    let overlay = generator.shutdown().unwrap();
    assert_eq!(overlay.output_amplitude(1), 0.0);
    assert_eq!(overlay.control_register(), 0);
}

#[derive(Debug, Clone)]
enum Setter {
    Enabled(bool),
    Shape(WaveformShape),
    Duty(f64),
    Amplitude(f64),
    Offset(f64),
    Frequency(f64),
    Phase(f64),
}

fn setter() -> impl Strategy<Value = Setter> {
    let recording = RecordingChannel::new(0, 64);
    let (min, max) = (
        recording.frequency_min().log10(),
        recording.frequency_max().log10(),
    );
    prop_oneof![
        any::<bool>().prop_map(Setter::Enabled),
        prop::sample::select(WaveformShape::ALL.to_vec()).prop_map(Setter::Shape),
        (0.0..=1.0).prop_map(Setter::Duty),
        (-1.0..=1.0).prop_map(Setter::Amplitude),
        (-1.0..=1.0).prop_map(Setter::Offset),
        (min..=max).prop_map(Setter::Frequency),
        (0.0..360.0).prop_map(Setter::Phase),
    ]
}

fn apply(controller: &mut ChannelController<RecordingChannel>, setter: &Setter) {
    let result = match *setter {
        Setter::Enabled(enabled) => controller.set_enabled(enabled),
        Setter::Shape(shape) => controller.set_waveform_shape(shape),
        Setter::Duty(duty) => controller.set_duty_cycle(duty),
        Setter::Amplitude(amplitude) => controller.set_amplitude(amplitude),
        Setter::Offset(offset) => controller.set_offset(offset),
        Setter::Frequency(v) => controller.set_frequency(v),
        Setter::Phase(phase) => controller.set_phase(phase),
    };
    result.unwrap();
}

proptest! {
    #[test]
    fn repeated_setter_is_idempotent(
        history in prop::collection::vec(setter(), 0..6),
        repeated in setter(),
    ) {
        let recorder = RecordingChannel::new(0, 64);
        let mut controller = ChannelController::new(0, recorder.clone()).unwrap();
        for setter in &history {
            apply(&mut controller, setter);
        }

        recorder.clear();
        apply(&mut controller, &repeated);
        let first_state = controller.state().clone();
        let first_calls = recorder.calls();

        recorder.clear();
        apply(&mut controller, &repeated);
        prop_assert_eq!(controller.state(), &first_state);
        prop_assert_eq!(recorder.calls(), first_calls);
    }

    #[test]
    fn disable_always_zeroes_hardware(
        amplitude in -1.0..=1.0f64,
        offset in -1.0..=1.0f64,
        enabled in any::<bool>(),
    ) {
        let overlay = SimulatedOverlay::new(DeviceKind::Mercury);
        let mut controller = ChannelController::new(0, overlay.configure(0).unwrap()).unwrap();
        controller.set_enabled(enabled).unwrap();
        controller.set_amplitude(amplitude).unwrap();
        controller.set_offset(offset).unwrap();

        controller.set_enabled(false).unwrap();
        prop_assert_eq!(overlay.output_amplitude(0), 0.0);
        prop_assert_eq!(overlay.output_offset(0), 0.0);

        controller.set_enabled(true).unwrap();
        prop_assert!(close(overlay.output_amplitude(0), amplitude));
        prop_assert!(close(overlay.output_offset(0), offset));
    }
}
