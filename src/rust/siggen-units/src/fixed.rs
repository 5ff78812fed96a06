// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Signed fixed-point scaling of normalized values in [-1, +1].

/// Largest word magnitude of a signed fixed-point number with `bits` bits.
pub const fn full_scale(bits: u32) -> i32 {
    (1 << (bits - 1)) - 1
}

/// Quantize a normalized value to a signed word of `bits` bits.
///
/// Values outside [-1, +1] saturate at full scale.
pub fn quantize_signed(value: f64, bits: u32) -> i32 {
    let scale = full_scale(bits) as f64;
    (value.clamp(-1.0, 1.0) * scale).round() as i32
}

pub fn dequantize_signed(word: i32, bits: u32) -> f64 {
    word as f64 / full_scale(bits) as f64
}

/// Two's complement encoding of `word` in the low `bits` bits of a register.
pub const fn to_register(word: i32, bits: u32) -> u32 {
    (word as u32) & ((1u32 << bits) - 1)
}

pub const fn from_register(register: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((register << shift) as i32) >> shift
}
