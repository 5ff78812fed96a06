// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

pub mod device_traits;
pub mod mask;
pub mod registers;
pub mod types;

pub use device_traits::DeviceTraits;
pub use mask::ChannelMask;
pub use types::DeviceKind;
