// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

/// Signal generator variants of the programmable-logic overlay.
#[derive(Debug, Clone, Eq, PartialEq, Copy, Hash, Default)]
pub enum DeviceKind {
    /// Two-channel generator.
    #[default]
    Mercury,
    /// Four-channel build of the same generator core.
    MercuryQuad,
}

impl DeviceKind {
    pub fn traits(&self) -> &'static crate::DeviceTraits {
        crate::DeviceTraits::from_device_kind(self)
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Mercury => write!(f, "mercury"),
            DeviceKind::MercuryQuad => write!(f, "mercury-quad"),
        }
    }
}
