// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use indexmap::IndexMap;

use crate::controller::ChannelController;
use crate::events::{ChannelEvent, EventTable, ParameterEvent};
use crate::hardware::{HardwareChannel, LoadStatus, Overlay};
use crate::params::{ControlDescriptor, control_descriptors};
use crate::settings::GeneratorSettings;
use crate::state::ChannelSnapshot;
use crate::{Error, Result};

/// A generator session: one controller per configured channel of an overlay.
///
/// Controllers are declared before the overlay, so they are torn down (and
/// their channels silenced) before the overlay is released.
pub struct Generator<O: Overlay> {
    channels: IndexMap<u8, ChannelController<O::Channel>>,
    events: EventTable<ChannelController<O::Channel>>,
    overlay: O,
}

impl<O: Overlay> Generator<O> {
    /// Open the channels listed in `settings` on `overlay`.
    pub fn new(overlay: O, settings: &GeneratorSettings) -> Result<Self> {
        let mut settings = settings.clone();
        for change in settings.sanitize(overlay.device_kind().traits())? {
            siggen_log::warn!(
                "Setting '{}' changed from {} to {}: {}",
                change.field,
                change.original,
                change.sanitized,
                change.reason
            );
        }
        if overlay.load_status() == LoadStatus::AlreadyLoaded {
            siggen_log::warn!("Generator bitstream is already loaded, reusing it");
        }

        let options = settings.controller_options();
        let mut channels = IndexMap::with_capacity(settings.channels.len());
        for &channel_index in &settings.channels {
            if channels.contains_key(&channel_index) {
                return Err(Error::configuration(format!(
                    "Channel {channel_index} is opened twice"
                )));
            }
            let hardware = overlay.configure(channel_index)?;
            let controller = ChannelController::with_options(channel_index, hardware, &options)?;
            channels.insert(channel_index, controller);
        }
        siggen_log::info!(
            "Generator session on {} with channels {:?}",
            overlay.device_kind(),
            settings.channels
        );
        Ok(Generator {
            channels,
            events: EventTable::for_channel(),
            overlay,
        })
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    pub fn channel_indices(&self) -> impl Iterator<Item = u8> + '_ {
        self.channels.keys().copied()
    }

    pub fn channel(&self, channel_index: u8) -> Result<&ChannelController<O::Channel>> {
        self.channels
            .get(&channel_index)
            .ok_or_else(|| Self::not_open(channel_index))
    }

    pub fn channel_mut(&mut self, channel_index: u8) -> Result<&mut ChannelController<O::Channel>> {
        self.channels
            .get_mut(&channel_index)
            .ok_or_else(|| Self::not_open(channel_index))
    }

    fn not_open(channel_index: u8) -> Error {
        Error::configuration(format!("Channel {channel_index} is not open in this session"))
    }

    /// Apply a parameter event to one channel.
    ///
    /// Errors are returned to the caller; the session and the channel stay
    /// usable.
    pub fn dispatch(&mut self, channel_index: u8, event: &ParameterEvent) -> Result<()> {
        let controller = self
            .channels
            .get_mut(&channel_index)
            .ok_or_else(|| Self::not_open(channel_index))?;
        self.events.dispatch(controller, event).inspect_err(|err| {
            siggen_log::warn!(
                "Event '{}' on channel {} failed: {}",
                event.parameter,
                channel_index,
                err
            );
        })
    }

    pub fn apply(&mut self, event: &ChannelEvent) -> Result<()> {
        self.dispatch(event.channel, &event.event)
    }

    pub fn snapshots(&self) -> Vec<ChannelSnapshot> {
        self.channels.values().map(|c| c.snapshot()).collect()
    }

    /// Control descriptors valid for every channel of the session.
    pub fn controls(&self) -> Vec<ControlDescriptor> {
        match self.channels.values().next() {
            Some(controller) => {
                let hardware = controller.hardware();
                control_descriptors(&hardware.frequency_range(), hardware.default_frequency())
            }
            None => {
                let traits = self.overlay.device_kind().traits();
                control_descriptors(&traits.frequency_range(), traits.default_frequency())
            }
        }
    }

    /// Silence and release every channel, then the overlay.
    ///
    /// All channels are shut down even if one fails; the first failure is returned.
    pub fn shutdown(mut self) -> Result<O> {
        let mut result = Ok(());
        for (_, controller) in self.channels.drain(..) {
            if let Err(err) = controller.shutdown() {
                siggen_log::warn!("Shutdown failed: {}", err);
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }
        result.map(|_| self.overlay)
    }
}
