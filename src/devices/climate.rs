//! Air conditioners.
//!
//! Each room with an AC owns one [`AcState`] slot, addressed by the
//! registry's [`RoomIndex`].  The relay output follows `is_on`; the target
//! temperature is bookkeeping reported back to the caller.

use heapless::Vec;
use log::{info, warn};

use crate::app::ports::OutputPort;
use crate::config::NodeConfig;
use crate::error::CommandError;
use crate::registry::{Capability, MAX_ROOMS, Registry, ResourceBinding, RoomIndex};

pub const MIN_TEMPERATURE_C: i32 = 0;
pub const MAX_TEMPERATURE_C: i32 = 40;

pub fn temperature_in_range(t: i32) -> bool {
    (MIN_TEMPERATURE_C..=MAX_TEMPERATURE_C).contains(&t)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcState {
    pub is_on: bool,
    pub target_temperature: i32,
}

/// Per-room AC state arena.
#[derive(Debug, Clone)]
pub struct ClimateBank {
    states: Vec<AcState, MAX_ROOMS>,
}

impl ClimateBank {
    /// One slot per registry room, seeded with the configured defaults.
    pub fn new(registry: &Registry, config: &NodeConfig) -> Self {
        let mut states = Vec::new();
        for (_, room) in registry.rooms() {
            let target = config
                .ac_default_for(room)
                .clamp(MIN_TEMPERATURE_C, MAX_TEMPERATURE_C);
            let pushed = states
                .push(AcState {
                    is_on: false,
                    target_temperature: target,
                })
                .is_ok();
            debug_assert!(pushed, "registry rooms exceed MAX_ROOMS");
        }
        Self { states }
    }

    /// Resolve `room` to its AC slot and binding.
    fn locate(
        &self,
        registry: &Registry,
        room: &str,
    ) -> Result<(RoomIndex, ResourceBinding), CommandError> {
        let idx = registry
            .find(room, Capability::AirConditioner)
            .ok_or(CommandError::DeviceNotFound)?;
        let dev = registry.device(idx);
        Ok((dev.room, dev.binding))
    }

    /// Switch the AC; a temperature is only taken when turning on.
    pub fn toggle(
        &mut self,
        registry: &Registry,
        hw: &mut impl OutputPort,
        room: &str,
        is_on: bool,
        temperature: Option<i32>,
    ) -> Result<AcState, CommandError> {
        let (slot, binding) = self.locate(registry, room).inspect_err(|_| {
            warn!("Climate: no AC in room '{}'", room);
        })?;

        if is_on {
            if let Some(t) = temperature {
                if !temperature_in_range(t) {
                    return Err(CommandError::MissingOrInvalidValue);
                }
            }
        }

        let state = &mut self.states[slot.get()];
        state.is_on = is_on;
        if is_on {
            if let Some(t) = temperature {
                state.target_temperature = t;
            }
        }

        if let Some(pin) = binding.pin() {
            hw.write_level(pin, is_on);
        }
        if is_on {
            info!(
                "Climate: '{}/ac' ON, target {} °C",
                room, state.target_temperature
            );
        } else {
            info!("Climate: '{}/ac' OFF", room);
        }
        Ok(*state)
    }

    /// Change the target temperature without touching the relay.
    pub fn set_temperature(
        &mut self,
        registry: &Registry,
        room: &str,
        temperature: i32,
    ) -> Result<AcState, CommandError> {
        let (slot, _) = self.locate(registry, room)?;
        if !temperature_in_range(temperature) {
            warn!(
                "Climate: rejected target {} °C for '{}'",
                temperature, room
            );
            return Err(CommandError::InvalidTemperature);
        }
        let state = &mut self.states[slot.get()];
        state.target_temperature = temperature;
        info!("Climate: '{}/ac' target set to {} °C", room, temperature);
        Ok(*state)
    }

    pub fn state(&self, registry: &Registry, room: &str) -> Option<AcState> {
        self.locate(registry, room)
            .ok()
            .map(|(slot, _)| self.states[slot.get()])
    }
}
