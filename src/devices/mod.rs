//! Device capability handlers.
//!
//! One strategy per [`CapabilityKind`](crate::registry::CapabilityKind):
//!
//! | Kind            | Handler                          | State                  |
//! |-----------------|----------------------------------|------------------------|
//! | Binary          | [`binary::set_binary`]           | none (output level)    |
//! | AirConditioner  | [`climate::ClimateBank`]         | per-room `AcState`     |
//! | Travel          | [`travel::TravelBank`]           | per-device step machine |
//! | Sensor          | [`SensorBank`](crate::sensors::SensorBank) | simulator values |
//!
//! [`DeviceBank`] owns every mutable state arena.  The registry is passed
//! in by reference on each call and never stored here.

pub mod binary;
pub mod climate;
pub mod travel;

use embassy_time::Instant;
use log::info;

use crate::app::ports::OutputPort;
use crate::config::{NodeConfig, TravelProfile};
use crate::error::CommandError;
use crate::registry::{Capability, CapabilityKind, Registry, ResourceBinding};
use crate::sensors::SensorBank;
use climate::ClimateBank;
use travel::{MotionCompletion, TravelBank, TravelCommand, TravelOutcome};

pub struct DeviceBank {
    pub climate: ClimateBank,
    pub travel: TravelBank,
    pub sensors: SensorBank,
    travel_profile: TravelProfile,
}

impl DeviceBank {
    pub fn new(registry: &Registry, config: &NodeConfig) -> Self {
        Self {
            climate: ClimateBank::new(registry, config),
            travel: TravelBank::new(registry),
            sensors: SensorBank::new(registry, config),
            travel_profile: config.travel,
        }
    }

    pub fn travel_profile(&self) -> &TravelProfile {
        &self.travel_profile
    }

    /// Boot-time output state: relays LOW, servos parked at neutral.
    /// Virtual devices are skipped.
    pub fn init_outputs(&self, registry: &Registry, hw: &mut impl OutputPort) {
        let mut relays = 0usize;
        for (_, dev) in registry.devices() {
            let ResourceBinding::Pin(pin) = dev.binding else {
                continue;
            };
            match dev.capability.kind() {
                CapabilityKind::Binary | CapabilityKind::AirConditioner => {
                    hw.configure_output(pin);
                    hw.write_level(pin, false);
                    relays += 1;
                }
                CapabilityKind::Travel | CapabilityKind::Sensor(_) => {}
            }
        }
        self.travel.park_all(hw, &self.travel_profile);
        info!("Devices: {} outputs initialised OFF, servos parked", relays);
    }

    /// Submit a window/curtain command.
    pub fn request_travel(
        &mut self,
        registry: &Registry,
        hw: &mut impl OutputPort,
        room: &str,
        capability: Capability,
        cmd: TravelCommand,
        now: Instant,
    ) -> Result<TravelOutcome, CommandError> {
        self.travel
            .request(registry, hw, room, capability, cmd, now, &self.travel_profile)
    }

    /// Advance running motions.
    pub fn tick(
        &mut self,
        now: Instant,
        hw: &mut impl OutputPort,
        done: &mut impl FnMut(MotionCompletion),
    ) {
        self.travel.tick(now, &self.travel_profile, hw, done);
    }
}
