//! Device registry.
//!
//! Immutable table mapping `(room, capability)` to a resource binding,
//! built once from the node's device table.  Capability strings are
//! resolved to the closed [`Capability`] enum here so nothing downstream
//! dispatches on raw strings.
//!
//! The registry also hands out the stable [`RoomIndex`] / [`DeviceIndex`]
//! values that address per-room and per-device state arenas.  Their
//! constructors are private: an index can only come from a successful
//! lookup, so state arrays are never indexed by unchecked input.

use heapless::{String, Vec};
use log::info;

use crate::config::{BindingSpec, DeviceSpec};
use crate::error::RegistryError;
use crate::protocol::topic;

pub const MAX_DEVICES: usize = 32;
pub const MAX_ROOMS: usize = 8;
/// Longest room or capability id (matches the topic segment limit).
pub const MAX_ID_LEN: usize = 31;

pub type RoomId = String<MAX_ID_LEN>;

// ───────────────────────────────────────────────────────────────
// Capabilities
// ───────────────────────────────────────────────────────────────

/// Every device type a node can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Light,
    BedsideLight,
    Hood,
    Fan,
    Door,
    AirConditioner,
    Window,
    Curtain,
    TemperatureSensor,
    HumiditySensor,
    BrightnessSensor,
    SmokeSensor,
    GasSensor,
}

/// How a capability is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityKind {
    /// On/off output.
    Binary,
    /// On/off plus a target temperature.
    AirConditioner,
    /// Timed servo motion between two end positions.
    Travel,
    /// Read-only value.
    Sensor(SensorKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Temperature,
    Humidity,
    Brightness,
    Smoke,
    Gas,
}

impl SensorKind {
    pub const COUNT: usize = 5;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Temperature,
        Self::Humidity,
        Self::Brightness,
        Self::Smoke,
        Self::Gas,
    ];

    /// Unit string carried in read replies.
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Humidity => "%",
            Self::Brightness => "lux",
            Self::Smoke | Self::Gas => "ppm",
        }
    }

    /// Accepted simulator range `(min, max)`.
    pub const fn range(self) -> (f32, f32) {
        match self {
            Self::Temperature => (-10.0, 40.0),
            Self::Humidity => (0.0, 100.0),
            Self::Brightness => (0.0, 100_000.0),
            Self::Smoke | Self::Gas => (0.0, 10_000.0),
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl Capability {
    pub const ALL: [Self; 13] = [
        Self::Light,
        Self::BedsideLight,
        Self::Hood,
        Self::Fan,
        Self::Door,
        Self::AirConditioner,
        Self::Window,
        Self::Curtain,
        Self::TemperatureSensor,
        Self::HumiditySensor,
        Self::BrightnessSensor,
        Self::SmokeSensor,
        Self::GasSensor,
    ];

    /// Resolve a topic device segment (exact, case-sensitive).
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }

    /// Topic device segment for this capability.
    pub const fn id(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::BedsideLight => "bedside_light",
            Self::Hood => "hood",
            Self::Fan => "fan",
            Self::Door => "door",
            Self::AirConditioner => "ac",
            Self::Window => "window",
            Self::Curtain => "curtain",
            Self::TemperatureSensor => "temp_sensor",
            Self::HumiditySensor => "humidity_sensor",
            Self::BrightnessSensor => "brightness_sensor",
            Self::SmokeSensor => "smoke_sensor",
            Self::GasSensor => "gas_sensor",
        }
    }

    pub const fn kind(self) -> CapabilityKind {
        match self {
            Self::Light | Self::BedsideLight | Self::Hood | Self::Fan | Self::Door => {
                CapabilityKind::Binary
            }
            Self::AirConditioner => CapabilityKind::AirConditioner,
            Self::Window | Self::Curtain => CapabilityKind::Travel,
            Self::TemperatureSensor => CapabilityKind::Sensor(SensorKind::Temperature),
            Self::HumiditySensor => CapabilityKind::Sensor(SensorKind::Humidity),
            Self::BrightnessSensor => CapabilityKind::Sensor(SensorKind::Brightness),
            Self::SmokeSensor => CapabilityKind::Sensor(SensorKind::Smoke),
            Self::GasSensor => CapabilityKind::Sensor(SensorKind::Gas),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Bindings and indices
// ───────────────────────────────────────────────────────────────

/// Physical resource behind a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceBinding {
    Pin(u8),
    Simulated,
}

impl ResourceBinding {
    pub const fn pin(self) -> Option<u8> {
        match self {
            Self::Pin(p) => Some(p),
            Self::Simulated => None,
        }
    }

    pub const fn is_virtual(self) -> bool {
        matches!(self, Self::Simulated)
    }
}

impl From<BindingSpec> for ResourceBinding {
    fn from(b: BindingSpec) -> Self {
        match b {
            BindingSpec::Pin(p) => Self::Pin(p),
            BindingSpec::Simulated => Self::Simulated,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoomIndex(u8);

impl RoomIndex {
    pub const fn get(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceIndex(u8);

impl DeviceIndex {
    pub const fn get(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Device {
    pub room: RoomIndex,
    pub capability: Capability,
    pub binding: ResourceBinding,
}

// ───────────────────────────────────────────────────────────────
// Registry
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Registry {
    rooms: Vec<RoomId, MAX_ROOMS>,
    devices: Vec<Device, MAX_DEVICES>,
}

impl Registry {
    /// Validate the device table and freeze it.
    pub fn build(specs: &[DeviceSpec]) -> Result<Self, RegistryError> {
        let mut reg = Self {
            rooms: Vec::new(),
            devices: Vec::new(),
        };

        for spec in specs {
            let capability =
                Capability::from_id(&spec.capability).ok_or(RegistryError::UnknownCapability)?;
            validate_room_id(&spec.room)?;
            let binding = ResourceBinding::from(spec.binding);

            if reg.find(&spec.room, capability).is_some() {
                return Err(RegistryError::Duplicate);
            }
            if let Some(pin) = binding.pin() {
                if reg.devices.iter().any(|d| d.binding.pin() == Some(pin)) {
                    return Err(RegistryError::PinConflict(pin));
                }
            }

            let room = match reg.room_index(&spec.room) {
                Some(idx) => idx,
                None => reg.add_room(&spec.room)?,
            };
            reg.devices
                .push(Device {
                    room,
                    capability,
                    binding,
                })
                .map_err(|_| RegistryError::TooManyDevices)?;
        }

        info!(
            "Registry: {} devices across {} rooms",
            reg.devices.len(),
            reg.rooms.len()
        );
        Ok(reg)
    }

    fn add_room(&mut self, room: &str) -> Result<RoomIndex, RegistryError> {
        let idx = RoomIndex(self.rooms.len() as u8);
        let id = RoomId::try_from(room).map_err(|()| RegistryError::InvalidRoomId)?;
        self.rooms.push(id).map_err(|_| RegistryError::TooManyRooms)?;
        Ok(idx)
    }

    /// Device index for `(room, capability)`, if this node owns it.
    pub fn find(&self, room: &str, capability: Capability) -> Option<DeviceIndex> {
        let room = self.room_index(room)?;
        self.devices
            .iter()
            .position(|d| d.room == room && d.capability == capability)
            .map(|i| DeviceIndex(i as u8))
    }

    /// Resource binding for `(room, capability)`.
    pub fn binding(&self, room: &str, capability: Capability) -> Option<ResourceBinding> {
        self.find(room, capability).map(|i| self.device(i).binding)
    }

    pub fn room_index(&self, room: &str) -> Option<RoomIndex> {
        self.rooms
            .iter()
            .position(|r| r.as_str() == room)
            .map(|i| RoomIndex(i as u8))
    }

    pub fn room_name(&self, idx: RoomIndex) -> &str {
        self.rooms[idx.get()].as_str()
    }

    pub fn device(&self, idx: DeviceIndex) -> &Device {
        &self.devices[idx.get()]
    }

    pub fn devices(&self) -> impl Iterator<Item = (DeviceIndex, &Device)> {
        self.devices
            .iter()
            .enumerate()
            .map(|(i, d)| (DeviceIndex(i as u8), d))
    }

    pub fn rooms(&self) -> impl Iterator<Item = (RoomIndex, &str)> {
        self.rooms
            .iter()
            .enumerate()
            .map(|(i, r)| (RoomIndex(i as u8), r.as_str()))
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

fn validate_room_id(room: &str) -> Result<(), RegistryError> {
    if !topic::is_valid_segment(room) || room.len() > MAX_ID_LEN {
        return Err(RegistryError::InvalidRoomId);
    }
    Ok(())
}
