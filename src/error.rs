//! Error types for the home node firmware.
//!
//! Command failures map one-to-one onto the wire error codes carried by an
//! error reply.  Topic and registry errors never reach the broker: the first
//! is logged and dropped, the second aborts startup.
//!
//! | Variant                 | `error_code`               |
//! |-------------------------|----------------------------|
//! | `PayloadParse`          | `JSON_PARSE_ERROR`         |
//! | `MissingField`          | `MISSING_REQUIRED_FIELDS`  |
//! | `UnknownRoom`           | `UNKNOWN_ROOM`             |
//! | `UnknownDeviceType`     | `UNKNOWN_DEVICE_TYPE`      |
//! | `UnknownAction`         | `UNKNOWN_ACTION`           |
//! | `InvalidTemperature`    | `INVALID_TEMPERATURE`      |
//! | `MissingOrInvalidValue` | `MISSING_OR_INVALID_VALUE` |
//! | `DeviceNotFound`        | `DEVICE_NOT_FOUND`         |
//! | `DeviceBusy`            | `DEVICE_BUSY`              |
//! | `SensorReadFailure`     | `SENSOR_READ_ERROR`        |

use core::fmt;

use crate::registry::SensorKind;

// ---------------------------------------------------------------------------
// Command errors (replied on the device state topic)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Payload is not a JSON object.
    PayloadParse,
    /// `action` or `correlation_id` is absent or not a string.
    MissingField,
    /// Sensor read addressed a room with no such sensor.
    UnknownRoom,
    /// Device segment does not name a known capability.
    UnknownDeviceType,
    /// Action is not understood by the addressed capability.
    UnknownAction,
    /// `SET_TEMP` value outside the accepted range.
    InvalidTemperature,
    /// `ON` for an air conditioner without an in-range value.
    MissingOrInvalidValue,
    /// No binding for the addressed (room, device) on this node.
    DeviceNotFound,
    /// Travel actuator command queue is full.
    DeviceBusy,
    /// Sensor produced no reading.
    SensorReadFailure(SensorKind),
}

impl CommandError {
    /// Stable wire code.
    pub const fn code(self) -> &'static str {
        match self {
            Self::PayloadParse => "JSON_PARSE_ERROR",
            Self::MissingField => "MISSING_REQUIRED_FIELDS",
            Self::UnknownRoom => "UNKNOWN_ROOM",
            Self::UnknownDeviceType => "UNKNOWN_DEVICE_TYPE",
            Self::UnknownAction => "UNKNOWN_ACTION",
            Self::InvalidTemperature => "INVALID_TEMPERATURE",
            Self::MissingOrInvalidValue => "MISSING_OR_INVALID_VALUE",
            Self::DeviceNotFound => "DEVICE_NOT_FOUND",
            Self::DeviceBusy => "DEVICE_BUSY",
            Self::SensorReadFailure(_) => "SENSOR_READ_ERROR",
        }
    }

    /// Human-readable message sent alongside the code.
    pub const fn message(self) -> &'static str {
        match self {
            Self::PayloadParse => "Invalid JSON format",
            Self::MissingField => "Missing required fields: action or correlation_id",
            Self::UnknownRoom => "Unknown room ID",
            Self::UnknownDeviceType => "Device type not supported",
            Self::UnknownAction => "Unknown action for this device",
            Self::InvalidTemperature => "Temperature must be between 0 and 40",
            Self::MissingOrInvalidValue => "Turning on requires a temperature between 0 and 40",
            Self::DeviceNotFound => "Device not found in this node's configuration",
            Self::DeviceBusy => "Device is busy, command queue full",
            Self::SensorReadFailure(kind) => match kind {
                SensorKind::Temperature => "Temperature sensor read failed",
                SensorKind::Humidity => "Humidity sensor read failed",
                SensorKind::Brightness => "Brightness sensor read failed",
                SensorKind::Smoke => "Smoke sensor read failed",
                SensorKind::Gas => "Gas sensor read failed",
            },
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

// ---------------------------------------------------------------------------
// Topic grammar errors (logged, never replied)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicError {
    /// Topic does not have exactly four `/`-separated segments.
    SegmentCount,
    /// First segment is not this node's prefix.
    WrongPrefix,
    /// Last segment is not `command`.
    WrongSuffix,
    /// Room or device segment is empty.
    EmptySegment,
    /// Room or device segment exceeds the identifier limit.
    SegmentTooLong,
    /// A formatted topic would not fit the topic buffer.
    TooLong,
}

impl fmt::Display for TopicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SegmentCount => write!(f, "expected <prefix>/<room>/<device>/command"),
            Self::WrongPrefix => write!(f, "foreign topic prefix"),
            Self::WrongSuffix => write!(f, "not a command topic"),
            Self::EmptySegment => write!(f, "empty room or device segment"),
            Self::SegmentTooLong => write!(f, "room or device segment too long"),
            Self::TooLong => write!(f, "topic exceeds buffer"),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry construction errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// Capability id in the device table is not recognised.
    UnknownCapability,
    /// Two entries share the same (room, capability) identity.
    Duplicate,
    /// Room id is empty, too long, or contains topic metacharacters.
    InvalidRoomId,
    /// Device table exceeds the fixed device capacity.
    TooManyDevices,
    /// Device table names more rooms than the fixed room capacity.
    TooManyRooms,
    /// The same physical pin is bound to more than one device.
    PinConflict(u8),
    /// Topic prefix is not a single valid topic segment.
    InvalidTopicPrefix,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCapability => write!(f, "unknown capability id"),
            Self::Duplicate => write!(f, "duplicate (room, capability) entry"),
            Self::InvalidRoomId => write!(f, "invalid room id"),
            Self::TooManyDevices => write!(f, "too many devices"),
            Self::TooManyRooms => write!(f, "too many rooms"),
            Self::PinConflict(pin) => write!(f, "pin {pin} bound twice"),
            Self::InvalidTopicPrefix => write!(f, "invalid topic prefix"),
        }
    }
}
