//! Static node profiles.
//!
//! Single source of truth for which devices each physical node owns and
//! which GPIO drives them.  The device ids here are matched byte-for-byte
//! against topic segments, so they must stay in sync with the home server's
//! device registry.
//!
//! | Node           | Role                                       |
//! |----------------|--------------------------------------------|
//! | `ESP32_Node_1` | lights, doors, windows, curtains, hood, fan |
//! | `ESP32_Node_2` | simulated sensors, air conditioners        |

use crate::config::BindingSpec::{self, Pin, Simulated};

// ---------------------------------------------------------------------------
// Shared network settings
// ---------------------------------------------------------------------------

pub const TOPIC_PREFIX: &str = "smarthome";
pub const BROKER_HOST: &str = "192.168.3.100";
pub const BROKER_PORT: u16 = 1883;
pub const WIFI_SSID: &str = "IOT-Router";
pub const WIFI_PASSWORD: &str = "1234567890";

/// A node's identity and device table.
#[derive(Debug)]
pub struct NodeProfile {
    pub node_id: &'static str,
    /// `(room, capability, binding)` rows.
    pub devices: &'static [(&'static str, &'static str, BindingSpec)],
    /// `(room, temperature)` AC start values.
    pub ac_defaults: &'static [(&'static str, i32)],
}

// ---------------------------------------------------------------------------
// Node 1: actuator node
// ---------------------------------------------------------------------------

pub static NODE_1: NodeProfile = NodeProfile {
    node_id: "ESP32_Node_1",
    devices: &[
        // livingroom
        ("livingroom", "light", Pin(22)),
        ("livingroom", "window", Pin(19)),
        ("livingroom", "door", Pin(17)),
        ("livingroom", "curtain", Pin(16)),
        // bedroom
        ("bedroom", "light", Pin(4)),
        ("bedroom", "bedside_light", Pin(2)),
        ("bedroom", "window", Pin(32)),
        ("bedroom", "door", Pin(33)),
        ("bedroom", "curtain", Pin(25)),
        // kitchen
        ("kitchen", "light", Pin(26)),
        ("kitchen", "hood", Pin(27)),
        // bathroom
        ("bathroom", "light", Pin(14)),
        ("bathroom", "fan", Pin(13)),
        ("bathroom", "door", Pin(12)),
    ],
    ac_defaults: &[],
};

// ---------------------------------------------------------------------------
// Node 2: sensor / climate node
// ---------------------------------------------------------------------------

// GPIO 34 is input-only on the ESP32, so the bedroom AC relay sits on
// GPIO 33.
pub static NODE_2: NodeProfile = NodeProfile {
    node_id: "ESP32_Node_2",
    devices: &[
        ("livingroom", "temp_sensor", Simulated),
        ("livingroom", "humidity_sensor", Simulated),
        ("livingroom", "brightness_sensor", Simulated),
        ("livingroom", "ac", Pin(21)),
        ("bedroom", "temp_sensor", Simulated),
        ("bedroom", "humidity_sensor", Simulated),
        ("bedroom", "brightness_sensor", Simulated),
        ("bedroom", "ac", Pin(33)),
        ("kitchen", "temp_sensor", Simulated),
        ("kitchen", "humidity_sensor", Simulated),
        ("kitchen", "smoke_sensor", Simulated),
        ("kitchen", "gas_sensor", Simulated),
        ("bathroom", "temp_sensor", Simulated),
        ("bathroom", "humidity_sensor", Simulated),
        ("outdoor", "temp_sensor", Simulated),
        ("outdoor", "humidity_sensor", Simulated),
        ("outdoor", "brightness_sensor", Simulated),
    ],
    ac_defaults: &[("livingroom", 26), ("bedroom", 24)],
};

/// Profile selected by the `node2` cargo feature.
pub fn active() -> &'static NodeProfile {
    if cfg!(feature = "node2") {
        &NODE_2
    } else {
        &NODE_1
    }
}

// ---------------------------------------------------------------------------
// Simulated sensor start values
// ---------------------------------------------------------------------------

/// Start values for one room's simulated sensors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomSensorDefaults {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub brightness_lux: f32,
    pub smoke_ppm: f32,
    pub gas_ppm: f32,
}

/// Used for rooms missing from [`SENSOR_DEFAULTS`].
pub const FALLBACK_SENSOR_DEFAULTS: RoomSensorDefaults = RoomSensorDefaults {
    temperature_c: 22.0,
    humidity_pct: 50.0,
    brightness_lux: 300.0,
    smoke_ppm: 0.0,
    gas_ppm: 0.0,
};

pub const SENSOR_DEFAULTS: &[(&str, RoomSensorDefaults)] = &[
    (
        "livingroom",
        RoomSensorDefaults {
            temperature_c: 24.5,
            humidity_pct: 45.2,
            brightness_lux: 350.0,
            smoke_ppm: 0.0,
            gas_ppm: 0.0,
        },
    ),
    (
        "bedroom",
        RoomSensorDefaults {
            temperature_c: 23.8,
            humidity_pct: 48.5,
            brightness_lux: 120.0,
            smoke_ppm: 0.0,
            gas_ppm: 0.0,
        },
    ),
    (
        "kitchen",
        RoomSensorDefaults {
            temperature_c: 26.1,
            humidity_pct: 52.3,
            brightness_lux: 400.0,
            smoke_ppm: 15.0,
            gas_ppm: 8.0,
        },
    ),
    (
        "bathroom",
        RoomSensorDefaults {
            temperature_c: 25.3,
            humidity_pct: 65.8,
            brightness_lux: 200.0,
            smoke_ppm: 0.0,
            gas_ppm: 0.0,
        },
    ),
    (
        "outdoor",
        RoomSensorDefaults {
            temperature_c: 20.0,
            humidity_pct: 60.0,
            brightness_lux: 10_000.0,
            smoke_ppm: 0.0,
            gas_ppm: 0.0,
        },
    ),
];

/// Start values for `room`, falling back to neutral indoor values.
pub fn sensor_defaults(room: &str) -> RoomSensorDefaults {
    SENSOR_DEFAULTS
        .iter()
        .find(|(r, _)| *r == room)
        .map_or(FALLBACK_SENSOR_DEFAULTS, |(_, d)| *d)
}
