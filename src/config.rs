//! Node configuration parameters
//!
//! Everything the node needs at startup: identity, broker, WiFi, the device
//! table and the timing knobs for connectivity and travel motion.  The value
//! is built once (from a [`profiles`](crate::profiles) table by default) and
//! handed to [`NodeService`](crate::app::service::NodeService) immutably.

use embassy_time::Duration;
use serde::{Deserialize, Serialize};

use crate::profiles::{self, NodeProfile};

/// Core node configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    // --- Identity ---
    /// Broker client id, also shown on the display.
    pub node_id: String,
    /// First topic segment shared by every node in the house.
    pub topic_prefix: String,

    // --- Network ---
    pub broker: BrokerConfig,
    pub wifi: WifiConfig,
    pub timings: ConnectivityTimings,

    // --- Devices ---
    pub devices: Vec<DeviceSpec>,
    /// Per-room AC start temperatures; rooms not listed use
    /// `default_ac_temperature_c`.
    pub ac_defaults: Vec<AcDefault>,
    pub default_ac_temperature_c: i32,
    pub travel: TravelProfile,

    // --- Sensor simulator ---
    /// Probability (0.0–1.0) that a simulated read reports "unavailable".
    pub sensor_failure_probability: f64,
    /// PRNG seed for the failure model.
    pub sensor_seed: u64,

    // --- Timing ---
    /// Main loop interval (milliseconds)
    pub control_loop_interval_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
}

impl BrokerConfig {
    /// `mqtt://host:port` form understood by the ESP-IDF client.
    pub fn url(&self) -> String {
        format!("mqtt://{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiConfig {
    pub ssid: String,
    pub password: String,
}

/// One row of the device table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSpec {
    pub room: String,
    /// Capability id as it appears in topics (`light`, `ac`, `curtain`, ...).
    pub capability: String,
    pub binding: BindingSpec,
}

impl DeviceSpec {
    pub fn new(room: &str, capability: &str, binding: BindingSpec) -> Self {
        Self {
            room: room.into(),
            capability: capability.into(),
            binding,
        }
    }
}

/// Where a device lives: a GPIO pin or the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingSpec {
    Pin(u8),
    Simulated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcDefault {
    pub room: String,
    pub temperature_c: i32,
}

/// Connect timeouts and retry back-offs for the link and the broker session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityTimings {
    pub link_connect_timeout_ms: u32,
    pub link_retry_ms: u32,
    pub link_lost_retry_ms: u32,
    pub session_connect_timeout_ms: u32,
    pub session_retry_ms: u32,
    pub session_lost_retry_ms: u32,
}

impl ConnectivityTimings {
    pub fn link_connect_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.link_connect_timeout_ms))
    }

    pub fn link_retry(&self) -> Duration {
        Duration::from_millis(u64::from(self.link_retry_ms))
    }

    pub fn link_lost_retry(&self) -> Duration {
        Duration::from_millis(u64::from(self.link_lost_retry_ms))
    }

    pub fn session_connect_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.session_connect_timeout_ms))
    }

    pub fn session_retry(&self) -> Duration {
        Duration::from_millis(u64::from(self.session_retry_ms))
    }

    pub fn session_lost_retry(&self) -> Duration {
        Duration::from_millis(u64::from(self.session_lost_retry_ms))
    }
}

impl Default for ConnectivityTimings {
    fn default() -> Self {
        Self {
            link_connect_timeout_ms: 10_000,
            link_retry_ms: 5_000,
            link_lost_retry_ms: 1_000,
            session_connect_timeout_ms: 3_000,
            session_retry_ms: 5_000,
            session_lost_retry_ms: 1_000,
        }
    }
}

/// Servo angles and phase durations of a window/curtain motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelProfile {
    pub neutral_deg: u8,
    /// Extreme driven for `ON` (open).
    pub open_deg: u8,
    /// Extreme driven for anything else (close).
    pub close_deg: u8,
    pub settle_ms: u32,
    pub hold_ms: u32,
    pub travel_ms: u32,
    pub target_hold_ms: u32,
    pub return_ms: u32,
}

impl TravelProfile {
    /// Wall time from accepting a command to recording the new status.
    pub fn total_ms(&self) -> u32 {
        self.settle_ms
            .saturating_add(self.hold_ms)
            .saturating_add(self.travel_ms)
            .saturating_add(self.target_hold_ms)
            .saturating_add(self.return_ms)
    }
}

impl Default for TravelProfile {
    fn default() -> Self {
        Self {
            neutral_deg: 90,
            open_deg: 180,
            close_deg: 0,
            settle_ms: 500,
            hold_ms: 500,
            travel_ms: 2_500,
            target_hold_ms: 2_000,
            return_ms: 500,
        }
    }
}

impl NodeConfig {
    /// Build the configuration for one of the static node profiles.
    pub fn for_profile(profile: &NodeProfile) -> Self {
        Self {
            node_id: profile.node_id.into(),
            topic_prefix: profiles::TOPIC_PREFIX.into(),
            broker: BrokerConfig {
                host: profiles::BROKER_HOST.into(),
                port: profiles::BROKER_PORT,
            },
            wifi: WifiConfig {
                ssid: profiles::WIFI_SSID.into(),
                password: profiles::WIFI_PASSWORD.into(),
            },
            timings: ConnectivityTimings::default(),
            devices: profile
                .devices
                .iter()
                .map(|&(room, cap, binding)| DeviceSpec::new(room, cap, binding))
                .collect(),
            ac_defaults: profile
                .ac_defaults
                .iter()
                .map(|&(room, temperature_c)| AcDefault {
                    room: room.into(),
                    temperature_c,
                })
                .collect(),
            default_ac_temperature_c: 26,
            travel: TravelProfile::default(),
            sensor_failure_probability: 0.05,
            sensor_seed: 0x5EED_CAFE,
            control_loop_interval_ms: 20,
        }
    }

    /// Starting AC temperature for `room`.
    pub fn ac_default_for(&self, room: &str) -> i32 {
        self.ac_defaults
            .iter()
            .find(|d| d.room == room)
            .map_or(self.default_ac_temperature_c, |d| d.temperature_c)
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self::for_profile(profiles::active())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = NodeConfig::default();
        assert_eq!(c.topic_prefix, "smarthome");
        assert!(!c.node_id.is_empty());
        assert!(!c.devices.is_empty());
        assert!(c.sensor_failure_probability > 0.0 && c.sensor_failure_probability < 1.0);
        assert!(c.control_loop_interval_ms > 0);
        assert!((0..=40).contains(&c.default_ac_temperature_c));
    }

    #[test]
    fn serde_roundtrip() {
        let c = NodeConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: NodeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c.node_id, c2.node_id);
        assert_eq!(c.devices, c2.devices);
        assert_eq!(c.timings, c2.timings);
        assert_eq!(c.travel, c2.travel);
    }

    #[test]
    fn binding_serializes_as_tagged_value() {
        let pin = serde_json::to_string(&BindingSpec::Pin(22)).unwrap();
        let sim = serde_json::to_string(&BindingSpec::Simulated).unwrap();
        assert_eq!(pin, r#"{"pin":22}"#);
        assert_eq!(sim, r#""simulated""#);
    }

    #[test]
    fn session_timeout_shorter_than_link_timeout() {
        let t = ConnectivityTimings::default();
        assert!(t.session_connect_timeout() < t.link_connect_timeout());
        assert!(t.link_lost_retry() < t.link_retry());
        assert!(t.session_lost_retry() < t.session_retry());
    }

    #[test]
    fn travel_motion_takes_about_six_seconds() {
        let p = TravelProfile::default();
        assert_eq!(p.total_ms(), 6_000);
        assert!(p.close_deg < p.neutral_deg && p.neutral_deg < p.open_deg);
    }

    #[test]
    fn travel_total_saturates_on_huge_phases() {
        let p = TravelProfile {
            travel_ms: u32::MAX,
            return_ms: u32::MAX,
            ..TravelProfile::default()
        };
        assert_eq!(p.total_ms(), u32::MAX);
    }

    #[test]
    fn ac_default_falls_back() {
        let mut c = NodeConfig::default();
        c.ac_defaults = vec![AcDefault {
            room: "bedroom".into(),
            temperature_c: 24,
        }];
        assert_eq!(c.ac_default_for("bedroom"), 24);
        assert_eq!(c.ac_default_for("attic"), c.default_ac_temperature_c);
    }

    #[test]
    fn broker_url_format() {
        let b = BrokerConfig {
            host: "192.168.3.100".into(),
            port: 1883,
        };
        assert_eq!(b.url(), "mqtt://192.168.3.100:1883");
    }
}
