//! Host harness: a [`NodeService`] wired to the simulated WiFi, MQTT and
//! GPIO adapters plus a recording event sink.
//!
//! Time is virtual.  Every [`Harness::tick`] advances the clock by the
//! configured control-loop interval.

use embassy_sync::channel::Channel;
use embassy_time::Instant;
use serde_json::Value;

use homenode::adapters::hardware::HardwareAdapter;
use homenode::adapters::mqtt::{InboundChannel, MqttAdapter};
use homenode::adapters::wifi::WifiAdapter;
use homenode::app::events::NodeEvent;
use homenode::app::ports::EventSink;
use homenode::app::service::NodeService;
use homenode::config::{BindingSpec, DeviceSpec, NodeConfig};
use homenode::connectivity::ConnectivityStatus;

// ── Recording sink ────────────────────────────────────────────

/// Keeps the `Debug` rendering of every event.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<String>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, variant: &str) -> usize {
        self.events.iter().filter(|e| e.starts_with(variant)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &NodeEvent<'_>) {
        self.events.push(format!("{:?}", event));
    }
}

// ── Fixture config ────────────────────────────────────────────

/// A small mixed device table independent of the active node profile.
pub fn test_config() -> NodeConfig {
    let mut cfg = NodeConfig::default();
    cfg.node_id = "ESP32_Test_Node".into();
    cfg.devices = vec![
        DeviceSpec::new("livingroom", "light", BindingSpec::Pin(22)),
        DeviceSpec::new("livingroom", "window", BindingSpec::Pin(19)),
        DeviceSpec::new("livingroom", "curtain", BindingSpec::Pin(16)),
        DeviceSpec::new("livingroom", "ac", BindingSpec::Pin(21)),
        DeviceSpec::new("livingroom", "temp_sensor", BindingSpec::Simulated),
        DeviceSpec::new("bedroom", "light", BindingSpec::Pin(4)),
        DeviceSpec::new("bedroom", "humidity_sensor", BindingSpec::Simulated),
        DeviceSpec::new("kitchen", "hood", BindingSpec::Simulated),
    ];
    cfg.sensor_failure_probability = 0.0;
    cfg
}

// ── Harness ───────────────────────────────────────────────────

pub struct Harness {
    pub node: NodeService,
    pub wifi: WifiAdapter,
    pub mqtt: MqttAdapter,
    pub hw: HardwareAdapter,
    pub sink: RecordingSink,
    pub config: NodeConfig,
    now_ms: u64,
}

#[allow(dead_code)]
impl Harness {
    pub fn new(config: NodeConfig) -> Self {
        let inbound: &'static InboundChannel = Box::leak(Box::new(Channel::new()));
        let mut wifi = WifiAdapter::new();
        wifi.set_credentials(&config.wifi.ssid, &config.wifi.password)
            .unwrap();
        let mqtt = MqttAdapter::new(config.broker.url(), inbound);
        let mut hw = HardwareAdapter::new();
        let mut sink = RecordingSink::default();
        let mut node = NodeService::new(&config).unwrap();
        node.start(&mut hw, &mut sink);
        Self {
            node,
            wifi,
            mqtt,
            hw,
            sink,
            config,
            now_ms: 0,
        }
    }

    pub fn now(&self) -> Instant {
        Instant::from_millis(self.now_ms)
    }

    pub fn tick(&mut self) -> ConnectivityStatus {
        let status = self.node.tick(
            self.now(),
            &mut self.wifi,
            &mut self.mqtt,
            &mut self.hw,
            &mut self.sink,
        );
        self.now_ms += u64::from(self.config.control_loop_interval_ms);
        status
    }

    /// Tick until `ms` of virtual time have passed.
    pub fn run_for(&mut self, ms: u64) {
        let until = self.now_ms + ms;
        while self.now_ms < until {
            self.tick();
        }
    }

    /// Tick until the broker session is up.
    pub fn connect(&mut self) {
        for _ in 0..10 {
            if self.tick().session_up {
                return;
            }
        }
        panic!("session did not come up: {:?}", self.node.status());
    }

    /// Deliver `payload` on `<prefix>/<room>/<device>/command`.
    pub fn command(&mut self, room: &str, device: &str, payload: &str) -> bool {
        let topic = format!("{}/{}/{}/command", self.config.topic_prefix, room, device);
        self.mqtt.inject(&topic, payload.as_bytes())
    }

    /// Published replies since the last call, payloads parsed as JSON.
    pub fn replies(&mut self) -> Vec<(String, Value)> {
        self.mqtt
            .take_published()
            .into_iter()
            .map(|(topic, payload)| (topic, serde_json::from_slice(&payload).unwrap()))
            .collect()
    }
}
