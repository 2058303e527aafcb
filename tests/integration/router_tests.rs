//! CommandRouter against the shipped node profiles and real adapters.

use embassy_time::Instant;
use serde_json::Value;

use homenode::adapters::hardware::HardwareAdapter;
use homenode::config::NodeConfig;
use homenode::devices::DeviceBank;
use homenode::profiles::{NODE_1, NODE_2};
use homenode::protocol::router::{CommandRouter, Routed};
use homenode::registry::{CapabilityKind, Registry, ResourceBinding};

struct Bench {
    router: CommandRouter,
    registry: Registry,
    devices: DeviceBank,
    hw: HardwareAdapter,
}

impl Bench {
    fn new(config: &NodeConfig) -> Self {
        let registry = Registry::build(&config.devices).unwrap();
        let devices = DeviceBank::new(&registry, config);
        let mut hw = HardwareAdapter::new();
        devices.init_outputs(&registry, &mut hw);
        Self {
            router: CommandRouter::new(&config.topic_prefix),
            registry,
            devices,
            hw,
        }
    }

    fn send(&mut self, topic: &str, payload: &str) -> Routed {
        self.router.route(
            topic,
            payload.as_bytes(),
            &self.registry,
            &mut self.devices,
            &mut self.hw,
            Instant::from_millis(0),
        )
    }
}

fn body(routed: &Routed) -> Value {
    match routed {
        Routed::Reply(out) => serde_json::from_slice(&out.payload).unwrap(),
        other => panic!("expected reply, got {other:?}"),
    }
}

#[test]
fn both_profiles_build_valid_registries() {
    for profile in [&NODE_1, &NODE_2] {
        let cfg = NodeConfig::for_profile(profile);
        let reg = Registry::build(&cfg.devices).unwrap();
        assert_eq!(reg.len(), profile.devices.len(), "{}", profile.node_id);
    }
}

#[test]
fn every_node1_relay_switches_its_pin() {
    let cfg = NodeConfig::for_profile(&NODE_1);
    let mut b = Bench::new(&cfg);
    let relays: Vec<_> = b
        .registry
        .devices()
        .filter(|(_, d)| d.capability.kind() == CapabilityKind::Binary)
        .map(|(_, d)| (b.registry.room_name(d.room).to_owned(), d.capability.id(), d.binding))
        .collect();
    assert!(!relays.is_empty());

    for (room, device, binding) in relays {
        let topic = format!("smarthome/{room}/{device}/command");
        let r = b.send(&topic, r#"{"action":"ON","correlation_id":"p"}"#);
        assert_eq!(body(&r)["state"], "ON", "{topic}");
        if let ResourceBinding::Pin(pin) = binding {
            assert_eq!(b.hw.level(pin), Some(true), "{topic}");
        }
    }
}

#[test]
fn node1_has_no_air_conditioner() {
    let cfg = NodeConfig::for_profile(&NODE_1);
    let mut b = Bench::new(&cfg);
    let r = b.send(
        "smarthome/livingroom/ac/command",
        r#"{"action":"ON","value":24,"correlation_id":"n"}"#,
    );
    assert_eq!(body(&r)["error_code"], "DEVICE_NOT_FOUND");
}

#[test]
fn node2_ac_defaults_and_pins() {
    let cfg = NodeConfig::for_profile(&NODE_2);
    let mut b = Bench::new(&cfg);
    let bedroom = b.devices.climate.state(&b.registry, "bedroom").unwrap();
    assert_eq!(bedroom.target_temperature, 24);
    assert!(!bedroom.is_on);

    let r = b.send(
        "smarthome/bedroom/ac/command",
        r#"{"action":"ON","value":20,"correlation_id":"b"}"#,
    );
    assert_eq!(body(&r)["state"], "ON");
    assert_eq!(b.hw.level(33), Some(true));
}

#[cfg(feature = "sensor-sim")]
#[test]
fn node2_kitchen_safety_sensors_read() {
    let mut cfg = NodeConfig::for_profile(&NODE_2);
    cfg.sensor_failure_probability = 0.0;
    let mut b = Bench::new(&cfg);
    for (device, unit) in [("smoke_sensor", "ppm"), ("gas_sensor", "ppm")] {
        let r = b.send(
            &format!("smarthome/kitchen/{device}/command"),
            r#"{"action":"READ","correlation_id":"k"}"#,
        );
        let v = body(&r);
        assert_eq!(v["state"], "READ", "{device}");
        assert_eq!(v["unit"], unit);
    }
}

#[test]
fn topic_grammar_violations_are_dropped_silently() {
    let cfg = NodeConfig::for_profile(&NODE_1);
    let mut b = Bench::new(&cfg);
    let payload = r#"{"action":"ON","correlation_id":"x"}"#;
    for topic in [
        "smarthome/livingroom/light",
        "smarthome/livingroom/light/command/extra",
        "SmartHome/livingroom/light/command",
        "other/livingroom/light/command",
        "smarthome/livingroom/light/COMMAND",
        "smarthome//light/command",
        "smarthome/livingroom//command",
        "",
    ] {
        assert_eq!(b.send(topic, payload), Routed::Dropped, "{topic:?}");
    }
    assert_eq!(b.hw.level(22), Some(false));
}

#[test]
fn travel_start_is_deferred_and_drives_servo() {
    let cfg = NodeConfig::for_profile(&NODE_1);
    let mut b = Bench::new(&cfg);
    let r = b.send(
        "smarthome/bedroom/window/command",
        r#"{"action":"ON","correlation_id":"w"}"#,
    );
    assert_eq!(r, Routed::Deferred);
    assert_eq!(b.hw.angle(32), Some(90));
    assert!(b.devices.travel.any_moving());
}
