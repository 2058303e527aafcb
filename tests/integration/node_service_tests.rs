//! End-to-end tests: inbound MQTT message → NodeService → GPIO/servo
//! output and published reply.

use serde_json::json;

use crate::harness::{Harness, test_config};

fn connected() -> Harness {
    let mut h = Harness::new(test_config());
    h.connect();
    h.sink.clear();
    h.replies();
    h
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_drives_relays_low_and_parks_servos() {
    let h = Harness::new(test_config());
    assert_eq!(h.hw.level(22), Some(false));
    assert_eq!(h.hw.level(21), Some(false));
    assert_eq!(h.hw.level(4), Some(false));
    assert_eq!(h.hw.angle(19), Some(90));
    assert_eq!(h.hw.angle(16), Some(90));
    assert_eq!(h.sink.count("Started"), 1);
}

#[test]
fn session_up_subscribes_every_device() {
    let mut h = Harness::new(test_config());
    h.connect();
    let subs = h.mqtt.subscriptions();
    assert_eq!(subs.len(), 8);
    assert!(subs.iter().any(|t| t == "smarthome/livingroom/light/command"));
    assert!(subs.iter().any(|t| t == "smarthome/kitchen/hood/command"));
    assert_eq!(h.sink.count("Subscribed"), 1);
}

#[test]
fn prefix_that_is_not_one_segment_is_rejected() {
    use homenode::app::service::NodeService;
    use homenode::error::RegistryError;

    for prefix in ["home/a", "", "home/+", "#"] {
        let mut cfg = test_config();
        cfg.topic_prefix = prefix.into();
        assert_eq!(
            NodeService::new(&cfg).err(),
            Some(RegistryError::InvalidTopicPrefix),
            "{prefix}"
        );
    }
}

#[test]
fn custom_prefix_round_trips_commands() {
    let mut cfg = test_config();
    cfg.topic_prefix = "home_a".into();
    let mut h = Harness::new(cfg);
    h.connect();
    assert!(h.mqtt.subscriptions().iter().all(|t| t.starts_with("home_a/")));
    h.replies();

    assert!(h.command("bedroom", "light", r#"{"action":"ON","correlation_id":"pfx"}"#));
    h.tick();
    assert_eq!(h.hw.level(4), Some(true));
    let replies = h.replies();
    assert_eq!(replies[0].0, "home_a/bedroom/light/state");
    assert_eq!(replies[0].1["correlation_id"], "pfx");
}

// ── Binary devices ────────────────────────────────────────────

#[test]
fn light_on_then_off() {
    let mut h = connected();
    assert!(h.command("livingroom", "light", r#"{"action":"ON","correlation_id":"c1"}"#));
    h.tick();
    assert_eq!(h.hw.level(22), Some(true));
    let replies = h.replies();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].0, "smarthome/livingroom/light/state");
    assert_eq!(replies[0].1, json!({"state": "ON", "correlation_id": "c1"}));

    h.command("livingroom", "light", r#"{"action":"OFF","correlation_id":"c2"}"#);
    h.tick();
    assert_eq!(h.hw.level(22), Some(false));
    assert_eq!(h.replies()[0].1["state"], "OFF");
}

#[test]
fn unknown_binary_action_switches_off() {
    let mut h = connected();
    h.command("bedroom", "light", r#"{"action":"ON","correlation_id":"a"}"#);
    h.tick();
    h.command("bedroom", "light", r#"{"action":"TOGGLE","correlation_id":"b"}"#);
    h.tick();
    assert_eq!(h.hw.level(4), Some(false));
    assert_eq!(h.replies()[1].1, json!({"state": "TOGGLE", "correlation_id": "b"}));
}

#[test]
fn simulated_binary_device_acknowledges_without_output() {
    let mut h = connected();
    h.command("kitchen", "hood", r#"{"action":"ON","correlation_id":"h"}"#);
    h.tick();
    assert_eq!(h.replies()[0].1["state"], "ON");
}

#[test]
fn malformed_payload_gets_error_reply() {
    let mut h = connected();
    h.command("livingroom", "light", "{not json");
    h.command("livingroom", "light", r#"{"action":"ON"}"#);
    h.tick();
    let replies = h.replies();
    assert_eq!(replies[0].1["error_code"], "JSON_PARSE_ERROR");
    assert_eq!(replies[0].1["correlation_id"], "unknown");
    assert_eq!(replies[1].1["error_code"], "MISSING_REQUIRED_FIELDS");
    assert_eq!(replies[1].1["state"], "ERROR");
    assert_eq!(h.hw.level(22), Some(false));
    assert_eq!(h.sink.count("CommandHandled"), 2);
}

// ── Air conditioner ───────────────────────────────────────────

#[test]
fn ac_on_requires_in_range_value() {
    let mut h = connected();
    h.command("livingroom", "ac", r#"{"action":"ON","correlation_id":"x"}"#);
    h.command("livingroom", "ac", r#"{"action":"ON","value":41,"correlation_id":"y"}"#);
    h.tick();
    let replies = h.replies();
    assert!(replies.iter().all(|(_, r)| r["error_code"] == "MISSING_OR_INVALID_VALUE"));
    assert_eq!(h.hw.level(21), Some(false));

    h.command("livingroom", "ac", r#"{"action":"ON","value":22,"correlation_id":"z"}"#);
    h.tick();
    assert_eq!(h.hw.level(21), Some(true));
    assert_eq!(h.replies()[0].1, json!({"state": "ON", "correlation_id": "z"}));
}

#[test]
fn ac_set_temp_replies_with_temperature() {
    let mut h = connected();
    h.command("livingroom", "ac", r#"{"action":"SET_TEMP","value":30,"correlation_id":"t"}"#);
    h.tick();
    assert_eq!(
        h.replies()[0].1,
        json!({"state": "SET_TEMP", "correlation_id": "t", "temperature": 30, "unit": "°C"})
    );

    h.command("livingroom", "ac", r#"{"action":"SET_TEMP","value":45,"correlation_id":"u"}"#);
    h.tick();
    assert_eq!(h.replies()[0].1["error_code"], "INVALID_TEMPERATURE");
}

// ── Sensors ───────────────────────────────────────────────────

#[cfg(feature = "sensor-sim")]
#[test]
fn sensor_read_reports_simulated_value() {
    let mut h = connected();
    h.command("livingroom", "temp_sensor", r#"{"action":"READ","correlation_id":"s"}"#);
    h.command("bedroom", "humidity_sensor", r#"{"action":"READ","correlation_id":"r"}"#);
    h.tick();
    let replies = h.replies();
    assert_eq!(
        replies[0].1,
        json!({"state": "READ", "correlation_id": "s", "value": 24.5, "unit": "°C"})
    );
    assert_eq!(replies[1].0, "smarthome/bedroom/humidity_sensor/state");
    assert_eq!(replies[1].1["value"], 48.5);
    assert_eq!(replies[1].1["unit"], "%");
}

#[cfg(feature = "sensor-sim")]
#[test]
fn sensor_failures_produce_error_replies() {
    let mut cfg = test_config();
    cfg.sensor_failure_probability = 1.0;
    let mut h = Harness::new(cfg);
    h.connect();
    h.command("livingroom", "temp_sensor", r#"{"action":"READ","correlation_id":"f"}"#);
    h.tick();
    let replies = h.replies();
    assert_eq!(replies[0].1["error_code"], "SENSOR_READ_ERROR");
    assert_eq!(replies[0].1["error_message"], "Temperature sensor read failed");
}

// ── Travel devices ────────────────────────────────────────────

#[test]
fn window_reply_deferred_until_motion_completes() {
    let mut h = connected();
    h.command("livingroom", "window", r#"{"action":"ON","correlation_id":"w"}"#);
    h.tick();
    assert!(h.replies().is_empty());
    assert_eq!(h.sink.count("CommandDeferred"), 1);

    h.run_for(3_000);
    assert!(h.replies().is_empty(), "no reply mid-motion");
    assert_eq!(h.hw.angle(19), Some(180));

    h.run_for(4_000);
    let replies = h.replies();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].0, "smarthome/livingroom/window/state");
    assert_eq!(replies[0].1, json!({"state": "ON", "correlation_id": "w"}));
    assert_eq!(h.hw.angle(19), Some(90));
    assert_eq!(h.sink.count("MotionCompleted"), 1);
}

#[test]
fn closing_a_closed_curtain_is_answered_immediately() {
    let mut h = connected();
    h.command("livingroom", "curtain", r#"{"action":"OFF","correlation_id":"c"}"#);
    h.tick();
    assert_eq!(h.replies()[0].1["state"], "OFF");
    assert_eq!(h.hw.angle(16), Some(90));
}

#[test]
fn travel_commands_queue_behind_motion() {
    let mut h = connected();
    h.command("livingroom", "curtain", r#"{"action":"ON","correlation_id":"1"}"#);
    h.command("livingroom", "curtain", r#"{"action":"OFF","correlation_id":"2"}"#);
    h.tick();
    h.run_for(7_000);
    let replies = h.replies();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].1["correlation_id"], "1");

    h.run_for(7_000);
    let replies = h.replies();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].1["correlation_id"], "2");
    assert_eq!(replies[0].1["state"], "OFF");
}

#[test]
fn fifth_queued_travel_command_is_busy() {
    let mut h = connected();
    for i in 0..6 {
        let payload = format!(r#"{{"action":"ON","correlation_id":"q{i}"}}"#);
        assert!(h.command("livingroom", "window", &payload));
    }
    h.tick();
    let replies = h.replies();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].1["correlation_id"], "q5");
    assert_eq!(replies[0].1["error_code"], "DEVICE_BUSY");
}

// ── Connectivity interplay ────────────────────────────────────

#[test]
fn motion_continues_while_disconnected() {
    let mut h = connected();
    h.command("livingroom", "window", r#"{"action":"ON","correlation_id":"w"}"#);
    h.tick();
    h.wifi.set_reachable(false);
    h.run_for(7_000);
    assert!(!h.node.status().link_up);
    assert_eq!(h.hw.angle(19), Some(90));
    assert!(h.replies().is_empty(), "completion reply cannot be published offline");
    assert_eq!(h.sink.count("PublishFailed"), 1);
    assert_eq!(h.sink.count("MotionCompleted"), 1);
}

#[test]
fn resubscribes_after_reconnect() {
    let mut h = connected();
    h.mqtt.set_broker_reachable(false);
    h.tick();
    assert!(!h.node.status().session_up);
    h.mqtt.set_broker_reachable(true);
    let retry = u64::from(h.config.timings.session_lost_retry_ms);
    h.run_for(retry + 200);
    assert!(h.node.status().session_up);
    assert_eq!(h.mqtt.subscriptions().len(), 8);
    assert_eq!(h.sink.count("Subscribed"), 1);
}

// ── Simulator panel ───────────────────────────────────────────

#[cfg(feature = "sensor-sim")]
#[test]
fn panel_edit_changes_next_reading() {
    use homenode::app::events::InputEvent;
    use homenode::app::panel::SimulatorPanel;

    let mut h = connected();
    let mut panel = SimulatorPanel::new();
    // livingroom is the first room; enter edit on temperature
    h.node.apply_input(&mut panel, InputEvent::Press, &mut h.sink);
    h.node.apply_input(&mut panel, InputEvent::Press, &mut h.sink);
    h.node.apply_input(&mut panel, InputEvent::Clockwise, &mut h.sink);
    h.node.apply_input(&mut panel, InputEvent::Clockwise, &mut h.sink);
    assert_eq!(h.sink.count("SensorAdjusted"), 2);
    assert!(h.node.take_redraw());

    h.command("livingroom", "temp_sensor", r#"{"action":"READ","correlation_id":"p"}"#);
    h.tick();
    assert_eq!(h.replies()[0].1["value"], 25.5);
}

#[cfg(feature = "sensor-sim")]
#[test]
fn panel_status_page_shows_session_state() {
    use homenode::app::events::InputEvent;
    use homenode::app::panel::{PanelMode, SimulatorPanel};

    let mut h = connected();
    let mut panel = SimulatorPanel::new();
    h.node.take_redraw();

    h.node.apply_input(&mut panel, InputEvent::Back, &mut h.sink);
    assert_eq!(panel.mode(), PanelMode::Status);
    let now = h.now();
    h.node.refresh_panel(&mut panel, now);
    assert!(panel.connectivity().link_up);
    assert!(panel.connectivity().session_up);
    assert!(h.node.take_redraw());

    h.mqtt.set_broker_reachable(false);
    h.run_for(2_000);
    let now = h.now();
    h.node.refresh_panel(&mut panel, now);
    assert!(!panel.connectivity().session_up);
    assert!(h.node.take_redraw());
}
