//! Link / session supervision through the full service tick.

use crate::harness::{Harness, test_config};

#[test]
fn comes_up_link_first_then_session() {
    let mut h = Harness::new(test_config());
    let s = h.tick();
    assert!(!s.link_up && !s.session_up);
    let s = h.tick();
    assert!(s.link_up && !s.session_up);
    let s = h.tick();
    assert!(s.link_up && s.session_up);
    assert_eq!(h.sink.count("ConnectivityChanged"), 2);
    assert_eq!(h.node.connectivity().link_attempts(), 1);
    assert_eq!(h.node.connectivity().session_attempts(), 1);
}

#[test]
fn link_attempt_times_out_and_retries_after_backoff() {
    let mut h = Harness::new(test_config());
    h.wifi.set_reachable(false);
    let t = h.config.timings;
    h.run_for(u64::from(t.link_connect_timeout_ms) + 100);
    assert_eq!(h.wifi.attempts(), 1);
    h.run_for(u64::from(t.link_retry_ms));
    assert_eq!(h.wifi.attempts(), 2);
    assert_eq!(h.node.connectivity().link_attempts(), 2);
    assert!(!h.node.status().link_up);
    assert_eq!(h.sink.count("ConnectivityChanged"), 0);
}

#[test]
fn access_point_appearing_completes_pending_attempt() {
    let mut h = Harness::new(test_config());
    h.wifi.set_reachable(false);
    h.run_for(2_000);
    h.wifi.set_reachable(true);
    h.run_for(100);
    assert!(h.node.status().link_up);
    assert!(h.node.status().session_up);
    assert_eq!(h.wifi.attempts(), 1);
}

#[test]
fn session_attempt_times_out_while_link_stays_up() {
    let mut h = Harness::new(test_config());
    h.mqtt.set_broker_reachable(false);
    let t = h.config.timings;
    h.run_for(u64::from(t.session_connect_timeout_ms) + 100);
    assert!(h.node.status().link_up);
    assert_eq!(h.node.connectivity().session_attempts(), 1);
    h.run_for(u64::from(t.session_retry_ms));
    assert_eq!(h.node.connectivity().session_attempts(), 2);
    assert!(!h.node.status().session_up);
}

#[test]
fn link_loss_drops_session_in_the_same_tick() {
    let mut h = Harness::new(test_config());
    h.connect();
    h.sink.clear();
    h.wifi.set_reachable(false);
    let s = h.tick();
    assert!(!s.link_up && !s.session_up);
    assert!(h.mqtt.subscriptions().is_empty());
    assert_eq!(h.sink.count("ConnectivityChanged"), 1);
}

#[test]
fn queued_messages_are_handled_even_if_session_drops() {
    let mut h = Harness::new(test_config());
    h.connect();
    h.sink.clear();
    h.command("livingroom", "light", r#"{"action":"ON","correlation_id":"late"}"#);
    h.mqtt.set_broker_reachable(false);
    h.tick();
    assert_eq!(h.hw.level(22), Some(true));
    assert_eq!(h.sink.count("CommandHandled"), 1);
    assert_eq!(h.sink.count("PublishFailed"), 1);
}

#[test]
fn recovers_after_link_loss() {
    let mut h = Harness::new(test_config());
    h.connect();
    h.wifi.set_reachable(false);
    h.tick();
    h.wifi.set_reachable(true);
    h.run_for(u64::from(h.config.timings.link_lost_retry_ms) + 200);
    assert!(h.node.status().session_up);
    assert_eq!(h.node.connectivity().link_attempts(), 2);
    assert_eq!(h.node.connectivity().session_attempts(), 2);
    assert_eq!(h.sink.count("Subscribed"), 2);
}
