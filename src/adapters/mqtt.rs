//! MQTT broker session adapter.
//!
//! Implements [`SessionPort`].  The broker client's callback runs on the
//! client task; it only copies received messages into a bounded
//! [`InboundChannel`] that the control loop drains each tick.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::mqtt::client::EspMqttClient`
//!   with a static callback.
//! - **all other targets**: an in-process loopback broker.  Tests inject
//!   messages on subscribed topics and inspect what was published.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{debug, info, warn};

use crate::app::ports::{InboundMessage, SessionError, SessionPort};

/// Messages buffered between the client callback and the control loop.
pub const INBOUND_DEPTH: usize = 8;

pub type InboundChannel = Channel<CriticalSectionRawMutex, InboundMessage, INBOUND_DEPTH>;

/// Copy one received message into the channel.  Drops (with a warning)
/// anything that does not fit.
fn enqueue_inbound(inbound: &InboundChannel, topic: &str, payload: &[u8]) -> bool {
    let Some(msg) = InboundMessage::new(topic, payload) else {
        warn!("MQTT: dropping oversized message on {} ({} bytes)", topic, payload.len());
        return false;
    };
    if inbound.try_send(msg).is_err() {
        warn!("MQTT: inbound queue full, dropping message on {}", topic);
        return false;
    }
    true
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF client
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod platform {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use esp_idf_svc::mqtt::client::{
        Details, EspMqttClient, EventPayload, MqttClientConfiguration, QoS,
    };
    use log::{info, warn};

    use super::{InboundChannel, enqueue_inbound};
    use crate::app::ports::SessionError;

    pub struct Client {
        url: String,
        client: Option<EspMqttClient<'static>>,
        connected: Arc<AtomicBool>,
        inbound: &'static InboundChannel,
    }

    impl Client {
        pub fn new(url: String, inbound: &'static InboundChannel) -> Self {
            Self {
                url,
                client: None,
                connected: Arc::new(AtomicBool::new(false)),
                inbound,
            }
        }

        pub fn connect(&mut self, client_id: &str) -> Result<(), SessionError> {
            self.client = None;
            self.connected.store(false, Ordering::Release);

            let conf = MqttClientConfiguration {
                client_id: Some(client_id),
                ..Default::default()
            };
            let connected = Arc::clone(&self.connected);
            let inbound = self.inbound;
            let client = EspMqttClient::new_cb(&self.url, &conf, move |event| {
                match event.payload() {
                    EventPayload::Connected(_) => connected.store(true, Ordering::Release),
                    EventPayload::Disconnected => connected.store(false, Ordering::Release),
                    EventPayload::Received {
                        topic: Some(topic),
                        data,
                        details: Details::Complete,
                        ..
                    } => {
                        enqueue_inbound(inbound, topic, data);
                    }
                    EventPayload::Received { .. } => {
                        warn!("MQTT: chunked message ignored");
                    }
                    EventPayload::Error(e) => warn!("MQTT: client error {:?}", e),
                    _ => {}
                }
            })
            .map_err(|e| {
                warn!("MQTT: client init failed: {}", e);
                SessionError::ClientInit
            })?;
            info!("MQTT: client started for {}", self.url);
            self.client = Some(client);
            Ok(())
        }

        pub fn is_connected(&self) -> bool {
            self.client.is_some() && self.connected.load(Ordering::Acquire)
        }

        pub fn abort(&mut self) {
            self.client = None;
            self.connected.store(false, Ordering::Release);
        }

        pub fn subscribe(&mut self, topic: &str) -> Result<(), SessionError> {
            let client = self.client.as_mut().ok_or(SessionError::NotConnected)?;
            client
                .subscribe(topic, QoS::AtMostOnce)
                .map(|_| ())
                .map_err(|_| SessionError::SubscribeFailed)
        }

        pub fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), SessionError> {
            let client = self.client.as_mut().ok_or(SessionError::NotConnected)?;
            client
                .enqueue(topic, QoS::AtMostOnce, false, payload)
                .map(|_| ())
                .map_err(|_| SessionError::PublishFailed)
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Host loopback broker
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod platform {
    use log::info;

    use super::{InboundChannel, enqueue_inbound};
    use crate::app::ports::SessionError;

    pub struct Client {
        url: String,
        broker_reachable: bool,
        attempting: bool,
        connected: bool,
        pub(super) subscriptions: Vec<String>,
        pub(super) published: Vec<(String, Vec<u8>)>,
        inbound: &'static InboundChannel,
    }

    impl Client {
        pub fn new(url: String, inbound: &'static InboundChannel) -> Self {
            Self {
                url,
                broker_reachable: true,
                attempting: false,
                connected: false,
                subscriptions: Vec::new(),
                published: Vec::new(),
                inbound,
            }
        }

        pub fn connect(&mut self, client_id: &str) -> Result<(), SessionError> {
            self.subscriptions.clear();
            self.attempting = true;
            self.connected = self.broker_reachable;
            info!("MQTT(sim): '{}' connecting to {}", client_id, self.url);
            Ok(())
        }

        pub fn poll(&mut self) {
            if self.attempting && self.broker_reachable {
                self.connected = true;
            }
        }

        pub fn is_connected(&self) -> bool {
            self.connected
        }

        pub fn abort(&mut self) {
            self.attempting = false;
            self.connected = false;
            self.subscriptions.clear();
        }

        pub fn set_broker_reachable(&mut self, reachable: bool) {
            self.broker_reachable = reachable;
            if !reachable {
                self.connected = false;
            }
        }

        pub fn subscribe(&mut self, topic: &str) -> Result<(), SessionError> {
            if !self.connected {
                return Err(SessionError::NotConnected);
            }
            if !self.subscriptions.iter().any(|t| t == topic) {
                self.subscriptions.push(topic.to_owned());
            }
            Ok(())
        }

        pub fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), SessionError> {
            if !self.connected {
                return Err(SessionError::NotConnected);
            }
            self.published.push((topic.to_owned(), payload.to_vec()));
            Ok(())
        }

        pub fn inject(&self, topic: &str, payload: &[u8]) -> bool {
            self.connected
                && self.subscriptions.iter().any(|t| t == topic)
                && enqueue_inbound(self.inbound, topic, payload)
        }
    }
}

// ───────────────────────────────────────────────────────────────
// MqttAdapter
// ───────────────────────────────────────────────────────────────

pub struct MqttAdapter {
    client: platform::Client,
    inbound: &'static InboundChannel,
}

impl MqttAdapter {
    /// `url` is `mqtt://host:port`.
    pub fn new(url: String, inbound: &'static InboundChannel) -> Self {
        Self {
            client: platform::Client::new(url, inbound),
            inbound,
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl MqttAdapter {
    /// Make the simulated broker (un)reachable.  Going unreachable drops
    /// the current session.
    pub fn set_broker_reachable(&mut self, reachable: bool) {
        self.client.set_broker_reachable(reachable);
    }

    /// Deliver a message as if the broker forwarded it.  Only subscribed
    /// topics on a live session get through.
    pub fn inject(&self, topic: &str, payload: &[u8]) -> bool {
        self.client.inject(topic, payload)
    }

    pub fn subscriptions(&self) -> &[String] {
        &self.client.subscriptions
    }

    /// Everything published since the last call.
    pub fn take_published(&mut self) -> Vec<(String, Vec<u8>)> {
        core::mem::take(&mut self.client.published)
    }
}

impl SessionPort for MqttAdapter {
    fn begin_connect(&mut self, client_id: &str) -> Result<(), SessionError> {
        self.client.connect(client_id)
    }

    fn poll_connect(&mut self) {
        #[cfg(not(target_os = "espidf"))]
        self.client.poll();
        debug!("MQTT: waiting for CONNACK");
    }

    fn is_connected(&self) -> bool {
        self.client.is_connected()
    }

    fn abort(&mut self) {
        info!("MQTT: session torn down");
        self.client.abort();
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), SessionError> {
        self.client.subscribe(topic)
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), SessionError> {
        self.client.publish(topic, payload)
    }

    fn pending(&self) -> usize {
        self.inbound.len()
    }

    fn try_receive(&mut self) -> Option<InboundMessage> {
        self.inbound.try_receive().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> MqttAdapter {
        let inbound: &'static InboundChannel = Box::leak(Box::new(Channel::new()));
        MqttAdapter::new("mqtt://127.0.0.1:1883".into(), inbound)
    }

    #[test]
    fn publish_requires_session() {
        let mut m = adapter();
        assert_eq!(m.publish("a/b", b"x"), Err(SessionError::NotConnected));
        m.begin_connect("node").unwrap();
        assert!(m.is_connected());
        m.publish("a/b", b"x").unwrap();
        assert_eq!(m.take_published(), vec![("a/b".to_owned(), b"x".to_vec())]);
    }

    #[test]
    fn inject_only_reaches_subscribed_topics() {
        let mut m = adapter();
        m.begin_connect("node").unwrap();
        m.subscribe("smarthome/kitchen/light/set").unwrap();
        assert!(m.inject("smarthome/kitchen/light/set", b"{}"));
        assert!(!m.inject("smarthome/kitchen/fan/set", b"{}"));
        assert_eq!(m.pending(), 1);
        let msg = m.try_receive().unwrap();
        assert_eq!(msg.topic.as_str(), "smarthome/kitchen/light/set");
        assert!(m.try_receive().is_none());
    }

    #[test]
    fn inbound_queue_is_bounded() {
        let mut m = adapter();
        m.begin_connect("node").unwrap();
        m.subscribe("t").unwrap();
        for _ in 0..INBOUND_DEPTH {
            assert!(m.inject("t", b"{}"));
        }
        assert!(!m.inject("t", b"{}"));
        assert_eq!(m.pending(), INBOUND_DEPTH);
    }

    #[test]
    fn unreachable_broker_keeps_attempt_pending() {
        let mut m = adapter();
        m.set_broker_reachable(false);
        m.begin_connect("node").unwrap();
        assert!(!m.is_connected());
        m.set_broker_reachable(true);
        m.poll_connect();
        assert!(m.is_connected());
        m.abort();
        assert!(!m.is_connected());
        assert!(m.subscriptions().is_empty());
    }
}
