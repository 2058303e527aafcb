//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured node events to the
//! ESP-IDF logger (UART / USB-CDC in production).

use log::{debug, info, warn};

use crate::app::events::NodeEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`NodeEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &NodeEvent<'_>) {
        match event {
            NodeEvent::Started { node_id, devices, rooms } => {
                info!("START | node={} devices={} rooms={}", node_id, devices, rooms);
            }
            NodeEvent::ConnectivityChanged(s) => {
                info!(
                    "LINK  | wifi={} mqtt={}",
                    if s.link_up { "up" } else { "down" },
                    if s.session_up { "up" } else { "down" },
                );
            }
            NodeEvent::Subscribed { topics } => {
                info!("LINK  | subscribed to {} command topics", topics);
            }
            NodeEvent::CommandHandled { topic, error_code: None } => {
                info!("CMD   | {} ok", topic);
            }
            NodeEvent::CommandHandled { topic, error_code: Some(code) } => {
                warn!("CMD   | {} rejected: {}", topic, code);
            }
            NodeEvent::CommandDeferred { topic } => {
                info!("CMD   | {} accepted, reply on completion", topic);
            }
            NodeEvent::TopicRejected { topic } => {
                warn!("CMD   | malformed topic dropped: {}", topic);
            }
            NodeEvent::MotionCompleted { room, device, open } => {
                info!(
                    "MOVE  | {}/{} {}",
                    room,
                    device,
                    if *open { "open" } else { "closed" }
                );
            }
            NodeEvent::PublishFailed { topic } => {
                warn!("MQTT  | publish to {} failed", topic);
            }
            NodeEvent::SensorAdjusted { room, kind, value } => {
                debug!("SIM   | {} {:?} = {:.1}{}", room, kind, value, kind.unit());
            }
        }
    }
}
