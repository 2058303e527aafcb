//! Command router.
//!
//! One inbound message in, at most one reply out:
//!
//! ```text
//!   topic ──parse──▶ (room, device) ──┐
//!                                     ├──▶ capability dispatch ──▶ Reply ──encode──▶ Outbound
//!   payload ──decode──▶ CommandMessage┘
//! ```
//!
//! Topic violations are dropped without a reply.  Every other failure
//! becomes an error reply on the device's state topic.  Travel commands
//! that start (or queue behind) a motion are answered later, from
//! [`CommandRouter::completion_reply`].

use embassy_time::Instant;
use log::{debug, error, info, warn};

use super::codec::{self, CommandMessage, Reply};
use super::topic::{self, CommandTopic, TopicBuf};
use crate::app::ports::{OutputPort, SessionPort};
use crate::devices::DeviceBank;
use crate::devices::binary::set_binary;
use crate::devices::climate::temperature_in_range;
use crate::devices::travel::{MotionCompletion, TravelCommand, TravelOutcome};
use crate::error::CommandError;
use crate::registry::{Capability, CapabilityKind, Registry};
use crate::sensors::SensorReading;

pub const ACTION_ON: &str = "ON";
pub const ACTION_OFF: &str = "OFF";
pub const ACTION_SET_TEMP: &str = "SET_TEMP";

/// An encoded reply ready to publish.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub topic: TopicBuf,
    pub payload: Vec<u8>,
    /// Wire code when the reply is an error reply.
    pub error_code: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Routed {
    Reply(Outbound),
    /// Accepted; the reply follows when the motion finishes.
    Deferred,
    /// Nothing to send (topic violation or encode failure).
    Dropped,
}

pub struct CommandRouter {
    prefix: String,
}

impl CommandRouter {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Subscribe to the command topic of every registry entry.
    /// Returns how many subscriptions were accepted.
    pub fn subscribe_all(&self, registry: &Registry, session: &mut dyn SessionPort) -> usize {
        let mut ok = 0;
        for (_, dev) in registry.devices() {
            let room = registry.room_name(dev.room);
            let topic = match topic::command_topic(&self.prefix, room, dev.capability.id()) {
                Ok(t) => t,
                Err(e) => {
                    error!("Router: cannot form topic for {}/{}: {}", room, dev.capability.id(), e);
                    continue;
                }
            };
            match session.subscribe(&topic) {
                Ok(()) => {
                    debug!("Router: subscribed {}", topic);
                    ok += 1;
                }
                Err(e) => warn!("Router: subscribe {} failed: {}", topic, e),
            }
        }
        info!("Router: {}/{} command topics subscribed", ok, registry.len());
        ok
    }

    /// Handle one inbound message.
    pub fn route(
        &self,
        topic: &str,
        payload: &[u8],
        registry: &Registry,
        devices: &mut DeviceBank,
        hw: &mut impl OutputPort,
        now: Instant,
    ) -> Routed {
        let target = match topic::parse_command_topic(&self.prefix, topic) {
            Ok(t) => t,
            Err(e) => {
                warn!("Router: dropped '{}': {}", topic, e);
                return Routed::Dropped;
            }
        };

        let reply = match codec::decode_command(payload) {
            Err(d) => {
                warn!("Router: {}/{} bad payload: {}", target.room, target.device, d.error);
                Reply::error(&d.correlation_id, d.error)
            }
            Ok(msg) => {
                debug!(
                    "Router: {}/{} action={} value={:?} id={}",
                    target.room, target.device, msg.action, msg.value, msg.correlation_id
                );
                match self.dispatch(target, &msg, registry, devices, hw, now) {
                    Ok(Some(reply)) => reply,
                    Ok(None) => return Routed::Deferred,
                    Err(e) => {
                        warn!("Router: {}/{} failed: {}", target.room, target.device, e);
                        Reply::error(&msg.correlation_id, e)
                    }
                }
            }
        };

        self.outbound(target.room, target.device, &reply)
            .map_or(Routed::Dropped, Routed::Reply)
    }

    fn dispatch(
        &self,
        target: CommandTopic<'_>,
        msg: &CommandMessage,
        registry: &Registry,
        devices: &mut DeviceBank,
        hw: &mut impl OutputPort,
        now: Instant,
    ) -> Result<Option<Reply>, CommandError> {
        let capability =
            Capability::from_id(target.device).ok_or(CommandError::UnknownDeviceType)?;
        let room = target.room;
        let cid = msg.correlation_id.as_str();
        let on = msg.action == ACTION_ON;

        match capability.kind() {
            CapabilityKind::Sensor(kind) => {
                if registry.find(room, capability).is_none() {
                    return Err(CommandError::UnknownRoom);
                }
                match devices.sensors.read(registry, room, kind) {
                    SensorReading::Value(v) => Ok(Some(Reply::reading(cid, v, kind.unit()))),
                    SensorReading::Unavailable => Err(CommandError::SensorReadFailure(kind)),
                }
            }

            CapabilityKind::AirConditioner => match msg.action.as_str() {
                ACTION_SET_TEMP => {
                    let state =
                        devices
                            .climate
                            .set_temperature(registry, room, msg.value_or_default())?;
                    Ok(Some(Reply::temperature(cid, state.target_temperature)))
                }
                ACTION_ON => match msg.value {
                    Some(t) if temperature_in_range(t) => {
                        devices.climate.toggle(registry, hw, room, true, Some(t))?;
                        Ok(Some(Reply::state(&msg.action, cid)))
                    }
                    _ => Err(CommandError::MissingOrInvalidValue),
                },
                ACTION_OFF => {
                    devices.climate.toggle(registry, hw, room, false, None)?;
                    Ok(Some(Reply::state(&msg.action, cid)))
                }
                _ => Err(CommandError::UnknownAction),
            },

            CapabilityKind::Travel => {
                let cmd = TravelCommand {
                    open: on,
                    action: msg.action.clone(),
                    correlation_id: msg.correlation_id.clone(),
                };
                match devices.request_travel(registry, hw, room, capability, cmd, now)? {
                    TravelOutcome::AlreadyThere => Ok(Some(Reply::state(&msg.action, cid))),
                    TravelOutcome::Started | TravelOutcome::Queued => Ok(None),
                }
            }

            CapabilityKind::Binary => {
                set_binary(registry, hw, room, capability, on)?;
                Ok(Some(Reply::state(&msg.action, cid)))
            }
        }
    }

    /// Reply for a travel command whose motion (or queued no-op) finished.
    pub fn completion_reply(
        &self,
        registry: &Registry,
        completion: &MotionCompletion,
    ) -> Option<Outbound> {
        let dev = registry.device(completion.device);
        let reply = Reply::state(
            &completion.command.action,
            &completion.command.correlation_id,
        );
        self.outbound(registry.room_name(dev.room), dev.capability.id(), &reply)
    }

    fn outbound(&self, room: &str, device: &str, reply: &Reply) -> Option<Outbound> {
        let topic = topic::state_topic(&self.prefix, room, device)
            .inspect_err(|e| error!("Router: state topic for {}/{}: {}", room, device, e))
            .ok()?;
        let payload = codec::encode_reply(reply)
            .inspect_err(|e| error!("Router: reply encode failed: {}", e))
            .ok()?;
        Some(Outbound {
            topic,
            payload,
            error_code: reply.error_code,
        })
    }
}
