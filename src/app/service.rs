//! Application service, the hexagonal core.
//!
//! [`NodeService`] owns the registry, the device state arenas, the
//! connectivity machine and the command router.  All I/O flows through
//! port traits injected at call sites, so the whole node runs on the host
//! against mock adapters.
//!
//! ```text
//!   LinkPort ──────▶ ┌───────────────────────────────┐ ──▶ EventSink
//!   SessionPort ◀──▶ │          NodeService          │
//!   OutputPort ◀──── │ Connectivity · Router · Banks │
//!                    └───────────────────────────────┘
//! ```
//!
//! One [`tick`](NodeService::tick) runs, in order: link evaluation,
//! session evaluation, dispatch of the inbound messages queued since the
//! previous tick, then travel motion steps.  Nothing in a tick waits.

use embassy_time::Instant;
use log::{info, warn};

use crate::config::NodeConfig;
use crate::connectivity::{ConnectivityDelegate, ConnectivityManager, ConnectivityStatus};
use crate::devices::DeviceBank;
use crate::devices::travel::MotionCompletion;
use crate::error::RegistryError;
use crate::protocol::router::{CommandRouter, Outbound, Routed};
use crate::protocol::topic;
use crate::registry::Registry;

use super::events::NodeEvent;
use super::ports::{EventSink, LinkPort, OutputPort, SessionPort};

// ───────────────────────────────────────────────────────────────
// Connectivity hooks
// ───────────────────────────────────────────────────────────────

/// Bridges connectivity callbacks to subscriptions and events.
struct SessionHooks<'a, E: EventSink> {
    router: &'a CommandRouter,
    registry: &'a Registry,
    sink: &'a mut E,
    redraw: &'a mut bool,
}

impl<E: EventSink> ConnectivityDelegate for SessionHooks<'_, E> {
    fn on_status_changed(&mut self, status: ConnectivityStatus) {
        *self.redraw = true;
        self.sink.emit(&NodeEvent::ConnectivityChanged(status));
    }

    fn on_session_established(&mut self, session: &mut dyn SessionPort) {
        let topics = self.router.subscribe_all(self.registry, session);
        self.sink.emit(&NodeEvent::Subscribed { topics });
    }
}

// ───────────────────────────────────────────────────────────────
// NodeService
// ───────────────────────────────────────────────────────────────

pub struct NodeService {
    node_id: String,
    registry: Registry,
    devices: DeviceBank,
    connectivity: ConnectivityManager,
    router: CommandRouter,
    tick_count: u64,
    redraw: bool,
}

impl NodeService {
    /// Build the registry and state arenas from `config`.
    pub fn new(config: &NodeConfig) -> Result<Self, RegistryError> {
        if !topic::is_valid_segment(&config.topic_prefix) {
            return Err(RegistryError::InvalidTopicPrefix);
        }
        let registry = Registry::build(&config.devices)?;
        let devices = DeviceBank::new(&registry, config);
        Ok(Self {
            node_id: config.node_id.clone(),
            connectivity: ConnectivityManager::new(&config.node_id, config.timings),
            router: CommandRouter::new(&config.topic_prefix),
            registry,
            devices,
            tick_count: 0,
            redraw: true,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Put every output in its boot state.
    pub fn start(&mut self, hw: &mut impl OutputPort, sink: &mut impl EventSink) {
        self.devices.init_outputs(&self.registry, hw);
        sink.emit(&NodeEvent::Started {
            node_id: &self.node_id,
            devices: self.registry.len(),
            rooms: self.registry.room_count(),
        });
        info!(
            "NodeService '{}' started: {} devices",
            self.node_id,
            self.registry.len()
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    pub fn tick(
        &mut self,
        now: Instant,
        link: &mut impl LinkPort,
        session: &mut impl SessionPort,
        hw: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) -> ConnectivityStatus {
        self.tick_count += 1;

        // 1. Link, then session
        let mut hooks = SessionHooks {
            router: &self.router,
            registry: &self.registry,
            sink: &mut *sink,
            redraw: &mut self.redraw,
        };
        let status = self.connectivity.tick(now, link, session, &mut hooks);

        // 2. Inbound messages queued since the last tick
        let budget = session.pending();
        for _ in 0..budget {
            let Some(msg) = session.try_receive() else {
                break;
            };
            let routed = self.router.route(
                &msg.topic,
                &msg.payload,
                &self.registry,
                &mut self.devices,
                hw,
                now,
            );
            match routed {
                Routed::Reply(out) => {
                    sink.emit(&NodeEvent::CommandHandled {
                        topic: &msg.topic,
                        error_code: out.error_code,
                    });
                    publish(session, &out, sink);
                }
                Routed::Deferred => sink.emit(&NodeEvent::CommandDeferred { topic: &msg.topic }),
                Routed::Dropped => sink.emit(&NodeEvent::TopicRejected { topic: &msg.topic }),
            }
        }

        // 3. Motion steps; finished travel commands get their reply now
        let router = &self.router;
        let registry = &self.registry;
        self.devices.tick(now, hw, &mut |done: MotionCompletion| {
            let dev = registry.device(done.device);
            sink.emit(&NodeEvent::MotionCompleted {
                room: registry.room_name(dev.room),
                device: dev.capability.id(),
                open: done.status,
            });
            if let Some(out) = router.completion_reply(registry, &done) {
                publish(session, &out, sink);
            }
        });

        status
    }

    /// Apply one debounced panel input to the sensor simulator.
    #[cfg(feature = "sensor-sim")]
    pub fn apply_input(
        &mut self,
        panel: &mut super::panel::SimulatorPanel,
        event: super::events::InputEvent,
        sink: &mut impl EventSink,
    ) {
        let sim = self.devices.sensors.simulator_mut();
        if let Some((room, kind, value)) = panel.handle(event, &self.registry, sim) {
            sink.emit(&NodeEvent::SensorAdjusted {
                room: self.registry.room_name(room),
                kind,
                value,
            });
        }
        if panel.take_redraw() {
            self.redraw = true;
        }
    }

    /// Hand the current connectivity to the panel's status page.
    #[cfg(feature = "sensor-sim")]
    pub fn refresh_panel(&mut self, panel: &mut super::panel::SimulatorPanel, now: Instant) {
        panel.refresh(now, self.connectivity.status());
        if panel.take_redraw() {
            self.redraw = true;
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn devices(&self) -> &DeviceBank {
        &self.devices
    }

    pub fn connectivity(&self) -> &ConnectivityManager {
        &self.connectivity
    }

    pub fn status(&self) -> ConnectivityStatus {
        self.connectivity.status()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Returns and clears the display redraw flag.
    pub fn take_redraw(&mut self) -> bool {
        core::mem::take(&mut self.redraw)
    }
}

fn publish(session: &mut impl SessionPort, out: &Outbound, sink: &mut impl EventSink) {
    if let Err(e) = session.publish(&out.topic, &out.payload) {
        warn!("MQTT: publish to {} failed: {}", out.topic, e);
        sink.emit(&NodeEvent::PublishFailed { topic: &out.topic });
    }
}
