//! Connectivity state machine: network link and broker session.
//!
//! Two orthogonal sub-machines, both advanced by [`ConnectivityManager::tick`]
//! once per control-loop iteration.  Neither ever blocks: ports start an
//! attempt and the manager polls for the result on later ticks.
//!
//! ```text
//!   LINK                                   SESSION (only while link is Up)
//!
//!   ┌──────┐ retry elapsed ┌────────────┐  ┌──────┐ retry elapsed ┌────────────┐
//!   │ Down │──────────────▶│ Connecting │  │ Down │──────────────▶│ Connecting │
//!   └──────┘               └────────────┘  └──────┘               └────────────┘
//!      ▲  ▲   timeout 10 s       │  up        ▲  ▲   timeout 3 s       │ connected
//!      │  └── (retry 5 s) ───────┘  │         │  └── (retry 5 s) ──────┘ │
//!      │                            ▼         │                          ▼
//!      │   lost (retry 1 s)     ┌──────┐      │  lost (retry 1 s)    ┌──────┐
//!      └────────────────────────│  Up  │      └──────────────────────│  Up  │──▶ resubscribe
//!                               └──────┘                             └──────┘
//! ```
//!
//! Link loss forces the session down in the same tick.  Failures are never
//! fatal: attempts repeat forever on the fixed back-off intervals from
//! [`ConnectivityTimings`], and the only outward signals are log lines and
//! the [`ConnectivityDelegate`] callbacks.

use embassy_time::Instant;
use log::{info, warn};

use crate::app::ports::{LinkPort, SessionPort};
use crate::config::ConnectivityTimings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkPhase {
    Down,
    Connecting,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Down,
    Connecting,
    Up,
}

/// Externally observable connectivity, shown on the node display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectivityStatus {
    pub link_up: bool,
    pub session_up: bool,
}

/// Callbacks from the connectivity machine.
///
/// Decouples the manager from subscriptions and from whoever draws the
/// status: the service implements this and the manager knows nothing
/// about topics or displays.
pub trait ConnectivityDelegate {
    /// Called once per tick in which [`ConnectivityStatus`] changed.
    fn on_status_changed(&mut self, status: ConnectivityStatus);

    /// Called on every transition into `SessionPhase::Up`.
    fn on_session_established(&mut self, session: &mut dyn SessionPort);
}

pub struct ConnectivityManager {
    client_id: String,
    timings: ConnectivityTimings,

    link: LinkPhase,
    link_retry_at: Instant,
    link_started: Instant,
    link_attempts: u32,

    session: SessionPhase,
    session_retry_at: Instant,
    session_started: Instant,
    session_attempts: u32,

    last_status: ConnectivityStatus,
}

impl ConnectivityManager {
    pub fn new(client_id: &str, timings: ConnectivityTimings) -> Self {
        let epoch = Instant::from_ticks(0);
        Self {
            client_id: client_id.into(),
            timings,
            link: LinkPhase::Down,
            link_retry_at: epoch,
            link_started: epoch,
            link_attempts: 0,
            session: SessionPhase::Down,
            session_retry_at: epoch,
            session_started: epoch,
            session_attempts: 0,
            last_status: ConnectivityStatus::default(),
        }
    }

    pub fn link_phase(&self) -> LinkPhase {
        self.link
    }

    pub fn session_phase(&self) -> SessionPhase {
        self.session
    }

    pub fn status(&self) -> ConnectivityStatus {
        ConnectivityStatus {
            link_up: self.link == LinkPhase::Up,
            session_up: self.session == SessionPhase::Up,
        }
    }

    pub fn link_attempts(&self) -> u32 {
        self.link_attempts
    }

    pub fn session_attempts(&self) -> u32 {
        self.session_attempts
    }

    /// Evaluate the link, then the session.  Returns the resulting status.
    pub fn tick(
        &mut self,
        now: Instant,
        link: &mut impl LinkPort,
        session: &mut impl SessionPort,
        delegate: &mut impl ConnectivityDelegate,
    ) -> ConnectivityStatus {
        self.step_link(now, link);
        self.step_session(now, session, delegate);

        let status = self.status();
        if status != self.last_status {
            self.last_status = status;
            delegate.on_status_changed(status);
        }
        status
    }

    // ── Link ──────────────────────────────────────────────────

    fn step_link(&mut self, now: Instant, link: &mut impl LinkPort) {
        match self.link {
            LinkPhase::Down => {
                if now < self.link_retry_at {
                    return;
                }
                self.link_attempts = self.link_attempts.wrapping_add(1);
                info!("WiFi: connecting (attempt {})", self.link_attempts);
                match link.begin_connect() {
                    Ok(()) => {
                        self.link = LinkPhase::Connecting;
                        self.link_started = now;
                    }
                    Err(e) => {
                        warn!("WiFi: attempt not started: {}", e);
                        self.link_retry_at = now + self.timings.link_retry();
                    }
                }
            }
            LinkPhase::Connecting => {
                if link.is_up() {
                    info!("WiFi: connected");
                    self.link = LinkPhase::Up;
                } else if now >= self.link_started + self.timings.link_connect_timeout() {
                    warn!(
                        "WiFi: connect timed out, retrying in {} ms",
                        self.timings.link_retry_ms
                    );
                    link.abort();
                    self.link = LinkPhase::Down;
                    self.link_retry_at = now + self.timings.link_retry();
                }
            }
            LinkPhase::Up => {
                if !link.is_up() {
                    warn!("WiFi: link lost");
                    self.link = LinkPhase::Down;
                    self.link_retry_at = now + self.timings.link_lost_retry();
                }
            }
        }
    }

    // ── Session ───────────────────────────────────────────────

    fn step_session(
        &mut self,
        now: Instant,
        session: &mut impl SessionPort,
        delegate: &mut impl ConnectivityDelegate,
    ) {
        if self.link != LinkPhase::Up {
            if self.session != SessionPhase::Down {
                warn!("MQTT: link down, dropping session");
                session.abort();
                self.session = SessionPhase::Down;
                self.session_retry_at = now + self.timings.session_lost_retry();
            }
            return;
        }

        match self.session {
            SessionPhase::Down => {
                if now < self.session_retry_at {
                    return;
                }
                self.session_attempts = self.session_attempts.wrapping_add(1);
                info!(
                    "MQTT: connecting as '{}' (attempt {})",
                    self.client_id, self.session_attempts
                );
                match session.begin_connect(&self.client_id) {
                    Ok(()) => {
                        self.session = SessionPhase::Connecting;
                        self.session_started = now;
                    }
                    Err(e) => {
                        warn!("MQTT: attempt not started: {}", e);
                        self.session_retry_at = now + self.timings.session_retry();
                    }
                }
            }
            SessionPhase::Connecting => {
                if session.is_connected() {
                    info!("MQTT: connected");
                    self.session = SessionPhase::Up;
                    delegate.on_session_established(session);
                } else if now >= self.session_started + self.timings.session_connect_timeout() {
                    warn!(
                        "MQTT: connect timed out, retrying in {} ms",
                        self.timings.session_retry_ms
                    );
                    session.abort();
                    self.session = SessionPhase::Down;
                    self.session_retry_at = now + self.timings.session_retry();
                } else {
                    session.poll_connect();
                }
            }
            SessionPhase::Up => {
                if !session.is_connected() {
                    warn!("MQTT: session lost");
                    self.session = SessionPhase::Down;
                    self.session_retry_at = now + self.timings.session_lost_retry();
                }
            }
        }
    }
}
