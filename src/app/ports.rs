//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ NodeService (domain)
//! ```
//!
//! Driven adapters (network link, broker session, GPIO/servo outputs,
//! event sinks) implement these traits.  The
//! [`NodeService`](super::service::NodeService) consumes them via generics,
//! so the domain core never touches hardware or sockets directly.
//!
//! Every method is non-blocking: a port that needs time to complete an
//! operation starts it and reports progress through a later query.

use heapless::{String, Vec};

// ───────────────────────────────────────────────────────────────
// Output port (driven adapter: domain → GPIO / servo)
// ───────────────────────────────────────────────────────────────

/// Write-side port for pin-bound devices.
pub trait OutputPort {
    /// Configure `pin` as a push-pull output.
    fn configure_output(&mut self, pin: u8);

    /// Attach a servo PWM channel to `pin`.
    fn configure_servo(&mut self, pin: u8);

    /// Drive a digital output.
    fn write_level(&mut self, pin: u8, high: bool);

    /// Command a servo to `degrees` (0–180).
    fn write_angle(&mut self, pin: u8, degrees: u8);
}

// ───────────────────────────────────────────────────────────────
// Link port (driven adapter: domain → WiFi station)
// ───────────────────────────────────────────────────────────────

/// Network link (WiFi station).
pub trait LinkPort {
    /// Start an association attempt and return immediately.
    fn begin_connect(&mut self) -> Result<(), LinkError>;

    /// Whether the link is currently usable.
    fn is_up(&self) -> bool;

    /// Abandon an attempt that ran past its timeout.
    fn abort(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Session port (driven adapter: domain ↔ MQTT broker)
// ───────────────────────────────────────────────────────────────

pub const MAX_TOPIC_LEN: usize = 128;
pub const MAX_PAYLOAD_LEN: usize = 512;

/// One message received on a subscribed topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String<MAX_TOPIC_LEN>,
    pub payload: Vec<u8, MAX_PAYLOAD_LEN>,
}

impl InboundMessage {
    /// `None` when the topic or payload exceed the fixed buffers.
    pub fn new(topic: &str, payload: &[u8]) -> Option<Self> {
        Some(Self {
            topic: String::try_from(topic).ok()?,
            payload: Vec::from_slice(payload).ok()?,
        })
    }
}

/// Broker session.
pub trait SessionPort {
    /// Start a session attempt with `client_id`.
    fn begin_connect(&mut self, client_id: &str) -> Result<(), SessionError>;

    /// Cheap retry nudge while an attempt is in flight.
    fn poll_connect(&mut self);

    fn is_connected(&self) -> bool;

    /// Tear down a session attempt that ran past its timeout.
    fn abort(&mut self);

    fn subscribe(&mut self, topic: &str) -> Result<(), SessionError>;

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), SessionError>;

    /// Messages waiting to be taken.
    fn pending(&self) -> usize;

    fn try_receive(&mut self) -> Option<InboundMessage>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / display)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`NodeEvent`](super::events::NodeEvent)s
/// through this port.  Adapters decide where they go (serial log,
/// display redraw flag, test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::NodeEvent<'_>);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`LinkPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// No SSID configured.
    NoCredentials,
    /// The radio driver refused to start an attempt.
    DriverError,
}

/// Errors from [`SessionPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// Operation requires an established session.
    NotConnected,
    /// Client could not be created.
    ClientInit,
    /// Broker client rejected a subscribe request.
    SubscribeFailed,
    /// Outbound queue rejected the message.
    PublishFailed,
}

impl core::fmt::Display for LinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no credentials"),
            Self::DriverError => write!(f, "driver error"),
        }
    }
}

impl core::fmt::Display for SessionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotConnected => write!(f, "not connected"),
            Self::ClientInit => write!(f, "client init failed"),
            Self::SubscribeFailed => write!(f, "subscribe failed"),
            Self::PublishFailed => write!(f, "publish failed"),
        }
    }
}
