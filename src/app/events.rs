//! Outbound application events and inbound panel input.
//!
//! The [`NodeService`](super::service::NodeService) emits [`NodeEvent`]s
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them: log to serial, raise the
//! display redraw flag, record them in a test.

use crate::connectivity::ConnectivityStatus;
use crate::registry::SensorKind;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeEvent<'a> {
    /// The service has started and outputs are in their boot state.
    Started {
        node_id: &'a str,
        devices: usize,
        rooms: usize,
    },

    /// Link or session availability changed.
    ConnectivityChanged(ConnectivityStatus),

    /// Command topics (re)subscribed after a session came up.
    Subscribed { topics: usize },

    /// A command was answered; `error_code` is set for error replies.
    CommandHandled {
        topic: &'a str,
        error_code: Option<&'static str>,
    },

    /// A travel command was accepted; its reply follows on completion.
    CommandDeferred { topic: &'a str },

    /// An inbound topic violated the grammar and was dropped.
    TopicRejected { topic: &'a str },

    /// A window/curtain finished moving (or a queued no-op was answered).
    MotionCompleted {
        room: &'a str,
        device: &'static str,
        open: bool,
    },

    /// Outbound reply could not be handed to the broker client.
    PublishFailed { topic: &'a str },

    /// A simulated sensor value was changed from the panel.
    SensorAdjusted {
        room: &'a str,
        kind: SensorKind,
        value: f32,
    },
}

/// Debounced panel input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Encoder turned one detent clockwise.
    Clockwise,
    /// Encoder turned one detent counter-clockwise.
    CounterClockwise,
    /// Encoder shaft pressed.
    Press,
    /// Back key pressed.
    Back,
}
