//! Interrupt-driven panel input queue.
//!
//! GPIO ISRs on the encoder and back key record raw edges here; the main
//! loop drains them through the
//! [`InputDebouncer`](crate::drivers::encoder::InputDebouncer), which turns
//! them into [`InputEvent`](crate::app::events::InputEvent)s.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Encoder A    │────▶│              │     │              │
//! │ Encoder SW   │────▶│  Edge Queue  │────▶│  Debouncer   │──▶ panel
//! │ Back key     │────▶│  (lock-free) │     │  (main loop) │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```

use heapless::mpmc::Q32;

/// Which input produced an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeSource {
    /// Any edge on encoder phase A, with both phases sampled in the ISR.
    EncoderA { a_high: bool, b_high: bool },
    /// Falling edge on the encoder push switch.
    EncoderSwitch,
    /// Falling edge on the back key.
    BackKey,
}

/// One raw, undebounced edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEdge {
    pub source: EdgeSource,
    /// Milliseconds since boot, truncated to u32.
    pub at_ms: u32,
}

static EDGE_QUEUE: Q32<RawEdge> = Q32::new();

/// Record an edge.  Safe to call from ISR context (lock-free).
/// Returns `false` if the queue is full (edge dropped).
pub fn push_edge(edge: RawEdge) -> bool {
    EDGE_QUEUE.enqueue(edge).is_ok()
}

/// Pop the oldest pending edge.
pub fn pop_edge() -> Option<RawEdge> {
    EDGE_QUEUE.dequeue()
}

/// Drain all pending edges into a callback, in FIFO order.
pub fn drain_edges(mut handler: impl FnMut(RawEdge)) {
    while let Some(edge) = pop_edge() {
        handler(edge);
    }
}
