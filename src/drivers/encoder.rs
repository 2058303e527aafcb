//! Rotary encoder and back-key debouncer.
//!
//! ## Hardware
//!
//! EC11 encoder (phases A/B plus push switch) and a separate back key, all
//! active-low with pull-ups.  ISRs push [`RawEdge`]s into the edge queue;
//! [`InputDebouncer::poll`] runs from the main loop and classifies them.
//!
//! | Source        | ISR edge | Debounce | Event                               |
//! |---------------|----------|----------|-------------------------------------|
//! | Encoder A     | any      | 5 ms     | `Clockwise` / `CounterClockwise` (2 edges) |
//! | Encoder SW    | falling  | 200 ms   | `Press`                             |
//! | Back key      | falling  | 200 ms   | `Back`                              |
//!
//! Direction: phase A equal to phase B at the edge means clockwise.  One
//! logical step needs [`EDGES_PER_STEP`] edges in the same direction; a
//! partial step is discarded after [`ROTATION_IDLE_RESET_MS`] without edges.

use crate::app::events::InputEvent;
use crate::events::{self, EdgeSource, RawEdge};

pub const PRESS_DEBOUNCE_MS: u32 = 200;
pub const ROTATION_DEBOUNCE_MS: u32 = 5;
pub const EDGES_PER_STEP: i8 = 2;
pub const ROTATION_IDLE_RESET_MS: u32 = 500;

#[derive(Debug, Default)]
pub struct InputDebouncer {
    last_rotation_ms: Option<u32>,
    /// Signed edge count towards the next step (+ = clockwise).
    rotation_acc: i8,
    last_press_ms: Option<u32>,
    last_back_ms: Option<u32>,
}

impl InputDebouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one raw edge.  `None` when it falls inside its source's
    /// debounce window or only completes half a rotation step.
    pub fn feed(&mut self, edge: RawEdge) -> Option<InputEvent> {
        match edge.source {
            EdgeSource::EncoderA { a_high, b_high } => {
                let previous = self.last_rotation_ms;
                accept(&mut self.last_rotation_ms, edge.at_ms, ROTATION_DEBOUNCE_MS)?;
                let idle = previous
                    .is_some_and(|p| edge.at_ms.wrapping_sub(p) > ROTATION_IDLE_RESET_MS);
                if idle {
                    self.rotation_acc = 0;
                }
                self.rotation_acc += if a_high == b_high { 1 } else { -1 };
                if self.rotation_acc.abs() < EDGES_PER_STEP {
                    return None;
                }
                let event = if self.rotation_acc > 0 {
                    InputEvent::Clockwise
                } else {
                    InputEvent::CounterClockwise
                };
                self.rotation_acc = 0;
                Some(event)
            }
            EdgeSource::EncoderSwitch => {
                accept(&mut self.last_press_ms, edge.at_ms, PRESS_DEBOUNCE_MS)?;
                Some(InputEvent::Press)
            }
            EdgeSource::BackKey => {
                accept(&mut self.last_back_ms, edge.at_ms, PRESS_DEBOUNCE_MS)?;
                Some(InputEvent::Back)
            }
        }
    }

    /// Drain the ISR edge queue, handing each debounced event to `handler`.
    pub fn poll(&mut self, mut handler: impl FnMut(InputEvent)) {
        events::drain_edges(|edge| {
            if let Some(event) = self.feed(edge) {
                handler(event);
            }
        });
    }
}

fn accept(last: &mut Option<u32>, now_ms: u32, window_ms: u32) -> Option<()> {
    if let Some(prev) = *last {
        if now_ms.wrapping_sub(prev) <= window_ms {
            return None;
        }
    }
    *last = Some(now_ms);
    Some(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(source: EdgeSource, at_ms: u32) -> RawEdge {
        RawEdge { source, at_ms }
    }

    #[test]
    fn press_bounce_is_filtered() {
        let mut d = InputDebouncer::new();
        assert_eq!(d.feed(edge(EdgeSource::EncoderSwitch, 1000)), Some(InputEvent::Press));
        assert_eq!(d.feed(edge(EdgeSource::EncoderSwitch, 1150)), None);
        assert_eq!(d.feed(edge(EdgeSource::EncoderSwitch, 1201)), Some(InputEvent::Press));
    }

    #[test]
    fn back_key_debounced_independently() {
        let mut d = InputDebouncer::new();
        d.feed(edge(EdgeSource::EncoderSwitch, 500));
        assert_eq!(d.feed(edge(EdgeSource::BackKey, 510)), Some(InputEvent::Back));
    }

    const CW: EdgeSource = EdgeSource::EncoderA { a_high: false, b_high: false };
    const CCW: EdgeSource = EdgeSource::EncoderA { a_high: false, b_high: true };

    #[test]
    fn two_edges_make_one_step() {
        let mut d = InputDebouncer::new();
        assert_eq!(d.feed(edge(CW, 100)), None);
        assert_eq!(d.feed(edge(CW, 120)), Some(InputEvent::Clockwise));
        assert_eq!(d.feed(edge(CCW, 140)), None);
        assert_eq!(d.feed(edge(CCW, 160)), Some(InputEvent::CounterClockwise));
    }

    #[test]
    fn rotation_bounce_is_filtered() {
        let mut d = InputDebouncer::new();
        assert_eq!(d.feed(edge(CW, 100)), None);
        // Inside the 5 ms window: not counted.
        assert_eq!(d.feed(edge(CW, 103)), None);
        assert_eq!(d.feed(edge(CW, 110)), Some(InputEvent::Clockwise));
    }

    #[test]
    fn opposite_edges_cancel() {
        let mut d = InputDebouncer::new();
        assert_eq!(d.feed(edge(CW, 100)), None);
        assert_eq!(d.feed(edge(CCW, 120)), None);
        assert_eq!(d.feed(edge(CW, 140)), None);
        assert_eq!(d.feed(edge(CW, 160)), Some(InputEvent::Clockwise));
    }

    #[test]
    fn idle_half_step_is_dropped() {
        let mut d = InputDebouncer::new();
        assert_eq!(d.feed(edge(CW, 1_000)), None);
        // 501 ms later the pending half-step is gone.
        assert_eq!(d.feed(edge(CW, 1_501)), None);
        assert_eq!(d.feed(edge(CW, 1_520)), Some(InputEvent::Clockwise));
    }

    #[test]
    fn half_step_within_idle_window_completes() {
        let mut d = InputDebouncer::new();
        assert_eq!(d.feed(edge(CCW, 1_000)), None);
        assert_eq!(d.feed(edge(CCW, 1_500)), Some(InputEvent::CounterClockwise));
    }

    #[test]
    fn poll_drains_the_queue() {
        while events::pop_edge().is_some() {}
        events::push_edge(edge(EdgeSource::BackKey, 10));
        events::push_edge(edge(EdgeSource::BackKey, 20));
        let mut d = InputDebouncer::new();
        let mut seen = Vec::new();
        d.poll(|e| seen.push(e));
        assert_eq!(seen, vec![InputEvent::Back]);
        assert!(events::pop_edge().is_none());
    }
}
