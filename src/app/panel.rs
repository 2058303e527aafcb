//! Sensor simulator panel.
//!
//! Navigation driven by the rotary encoder and back key:
//!
//! ```text
//!   Status ◀──back──▶ Overview ──press──▶ Browse ──press──▶ Edit
//!                       ▲  ▲                │  ▲              │
//!                       │  └──────back──────┘  └────press─────┘
//!                       └───────────────back──────────────────┘
//!
//!   Overview: rotate selects the room
//!   Browse:   rotate toggles temperature / humidity
//!   Edit:     rotate adjusts the value by ±0.5
//!   Status:   link and session state, refreshed every second
//! ```
//!
//! Entering Browse always starts on temperature.  The panel never draws
//! anything; it raises a redraw flag that the display collaborator
//! consumes.

use embassy_time::{Duration, Instant};
use log::debug;

use super::events::InputEvent;
use crate::connectivity::ConnectivityStatus;
use crate::registry::{Registry, RoomIndex, SensorKind};
use crate::sensors::simulator::SensorSimulator;

/// Value change per encoder step in edit mode.
pub const ADJUST_STEP: f32 = 0.5;
/// Redraw period of the status page.
pub const STATUS_REFRESH_MS: u64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelMode {
    Overview,
    Browse,
    Edit,
    Status,
}

#[derive(Debug)]
pub struct SimulatorPanel {
    mode: PanelMode,
    room_cursor: usize,
    metric: SensorKind,
    connectivity: ConnectivityStatus,
    last_status_draw: Option<Instant>,
    redraw: bool,
}

impl Default for SimulatorPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatorPanel {
    pub fn new() -> Self {
        Self {
            mode: PanelMode::Overview,
            room_cursor: 0,
            metric: SensorKind::Temperature,
            connectivity: ConnectivityStatus::default(),
            last_status_draw: None,
            redraw: true,
        }
    }

    pub fn mode(&self) -> PanelMode {
        self.mode
    }

    pub fn metric(&self) -> SensorKind {
        self.metric
    }

    /// Connectivity last shown on the status page.
    pub fn connectivity(&self) -> ConnectivityStatus {
        self.connectivity
    }

    pub fn selected_room<'r>(&self, registry: &'r Registry) -> Option<(RoomIndex, &'r str)> {
        registry.rooms().nth(self.room_cursor)
    }

    /// Returns and clears the redraw flag.
    pub fn take_redraw(&mut self) -> bool {
        core::mem::take(&mut self.redraw)
    }

    /// Feed the current connectivity.  On the status page this redraws on
    /// every change and at least once per [`STATUS_REFRESH_MS`].
    pub fn refresh(&mut self, now: Instant, status: ConnectivityStatus) {
        let changed = status != self.connectivity;
        self.connectivity = status;
        if self.mode != PanelMode::Status {
            return;
        }
        let due = self
            .last_status_draw
            .is_none_or(|t| now >= t + Duration::from_millis(STATUS_REFRESH_MS));
        if changed || due {
            self.last_status_draw = Some(now);
            self.redraw = true;
        }
    }

    /// Apply one input event.  Returns the new value when a sensor changed.
    pub fn handle(
        &mut self,
        event: InputEvent,
        registry: &Registry,
        sim: &mut SensorSimulator,
    ) -> Option<(RoomIndex, SensorKind, f32)> {
        let rooms = registry.room_count();
        if rooms == 0 {
            return None;
        }
        let mut changed = None;

        match (self.mode, event) {
            (PanelMode::Overview, InputEvent::Clockwise) => {
                self.room_cursor = (self.room_cursor + 1) % rooms;
            }
            (PanelMode::Overview, InputEvent::CounterClockwise) => {
                self.room_cursor = (self.room_cursor + rooms - 1) % rooms;
            }
            (PanelMode::Overview, InputEvent::Press) => {
                self.mode = PanelMode::Browse;
                self.metric = SensorKind::Temperature;
            }
            (PanelMode::Overview, InputEvent::Back) => {
                self.mode = PanelMode::Status;
                self.last_status_draw = None;
            }

            (PanelMode::Browse, InputEvent::Clockwise | InputEvent::CounterClockwise) => {
                self.metric = match self.metric {
                    SensorKind::Temperature => SensorKind::Humidity,
                    _ => SensorKind::Temperature,
                };
            }
            (PanelMode::Browse, InputEvent::Press) => self.mode = PanelMode::Edit,

            (PanelMode::Edit, InputEvent::Clockwise | InputEvent::CounterClockwise) => {
                let delta = if event == InputEvent::Clockwise {
                    ADJUST_STEP
                } else {
                    -ADJUST_STEP
                };
                let (room, _) = self.selected_room(registry)?;
                let value = sim.adjust(room, self.metric, delta);
                changed = Some((room, self.metric, value));
            }
            (PanelMode::Edit, InputEvent::Press) => self.mode = PanelMode::Browse,

            (PanelMode::Browse | PanelMode::Edit | PanelMode::Status, InputEvent::Back) => {
                self.mode = PanelMode::Overview;
            }
            // Rotation and press do nothing on the status page.
            (PanelMode::Status, _) => return None,
        }

        debug!(
            "Panel: {:?} → mode={:?} room={} metric={:?}",
            event, self.mode, self.room_cursor, self.metric
        );
        self.redraw = true;
        changed
    }
}
