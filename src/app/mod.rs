//! Application core: pure domain logic, zero I/O.
//!
//! Orchestration of connectivity, command dispatch and the simulator
//! panel.  All interaction with hardware and the network happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod events;
#[cfg(feature = "sensor-sim")]
pub mod panel;
pub mod ports;
pub mod service;
