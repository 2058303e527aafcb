//! Sensor subsystem: per-room readings behind one [`SensorBank`].
//!
//! With the `sensor-sim` feature the bank owns a [`SensorSimulator`] that
//! serves adjustable per-room values with a configurable failure rate.
//! Without it there is no sensor hardware on this board and every read
//! reports [`SensorReading::Unavailable`].
//!
//! [`SensorSimulator`]: simulator::SensorSimulator

#[cfg(feature = "sensor-sim")]
pub mod simulator;

use crate::config::NodeConfig;
use crate::registry::{Registry, SensorKind};

/// Outcome of a single sensor read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorReading {
    Value(f32),
    Unavailable,
}

impl SensorReading {
    pub fn value(self) -> Option<f32> {
        match self {
            Self::Value(v) => Some(v),
            Self::Unavailable => None,
        }
    }
}

pub struct SensorBank {
    #[cfg(feature = "sensor-sim")]
    sim: simulator::SensorSimulator,
}

impl SensorBank {
    #[cfg_attr(not(feature = "sensor-sim"), allow(unused_variables))]
    pub fn new(registry: &Registry, config: &NodeConfig) -> Self {
        Self {
            #[cfg(feature = "sensor-sim")]
            sim: simulator::SensorSimulator::new(
                registry,
                config.sensor_failure_probability,
                config.sensor_seed,
            ),
        }
    }

    /// Current reading of `kind` in `room`.  Unknown rooms are unavailable.
    pub fn read(&mut self, registry: &Registry, room: &str, kind: SensorKind) -> SensorReading {
        let Some(room_idx) = registry.room_index(room) else {
            return SensorReading::Unavailable;
        };

        #[cfg(feature = "sensor-sim")]
        {
            self.sim.read(room_idx, kind)
        }

        #[cfg(not(feature = "sensor-sim"))]
        {
            let _ = room_idx;
            log::warn!("Sensor: no {:?} hardware in '{}'", kind, room);
            SensorReading::Unavailable
        }
    }

    #[cfg(feature = "sensor-sim")]
    pub fn simulator(&self) -> &simulator::SensorSimulator {
        &self.sim
    }

    #[cfg(feature = "sensor-sim")]
    pub fn simulator_mut(&mut self) -> &mut simulator::SensorSimulator {
        &mut self.sim
    }
}
