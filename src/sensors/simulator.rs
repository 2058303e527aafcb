//! Simulated room sensors.
//!
//! Values start from [`profiles::sensor_defaults`](crate::profiles::sensor_defaults)
//! and are changed through [`set`](SensorSimulator::set) /
//! [`adjust`](SensorSimulator::adjust) (the simulator panel), clamped to
//! each kind's plausible range.  Every read independently fails with the
//! configured probability, modelling a flaky bus.

use heapless::Vec;
use log::debug;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::SensorReading;
use crate::profiles;
use crate::registry::{MAX_ROOMS, Registry, RoomIndex, SensorKind};

pub struct SensorSimulator {
    values: Vec<[f32; SensorKind::COUNT], MAX_ROOMS>,
    failure_probability: f64,
    rng: SmallRng,
}

impl SensorSimulator {
    pub fn new(registry: &Registry, failure_probability: f64, seed: u64) -> Self {
        let mut values = Vec::new();
        for (_, room) in registry.rooms() {
            let d = profiles::sensor_defaults(room);
            let mut row = [0.0; SensorKind::COUNT];
            row[SensorKind::Temperature.index()] = d.temperature_c;
            row[SensorKind::Humidity.index()] = d.humidity_pct;
            row[SensorKind::Brightness.index()] = d.brightness_lux;
            row[SensorKind::Smoke.index()] = d.smoke_ppm;
            row[SensorKind::Gas.index()] = d.gas_ppm;
            let pushed = values.push(row).is_ok();
            debug_assert!(pushed, "registry rooms exceed MAX_ROOMS");
        }
        Self {
            values,
            failure_probability: if failure_probability.is_nan() {
                0.0
            } else {
                failure_probability.clamp(0.0, 1.0)
            },
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn read(&mut self, room: RoomIndex, kind: SensorKind) -> SensorReading {
        if self.rng.gen_bool(self.failure_probability) {
            debug!("Sensor: simulated {:?} failure in room {}", kind, room.get());
            return SensorReading::Unavailable;
        }
        SensorReading::Value(self.get(room, kind))
    }

    pub fn get(&self, room: RoomIndex, kind: SensorKind) -> f32 {
        self.values[room.get()][kind.index()]
    }

    /// Store `value` clamped to the kind's range; returns the stored value.
    pub fn set(&mut self, room: RoomIndex, kind: SensorKind, value: f32) -> f32 {
        let (lo, hi) = kind.range();
        let v = value.clamp(lo, hi);
        self.values[room.get()][kind.index()] = v;
        v
    }

    pub fn adjust(&mut self, room: RoomIndex, kind: SensorKind, delta: f32) -> f32 {
        self.set(room, kind, self.get(room, kind) + delta)
    }

    pub fn failure_probability(&self) -> f64 {
        self.failure_probability
    }
}
