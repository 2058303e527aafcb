//! Hardware adapter: bridges GPIO relays and LEDC servos to [`OutputPort`].
//!
//! This is the only module that drives actual outputs.  It also keeps a
//! shadow of every commanded level and angle, which the display and the
//! host tests read back.  On non-espidf targets the underlying driver
//! calls are simulation stubs.

use heapless::Vec;
use log::{debug, warn};

use crate::app::ports::OutputPort;
use crate::drivers::hw_init;
use crate::drivers::servo::{LedcChannel, Servo};
use crate::pins::MAX_SERVOS;
use crate::registry::MAX_DEVICES;

pub struct HardwareAdapter {
    levels: Vec<(u8, bool), MAX_DEVICES>,
    servos: Vec<(u8, Servo<LedcChannel>), MAX_SERVOS>,
}

impl Default for HardwareAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareAdapter {
    pub fn new() -> Self {
        Self {
            levels: Vec::new(),
            servos: Vec::new(),
        }
    }

    /// Last level written to `pin`.
    pub fn level(&self, pin: u8) -> Option<bool> {
        self.levels.iter().find(|(p, _)| *p == pin).map(|&(_, l)| l)
    }

    /// Number of servos holding an LEDC channel.
    pub fn servo_count(&self) -> usize {
        self.servos.len()
    }

    /// Last angle commanded on the servo at `pin`.
    pub fn angle(&self, pin: u8) -> Option<u8> {
        self.servos
            .iter()
            .find(|(p, _)| *p == pin)
            .and_then(|(_, s)| s.angle())
    }
}

impl OutputPort for HardwareAdapter {
    fn configure_output(&mut self, pin: u8) {
        if let Err(e) = hw_init::gpio_configure_output(pin) {
            warn!("HW: GPIO{} output config failed: {}", pin, e);
        }
    }

    fn configure_servo(&mut self, pin: u8) {
        if self.servos.iter().any(|(p, _)| *p == pin) {
            return;
        }
        if self.servos.is_full() {
            warn!("HW: no LEDC channel left for servo on GPIO{}", pin);
            return;
        }
        let channel = self.servos.len() as u8;
        match LedcChannel::attach(channel, pin) {
            Ok(ch) => {
                if self.servos.push((pin, Servo::new(ch))).is_ok() {
                    debug!("HW: servo GPIO{} on LEDC CH{}", pin, channel);
                }
            }
            Err(e) => warn!("HW: servo attach on GPIO{} failed: {}", pin, e),
        }
    }

    fn write_level(&mut self, pin: u8, high: bool) {
        hw_init::gpio_write(pin, high);
        if let Some(slot) = self.levels.iter_mut().find(|(p, _)| *p == pin) {
            slot.1 = high;
        } else if self.levels.push((pin, high)).is_err() {
            warn!("HW: level shadow full, GPIO{} not tracked", pin);
        }
    }

    fn write_angle(&mut self, pin: u8, degrees: u8) {
        let Some((_, servo)) = self.servos.iter_mut().find(|(p, _)| *p == pin) else {
            warn!("HW: no servo attached on GPIO{}", pin);
            return;
        };
        if let Err(e) = servo.set_angle(degrees) {
            warn!("HW: servo GPIO{} write failed: {:?}", pin, e);
        }
    }
}
