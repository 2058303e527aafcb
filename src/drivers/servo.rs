//! Hobby-servo driver over any [`SetDutyCycle`] channel.
//!
//! 50 Hz frame, 500–2500 µs pulse mapped linearly onto 0–180°.  On the
//! target each servo owns one LEDC channel ([`LedcChannel`]); host tests
//! plug in a recording channel.

use core::convert::Infallible;

use embedded_hal::pwm::{ErrorType, SetDutyCycle};

use crate::drivers::hw_init;
use crate::pins::{SERVO_MAX_PULSE_US, SERVO_MIN_PULSE_US, SERVO_PERIOD_US, SERVO_PWM_RESOLUTION_BITS};

pub const MAX_ANGLE_DEG: u8 = 180;

/// Pulse width for `degrees`, clamped to 0–180.
pub fn pulse_width_us(degrees: u8) -> u16 {
    let deg = u32::from(degrees.min(MAX_ANGLE_DEG));
    let span = u32::from(SERVO_MAX_PULSE_US - SERVO_MIN_PULSE_US);
    SERVO_MIN_PULSE_US + (span * deg / u32::from(MAX_ANGLE_DEG)) as u16
}

pub struct Servo<P: SetDutyCycle> {
    pwm: P,
    angle: Option<u8>,
}

impl<P: SetDutyCycle> Servo<P> {
    pub fn new(pwm: P) -> Self {
        Self { pwm, angle: None }
    }

    pub fn set_angle(&mut self, degrees: u8) -> Result<(), P::Error> {
        let degrees = degrees.min(MAX_ANGLE_DEG);
        self.pwm
            .set_duty_cycle_fraction(pulse_width_us(degrees), SERVO_PERIOD_US)?;
        self.angle = Some(degrees);
        Ok(())
    }

    /// Last commanded angle.
    pub fn angle(&self) -> Option<u8> {
        self.angle
    }
}

/// One LEDC channel on the servo timer.
pub struct LedcChannel {
    channel: u8,
}

impl LedcChannel {
    /// Bind `channel` to `gpio` on the shared 50 Hz servo timer.
    pub fn attach(channel: u8, gpio: u8) -> Result<Self, hw_init::HwInitError> {
        hw_init::ledc_attach(channel, gpio)?;
        Ok(Self { channel })
    }
}

impl ErrorType for LedcChannel {
    type Error = Infallible;
}

impl SetDutyCycle for LedcChannel {
    fn max_duty_cycle(&self) -> u16 {
        ((1u32 << SERVO_PWM_RESOLUTION_BITS) - 1) as u16
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        hw_init::ledc_set_duty(self.channel, u32::from(duty));
        Ok(())
    }
}
