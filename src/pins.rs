//! GPIO / peripheral assignments that are not part of a device table.
//!
//! Device outputs live in [`profiles`](crate::profiles); this module holds
//! the simulator panel inputs and the servo PWM parameters shared by every
//! travel actuator.

// ---------------------------------------------------------------------------
// Simulator panel inputs (EC11 rotary encoder + back key, active-low)
// ---------------------------------------------------------------------------

/// Encoder phase A, edge source for rotation.
pub const ENCODER_A_GPIO: u8 = 14;
/// Encoder phase B, sampled on phase A edges for direction.
pub const ENCODER_B_GPIO: u8 = 27;
/// Encoder push switch.
pub const ENCODER_SW_GPIO: u8 = 26;
/// Separate back/OK key.
pub const BACK_KEY_GPIO: u8 = 25;

pub const PANEL_INPUT_GPIOS: [u8; 4] = [
    ENCODER_A_GPIO,
    ENCODER_B_GPIO,
    ENCODER_SW_GPIO,
    BACK_KEY_GPIO,
];

// ---------------------------------------------------------------------------
// Servo PWM configuration (LEDC)
// ---------------------------------------------------------------------------

/// Standard hobby-servo frame rate.
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
/// LEDC timer resolution (bits).  14-bit gives ~1.2 µs steps at 50 Hz.
pub const SERVO_PWM_RESOLUTION_BITS: u32 = 14;
/// Frame period in microseconds.
pub const SERVO_PERIOD_US: u16 = 20_000;
/// Pulse width at 0°.
pub const SERVO_MIN_PULSE_US: u16 = 500;
/// Pulse width at 180°.
pub const SERVO_MAX_PULSE_US: u16 = 2_500;
/// Maximum number of servos (one LEDC channel each).
pub const MAX_SERVOS: usize = 8;
