//! Panel input, servo and raw peripheral drivers.

pub mod encoder;
pub mod hw_init;
pub mod servo;
