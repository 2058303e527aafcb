//! HomeNode firmware library.
//!
//! Exposes the pure-logic modules for integration testing and the
//! adapters for the firmware binary.  All ESP-IDF-specific code is
//! guarded by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod connectivity;
pub mod devices;
pub mod error;
pub mod events;
pub mod pins;
pub mod profiles;
pub mod protocol;
pub mod registry;
pub mod sensors;

pub mod adapters;
pub mod drivers;

#[cfg(target_os = "espidf")]
mod esp_link_shims;
