//! WiFi station-mode adapter.
//!
//! Implements [`LinkPort`].  Attempts are started non-blocking; the
//! [`ConnectivityManager`](crate::connectivity::ConnectivityManager)
//! owns timeouts and retry spacing.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::wifi::EspWifi` in STA mode.
//! - **all other targets**: a simulated access point that can be made
//!   (un)reachable from tests.

use core::fmt;
use log::{info, warn};

use crate::app::ports::{LinkError, LinkPort};

// ───────────────────────────────────────────────────────────────
// Credential validation
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialError {
    InvalidSsid,
    InvalidPassword,
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
        }
    }
}

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), CredentialError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(CredentialError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), CredentialError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(CredentialError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    attempts: u32,
    #[cfg(target_os = "espidf")]
    driver: esp_idf_svc::wifi::EspWifi<'static>,
    #[cfg(not(target_os = "espidf"))]
    sim: SimAccessPoint,
}

#[cfg(not(target_os = "espidf"))]
#[derive(Debug)]
struct SimAccessPoint {
    reachable: bool,
    associating: bool,
    associated: bool,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(driver: esp_idf_svc::wifi::EspWifi<'static>) -> Self {
        Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            attempts: 0,
            driver,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            attempts: 0,
            sim: SimAccessPoint {
                reachable: true,
                associating: false,
                associated: false,
            },
        }
    }

    pub fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), CredentialError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid.push_str(ssid).map_err(|_| CredentialError::InvalidSsid)?;
        self.password.clear();
        self.password.push_str(password).map_err(|_| CredentialError::InvalidPassword)?;
        info!("WiFi: credentials updated (SSID='{}')", self.ssid);
        Ok(())
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    /// Association attempts started so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), LinkError> {
        use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};

        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let conf = Configuration::Client(ClientConfiguration {
            ssid: self.ssid.clone(),
            password: self.password.clone(),
            auth_method,
            ..Default::default()
        });
        let driver_err = |e: esp_idf_svc::sys::EspError| {
            warn!("WiFi: driver error {}", e);
            LinkError::DriverError
        };
        self.driver.set_configuration(&conf).map_err(driver_err)?;
        if !self.driver.is_started().map_err(driver_err)? {
            self.driver.start().map_err(driver_err)?;
        }
        self.driver.connect().map_err(driver_err)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), LinkError> {
        self.sim.associating = true;
        self.sim.associated = self.sim.reachable;
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_up(&self) -> bool {
        self.driver.is_up().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_up(&self) -> bool {
        self.sim.associated
    }

    #[cfg(target_os = "espidf")]
    fn platform_disconnect(&mut self) {
        if let Err(e) = self.driver.disconnect() {
            warn!("WiFi: disconnect failed: {}", e);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_disconnect(&mut self) {
        self.sim.associating = false;
        self.sim.associated = false;
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_os = "espidf"))]
impl WifiAdapter {
    /// Make the simulated AP (un)reachable.  Becoming reachable completes
    /// an in-flight attempt; becoming unreachable drops the link.
    pub fn set_reachable(&mut self, reachable: bool) {
        self.sim.reachable = reachable;
        self.sim.associated = reachable && self.sim.associating;
    }
}

// ───────────────────────────────────────────────────────────────
// LinkPort
// ───────────────────────────────────────────────────────────────

impl LinkPort for WifiAdapter {
    fn begin_connect(&mut self) -> Result<(), LinkError> {
        if self.ssid.is_empty() {
            return Err(LinkError::NoCredentials);
        }
        self.attempts = self.attempts.wrapping_add(1);
        info!("WiFi: connecting to '{}' (attempt {})", self.ssid, self.attempts);
        self.platform_connect()
    }

    fn is_up(&self) -> bool {
        self.platform_is_up()
    }

    fn abort(&mut self) {
        warn!("WiFi: attempt abandoned");
        self.platform_disconnect();
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
