//! One-shot hardware peripheral initialization and raw GPIO/LEDC access.
//!
//! Configures relay outputs, the shared 50 Hz servo LEDC timer, and the
//! panel inputs with their ISRs using raw ESP-IDF sys calls.  On host
//! targets every function is a logging no-op.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    LedcInitFailed(i32),
    IsrInstallFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::LedcInitFailed(rc) => write!(f, "LEDC timer/channel config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
        }
    }
}

// ── GPIO outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn gpio_configure_output(pin: u8) -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        ..Default::default()
    };
    // SAFETY: gpio_config reads the config struct; main-task only.
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed(ret));
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_configure_output(pin: u8) -> Result<(), HwInitError> {
    log::debug!("hw_init(sim): GPIO{} as output", pin);
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: u8, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin.
    unsafe {
        gpio_set_level(i32::from(pin), u32::from(high));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: u8, _high: bool) {}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: u8) -> bool {
    // SAFETY: register read on a configured pin; also safe in ISR context.
    (unsafe { gpio_get_level(i32::from(pin)) }) != 0
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(_pin: u8) -> bool {
    true
}

// ── LEDC servo PWM ────────────────────────────────────────────

/// Configure LEDC timer 0 for the servos.  Call once before
/// [`ledc_attach`].
#[cfg(target_os = "espidf")]
pub fn init_servo_timer() -> Result<(), HwInitError> {
    let timer = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: ledc_timer_t_LEDC_TIMER_0,
        duty_resolution: pins::SERVO_PWM_RESOLUTION_BITS,
        freq_hz: pins::SERVO_PWM_FREQ_HZ,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    // SAFETY: single call from main() before any channel is attached.
    let ret = unsafe { ledc_timer_config(&timer) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::LedcInitFailed(ret));
    }
    info!(
        "hw_init: servo timer {} Hz / {}-bit",
        pins::SERVO_PWM_FREQ_HZ,
        pins::SERVO_PWM_RESOLUTION_BITS
    );
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_servo_timer() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): servo timer skipped");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn ledc_attach(channel: u8, gpio: u8) -> Result<(), HwInitError> {
    let cfg = ledc_channel_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        channel: u32::from(channel),
        timer_sel: ledc_timer_t_LEDC_TIMER_0,
        gpio_num: i32::from(gpio),
        duty: 0,
        hpoint: 0,
        ..Default::default()
    };
    // SAFETY: channel config from the main task; timer configured earlier.
    let ret = unsafe { ledc_channel_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::LedcInitFailed(ret));
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_attach(channel: u8, gpio: u8) -> Result<(), HwInitError> {
    log::debug!("hw_init(sim): LEDC CH{} → GPIO{}", channel, gpio);
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn ledc_set_duty(channel: u8, duty: u32) {
    // SAFETY: channel configured by ledc_attach(); main loop is the only writer.
    unsafe {
        esp_idf_svc::sys::ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, u32::from(channel), duty);
        esp_idf_svc::sys::ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, u32::from(channel));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_set_duty(_channel: u8, _duty: u32) {}

// ── Panel inputs + ISR service ────────────────────────────────

#[cfg(target_os = "espidf")]
use crate::events::{EdgeSource, RawEdge, push_edge};

#[cfg(target_os = "espidf")]
fn isr_now_ms() -> u32 {
    // SAFETY: esp_timer_get_time is an RTC counter read; safe in ISR context.
    (unsafe { esp_timer_get_time() } / 1_000) as u32
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn encoder_a_isr(_arg: *mut core::ffi::c_void) {
    let source = EdgeSource::EncoderA {
        a_high: gpio_read(pins::ENCODER_A_GPIO),
        b_high: gpio_read(pins::ENCODER_B_GPIO),
    };
    push_edge(RawEdge { source, at_ms: isr_now_ms() });
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn encoder_sw_isr(_arg: *mut core::ffi::c_void) {
    push_edge(RawEdge { source: EdgeSource::EncoderSwitch, at_ms: isr_now_ms() });
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn back_key_isr(_arg: *mut core::ffi::c_void) {
    push_edge(RawEdge { source: EdgeSource::BackKey, at_ms: isr_now_ms() });
}

/// Configure the encoder and back key as pulled-up inputs and register
/// their edge ISRs.
#[cfg(target_os = "espidf")]
pub fn init_panel_inputs() -> Result<(), HwInitError> {
    for &pin in &pins::PANEL_INPUT_GPIOS {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
            ..Default::default()
        };
        // SAFETY: config struct read by the driver; main-task only.
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
    }

    // SAFETY: ESP_ERR_INVALID_STATE means the service is already installed.
    // Handlers are static functions that only push to the lock-free queue.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        let a = i32::from(pins::ENCODER_A_GPIO);
        gpio_set_intr_type(a, gpio_int_type_t_GPIO_INTR_ANYEDGE);
        gpio_isr_handler_add(a, Some(encoder_a_isr), core::ptr::null_mut());
        gpio_intr_enable(a);

        let sw = i32::from(pins::ENCODER_SW_GPIO);
        gpio_set_intr_type(sw, gpio_int_type_t_GPIO_INTR_NEGEDGE);
        gpio_isr_handler_add(sw, Some(encoder_sw_isr), core::ptr::null_mut());
        gpio_intr_enable(sw);

        let back = i32::from(pins::BACK_KEY_GPIO);
        gpio_set_intr_type(back, gpio_int_type_t_GPIO_INTR_NEGEDGE);
        gpio_isr_handler_add(back, Some(back_key_isr), core::ptr::null_mut());
        gpio_intr_enable(back);
    }
    info!("hw_init: panel inputs + ISRs installed (encoder A/SW, back key)");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_panel_inputs() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): panel ISRs skipped");
    Ok(())
}
