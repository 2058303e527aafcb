//! HomeNode firmware entry point
//!
//! Hexagonal architecture with a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  WifiAdapter   MqttAdapter    HardwareAdapter   LogEventSink   │
//! │  (LinkPort)    (SessionPort)  (OutputPort)      (EventSink)    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              NodeService (pure logic)                  │    │
//! │  │  Connectivity · Router · Device banks · Simulator      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Panel ISRs → edge queue → InputDebouncer → SimulatorPanel     │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Result, anyhow};
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::prelude::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::EspWifi;
use log::{debug, info, warn};

use embassy_sync::channel::Channel;
use homenode::adapters::hardware::HardwareAdapter;
use homenode::adapters::log_sink::LogEventSink;
use homenode::adapters::mqtt::{InboundChannel, MqttAdapter};
use homenode::adapters::time::Esp32TimeAdapter;
use homenode::adapters::wifi::WifiAdapter;
use homenode::app::service::NodeService;
use homenode::config::{BindingSpec, NodeConfig};
use homenode::drivers::encoder::InputDebouncer;
use homenode::drivers::hw_init;
use homenode::pins;

/// Broker callback → control loop.
static INBOUND: InboundChannel = Channel::new();

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  HomeNode v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = NodeConfig::default();
    info!(
        "Node '{}': {} devices, broker {}",
        config.node_id,
        config.devices.len(),
        config.broker.url()
    );

    // ── 2. Peripherals ────────────────────────────────────────
    if let Err(e) = hw_init::init_servo_timer() {
        warn!("Servo timer init failed: {}, servos disabled", e);
    }
    // Node 1 drives relays on the panel GPIOs; only claim them when free.
    let panel_pins_free = config.devices.iter().all(|d| {
        !matches!(d.binding, BindingSpec::Pin(p) if pins::PANEL_INPUT_GPIOS.contains(&p))
    });
    if !panel_pins_free {
        info!("Panel: GPIOs owned by device table, panel disabled");
    } else if let Err(e) = hw_init::init_panel_inputs() {
        warn!("Panel input init failed: {}, continuing without panel", e);
    }

    // ── 3. Adapters ───────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let driver = EspWifi::new(peripherals.modem, sysloop, Some(nvs))?;

    let mut wifi = WifiAdapter::new(driver);
    wifi.set_credentials(&config.wifi.ssid, &config.wifi.password)
        .map_err(|e| anyhow!("WiFi credentials: {}", e))?;
    let mut mqtt = MqttAdapter::new(config.broker.url(), &INBOUND);
    let mut hw = HardwareAdapter::new();
    let mut sink = LogEventSink::new();
    let time = Esp32TimeAdapter::new();

    // ── 4. Node service ───────────────────────────────────────
    let mut node = NodeService::new(&config).map_err(|e| anyhow!("device table: {}", e))?;
    node.start(&mut hw, &mut sink);

    let mut debouncer = InputDebouncer::new();
    #[cfg(feature = "sensor-sim")]
    let mut panel = homenode::app::panel::SimulatorPanel::new();

    info!("System ready. Entering control loop.");

    // ── 5. Control loop ───────────────────────────────────────
    loop {
        let status = node.tick(time.now(), &mut wifi, &mut mqtt, &mut hw, &mut sink);

        debouncer.poll(|event| {
            #[cfg(feature = "sensor-sim")]
            node.apply_input(&mut panel, event, &mut sink);
            #[cfg(not(feature = "sensor-sim"))]
            debug!("Panel: {:?} ignored, simulator not built", event);
        });
        #[cfg(feature = "sensor-sim")]
        node.refresh_panel(&mut panel, time.now());

        if node.take_redraw() {
            debug!(
                "Display: wifi={} mqtt={} tick={}",
                status.link_up,
                status.session_up,
                node.tick_count()
            );
        }

        FreeRtos::delay_ms(config.control_loop_interval_ms);
    }
}
