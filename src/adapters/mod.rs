//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements   | Connects to                 |
//! |-------------|--------------|-----------------------------|
//! | `hardware`  | OutputPort   | ESP32 GPIO, LEDC servo PWM  |
//! | `log_sink`  | EventSink    | Serial log output           |
//! | `mqtt`      | SessionPort  | ESP-IDF MQTT client         |
//! | `time`      | (none)       | ESP32 system timer          |
//! | `wifi`      | LinkPort     | ESP-IDF WiFi STA            |

pub mod hardware;
pub mod log_sink;
pub mod mqtt;
pub mod time;
pub mod wifi;
