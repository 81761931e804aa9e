//! ESP32 adapters for the WebGUI panel.
//!
//! The ESP32 profile renders buffered pages and keeps settings in the
//! preferences (NVS) store. This crate supplies the two board-specific
//! pieces:
//! - [`wifi::EspWifiDriver`] implements [`webgui_core::WifiDriver`]
//! - [`nvs::NvsSettings`] implements [`webgui_core::SettingsStore`]
//!
//! # Example
//!
//! ```ignore
//! use webgui_core::NetworkAdapter;
//! use webgui_esp32::{nvs::NvsSettings, wifi::EspWifiDriver};
//!
//! let driver = EspWifiDriver::new(peripherals.modem, sysloop, Some(nvs_partition.clone()))?;
//! let mut network = NetworkAdapter::new(driver);
//! if !network.join_network("ssid", "password") {
//!     network.start_access_point("WebGUI", "webgui123")?;
//! }
//!
//! let settings = NvsSettings::open(nvs_partition, "webgui")?;
//! ```

pub mod nvs;
pub mod wifi;
