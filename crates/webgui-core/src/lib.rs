//! # webgui-core
//!
//! Core of the WebGUI control panel library.
//!
//! This crate provides:
//! - Widget model (buttons, toggles, sliders, sensor readouts, text boxes)
//! - Widget registry with typed handles
//! - Page assembly, themes and the buffered/streaming render engine
//! - IPv4 validation and network helpers
//! - Persistent settings strategies
//! - WiFi connectivity policy over a board driver
//!
//! This crate is intentionally runtime-agnostic and contains no async code,
//! making it usable on hosts (tokio/axum) and microcontroller targets alike.

pub mod connectivity;
pub mod net;
pub mod page;
pub mod panel;
pub mod platform;
pub mod registry;
pub mod render;
pub mod settings;
pub mod template;
pub mod theme;
pub mod widget;

pub use connectivity::{ConnectError, Connectivity, NetworkAdapter, WifiDriver};
pub use page::PageConfig;
pub use panel::ControlPanel;
pub use platform::{Platform, PlatformProfile};
pub use registry::Registry;
pub use render::{ChunkedWriter, RenderMode};
pub use settings::{SettingValue, SettingsError, SettingsStore, SettingsStrategy};
pub use theme::{Stylesheet, Theme};
pub use widget::{
    Button, ButtonStyle, Control, Element, Geometry, Handle, SensorStatus, Slider, TextBox, Toggle,
    Widget,
};
