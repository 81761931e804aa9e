//! # webgui-server
//!
//! Single-client HTTP dispatcher for the WebGUI panel.
//!
//! This crate provides:
//! - `Transport`/`Connection` traits over the board's socket layer
//! - A non-blocking `std::net` TCP transport for hosts
//! - The `WebGui` controller and its `process_pending` entry point
//!
//! Pages are streamed in bounded chunks by default, so the whole page is
//! never held in memory.

pub mod config;
pub mod gui;
pub mod transport;

pub use config::ServerConfig;
pub use gui::{Handled, ServerError, WebGui};
pub use transport::{Connection, TcpTransport, Transport};
pub use webgui_core::{ControlPanel, RenderMode};
