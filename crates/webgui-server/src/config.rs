//! Dispatcher configuration.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use webgui_core::RenderMode;
use webgui_protocol::request::DEFAULT_MAX_LINE;

/// Configuration for the streaming dispatcher.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// How page responses are produced.
    pub render_mode: RenderMode,
    /// Per-connection read timeout. A client that stalls longer is dropped.
    pub read_timeout: Option<Duration>,
    /// Request line bytes kept; the rest of a longer line is discarded.
    pub max_request_line: usize,
    /// Largest single write handed to the socket while streaming.
    pub max_chunk: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 80)),
            render_mode: RenderMode::Streaming,
            read_timeout: Some(Duration::from_secs(5)),
            max_request_line: DEFAULT_MAX_LINE,
            max_chunk: 512,
        }
    }
}
