//! # webgui-web
//!
//! Buffered-mode front end for the WebGUI panel.
//!
//! Used where a full HTTP server is available: the page is rendered into
//! one string per request and the server handles request parsing and
//! connection management.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use webgui_web::{create_router, shared_panel};
//!
//! let state = shared_panel(panel);
//! let app = create_router(state.clone());
//!
//! let listener = TcpListener::bind("0.0.0.0:80").await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod routes;

pub use routes::create_router;

use std::sync::Arc;

use tokio::sync::RwLock;
use webgui_core::ControlPanel;

/// Panel shared between the route handlers and the application loop.
pub type AppState = Arc<RwLock<ControlPanel>>;

pub fn shared_panel(panel: ControlPanel) -> AppState {
    Arc::new(RwLock::new(panel))
}
