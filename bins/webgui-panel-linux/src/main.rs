mod sketch;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use webgui_core::settings::open_store;
use webgui_core::{ControlPanel, NetworkAdapter, Platform, PlatformProfile, RenderMode};
use webgui_server::{ServerConfig, WebGui};
use webgui_web::{create_router, shared_panel};

use crate::sketch::{HostWifi, Sketch};

const ACCESS_POINT_SSID: &str = "WebGUI-Panel";
const ACCESS_POINT_PASSWORD: &str = "webgui123";
const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,webgui_server=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("WebGUI panel starting...");

    // Configuration
    let bind_addr: SocketAddr = std::env::var("WEBGUI_BIND")
        .unwrap_or_else(|_| "0.0.0.0:8080".into())
        .parse()?;
    let platform: Platform = std::env::var("WEBGUI_PLATFORM")
        .unwrap_or_else(|_| "uno-r4-wifi".into())
        .parse()?;
    let settings_path = std::env::var("WEBGUI_SETTINGS").ok().map(PathBuf::from);
    let profile = platform.profile();
    tracing::info!(
        "Platform {}: {:?} rendering, {:?} settings",
        platform,
        profile.render_mode,
        profile.settings
    );

    // Network bring-up, falling back to access point mode
    let host_ip = match bind_addr.ip() {
        IpAddr::V4(ip) if !ip.is_unspecified() => ip,
        _ => Ipv4Addr::LOCALHOST,
    };
    let mut network = NetworkAdapter::new(HostWifi::new(host_ip))
        .with_retry(3, Duration::from_millis(100))
        .with_gateway_quirk(profile.gateway_quirk);
    if !network.join_network("host-network", "") {
        network.start_access_point(ACCESS_POINT_SSID, ACCESS_POINT_PASSWORD)?;
    }
    tracing::info!(
        "Network: {}",
        webgui_core::net::format_ip_display(
            &network.local_address().to_string(),
            &network.current_subnet().to_string(),
            &network.current_gateway().to_string()
        )
    );

    // Panel and persisted settings
    let settings = open_store(profile.settings, settings_path.as_deref())?;
    let mut panel = ControlPanel::new();
    let sketch = Sketch::setup(&mut panel, settings)?;

    match profile.render_mode {
        RenderMode::Streaming => run_streaming(panel, sketch, bind_addr, profile).await?,
        RenderMode::Buffered => run_buffered(panel, sketch, bind_addr).await?,
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Single-threaded dispatcher loop, as on the memory-constrained boards.
async fn run_streaming(
    panel: ControlPanel,
    mut sketch: Sketch,
    bind_addr: SocketAddr,
    profile: PlatformProfile,
) -> anyhow::Result<()> {
    let config = ServerConfig {
        bind_addr,
        render_mode: profile.render_mode,
        ..Default::default()
    };
    let mut gui = WebGui::bind(panel, config)?;
    tracing::info!("Open http://{}/ in a browser", gui.local_addr()?);

    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    let worker = tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        while flag.load(Ordering::Relaxed) {
            let handled = match gui.process_pending() {
                Ok(handled) => handled,
                Err(e) => {
                    tracing::warn!("Request failed: {}", e);
                    None
                }
            };
            sketch.poll(gui.panel_mut());
            if handled.is_none() {
                std::thread::sleep(POLL_INTERVAL);
            }
        }
        Ok(())
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, shutting down...");
            running.store(false, Ordering::Relaxed);
        }
        result = worker => {
            result??;
            tracing::warn!("Dispatcher loop stopped");
        }
    }
    Ok(())
}

/// axum front end with the sketch polled from a task.
async fn run_buffered(panel: ControlPanel, mut sketch: Sketch, bind_addr: SocketAddr) -> anyhow::Result<()> {
    let state = shared_panel(panel);
    let app = create_router(state.clone()).layer(TraceLayer::new_for_http());

    let sketch_state = state.clone();
    let sketch_handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(POLL_INTERVAL);
        loop {
            interval.tick().await;
            let mut panel = sketch_state.write().await;
            sketch.poll(&mut panel);
        }
    });

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Open http://{}/ in a browser", listener.local_addr()?);
    let http_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = http_handle => {
            tracing::warn!("HTTP server stopped");
        }
        _ = sketch_handle => {
            tracing::warn!("Sketch loop stopped");
        }
    }
    Ok(())
}
