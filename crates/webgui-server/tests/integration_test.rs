//! Integration tests for the streaming dispatcher.
//!
//! These tests bind a real loopback listener, connect with a plain TCP
//! client and drive `process_pending` from the test thread.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::Duration;

use webgui_server::{ControlPanel, Handled, RenderMode, ServerConfig, TcpTransport, WebGui};

/// Start a dispatcher on an ephemeral loopback port.
fn start_test_gui(render_mode: RenderMode) -> WebGui<TcpTransport> {
    let mut panel = ControlPanel::new();
    panel.set_title("Test Panel");
    panel.add_button("Start");
    panel.add_toggle("Pump");
    panel.add_slider("Speed", 0, 255, 128);
    panel.add_sensor_status("Temperature");
    panel.add_text_box("SSID", "network name");

    let config = ServerConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        render_mode,
        read_timeout: Some(Duration::from_millis(500)),
        max_chunk: 64,
        ..Default::default()
    };
    WebGui::bind(panel, config).unwrap()
}

/// Send `request`, let the dispatcher serve it, and return the raw response.
fn exchange(gui: &mut WebGui<TcpTransport>, request: &str) -> (Handled, String) {
    let addr: SocketAddr = gui.local_addr().unwrap();
    let mut client = TcpStream::connect(addr).unwrap();
    client.write_all(request.as_bytes()).unwrap();

    let mut handled = None;
    for _ in 0..100 {
        if let Some(h) = gui.process_pending().unwrap() {
            handled = Some(h);
            break;
        }
        thread::sleep(Duration::from_millis(10));
    }

    let mut response = String::new();
    client.read_to_string(&mut response).unwrap();
    (handled.expect("request was not served"), response)
}

fn body(response: &str) -> &str {
    response.split_once("\r\n\r\n").map(|(_, b)| b).unwrap()
}

#[test]
fn test_idle_poll_returns_none() {
    let mut gui = start_test_gui(RenderMode::Streaming);
    assert_eq!(gui.process_pending().unwrap(), None);
}

#[test]
fn test_page_over_tcp() {
    let mut gui = start_test_gui(RenderMode::Streaming);
    let (handled, response) = exchange(&mut gui, "GET / HTTP/1.1\r\nHost: localhost\r\n\r\n");

    assert_eq!(handled, Handled::Page);
    assert!(response.starts_with("HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n"));
    assert!(!response.contains("Content-Length"));
    assert_eq!(body(&response), gui.panel().render_page());
    assert!(response.contains("<title>Test Panel</title>"));
}

#[test]
fn test_streaming_and_buffered_bodies_match() {
    let mut streaming = start_test_gui(RenderMode::Streaming);
    let mut buffered = start_test_gui(RenderMode::Buffered);

    let (_, streamed) = exchange(&mut streaming, "GET / HTTP/1.1\r\n\r\n");
    let (_, whole) = exchange(&mut buffered, "GET / HTTP/1.1\r\n\r\n");

    assert_eq!(body(&streamed), body(&whole));
}

#[test]
fn test_set_then_get() {
    let mut gui = start_test_gui(RenderMode::Streaming);

    let (handled, response) = exchange(
        &mut gui,
        "GET /set?element0=1&element1=true&element2=300&element4=Home%20Net HTTP/1.1\r\n\r\n",
    );
    assert!(matches!(handled, Handled::SetValues(outcome) if outcome.applied == 4));
    assert!(response.contains("Content-Type: text/plain"));
    assert_eq!(body(&response), "OK");

    let (handled, response) = exchange(&mut gui, "GET /get HTTP/1.1\r\n\r\n");
    assert_eq!(handled, Handled::GetValues);

    let values: serde_json::Value = serde_json::from_str(body(&response)).unwrap();
    assert_eq!(values["element0"], "1");
    assert_eq!(values["element1"], "1");
    assert_eq!(values["element2"], "255");
    assert_eq!(values["element3"], "0");
    assert_eq!(values["element4"], "Home Net");
}

#[test]
fn test_unmatched_set_still_ok() {
    let mut gui = start_test_gui(RenderMode::Streaming);
    let (_, response) = exchange(&mut gui, "GET /set?element99=1 HTTP/1.1\r\n\r\n");
    assert_eq!(body(&response), "OK");
}

#[test]
fn test_client_that_never_finishes_is_dropped() {
    let mut gui = start_test_gui(RenderMode::Streaming);
    let (handled, response) = exchange(&mut gui, "GET /set?element0=1 HTTP/1.1\r\nHost: x\r\n");

    assert_eq!(handled, Handled::Abandoned);
    assert!(response.is_empty());

    // The dispatcher keeps serving afterwards.
    let (handled, _) = exchange(&mut gui, "GET /get HTTP/1.1\r\n\r\n");
    assert_eq!(handled, Handled::GetValues);
}
