//! Router tests, driven in-process with `tower::ServiceExt::oneshot`.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use webgui_core::ControlPanel;
use webgui_web::{create_router, shared_panel, AppState};

fn test_state() -> AppState {
    let mut panel = ControlPanel::new();
    panel.set_title("Router Test");
    panel.add_button("Start");
    panel.add_toggle("Pump");
    panel.add_slider("Speed", 0, 10, 5);
    panel.add_sensor_status("Temperature");
    shared_panel(panel)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_page() {
    let state = test_state();
    let (status, content_type, body) = get(create_router(state.clone()), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    assert_eq!(body, state.read().await.render_page());
    assert!(body.contains("<h1>Router Test</h1>"));
}

#[tokio::test]
async fn test_unknown_path_serves_page() {
    let state = test_state();
    let (status, _, body) = get(create_router(state), "/anything/else").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with("<!DOCTYPE html>"));
}

#[tokio::test]
async fn test_set_and_get() {
    let state = test_state();

    let (status, content_type, body) =
        get(create_router(state.clone()), "/set?element0=1&element2=99&unknown=4").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/plain"));
    assert_eq!(body, "OK");

    let (_, content_type, body) = get(create_router(state.clone()), "/get").await;
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(
        body,
        r#"{"element0":"1","element1":"0","element2":"10","element3":"0"}"#
    );
}

#[tokio::test]
async fn test_set_without_query() {
    let (status, _, body) = get(create_router(test_state()), "/set").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn test_sketch_changes_are_visible() {
    let state = test_state();
    let handle = {
        let mut panel = state.write().await;
        panel.add_sensor_status("Humidity")
    };
    state.write().await.get_mut(handle).unwrap().set_text("40 %");

    let (_, _, body) = get(create_router(state), "/get").await;
    let values: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(values["element4"], "40 %");
}

#[tokio::test]
async fn test_buffered_page_matches_streamed_render() {
    let state = test_state();
    let (_, _, body) = get(create_router(state.clone()), "/").await;

    let mut streamed = Vec::new();
    state.read().await.stream_page(&mut streamed).unwrap();
    assert_eq!(body.into_bytes(), streamed);
}
