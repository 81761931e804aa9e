//! Panel routes.
//!
//! - `/` and any unknown path - the full page, built in memory
//! - `/set?id=value&...` - apply values, always answers `OK`
//! - `/get` - JSON snapshot of every widget value

use axum::extract::{RawQuery, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use tracing::{debug, error};

use webgui_protocol::request::{GET_PATH, SET_PATH};
use webgui_protocol::{apply_set_query, ContentType, ValuesSnapshot, SET_OK_BODY};

use crate::AppState;

/// Create the panel router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", any(page_handler))
        .route(SET_PATH, any(set_handler))
        .route(GET_PATH, any(get_handler))
        .fallback(page_handler)
        .with_state(state)
}

async fn page_handler(State(state): State<AppState>) -> Html<String> {
    let panel = state.read().await;
    Html(panel.render_page())
}

async fn set_handler(State(state): State<AppState>, RawQuery(query): RawQuery) -> Response {
    let outcome = {
        let mut panel = state.write().await;
        apply_set_query(panel.registry_mut(), query.as_deref().unwrap_or(""))
    };
    if outcome.ignored > 0 {
        debug!("Ignored {} unknown parameters", outcome.ignored);
    }
    ([(header::CONTENT_TYPE, ContentType::PlainText.as_str())], SET_OK_BODY).into_response()
}

async fn get_handler(State(state): State<AppState>) -> Response {
    let panel = state.read().await;
    match ValuesSnapshot::new(panel.registry()).to_json() {
        Ok(json) => ([(header::CONTENT_TYPE, ContentType::Json.as_str())], json).into_response(),
        Err(e) => {
            error!("Failed to encode values: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
