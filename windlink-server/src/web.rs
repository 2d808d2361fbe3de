//! Dashboard Web Server
//!
//! - `GET /api/scene`: the full [`SceneSnapshot`](crate::dashboard::SceneSnapshot)
//! - `GET /api/markers`: device id to marker handles and position
//! - anything else: the embedded Leaflet page and its assets

use std::collections::BTreeMap;
use std::net::SocketAddr;

use anyhow::Context;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use http::{header, StatusCode, Uri};
use rust_embed::RustEmbed;
use tokio::net::TcpListener;
use tokio_graceful_shutdown::SubsystemHandle;
use windlink_core::MarkerEntry;

use crate::dashboard::{SceneSnapshot, SharedDashboard};

#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/web/"]
struct Assets;

pub fn router(dashboard: SharedDashboard) -> Router {
    Router::new()
        .route("/api/scene", get(get_scene))
        .route("/api/markers", get(get_markers))
        .fallback(static_asset)
        .with_state(dashboard)
}

pub async fn serve(
    subsys: SubsystemHandle,
    addr: SocketAddr,
    dashboard: SharedDashboard,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Unable to listen on {}", addr))?;
    log::info!("Dashboard at http://{}/", addr);

    axum::serve(listener, router(dashboard))
        .with_graceful_shutdown(async move { subsys.on_shutdown_requested().await })
        .await
        .context("Dashboard server failed")?;

    log::debug!("web: shutdown");
    Ok(())
}

async fn get_scene(State(dashboard): State<SharedDashboard>) -> Json<SceneSnapshot> {
    Json(dashboard.read().unwrap().snapshot())
}

async fn get_markers(State(dashboard): State<SharedDashboard>) -> Json<BTreeMap<i64, MarkerEntry>> {
    Json(dashboard.read().unwrap().markers())
}

async fn static_asset(uri: Uri) -> Response {
    let path = match uri.path().trim_start_matches('/') {
        "" => "index.html",
        p => p,
    };

    match Assets::get(path) {
        Some(file) => (
            [(header::CONTENT_TYPE, file.metadata.mimetype().to_owned())],
            file.data.into_owned(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}
