//! Vinylwall Server
//!
//! Axum backend: shelf snapshot/CRUD endpoints, the album library, device
//! management, the hardware key listener endpoint and the per-shelf live
//! sync WebSocket. The SPA build is served from `dist/` when present.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::store::ShelfDb;

mod error;
mod live;
mod routes;
mod store;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    let db = Arc::new(ShelfDb::seeded());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let api = Router::new()
        .route("/shelf_json/{shelf_id}", get(routes::shelf_json))
        .route("/active_shelf/", get(routes::active_shelf))
        .route("/shelves", get(routes::shelves))
        .route("/shelf/add/", post(routes::add_spot))
        .route("/shelf/remove/", post(routes::remove_spot))
        .route("/shelf/activate/{shelf_id}", get(routes::activate_shelf))
        .route("/shelf/duplicate/{shelf_id}", get(routes::duplicate_shelf))
        .route("/shelfspot/set/", post(routes::set_playable))
        .route("/album/library/", get(routes::album_library))
        .route("/devices/", get(routes::devices))
        .route("/devices/activate", post(routes::activate_device));

    let spa = ServeDir::new("dist").fallback(ServeFile::new("dist/index.html"));

    let app = Router::new()
        .nest("/api", api)
        .route("/handle_button/", post(routes::handle_button))
        .route("/ws/configure/{shelf_id}/", get(live::ws_configure))
        .fallback_service(spa)
        .layer(cors)
        .with_state(db);

    tracing::info!("Server listening on {addr}");
    tracing::info!("  - API: http://{addr}/api/*");
    tracing::info!("  - Live sync: ws://{addr}/ws/configure/{{shelf_id}}/");
    tracing::info!("  - SPA (dist/): http://{addr}/");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind server address");
    axum::serve(listener, app)
        .await
        .expect("server error");
}
