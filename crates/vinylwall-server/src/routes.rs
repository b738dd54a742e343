//! HTTP API handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use vinylwall_core::shelf::{
    AlbumPage, AssignRequest, Device, Shelf, ShelfPage, SpotCellRequest,
};

use crate::error::ApiError;
use crate::store::ShelfDb;

pub type Db = Arc<ShelfDb>;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct LibraryQuery {
    pub search_txt: Option<String>,
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct KeyInput {
    pub key: u32,
}

#[derive(Debug, Deserialize)]
pub struct DeviceActivate {
    pub device_id: u64,
}

pub async fn shelf_json(
    State(db): State<Db>,
    Path(shelf_id): Path<u64>,
) -> Result<Json<Shelf>, ApiError> {
    db.snapshot(shelf_id).map(Json)
}

pub async fn active_shelf(State(db): State<Db>) -> Result<Json<Shelf>, ApiError> {
    db.active_snapshot().map(Json)
}

pub async fn shelves(State(db): State<Db>, Query(query): Query<PageQuery>) -> Json<ShelfPage> {
    Json(db.shelves_page(query.page.unwrap_or(1)))
}

pub async fn add_spot(
    State(db): State<Db>,
    Json(req): Json<SpotCellRequest>,
) -> Result<Json<Shelf>, ApiError> {
    tracing::info!(
        "add spot ({}, {}) to shelf {}",
        req.row_id,
        req.col_id,
        req.shelf_id
    );
    db.add_spot(req.shelf_id, req.row_id, req.col_id).map(Json)
}

pub async fn remove_spot(
    State(db): State<Db>,
    Json(req): Json<SpotCellRequest>,
) -> Result<Json<Shelf>, ApiError> {
    tracing::info!(
        "remove spot ({}, {}) from shelf {}",
        req.row_id,
        req.col_id,
        req.shelf_id
    );
    db.remove_spot(req.shelf_id, req.row_id, req.col_id).map(Json)
}

pub async fn set_playable(
    State(db): State<Db>,
    Json(req): Json<AssignRequest>,
) -> Result<Json<Shelf>, ApiError> {
    tracing::info!("assign album {} to spot {}", req.playable_id, req.shelfspot_id);
    db.assign_playable(req.shelfspot_id, req.playable_id).map(Json)
}

pub async fn album_library(
    State(db): State<Db>,
    Query(query): Query<LibraryQuery>,
) -> Json<AlbumPage> {
    Json(db.album_page(
        query.search_txt.as_deref().unwrap_or(""),
        query.page.unwrap_or(1),
    ))
}

pub async fn activate_shelf(
    State(db): State<Db>,
    Path(shelf_id): Path<u64>,
) -> Result<Json<ShelfPage>, ApiError> {
    db.activate_shelf(shelf_id)?;
    Ok(Json(db.shelves_page(1)))
}

pub async fn duplicate_shelf(
    State(db): State<Db>,
    Path(shelf_id): Path<u64>,
) -> Result<Json<ShelfPage>, ApiError> {
    let new_id = db.duplicate_shelf(shelf_id)?;
    tracing::info!("duplicated shelf {shelf_id} as {new_id}");
    Ok(Json(db.shelves_page(1)))
}

pub async fn devices(State(db): State<Db>) -> Json<Vec<Device>> {
    Json(db.devices())
}

pub async fn activate_device(
    State(db): State<Db>,
    Json(req): Json<DeviceActivate>,
) -> Result<Json<Vec<Device>>, ApiError> {
    db.activate_device(req.device_id)?;
    Ok(Json(db.devices()))
}

/// Hardware key listener endpoint: the GPIO daemon posts here when a
/// physical button is pressed. Pairs the key with whichever spot is
/// currently listening.
pub async fn handle_button(
    State(db): State<Db>,
    Json(req): Json<KeyInput>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let spot_id = db.assign_key(req.key)?;
    tracing::info!("key {} paired with spot {}", req.key, spot_id);
    Ok(Json(serde_json::json!({ "shelfspot_id": spot_id })))
}
