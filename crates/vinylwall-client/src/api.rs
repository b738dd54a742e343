//! HTTP API client. Thin async wrappers over the backend endpoints; every
//! mutation returns the refreshed shelf snapshot.

use gloo::net::http::Request;
use serde::Serialize;
use serde::de::DeserializeOwned;
use vinylwall_core::bevy::MutationRequest;
use vinylwall_core::shelf::{
    AlbumPage, AssignRequest, Device, Shelf, ShelfPage, SpotCellRequest,
};

async fn get_json<T: DeserializeOwned>(url: &str) -> Result<T, String> {
    let response = Request::get(url).send().await.map_err(|e| e.to_string())?;
    if !response.ok() {
        return Err(format!("{} returned {}", url, response.status()));
    }
    response.json::<T>().await.map_err(|e| e.to_string())
}

async fn post_json<B: Serialize, T: DeserializeOwned>(url: &str, body: &B) -> Result<T, String> {
    let response = Request::post(url)
        .json(body)
        .map_err(|e| e.to_string())?
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !response.ok() {
        return Err(format!("{} returned {}", url, response.status()));
    }
    response.json::<T>().await.map_err(|e| e.to_string())
}

pub async fn fetch_shelf(shelf_id: u64) -> Result<Shelf, String> {
    get_json(&format!("/api/shelf_json/{shelf_id}")).await
}

pub async fn fetch_active_shelf() -> Result<Shelf, String> {
    get_json("/api/active_shelf/").await
}

pub async fn fetch_shelves(page: u32) -> Result<ShelfPage, String> {
    get_json(&format!("/api/shelves?page={page}")).await
}

pub async fn fetch_album_library(query: &str, page: u32) -> Result<AlbumPage, String> {
    get_json(&format!(
        "/api/album/library/?search_txt={query}&page={page}"
    ))
    .await
}

pub async fn fetch_devices() -> Result<Vec<Device>, String> {
    get_json("/api/devices/").await
}

pub async fn add_spot(request: &SpotCellRequest) -> Result<Shelf, String> {
    post_json("/api/shelf/add/", request).await
}

pub async fn remove_spot(request: &SpotCellRequest) -> Result<Shelf, String> {
    post_json("/api/shelf/remove/", request).await
}

pub async fn set_playable(request: &AssignRequest) -> Result<Shelf, String> {
    post_json("/api/shelfspot/set/", request).await
}

pub async fn activate_shelf(shelf_id: u64) -> Result<ShelfPage, String> {
    get_json(&format!("/api/shelf/activate/{shelf_id}")).await
}

pub async fn duplicate_shelf(shelf_id: u64) -> Result<ShelfPage, String> {
    get_json(&format!("/api/shelf/duplicate/{shelf_id}")).await
}

pub async fn activate_device(device_id: u64) -> Result<Vec<Device>, String> {
    post_json("/api/devices/activate", &serde_json::json!({ "device_id": device_id })).await
}

/// Executes a mutation requested by the view core.
pub async fn perform_mutation(request: MutationRequest) -> Result<Shelf, String> {
    match request {
        MutationRequest::AddSpot(req) => add_spot(&req).await,
        MutationRequest::RemoveSpot(req) => remove_spot(&req).await,
        MutationRequest::AssignPlayable(req) => set_playable(&req).await,
    }
}
