//! API error type and its HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("shelf {0} not found")]
    ShelfNotFound(u64),
    #[error("no active shelf")]
    NoActiveShelf,
    #[error("spot {0} not found")]
    SpotNotFound(u64),
    #[error("spot ({row}, {col}) not found on shelf {shelf_id}")]
    SpotCellNotFound { shelf_id: u64, row: i32, col: i32 },
    #[error("spot ({row}, {col}) is already occupied on shelf {shelf_id}")]
    SpotOccupied { shelf_id: u64, row: i32, col: i32 },
    #[error("shelf {0} cannot lose its last spot")]
    LastSpot(u64),
    #[error("album {0} not found")]
    AlbumNotFound(u64),
    #[error("device {0} not found")]
    DeviceNotFound(u64),
    #[error("no spot is listening for a key press")]
    NoListeningSpot,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::ShelfNotFound(_)
            | Self::NoActiveShelf
            | Self::SpotNotFound(_)
            | Self::SpotCellNotFound { .. }
            | Self::AlbumNotFound(_)
            | Self::DeviceNotFound(_) => StatusCode::NOT_FOUND,
            Self::SpotOccupied { .. } | Self::LastSpot(_) | Self::NoListeningSpot => {
                StatusCode::CONFLICT
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::warn!("request failed: {self}");
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
