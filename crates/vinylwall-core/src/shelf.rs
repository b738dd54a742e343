//! Shelf data model and HTTP wire shapes.
//!
//! These types mirror the JSON the backend speaks: the shelf snapshot,
//! paginated listings, the album library page and the mutation payloads.
//! The snapshot is always replaced wholesale after a mutation; only the
//! live sync channel mutates spots in place (and then only `button_state`).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coord::{self, GridCoord};

/// Spot id `0` is reserved for edit-mode placeholders that have not been
/// persisted yet.
pub type SpotId = u64;

pub const PLACEHOLDER_SPOT_ID: SpotId = 0;

/// Tri-state hardware button feedback.
///
/// The wire encoding is a signed integer, mapped by sign: any negative
/// value means no hardware key is assigned, zero means a pairing attempt
/// is pending, any positive value means a key is assigned and confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    Unassigned,
    #[default]
    Pending,
    Assigned,
}

impl ButtonState {
    pub fn from_wire(raw: i32) -> Self {
        match raw.signum() {
            -1 => Self::Unassigned,
            0 => Self::Pending,
            _ => Self::Assigned,
        }
    }

    pub fn to_wire(self) -> i32 {
        match self {
            Self::Unassigned => -1,
            Self::Pending => 0,
            Self::Assigned => 1,
        }
    }
}

impl Serialize for ButtonState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.to_wire())
    }
}

impl<'de> Deserialize<'de> for ButtonState {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_wire(i32::deserialize(deserializer)?))
    }
}

/// An album (or playlist) that can be assigned to a spot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playable {
    pub id: u64,
    pub name: String,
    pub image_url: String,
}

/// One cell of the shelf grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelfSpot {
    pub id: SpotId,
    pub row: i32,
    pub col: i32,
    pub playable: Option<Playable>,
    pub associated_key: Option<u32>,
    /// Set by live sync messages only; absent until the first one arrives.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_state: Option<ButtonState>,
}

impl ShelfSpot {
    /// A transient edit-mode placeholder at `coord`. Never persisted.
    pub fn placeholder(coord: GridCoord) -> Self {
        Self {
            id: PLACEHOLDER_SPOT_ID,
            row: coord.row,
            col: coord.col,
            playable: None,
            associated_key: None,
            button_state: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.id == PLACEHOLDER_SPOT_ID
    }

    pub fn coord(&self) -> GridCoord {
        GridCoord::new(self.row, self.col)
    }

    /// The state the button should be rendered with: the last synced value
    /// if any, otherwise derived from whether a hardware key is assigned.
    pub fn effective_button_state(&self) -> ButtonState {
        self.button_state.unwrap_or(if self.associated_key.is_some() {
            ButtonState::Assigned
        } else {
            ButtonState::Unassigned
        })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShelfError {
    #[error("duplicate spot coordinate ({row}, {col}) in shelf {shelf_id}")]
    DuplicateCoordinate { shelf_id: u64, row: i32, col: i32 },
}

/// A full shelf snapshot as served by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shelf {
    pub shelf_id: u64,
    pub name: String,
    pub active: bool,
    pub updated_at: String,
    pub spot_matrix: Vec<ShelfSpot>,
}

impl Shelf {
    /// All occupied coordinates. Input to [`coord::expand`].
    pub fn occupied_coords(&self) -> HashSet<GridCoord> {
        self.spot_matrix.iter().map(ShelfSpot::coord).collect()
    }

    pub fn spot_at(&self, coord: GridCoord) -> Option<&ShelfSpot> {
        self.spot_matrix.iter().find(|s| s.coord() == coord)
    }

    pub fn spot_by_id_mut(&mut self, id: SpotId) -> Option<&mut ShelfSpot> {
        self.spot_matrix.iter_mut().find(|s| s.id == id)
    }

    /// Placeholder spots for the current occupancy, sorted for stable
    /// iteration. Recomputed from scratch on every snapshot change.
    pub fn placeholder_spots(&self) -> Vec<ShelfSpot> {
        let mut coords: Vec<GridCoord> = coord::expand(&self.occupied_coords()).into_iter().collect();
        coords.sort_unstable();
        coords.into_iter().map(ShelfSpot::placeholder).collect()
    }

    /// Checks the no-duplicate-coordinates invariant. Snapshots that fail
    /// this are rejected instead of merged.
    pub fn validate(&self) -> Result<(), ShelfError> {
        let mut seen = HashSet::with_capacity(self.spot_matrix.len());
        for spot in &self.spot_matrix {
            if !seen.insert(spot.coord()) {
                return Err(ShelfError::DuplicateCoordinate {
                    shelf_id: self.shelf_id,
                    row: spot.row,
                    col: spot.col,
                });
            }
        }
        Ok(())
    }
}

/// One page of the shelf listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelfPage {
    pub data: Vec<Shelf>,
    pub previous_page: Option<u32>,
    pub next_page: Option<u32>,
    pub total_pages: u32,
}

/// One page of the album library, search-filtered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumPage {
    pub page: u32,
    pub max_page: u32,
    pub album_list: Vec<Playable>,
}

/// A registered playback device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub device_id: u64,
    pub device_name: String,
    pub device_type: String,
    pub active: bool,
}

/// Payload for add/remove spot mutations. Both return a fresh snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotCellRequest {
    pub shelf_id: u64,
    pub row_id: i32,
    pub col_id: i32,
}

impl SpotCellRequest {
    pub fn new(shelf_id: u64, coord: GridCoord) -> Self {
        Self {
            shelf_id,
            row_id: coord.row,
            col_id: coord.col,
        }
    }
}

/// Payload for assigning an album to a spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignRequest {
    pub shelfspot_id: SpotId,
    pub playable_id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shelf_with_spots(coords: &[(i32, i32)]) -> Shelf {
        Shelf {
            shelf_id: 1,
            name: "Living room".to_string(),
            active: true,
            updated_at: "2025-06-01T12:00:00Z".to_string(),
            spot_matrix: coords
                .iter()
                .enumerate()
                .map(|(i, &(row, col))| ShelfSpot {
                    id: i as SpotId + 1,
                    row,
                    col,
                    playable: None,
                    associated_key: None,
                    button_state: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_button_state_wire_mapping() {
        assert_eq!(ButtonState::from_wire(-1), ButtonState::Unassigned);
        assert_eq!(ButtonState::from_wire(-7), ButtonState::Unassigned);
        assert_eq!(ButtonState::from_wire(0), ButtonState::Pending);
        assert_eq!(ButtonState::from_wire(1), ButtonState::Assigned);
        assert_eq!(ButtonState::from_wire(3), ButtonState::Assigned);
        assert_eq!(ButtonState::Pending.to_wire(), 0);
    }

    #[test]
    fn test_effective_button_state_falls_back_to_key() {
        let mut spot = ShelfSpot::placeholder(GridCoord::new(0, 0));
        assert_eq!(spot.effective_button_state(), ButtonState::Unassigned);
        spot.associated_key = Some(12);
        assert_eq!(spot.effective_button_state(), ButtonState::Assigned);
        spot.button_state = Some(ButtonState::Pending);
        assert_eq!(spot.effective_button_state(), ButtonState::Pending);
    }

    #[test]
    fn test_placeholder_spots_exclude_occupied() {
        let shelf = shelf_with_spots(&[(0, 0), (0, 1)]);
        let placeholders = shelf.placeholder_spots();
        assert_eq!(placeholders.len(), 6);
        assert!(placeholders.iter().all(ShelfSpot::is_placeholder));
        assert!(placeholders.iter().all(|p| shelf.spot_at(p.coord()).is_none()));
    }

    #[test]
    fn test_validate_rejects_duplicate_coords() {
        let mut shelf = shelf_with_spots(&[(0, 0), (0, 1)]);
        shelf.spot_matrix[1].row = 0;
        shelf.spot_matrix[1].col = 0;
        assert!(matches!(
            shelf.validate(),
            Err(ShelfError::DuplicateCoordinate { row: 0, col: 0, .. })
        ));
    }

    #[test]
    fn test_snapshot_json_round_trip() {
        let json = r#"{
            "shelf_id": 3,
            "name": "Studio",
            "active": false,
            "updated_at": "2025-05-30T08:15:00Z",
            "spot_matrix": [
                {"id": 7, "row": 0, "col": 0, "playable": {"id": 2, "name": "Kind of Blue", "image_url": "/covers/2"}, "associated_key": 4},
                {"id": 8, "row": 1, "col": 0, "playable": null, "associated_key": null}
            ]
        }"#;
        let shelf: Shelf = serde_json::from_str(json).unwrap();
        assert_eq!(shelf.spot_matrix.len(), 2);
        assert_eq!(shelf.spot_matrix[0].associated_key, Some(4));
        assert_eq!(shelf.spot_matrix[1].button_state, None);
        shelf.validate().unwrap();
    }
}
