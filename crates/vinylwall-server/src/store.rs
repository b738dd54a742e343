//! In-memory shelf database.
//!
//! Shelves, the album library and devices live behind one `RwLock`; every
//! mutation bumps the shelf's `updated_at` and callers get back a full
//! snapshot, so the client can always replace wholesale. The listening
//! slot is the pairing rendezvous between the live channel countdown and
//! the hardware key endpoint.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use vinylwall_core::shelf::{
    AlbumPage, ButtonState, Device, Playable, Shelf, ShelfPage, ShelfSpot, SpotId,
};

use crate::error::ApiError;

/// Shelves per listing page.
const SHELF_PAGE_SIZE: usize = 4;

/// Albums per library page.
const ALBUM_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone)]
struct SpotRecord {
    id: SpotId,
    row: i32,
    col: i32,
    playable_id: Option<u64>,
    associated_key: Option<u32>,
}

#[derive(Debug, Clone)]
struct ShelfRecord {
    shelf_id: u64,
    name: String,
    active: bool,
    updated_at: DateTime<Utc>,
    spots: Vec<SpotRecord>,
}

#[derive(Debug)]
struct DbInner {
    shelves: Vec<ShelfRecord>,
    albums: Vec<Playable>,
    devices: Vec<Device>,
    next_shelf_id: u64,
    next_spot_id: SpotId,
    /// Spot currently waiting for a hardware key press, if any.
    listening_spot: Option<SpotId>,
}

/// Thread-safe store shared across handlers and live channels.
#[derive(Debug)]
pub struct ShelfDb {
    inner: RwLock<DbInner>,
}

impl ShelfDb {
    /// A store seeded the way a fresh install looks: one active shelf
    /// with a few spots, a small album library and two devices. Every
    /// shelf always has at least one spot; the expansion algorithm cannot
    /// bootstrap an empty grid.
    pub fn seeded() -> Self {
        let albums: Vec<Playable> = [
            "Kind of Blue",
            "Blue Train",
            "A Love Supreme",
            "Mingus Ah Um",
            "Time Out",
            "Somethin' Else",
            "Moanin'",
            "Maiden Voyage",
            "Speak No Evil",
            "The Sidewinder",
            "Song for My Father",
            "Saxophone Colossus",
            "Go!",
            "Soul Station",
            "Midnight Blue",
            "The Shape of Jazz to Come",
            "Out to Lunch!",
            "Empyrean Isles",
            "Una Mas",
            "Cool Struttin'",
            "Idle Moments",
            "Ready for Freddie",
            "Takin' Off",
            "Page One",
        ]
        .iter()
        .enumerate()
        .map(|(i, name)| Playable {
            id: i as u64 + 1,
            name: (*name).to_string(),
            image_url: format!("/api/album_cover/{}", i + 1),
        })
        .collect();

        let shelf = ShelfRecord {
            shelf_id: 1,
            name: "Living room wall".to_string(),
            active: true,
            updated_at: Utc::now(),
            spots: vec![
                SpotRecord {
                    id: 1,
                    row: 0,
                    col: 0,
                    playable_id: Some(1),
                    associated_key: Some(1),
                },
                SpotRecord {
                    id: 2,
                    row: 0,
                    col: 1,
                    playable_id: Some(2),
                    associated_key: None,
                },
                SpotRecord {
                    id: 3,
                    row: 1,
                    col: 0,
                    playable_id: None,
                    associated_key: None,
                },
            ],
        };

        let devices = vec![
            Device {
                device_id: 1,
                device_name: "Living Room Speaker".to_string(),
                device_type: "Speaker".to_string(),
                active: true,
            },
            Device {
                device_id: 2,
                device_name: "Workshop".to_string(),
                device_type: "Computer".to_string(),
                active: false,
            },
        ];

        Self {
            inner: RwLock::new(DbInner {
                shelves: vec![shelf],
                albums,
                devices,
                next_shelf_id: 2,
                next_spot_id: 4,
                listening_spot: None,
            }),
        }
    }

    // ========================================================================
    // Snapshots and listings
    // ========================================================================

    pub fn snapshot(&self, shelf_id: u64) -> Result<Shelf, ApiError> {
        let inner = self.inner.read();
        let record = find_shelf(&inner, shelf_id)?;
        Ok(to_snapshot(record, &inner.albums))
    }

    pub fn active_snapshot(&self) -> Result<Shelf, ApiError> {
        let inner = self.inner.read();
        let record = inner
            .shelves
            .iter()
            .find(|s| s.active)
            .ok_or(ApiError::NoActiveShelf)?;
        Ok(to_snapshot(record, &inner.albums))
    }

    pub fn shelves_page(&self, page: u32) -> ShelfPage {
        let inner = self.inner.read();
        let total_pages = (inner.shelves.len().div_ceil(SHELF_PAGE_SIZE)).max(1) as u32;
        let page = page.clamp(1, total_pages);
        let start = (page as usize - 1) * SHELF_PAGE_SIZE;
        let data = inner
            .shelves
            .iter()
            .skip(start)
            .take(SHELF_PAGE_SIZE)
            .map(|s| to_snapshot(s, &inner.albums))
            .collect();
        ShelfPage {
            data,
            previous_page: (page > 1).then(|| page - 1),
            next_page: (page < total_pages).then(|| page + 1),
            total_pages,
        }
    }

    pub fn album_page(&self, search: &str, page: u32) -> AlbumPage {
        let inner = self.inner.read();
        let needle = search.to_lowercase();
        let matches: Vec<&Playable> = inner
            .albums
            .iter()
            .filter(|a| needle.is_empty() || a.name.to_lowercase().contains(&needle))
            .collect();
        let max_page = (matches.len().div_ceil(ALBUM_PAGE_SIZE)).max(1) as u32;
        let page = page.clamp(1, max_page);
        let start = (page as usize - 1) * ALBUM_PAGE_SIZE;
        AlbumPage {
            page,
            max_page,
            album_list: matches
                .into_iter()
                .skip(start)
                .take(ALBUM_PAGE_SIZE)
                .cloned()
                .collect(),
        }
    }

    pub fn devices(&self) -> Vec<Device> {
        self.inner.read().devices.clone()
    }

    // ========================================================================
    // Mutations (each returns the refreshed snapshot)
    // ========================================================================

    pub fn add_spot(&self, shelf_id: u64, row: i32, col: i32) -> Result<Shelf, ApiError> {
        let mut inner = self.inner.write();
        let spot_id = inner.next_spot_id;
        {
            let record = find_shelf_mut(&mut inner, shelf_id)?;
            if record.spots.iter().any(|s| s.row == row && s.col == col) {
                return Err(ApiError::SpotOccupied { shelf_id, row, col });
            }
            record.spots.push(SpotRecord {
                id: spot_id,
                row,
                col,
                playable_id: None,
                associated_key: None,
            });
            record.updated_at = Utc::now();
        }
        inner.next_spot_id += 1;
        let record = find_shelf(&inner, shelf_id)?;
        Ok(to_snapshot(record, &inner.albums))
    }

    pub fn remove_spot(&self, shelf_id: u64, row: i32, col: i32) -> Result<Shelf, ApiError> {
        let mut inner = self.inner.write();
        let record = find_shelf_mut(&mut inner, shelf_id)?;
        if record.spots.len() <= 1 {
            return Err(ApiError::LastSpot(shelf_id));
        }
        let before = record.spots.len();
        record.spots.retain(|s| !(s.row == row && s.col == col));
        if record.spots.len() == before {
            return Err(ApiError::SpotCellNotFound { shelf_id, row, col });
        }
        record.updated_at = Utc::now();
        let record = find_shelf(&inner, shelf_id)?;
        Ok(to_snapshot(record, &inner.albums))
    }

    pub fn assign_playable(&self, spot_id: SpotId, playable_id: u64) -> Result<Shelf, ApiError> {
        let mut inner = self.inner.write();
        if !inner.albums.iter().any(|a| a.id == playable_id) {
            return Err(ApiError::AlbumNotFound(playable_id));
        }
        let shelf_id = {
            let record = inner
                .shelves
                .iter_mut()
                .find(|s| s.spots.iter().any(|spot| spot.id == spot_id))
                .ok_or(ApiError::SpotNotFound(spot_id))?;
            let spot = record
                .spots
                .iter_mut()
                .find(|s| s.id == spot_id)
                .ok_or(ApiError::SpotNotFound(spot_id))?;
            spot.playable_id = Some(playable_id);
            record.updated_at = Utc::now();
            record.shelf_id
        };
        let record = find_shelf(&inner, shelf_id)?;
        Ok(to_snapshot(record, &inner.albums))
    }

    pub fn activate_shelf(&self, shelf_id: u64) -> Result<(), ApiError> {
        let mut inner = self.inner.write();
        if !inner.shelves.iter().any(|s| s.shelf_id == shelf_id) {
            return Err(ApiError::ShelfNotFound(shelf_id));
        }
        for shelf in &mut inner.shelves {
            shelf.active = shelf.shelf_id == shelf_id;
        }
        Ok(())
    }

    pub fn duplicate_shelf(&self, shelf_id: u64) -> Result<u64, ApiError> {
        let mut inner = self.inner.write();
        let source = find_shelf(&inner, shelf_id)?.clone();
        let new_shelf_id = inner.next_shelf_id;
        let mut next_spot_id = inner.next_spot_id;
        let spots = source
            .spots
            .iter()
            .map(|s| {
                let spot = SpotRecord {
                    id: next_spot_id,
                    row: s.row,
                    col: s.col,
                    playable_id: s.playable_id,
                    // Hardware keys stay with the original shelf.
                    associated_key: None,
                };
                next_spot_id += 1;
                spot
            })
            .collect();
        inner.shelves.push(ShelfRecord {
            shelf_id: new_shelf_id,
            name: format!("{} (copy)", source.name),
            active: false,
            updated_at: Utc::now(),
            spots,
        });
        inner.next_shelf_id += 1;
        inner.next_spot_id = next_spot_id;
        Ok(new_shelf_id)
    }

    pub fn activate_device(&self, device_id: u64) -> Result<(), ApiError> {
        let mut inner = self.inner.write();
        if !inner.devices.iter().any(|d| d.device_id == device_id) {
            return Err(ApiError::DeviceNotFound(device_id));
        }
        for device in &mut inner.devices {
            device.active = device.device_id == device_id;
        }
        Ok(())
    }

    // ========================================================================
    // Key pairing rendezvous
    // ========================================================================

    pub fn set_listening(&self, spot_id: SpotId) {
        self.inner.write().listening_spot = Some(spot_id);
    }

    pub fn listening(&self) -> Option<SpotId> {
        self.inner.read().listening_spot
    }

    pub fn reset_listening(&self) {
        self.inner.write().listening_spot = None;
    }

    /// Assigns a pressed hardware key to the listening spot and clears the
    /// slot. Called by the key listener endpoint.
    pub fn assign_key(&self, key: u32) -> Result<SpotId, ApiError> {
        let mut inner = self.inner.write();
        let spot_id = inner.listening_spot.ok_or(ApiError::NoListeningSpot)?;
        // One key pairs with one spot; steal it from any previous owner.
        for shelf in &mut inner.shelves {
            for spot in &mut shelf.spots {
                if spot.associated_key == Some(key) {
                    spot.associated_key = None;
                }
                if spot.id == spot_id {
                    spot.associated_key = Some(key);
                    shelf.updated_at = Utc::now();
                }
            }
        }
        inner.listening_spot = None;
        Ok(spot_id)
    }

    /// Per-spot button states for a shelf, derived from key assignment.
    /// This is the full map sent with a final live sync message.
    pub fn button_states(&self, shelf_id: u64) -> Result<HashMap<SpotId, ButtonState>, ApiError> {
        let inner = self.inner.read();
        let record = find_shelf(&inner, shelf_id)?;
        Ok(record
            .spots
            .iter()
            .map(|s| {
                let state = if s.associated_key.is_some() {
                    ButtonState::Assigned
                } else {
                    ButtonState::Unassigned
                };
                (s.id, state)
            })
            .collect())
    }

    /// Which shelf a spot belongs to.
    pub fn shelf_of_spot(&self, spot_id: SpotId) -> Option<u64> {
        let inner = self.inner.read();
        inner
            .shelves
            .iter()
            .find(|s| s.spots.iter().any(|spot| spot.id == spot_id))
            .map(|s| s.shelf_id)
    }
}

fn find_shelf<'a>(inner: &'a DbInner, shelf_id: u64) -> Result<&'a ShelfRecord, ApiError> {
    inner
        .shelves
        .iter()
        .find(|s| s.shelf_id == shelf_id)
        .ok_or(ApiError::ShelfNotFound(shelf_id))
}

fn find_shelf_mut<'a>(inner: &'a mut DbInner, shelf_id: u64) -> Result<&'a mut ShelfRecord, ApiError> {
    inner
        .shelves
        .iter_mut()
        .find(|s| s.shelf_id == shelf_id)
        .ok_or(ApiError::ShelfNotFound(shelf_id))
}

fn to_snapshot(record: &ShelfRecord, albums: &[Playable]) -> Shelf {
    Shelf {
        shelf_id: record.shelf_id,
        name: record.name.clone(),
        active: record.active,
        updated_at: record.updated_at.to_rfc3339(),
        spot_matrix: record
            .spots
            .iter()
            .map(|s| ShelfSpot {
                id: s.id,
                row: s.row,
                col: s.col,
                playable: s
                    .playable_id
                    .and_then(|id| albums.iter().find(|a| a.id == id).cloned()),
                associated_key: s.associated_key,
                button_state: None,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove_spot() {
        let db = ShelfDb::seeded();
        let shelf = db.add_spot(1, 1, 1).unwrap();
        assert_eq!(shelf.spot_matrix.len(), 4);

        // Duplicate coordinate is rejected.
        assert_eq!(
            db.add_spot(1, 1, 1),
            Err(ApiError::SpotOccupied {
                shelf_id: 1,
                row: 1,
                col: 1
            })
        );

        let shelf = db.remove_spot(1, 1, 1).unwrap();
        assert_eq!(shelf.spot_matrix.len(), 3);
        shelf.validate().unwrap();
    }

    #[test]
    fn test_last_spot_cannot_be_removed() {
        let db = ShelfDb::seeded();
        db.remove_spot(1, 0, 1).unwrap();
        db.remove_spot(1, 1, 0).unwrap();
        assert_eq!(db.remove_spot(1, 0, 0), Err(ApiError::LastSpot(1)));
    }

    #[test]
    fn test_assign_playable_returns_snapshot() {
        let db = ShelfDb::seeded();
        let shelf = db.assign_playable(3, 5).unwrap();
        let spot = shelf.spot_matrix.iter().find(|s| s.id == 3).unwrap();
        assert_eq!(spot.playable.as_ref().unwrap().id, 5);
        assert_eq!(db.assign_playable(3, 9999), Err(ApiError::AlbumNotFound(9999)));
    }

    #[test]
    fn test_album_page_search_and_pagination() {
        let db = ShelfDb::seeded();
        let page = db.album_page("", 1);
        assert_eq!(page.page, 1);
        assert_eq!(page.max_page, 2);
        assert_eq!(page.album_list.len(), 20);

        let page2 = db.album_page("", 2);
        assert_eq!(page2.album_list.len(), 4);

        let blue = db.album_page("blue", 1);
        assert_eq!(blue.max_page, 1);
        assert!(blue.album_list.iter().all(|a| a.name.to_lowercase().contains("blue")));
    }

    #[test]
    fn test_key_pairing_flow() {
        let db = ShelfDb::seeded();
        assert_eq!(db.assign_key(9), Err(ApiError::NoListeningSpot));

        db.set_listening(3);
        assert_eq!(db.assign_key(9), Ok(3));
        assert_eq!(db.listening(), None);

        let states = db.button_states(1).unwrap();
        assert_eq!(states[&3], ButtonState::Assigned);
        assert_eq!(states[&2], ButtonState::Unassigned);
    }

    #[test]
    fn test_key_moves_between_spots() {
        let db = ShelfDb::seeded();
        // Key 1 starts on spot 1; pairing it to spot 2 must steal it.
        db.set_listening(2);
        db.assign_key(1).unwrap();
        let states = db.button_states(1).unwrap();
        assert_eq!(states[&1], ButtonState::Unassigned);
        assert_eq!(states[&2], ButtonState::Assigned);
    }

    #[test]
    fn test_duplicate_shelf_copies_spots_without_keys() {
        let db = ShelfDb::seeded();
        let new_id = db.duplicate_shelf(1).unwrap();
        let copy = db.snapshot(new_id).unwrap();
        assert_eq!(copy.spot_matrix.len(), 3);
        assert!(copy.spot_matrix.iter().all(|s| s.associated_key.is_none()));
        assert!(!copy.active);

        let page = db.shelves_page(1);
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_activate_shelf_is_exclusive() {
        let db = ShelfDb::seeded();
        let new_id = db.duplicate_shelf(1).unwrap();
        db.activate_shelf(new_id).unwrap();
        assert!(db.snapshot(new_id).unwrap().active);
        assert!(!db.snapshot(1).unwrap().active);
        assert_eq!(db.active_snapshot().unwrap().shelf_id, new_id);
    }
}
