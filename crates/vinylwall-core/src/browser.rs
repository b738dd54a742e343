//! Album picker state: horizontal carousel with lazy page loading.
//!
//! The picker lays sleeves out on a horizontal rail. As the viewpoint
//! scrolls toward the loaded edge the next page is requested; a latch keeps
//! concurrent requests from stacking up. A new search query resets the rail
//! wholesale instead of appending.

use serde::{Deserialize, Serialize};

use crate::shelf::{AlbumPage, Playable};

/// Sleeve edge length on the picker rail, matching the shelf sleeves.
pub const SLEEVE_WIDTH: f32 = 30.0;

/// Distance between neighboring sleeves on the rail.
pub const SLOT_STEP: f32 = SLEEVE_WIDTH * 4.0 / 5.0;

/// How far a centered sleeve lifts toward the camera.
const LIFT_DEPTH: f32 = 18.0;

/// Maximum yaw of an off-center sleeve, radians.
const YAW_LIMIT: f32 = std::f32::consts::FRAC_PI_2 * 1.3;

/// A pending library fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub query: String,
    pub page: u32,
}

/// Paginated, search-filterable album browser state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlbumBrowser {
    pub page: u32,
    pub max_page: u32,
    pub albums: Vec<Playable>,
    pub query: String,
    is_expanding: bool,
}

impl AlbumBrowser {
    pub fn new() -> Self {
        Self {
            page: 1,
            max_page: 1,
            ..Self::default()
        }
    }

    pub fn is_expanding(&self) -> bool {
        self.is_expanding
    }

    /// Rightmost reachable scroll position: the last sleeve's slot.
    pub fn scroll_limit(&self) -> f32 {
        SLOT_STEP * self.albums.len().saturating_sub(1) as f32
    }

    /// Keeps the viewpoint on the rail.
    pub fn clamp_scroll(&self, x: f32) -> f32 {
        x.clamp(0.0, self.scroll_limit())
    }

    /// Checks the expand condition for the current scroll position and, if
    /// met, latches and returns the request for the next page.
    ///
    /// The condition: the viewpoint is within one sleeve width of the
    /// loaded edge, no fetch is in flight, and more pages exist.
    pub fn next_page_request(&mut self, scroll_x: f32) -> Option<PageRequest> {
        if self.is_expanding || self.page >= self.max_page {
            return None;
        }
        if scroll_x < self.scroll_limit() - SLEEVE_WIDTH {
            return None;
        }
        self.is_expanding = true;
        Some(PageRequest {
            query: self.query.clone(),
            page: self.page + 1,
        })
    }

    /// Applies a fetched page: page 1 replaces the rail, later pages
    /// append. Always releases the latch.
    pub fn apply_page(&mut self, fetched: AlbumPage) {
        if fetched.page <= 1 {
            self.albums = fetched.album_list;
        } else {
            self.albums.extend(fetched.album_list);
        }
        self.page = fetched.page.max(1);
        self.max_page = fetched.max_page.max(1);
        self.is_expanding = false;
    }

    /// Releases the latch after a failed fetch; the rail keeps its prior
    /// content and the user can scroll to retry.
    pub fn expand_failed(&mut self) {
        self.is_expanding = false;
    }

    /// Starts a new search: resets to page 1 and returns the request. The
    /// matching [`Self::apply_page`] call replaces the list wholesale.
    pub fn begin_search(&mut self, query: impl Into<String>) -> PageRequest {
        self.query = query.into();
        self.page = 1;
        self.is_expanding = true;
        PageRequest {
            query: self.query.clone(),
            page: 1,
        }
    }

    /// Rail position of the sleeve at `index`.
    pub fn slot_x(index: usize) -> f32 {
        SLOT_STEP * index as f32
    }

    /// Z-lift of a sleeve at horizontal offset `dx` from the viewpoint:
    /// sleeves near the focus slide forward, falling off exponentially.
    pub fn carousel_lift(dx: f32) -> f32 {
        LIFT_DEPTH * (-1.5 / SLEEVE_WIDTH * dx.abs()).exp()
    }

    /// Yaw of a sleeve at horizontal offset `dx`: off-center sleeves turn
    /// their spines toward the viewer, easing in over one sleeve width.
    pub fn carousel_yaw(dx: f32) -> f32 {
        let eased = if dx.abs() > SLEEVE_WIDTH / 2.0 {
            (std::f32::consts::FRAC_PI_4).sin().powi(2)
        } else {
            (dx * std::f32::consts::FRAC_PI_2 / SLEEVE_WIDTH).sin().powi(2)
        };
        -dx.signum() * eased * YAW_LIMIT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn album(id: u64) -> Playable {
        Playable {
            id,
            name: format!("Album {id}"),
            image_url: format!("/covers/{id}"),
        }
    }

    fn page(n: u32, max: u32, count: u64) -> AlbumPage {
        AlbumPage {
            page: n,
            max_page: max,
            album_list: (0..count).map(|i| album(u64::from(n) * 100 + i)).collect(),
        }
    }

    #[test]
    fn test_no_fetch_on_last_page() {
        let mut browser = AlbumBrowser::new();
        browser.apply_page(page(1, 1, 8));
        let at_edge = browser.scroll_limit();
        assert_eq!(browser.next_page_request(at_edge), None);
    }

    #[test]
    fn test_fetch_triggers_near_loaded_edge() {
        let mut browser = AlbumBrowser::new();
        browser.apply_page(page(1, 3, 8));

        let limit = browser.scroll_limit();
        // Far from the edge: nothing.
        assert_eq!(browser.next_page_request(0.0), None);
        // Within one sleeve width of the edge: page 2 requested.
        let req = browser.next_page_request(limit - SLEEVE_WIDTH / 2.0).unwrap();
        assert_eq!(req.page, 2);
        assert!(browser.is_expanding());
    }

    #[test]
    fn test_latch_blocks_concurrent_fetches() {
        let mut browser = AlbumBrowser::new();
        browser.apply_page(page(1, 3, 8));
        let limit = browser.scroll_limit();

        assert!(browser.next_page_request(limit).is_some());
        // Still in flight: repeated frames do not re-request.
        assert_eq!(browser.next_page_request(limit), None);

        browser.apply_page(page(2, 3, 8));
        assert!(!browser.is_expanding());
        assert_eq!(browser.albums.len(), 16);
    }

    #[test]
    fn test_failed_expand_releases_latch() {
        let mut browser = AlbumBrowser::new();
        browser.apply_page(page(1, 2, 4));
        let limit = browser.scroll_limit();

        assert!(browser.next_page_request(limit).is_some());
        browser.expand_failed();
        assert!(browser.next_page_request(limit).is_some());
    }

    #[test]
    fn test_search_resets_wholesale() {
        let mut browser = AlbumBrowser::new();
        browser.apply_page(page(1, 3, 8));
        browser.apply_page(page(2, 3, 8));
        assert_eq!(browser.albums.len(), 16);

        let req = browser.begin_search("miles");
        assert_eq!(req, PageRequest { query: "miles".to_string(), page: 1 });
        browser.apply_page(page(1, 1, 3));
        assert_eq!(browser.albums.len(), 3);
        assert_eq!(browser.query, "miles");
    }

    #[test]
    fn test_scroll_clamps_to_rail() {
        let mut browser = AlbumBrowser::new();
        browser.apply_page(page(1, 1, 5));
        assert_eq!(browser.clamp_scroll(-10.0), 0.0);
        assert_eq!(browser.clamp_scroll(1e6), SLOT_STEP * 4.0);
    }

    #[test]
    fn test_carousel_shape() {
        // Centered sleeve: full lift, no yaw.
        assert!((AlbumBrowser::carousel_lift(0.0) - 18.0).abs() < 1e-5);
        assert!(AlbumBrowser::carousel_yaw(0.0).abs() < 1e-5);
        // Lift decays with distance, yaw is antisymmetric.
        assert!(AlbumBrowser::carousel_lift(40.0) < AlbumBrowser::carousel_lift(10.0));
        let yaw = AlbumBrowser::carousel_yaw(25.0);
        assert!(yaw < 0.0);
        assert!((AlbumBrowser::carousel_yaw(-25.0) + yaw).abs() < 1e-5);
    }
}
