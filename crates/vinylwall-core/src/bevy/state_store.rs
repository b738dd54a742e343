//! Shared state stores for ECS-to-frontend communication.
//!
//! Each store holds one slice of view state that the Yew hooks can poll
//! independently, keyed by a version counter so the frontend only
//! re-renders when its slice actually changed.

use std::sync::Arc;

use bevy::prelude::Resource;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::shelf::{Shelf, SpotId};
use crate::sync::ChannelState;

/// Store for the shelf snapshot on display.
#[derive(Debug, Default)]
pub struct ShelfStore {
    shelf: RwLock<Option<Shelf>>,
    version: RwLock<u64>,
}

impl ShelfStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_shelf(&self) -> Option<Shelf> {
        self.shelf.read().clone()
    }

    pub fn get_version(&self) -> u64 {
        *self.version.read()
    }

    pub fn set_shelf(&self, shelf: Option<Shelf>) {
        *self.shelf.write() = shelf;
        *self.version.write() += 1;
    }
}

/// Live channel summary for the frontend: state, countdown text, modal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConnectionSummary {
    pub state: ChannelState,
    pub countdown: Option<String>,
    pub modal_visible: bool,
}

/// Store for the live sync channel state.
#[derive(Debug, Default)]
pub struct ConnectionStore {
    summary: RwLock<ConnectionSummary>,
    version: RwLock<u64>,
}

impl ConnectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_summary(&self) -> ConnectionSummary {
        self.summary.read().clone()
    }

    pub fn get_version(&self) -> u64 {
        *self.version.read()
    }

    pub fn update(&self, summary: ConnectionSummary) {
        *self.summary.write() = summary;
        *self.version.write() += 1;
    }
}

/// View flags summary: edit mode, pause, loading, picker target, errors.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewSummary {
    pub editing: bool,
    pub paused: bool,
    pub loading: bool,
    pub picker_spot: Option<SpotId>,
    pub last_error: Option<String>,
}

/// Store for view flags.
#[derive(Debug, Default)]
pub struct ViewStore {
    summary: RwLock<ViewSummary>,
    version: RwLock<u64>,
}

impl ViewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_summary(&self) -> ViewSummary {
        self.summary.read().clone()
    }

    pub fn get_version(&self) -> u64 {
        *self.version.read()
    }

    pub fn update(&self, summary: ViewSummary) {
        *self.summary.write() = summary;
        *self.version.write() += 1;
    }
}

/// All stores combined for easy sharing.
#[derive(Debug, Clone, Resource)]
pub struct ShelfStores {
    pub shelf: Arc<ShelfStore>,
    pub connection: Arc<ConnectionStore>,
    pub view: Arc<ViewStore>,
}

impl ShelfStores {
    pub fn new() -> Self {
        Self {
            shelf: Arc::new(ShelfStore::new()),
            connection: Arc::new(ConnectionStore::new()),
            view: Arc::new(ViewStore::new()),
        }
    }
}

impl Default for ShelfStores {
    fn default() -> Self {
        Self::new()
    }
}
