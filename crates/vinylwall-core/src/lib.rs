//! Vinylwall Core Library
//!
//! Shelf grid logic for the vinyl wall configurator: coordinate math and
//! neighbor expansion, the 3D placement law, viewport fitting, the album
//! browser and the live sync protocol, plus a full Bevy integration for
//! driving the scene.

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod browser;
pub mod coord;
pub mod framing;
pub mod layout;
pub mod shelf;
pub mod sync;

// Bevy integration
pub mod bevy;

pub use browser::{AlbumBrowser, PageRequest};
pub use coord::{GridCoord, expand};
pub use framing::{BoundingFrame, CameraPose, FIT_MARGIN, VERTICAL_FOV, fit};
pub use layout::{LayoutParams, PartPlacement, SpotPlacement};
pub use shelf::{
    AlbumPage, AssignRequest, ButtonState, Device, PLACEHOLDER_SPOT_ID, Playable, Shelf,
    ShelfError, ShelfPage, ShelfSpot, SpotCellRequest, SpotId,
};
pub use sync::{ChannelState, ControlMessage, StateMessage, SyncError, SyncSession};
