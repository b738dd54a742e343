//! Bevy-based shelf viewer for vinylwall.
//!
//! ECS components, resources and systems driving the 3D shelf scene:
//! grid placement, edit-mode placeholders, bounding-fit camera with
//! pointer parallax, and live sync state merging.

pub mod components;
pub mod events;
pub mod plugin;
pub mod resources;
pub mod state_store;
pub mod systems;

#[cfg(test)]
pub(crate) mod test_utils;

#[cfg(all(target_arch = "wasm32", feature = "windowed"))]
pub mod wasm_entry;

#[cfg(all(target_arch = "wasm32", feature = "windowed"))]
pub use wasm_entry::*;

pub use components::*;
pub use events::*;
pub use plugin::{ShelfCorePlugin, ViewMode};
pub use resources::*;
pub use state_store::{
    ConnectionStore, ConnectionSummary, ShelfStore, ShelfStores, ViewStore, ViewSummary,
};

#[cfg(feature = "windowed")]
pub use plugin::ShelfViewerPlugin;
pub use systems::camera::{apply_parallax, refit_camera};
