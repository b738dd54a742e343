//! ECS systems for the shelf view.

pub mod camera;
pub mod commands;
pub mod edit;
pub mod scene;
pub mod stores;

#[cfg(feature = "windowed")]
pub mod windowed;

pub use camera::{apply_parallax, refit_camera};
pub use commands::process_commands;
pub use edit::{handle_spot_activation, mark_scene_dirty, rebuild_interactions};
pub use scene::rebuild_scene;
pub use stores::{sync_connection_to_stores, sync_shelf_to_stores, sync_view_to_stores};
