//! Yew hooks for the shelf viewer.

mod shelf_app;

pub use shelf_app::{
    ShelfProvider, SHELF_CANVAS_ID, dispatch, use_connection, use_shelf, use_view,
};
