//! Client-side routes.

use yew_router::prelude::*;

#[derive(Routable, Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The active shelf.
    #[at("/")]
    Home,
    /// A specific shelf by id.
    #[at("/shelf/:shelf_id")]
    Shelf { shelf_id: u64 },
    /// Paginated shelf browser.
    #[at("/shelves")]
    ShelfPicker,
    /// Playback device management.
    #[at("/devices")]
    Devices,
    #[not_found]
    #[at("/404")]
    NotFound,
}
