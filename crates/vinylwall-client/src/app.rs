//! Main application component.

use yew::prelude::*;
use yew_router::prelude::*;

use crate::components::Navigation;
use crate::hooks::ShelfProvider;
use crate::pages::{DevicesView, NotFoundPage, ShelfPickerView, ShelfView};
use crate::routes::Route;

/// Route switch function.
fn switch(route: Route) -> Html {
    match route {
        Route::Home => html! { <ShelfView /> },
        Route::Shelf { shelf_id } => html! { <ShelfView shelf_id={Some(shelf_id)} /> },
        Route::ShelfPicker => html! { <ShelfPickerView /> },
        Route::Devices => html! { <DevicesView /> },
        Route::NotFound => html! { <NotFoundPage /> },
    }
}

/// Root application component with the router and the Bevy canvas
/// provider. The canvas stays mounted across route changes; list pages
/// simply render above it.
#[function_component(App)]
pub fn app() -> Html {
    html! {
        <BrowserRouter>
            <ShelfProvider>
                <Navigation />
                <Switch<Route> render={switch} />
            </ShelfProvider>
        </BrowserRouter>
    }
}
