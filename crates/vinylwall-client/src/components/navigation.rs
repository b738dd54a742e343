//! Top navigation bar.

use yew::prelude::*;
use yew_router::prelude::*;

use crate::routes::Route;

#[function_component(Navigation)]
pub fn navigation() -> Html {
    html! {
        <nav class="navigation">
            <Link<Route> to={Route::Home}>{ "Wall" }</Link<Route>>
            <Link<Route> to={Route::ShelfPicker}>{ "Shelves" }</Link<Route>>
            <Link<Route> to={Route::Devices}>{ "Devices" }</Link<Route>>
        </nav>
    }
}
