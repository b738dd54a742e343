//! 404 page.

use yew::prelude::*;
use yew_router::prelude::*;

use crate::routes::Route;

#[function_component(NotFoundPage)]
pub fn not_found_page() -> Html {
    html! {
        <div class="not-found">
            <h2>{ "Nothing here" }</h2>
            <Link<Route> to={Route::Home}>{ "Back to the wall" }</Link<Route>>
        </div>
    }
}
