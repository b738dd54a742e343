//! Paginated shelf browser: activate, duplicate or open a shelf.

use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

use vinylwall_core::shelf::ShelfPage;

use crate::api;
use crate::routes::Route;

#[function_component(ShelfPickerView)]
pub fn shelf_picker_view() -> Html {
    let page = use_state(|| None::<ShelfPage>);
    let current = use_state(|| 1u32);

    {
        let page = page.clone();
        use_effect_with(*current, move |&page_no| {
            spawn_local(async move {
                match api::fetch_shelves(page_no).await {
                    Ok(fetched) => page.set(Some(fetched)),
                    Err(e) => tracing::error!("shelf list fetch failed: {e}"),
                }
            });
        });
    }

    let reload = {
        let page = page.clone();
        Callback::from(move |fetched: ShelfPage| page.set(Some(fetched)))
    };

    let Some(listing) = (*page).clone() else {
        return html! { <div class="loader" /> };
    };

    let shelves: Html = listing
        .data
        .iter()
        .map(|shelf| {
            let shelf_id = shelf.shelf_id;
            let on_activate = {
                let reload = reload.clone();
                Callback::from(move |_| {
                    let reload = reload.clone();
                    spawn_local(async move {
                        match api::activate_shelf(shelf_id).await {
                            Ok(fetched) => reload.emit(fetched),
                            Err(e) => tracing::error!("shelf activation failed: {e}"),
                        }
                    });
                })
            };
            let on_duplicate = {
                let reload = reload.clone();
                Callback::from(move |_| {
                    let reload = reload.clone();
                    spawn_local(async move {
                        match api::duplicate_shelf(shelf_id).await {
                            Ok(fetched) => reload.emit(fetched),
                            Err(e) => tracing::error!("shelf duplication failed: {e}"),
                        }
                    });
                })
            };

            html! {
                <li class="shelf-row" key={shelf_id}>
                    <Link<Route> to={Route::Shelf { shelf_id }}>
                        { &shelf.name }
                    </Link<Route>>
                    <span class="spot-count">
                        { format!("{} spots", shelf.spot_matrix.len()) }
                    </span>
                    if shelf.active {
                        <span class="active-badge">{ "active" }</span>
                    } else {
                        <button onclick={on_activate}>{ "Activate" }</button>
                    }
                    <button onclick={on_duplicate}>{ "Duplicate" }</button>
                </li>
            }
        })
        .collect();

    let prev = listing.previous_page.map(|p| {
        let current = current.clone();
        html! { <button onclick={Callback::from(move |_| current.set(p))}>{ "Previous" }</button> }
    });
    let next = listing.next_page.map(|p| {
        let current = current.clone();
        html! { <button onclick={Callback::from(move |_| current.set(p))}>{ "Next" }</button> }
    });

    html! {
        <div class="shelf-picker-view">
            <h2>{ "Shelves" }</h2>
            <ul>{ shelves }</ul>
            <div class="pager">
                { prev }
                <span>{ format!("page {} / {}", *current, listing.total_pages) }</span>
                { next }
            </div>
        </div>
    }
}
