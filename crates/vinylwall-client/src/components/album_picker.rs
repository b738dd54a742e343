//! Album picker overlay: a horizontally scrolling, lazily paginated
//! carousel over the album library.
//!
//! The scroll/pagination/carousel math lives in
//! [`vinylwall_core::browser::AlbumBrowser`]; this component maps DOM
//! scroll offsets onto the browser's rail units and renders the sleeves
//! with CSS 3D transforms.

use std::f32::consts::PI;

use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, HtmlInputElement};
use yew::prelude::*;

use vinylwall_core::bevy::ShelfCommand;
use vinylwall_core::browser::{AlbumBrowser, SLOT_STEP};
use vinylwall_core::shelf::{Playable, SpotId};

use crate::api;
use crate::hooks::dispatch;

/// Pixels per rail unit; one slot is `SLOT_STEP * PX_PER_UNIT` wide.
const PX_PER_UNIT: f32 = 5.0;

#[derive(Properties, PartialEq)]
pub struct AlbumPickerProps {
    /// Spot the chosen album will be assigned to.
    pub spot_id: SpotId,
}

#[function_component(AlbumPicker)]
pub fn album_picker(props: &AlbumPickerProps) -> Html {
    let browser = use_mut_ref(AlbumBrowser::new);
    let albums = use_state(Vec::<Playable>::new);
    let scroll_units = use_state(|| 0.0f32);
    let search_ref = use_node_ref();

    // Initial library page.
    {
        let browser = browser.clone();
        let albums = albums.clone();
        use_effect_with((), move |_| {
            let request = browser.borrow_mut().begin_search("");
            spawn_local(async move {
                match api::fetch_album_library(&request.query, request.page).await {
                    Ok(page) => {
                        browser.borrow_mut().apply_page(page);
                        albums.set(browser.borrow().albums.clone());
                    }
                    Err(e) => {
                        tracing::warn!("album library fetch failed: {e}");
                        browser.borrow_mut().expand_failed();
                    }
                }
            });
        });
    }

    let on_search = {
        let browser = browser.clone();
        let albums = albums.clone();
        let search_ref = search_ref.clone();
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            let query = search_ref
                .cast::<HtmlInputElement>()
                .map(|input| input.value())
                .unwrap_or_default();
            let request = browser.borrow_mut().begin_search(query);
            let browser = browser.clone();
            let albums = albums.clone();
            spawn_local(async move {
                match api::fetch_album_library(&request.query, request.page).await {
                    Ok(page) => {
                        browser.borrow_mut().apply_page(page);
                        albums.set(browser.borrow().albums.clone());
                    }
                    Err(e) => {
                        tracing::warn!("album search failed: {e}");
                        browser.borrow_mut().expand_failed();
                    }
                }
            });
        })
    };

    let on_scroll = {
        let browser = browser.clone();
        let albums = albums.clone();
        let scroll_units = scroll_units.clone();
        Callback::from(move |event: Event| {
            let Some(target) = event.target_dyn_into::<Element>() else {
                return;
            };
            let units = target.scroll_left() as f32 / PX_PER_UNIT;
            scroll_units.set(units);

            // Lazily request the next page as the viewpoint nears the
            // loaded edge; the browser's latch guards double fetches.
            let request = browser.borrow_mut().next_page_request(units);
            if let Some(request) = request {
                let browser = browser.clone();
                let albums = albums.clone();
                spawn_local(async move {
                    match api::fetch_album_library(&request.query, request.page).await {
                        Ok(page) => {
                            browser.borrow_mut().apply_page(page);
                            albums.set(browser.borrow().albums.clone());
                        }
                        Err(e) => {
                            tracing::warn!("album page fetch failed: {e}");
                            browser.borrow_mut().expand_failed();
                        }
                    }
                });
            }
        })
    };

    let on_close = Callback::from(|_| dispatch(&ShelfCommand::ClosePicker));

    let spot_id = props.spot_id;
    let sleeves: Html = albums
        .iter()
        .enumerate()
        .map(|(index, album)| {
            let dx = AlbumBrowser::slot_x(index) - *scroll_units;
            let lift = AlbumBrowser::carousel_lift(dx) * PX_PER_UNIT;
            let yaw_deg = AlbumBrowser::carousel_yaw(dx) * 180.0 / PI;
            let style = format!(
                "width: {:.0}px; transform: translateZ({lift:.1}px) rotateY({yaw_deg:.1}deg);",
                SLOT_STEP * PX_PER_UNIT,
            );

            let playable_id = album.id;
            let on_select = Callback::from(move |_| {
                dispatch(&ShelfCommand::AssignPlayable {
                    spot_id,
                    playable_id,
                });
            });

            html! {
                <button class="album-sleeve" {style} onclick={on_select} key={album.id}>
                    <img src={album.image_url.clone()} alt={album.name.clone()} />
                    <span>{ &album.name }</span>
                </button>
            }
        })
        .collect();

    html! {
        <>
            <div class="pause-mask" onclick={on_close.clone()}></div>
            <div class="album-picker">
                <form class="search-bar" onsubmit={on_search}>
                    <input ref={search_ref} type="text" placeholder="Search" />
                    <button type="submit">{ "Search" }</button>
                </form>
                <div class="album-rail" onscroll={on_scroll}>
                    { sleeves }
                </div>
            </div>
        </>
    }
}
