//! Shelf viewer integration hooks.
//!
//! `ShelfProvider` owns the canvas and boots the Bevy app once; the
//! polling hooks read the shared state stores, re-rendering only when the
//! store's version counter moves.

use gloo::timers::callback::{Interval, Timeout};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use yew::prelude::*;

use vinylwall_core::bevy::wasm_entry::{
    get_connection, get_connection_version, get_shelf, get_shelf_version, get_view,
    get_view_version, request_app_exit, reset_app_state, send_command, start_shelf_app,
};
use vinylwall_core::bevy::{ConnectionSummary, ShelfCommand, ViewSummary};
use vinylwall_core::shelf::Shelf;

/// Canvas element the Bevy app renders into.
pub const SHELF_CANVAS_ID: &str = "shelf-canvas";

/// Store polling interval in milliseconds (20 FPS for UI updates).
const POLL_INTERVAL_MS: u32 = 50;

/// Serializes a command and pushes it to the view core.
pub fn dispatch(command: &ShelfCommand) {
    match serde_json::to_string(command) {
        Ok(json) => {
            if let Err(e) = send_command(&json) {
                tracing::error!("command dispatch failed: {e:?}");
            }
        }
        Err(e) => tracing::error!("command serialization failed: {e}"),
    }
}

#[derive(Properties, PartialEq)]
pub struct ShelfProviderProps {
    pub children: Children,
}

/// Mounts the canvas and starts the Bevy shelf app.
///
/// The app keeps running across route changes; a `beforeunload` handler
/// tears it down on page reload.
#[function_component(ShelfProvider)]
pub fn shelf_provider(props: &ShelfProviderProps) -> Html {
    use_effect_with((), move |_| {
        let window = web_sys::window().expect("no global window");
        let beforeunload = Closure::<dyn Fn()>::new(move || {
            tracing::info!("beforeunload: shutting the shelf app down");
            request_app_exit();
            reset_app_state();
        });
        window
            .add_event_listener_with_callback("beforeunload", beforeunload.as_ref().unchecked_ref())
            .expect("failed to add beforeunload listener");

        // Small delay so the canvas is mounted before winit looks for it.
        let timeout = Timeout::new(100, move || {
            tracing::info!("starting shelf app...");
            if let Err(e) = start_shelf_app(SHELF_CANVAS_ID) {
                tracing::error!("failed to start shelf app: {e:?}");
            }
        });

        let window = web_sys::window().expect("no global window");
        move || {
            let _ = window.remove_event_listener_with_callback(
                "beforeunload",
                beforeunload.as_ref().unchecked_ref(),
            );
            drop(timeout);
        }
    });

    let canvas_style = "position: fixed; top: 0; left: 0; width: 100%; height: 100%; z-index: 0;";

    html! {
        <>
            <canvas id={SHELF_CANVAS_ID} class="shelf-canvas" style={canvas_style} />
            { props.children.clone() }
        </>
    }
}

/// Hook to read the current shelf snapshot.
#[hook]
pub fn use_shelf() -> Option<Shelf> {
    let shelf = use_state(|| None::<Shelf>);
    let last_version = use_mut_ref(|| 0u64);

    {
        let shelf = shelf.clone();
        use_effect_with((), move |_| {
            let interval = Interval::new(POLL_INTERVAL_MS, move || {
                let version = get_shelf_version();
                if version != *last_version.borrow() {
                    *last_version.borrow_mut() = version;
                    let js_value = get_shelf();
                    if let Ok(snapshot) =
                        serde_wasm_bindgen::from_value::<Option<Shelf>>(js_value)
                    {
                        shelf.set(snapshot);
                    }
                }
            });
            move || drop(interval)
        });
    }

    (*shelf).clone()
}

/// Hook to read the live channel summary.
#[hook]
pub fn use_connection() -> ConnectionSummary {
    let summary = use_state(ConnectionSummary::default);
    let last_version = use_mut_ref(|| 0u64);

    {
        let summary = summary.clone();
        use_effect_with((), move |_| {
            let interval = Interval::new(POLL_INTERVAL_MS, move || {
                let version = get_connection_version();
                if version != *last_version.borrow() {
                    *last_version.borrow_mut() = version;
                    if let Ok(value) =
                        serde_wasm_bindgen::from_value::<ConnectionSummary>(get_connection())
                    {
                        summary.set(value);
                    }
                }
            });
            move || drop(interval)
        });
    }

    (*summary).clone()
}

/// Hook to read the view flags (edit mode, loading, picker target).
#[hook]
pub fn use_view() -> ViewSummary {
    let summary = use_state(ViewSummary::default);
    let last_version = use_mut_ref(|| 0u64);

    {
        let summary = summary.clone();
        use_effect_with((), move |_| {
            let interval = Interval::new(POLL_INTERVAL_MS, move || {
                let version = get_view_version();
                if version != *last_version.borrow() {
                    *last_version.borrow_mut() = version;
                    if let Ok(value) = serde_wasm_bindgen::from_value::<ViewSummary>(get_view()) {
                        summary.set(value);
                    }
                }
            });
            move || drop(interval)
        });
    }

    (*summary).clone()
}
