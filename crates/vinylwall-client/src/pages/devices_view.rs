//! Playback device list and activation.

use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use vinylwall_core::shelf::Device;

use crate::api;

#[function_component(DevicesView)]
pub fn devices_view() -> Html {
    let devices = use_state(Vec::<Device>::new);

    {
        let devices = devices.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                match api::fetch_devices().await {
                    Ok(fetched) => devices.set(fetched),
                    Err(e) => tracing::error!("device fetch failed: {e}"),
                }
            });
        });
    }

    let rows: Html = devices
        .iter()
        .map(|device| {
            let device_id = device.device_id;
            let devices = devices.clone();
            let on_activate = Callback::from(move |_| {
                let devices = devices.clone();
                spawn_local(async move {
                    match api::activate_device(device_id).await {
                        Ok(fetched) => devices.set(fetched),
                        Err(e) => tracing::error!("device activation failed: {e}"),
                    }
                });
            });

            html! {
                <li class="device-row" key={device_id}>
                    <span>{ &device.device_name }</span>
                    <span class="device-type">{ &device.device_type }</span>
                    if device.active {
                        <span class="active-badge">{ "active" }</span>
                    } else {
                        <button onclick={on_activate}>{ "Activate" }</button>
                    }
                </li>
            }
        })
        .collect();

    html! {
        <div class="devices-view">
            <h2>{ "Devices" }</h2>
            <ul>{ rows }</ul>
        </div>
    }
}
