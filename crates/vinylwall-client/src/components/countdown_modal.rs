//! Pairing countdown modal, driven by the live channel summary.

use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct CountdownModalProps {
    pub visible: bool,
    pub message: Option<String>,
}

/// Shown while the remote peer keeps pushing non-final state messages.
/// The message body is the countdown text supplied by the peer; the
/// client does not run a timer of its own.
#[function_component(CountdownModal)]
pub fn countdown_modal(props: &CountdownModalProps) -> Html {
    if !props.visible {
        return html! {};
    }

    html! {
        <div class="modal-backdrop">
            <div class="modal-body">
                { "Press Button to connect. You have" }
                <h1 class="modal-countdown">
                    { props.message.clone().unwrap_or_default() }
                </h1>
                { "seconds" }
            </div>
        </div>
    }
}
