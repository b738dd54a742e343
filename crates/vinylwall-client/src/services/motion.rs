//! Device-orientation parallax source for handheld devices.
//!
//! Mutually exclusive with the pointer source: the core only switches
//! over after `EnableMotionSource`, which we send once the (possibly
//! permission-gated) subscription is actually delivering samples. Until
//! then pointer parallax stays active.

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::JsFuture;
use web_sys::DeviceOrientationEvent;

use vinylwall_core::bevy::ShelfCommand;

use crate::hooks::dispatch;

/// Tilt angle (degrees) that maps to a full-scale parallax signal.
const FULL_TILT_DEG: f64 = 45.0;

/// Neutral front-back holding angle for a handheld device.
const NEUTRAL_BETA_DEG: f64 = 45.0;

/// Active device-orientation subscription. Dropping it removes the
/// listener; the core keeps whatever source it was last told to use.
pub struct MotionParallax {
    listener: Closure<dyn FnMut(DeviceOrientationEvent)>,
}

impl MotionParallax {
    /// Whether this browser exposes device orientation at all.
    pub fn supported() -> bool {
        web_sys::window()
            .map(|w| {
                js_sys::Reflect::has(&w, &"DeviceOrientationEvent".into()).unwrap_or(false)
            })
            .unwrap_or(false)
    }

    /// Requests the orientation permission where the platform gates it
    /// (`DeviceOrientationEvent.requestPermission`, handheld Safari).
    /// Platforms without the gate report granted immediately.
    pub async fn request_permission() -> bool {
        let Some(window) = web_sys::window() else {
            return false;
        };
        let Ok(ctor) = js_sys::Reflect::get(&window, &"DeviceOrientationEvent".into()) else {
            return false;
        };
        let Ok(request) = js_sys::Reflect::get(&ctor, &"requestPermission".into()) else {
            return Self::supported();
        };
        let Some(request) = request.dyn_ref::<js_sys::Function>() else {
            // No permission gate on this platform.
            return Self::supported();
        };

        let Ok(promise) = request.call0(&ctor) else {
            return false;
        };
        let Ok(promise) = promise.dyn_into::<js_sys::Promise>() else {
            return false;
        };
        match JsFuture::from(promise).await {
            Ok(result) => result.as_string().as_deref() == Some("granted"),
            Err(_) => false,
        }
    }

    /// Subscribes to orientation events and switches the core's parallax
    /// source to motion. Call only after permission was granted.
    pub fn start() -> Result<Self, String> {
        let window = web_sys::window().ok_or_else(|| "no global window".to_string())?;

        let listener = Closure::<dyn FnMut(DeviceOrientationEvent)>::new(
            move |event: DeviceOrientationEvent| {
                let gamma = event.gamma().unwrap_or(0.0);
                let beta = event.beta().unwrap_or(NEUTRAL_BETA_DEG);
                let x = (gamma / FULL_TILT_DEG).clamp(-1.0, 1.0) as f32;
                let y = (-(beta - NEUTRAL_BETA_DEG) / FULL_TILT_DEG).clamp(-1.0, 1.0) as f32;
                dispatch(&ShelfCommand::SetMotionSignal { x, y });
            },
        );

        window
            .add_event_listener_with_callback(
                "deviceorientation",
                listener.as_ref().unchecked_ref(),
            )
            .map_err(|e| format!("{e:?}"))?;

        dispatch(&ShelfCommand::EnableMotionSource);
        tracing::info!("motion parallax source active");

        Ok(Self { listener })
    }
}

impl Drop for MotionParallax {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            let _ = window.remove_event_listener_with_callback(
                "deviceorientation",
                self.listener.as_ref().unchecked_ref(),
            );
        }
    }
}
