//! Ramp Instant SDK integration via wasm-bindgen
//!
//! The widget script is loaded from index.html and hangs its constructor
//! off the window object; the exact location differs between SDK builds,
//! so probe the known spots.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::services::connector::js_error_message;
use crate::state::purchase::{RawWidgetEvent, WidgetConfig, WidgetEvent};

#[wasm_bindgen(inline_js = "
export function openRampWidget(config, onEvent) {
    let Sdk = null;
    if (window.rampInstantSdk && window.rampInstantSdk.RampInstantSDK) {
        Sdk = window.rampInstantSdk.RampInstantSDK;
    } else if (window.RampInstantSDK) {
        Sdk = window.RampInstantSDK;
    }
    if (!Sdk) {
        throw new Error('Ramp SDK script not loaded');
    }

    const widget = new Sdk(config);
    widget.on('*', (event) => onEvent(event));
    widget.show();
    return widget;
}

export function closeRampWidget(widget) {
    // Teardown is best-effort; SDK builds disagree on the method name.
    try {
        if (widget && typeof widget.close === 'function') {
            widget.close();
        } else if (widget && typeof widget.destroy === 'function') {
            widget.destroy();
        }
    } catch (e) {
        console.warn('widget teardown failed', e);
    }
}
")]
extern "C" {
    #[wasm_bindgen(catch)]
    fn openRampWidget(config: JsValue, on_event: &js_sys::Function) -> Result<JsValue, JsValue>;

    fn closeRampWidget(widget: &JsValue);
}

/// A live widget session. Dropping it tears the widget down and releases
/// the wildcard event subscription.
pub struct RampSession {
    widget: JsValue,
    _on_event: Closure<dyn FnMut(JsValue)>,
}

impl RampSession {
    /// Construct the widget, register the single wildcard event handler
    /// and show it.
    pub fn open(
        config: &WidgetConfig,
        mut handle_event: impl FnMut(WidgetEvent) + 'static,
    ) -> Result<Self, String> {
        let config_js = serde_wasm_bindgen::to_value(config)
            .map_err(|e| format!("bad widget config: {e}"))?;

        let on_event = Closure::new(move |raw: JsValue| {
            match serde_wasm_bindgen::from_value::<RawWidgetEvent>(raw) {
                Ok(raw_event) => handle_event(WidgetEvent::from(raw_event)),
                Err(e) => log::warn!("unreadable widget event: {e}"),
            }
        });

        let widget = openRampWidget(config_js, on_event.as_ref().unchecked_ref())
            .map_err(js_error_message)?;

        Ok(Self {
            widget,
            _on_event: on_event,
        })
    }
}

impl Drop for RampSession {
    fn drop(&mut self) {
        closeRampWidget(&self.widget);
    }
}
