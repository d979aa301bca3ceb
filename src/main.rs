//! Fiat On-Ramp Mini App - Leptos Frontend
//!
//! Single-page checkout for buying BNB on Base with PLN through the
//! hosted Ramp widget. The embedding host's wallet connector supplies the
//! receiving address.

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

pub mod app;
pub mod components;
pub mod services;
pub mod state;
pub mod utils;

use app::App;

#[wasm_bindgen(start)]
pub fn main() {
    // Readable panic messages in the browser console
    console_error_panic_hook::set_once();

    wasm_logger::init(wasm_logger::Config::default());
    log::info!("on-ramp mini app starting");

    hide_loading_screen();

    leptos::mount::mount_to_body(|| view! { <App/> });
}

/// Hide the static loading screen once the WASM module has taken over.
fn hide_loading_screen() {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let Some(loading_element) = document.get_element_by_id("app-loading") else {
        log::warn!("loading element not found");
        return;
    };
    if let Some(html_element) = loading_element.dyn_ref::<HtmlElement>() {
        if let Err(e) = html_element.class_list().add_1("hidden") {
            log::warn!("failed to hide loading screen: {:?}", e);
        }
    }
    // Belt and braces in case the stylesheet has not loaded yet
    loading_element
        .set_attribute("style", "display: none;")
        .ok();
}
