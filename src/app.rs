//! Page shell: heading, the Basic/Enhanced variant toggle and the
//! selected purchase form.

use leptos::prelude::*;

use crate::components::{BuyForm, EnhancedBuyForm};

#[component]
pub fn App() -> impl IntoView {
    let (use_enhanced, set_use_enhanced) = signal(true);

    view! {
        <main class="page">
            <div class="page-inner">
                <header class="page-header">
                    <h1>"BNB Purchase"</h1>
                    <p>"Buy BNB with Polish Zloty on Base network"</p>

                    <div class="variant-toggle">
                        <span class=move || if use_enhanced.get() { "toggle-label" } else { "toggle-label toggle-label-active" }>
                            "Basic"
                        </span>
                        <button
                            class=move || if use_enhanced.get() { "toggle toggle-on" } else { "toggle" }
                            on:click=move |_| set_use_enhanced.update(|v| *v = !*v)
                        >
                            <span class="toggle-knob"></span>
                        </button>
                        <span class=move || if use_enhanced.get() { "toggle-label toggle-label-active" } else { "toggle-label" }>
                            "Enhanced"
                        </span>
                    </div>
                </header>

                {move || if use_enhanced.get() {
                    view! { <EnhancedBuyForm/> }.into_any()
                } else {
                    view! { <BuyForm/> }.into_any()
                }}

                <footer class="page-footer">
                    <p>"Buy BNB with PLN - Powered by Ramp Network"</p>
                </footer>
            </div>
        </main>
    }
}
