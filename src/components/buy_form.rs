//! Basic purchase form
//!
//! One-shot wallet address lookup on mount, then straight to the widget.
//! No status monitoring and no transaction history; the enhanced variant
//! adds those.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::logging::log;
use send_wrapper::SendWrapper;
use leptos::prelude::*;

use crate::services::connector::HostConnector;
use crate::services::ramp::RampSession;
use crate::state::purchase::{widget_config, WidgetEvent, ERR_WIDGET_OPEN_FAILED};
use crate::state::wallet::{WalletConnector, ERR_WALLET_UNAVAILABLE};
use crate::utils::amount::is_valid_fiat_amount;
use crate::utils::constants::{FIAT_CURRENCY, TARGET_ASSET};
use crate::utils::format::{asset_symbol, truncate_address};

#[component]
pub fn BuyForm() -> impl IntoView {
    let (address, set_address) = signal(None::<String>);
    let (is_loading, set_is_loading) = signal(false);
    let (error, set_error) = signal(None::<String>);
    let (fiat_amount, set_fiat_amount) = signal(String::new());

    let session: Rc<RefCell<Option<RampSession>>> = Rc::new(RefCell::new(None));

    // One-shot lookup; this variant does not keep watching afterwards.
    leptos::task::spawn_local(async move {
        let Some(connector) = HostConnector::detect() else {
            log!("wallet not connected or available");
            return;
        };
        match connector.active_address().await {
            Ok(addr) => set_address.set(addr),
            Err(e) => log!("wallet not connected or available: {}", e),
        }
    });

    let connect_wallet = move |_| {
        leptos::task::spawn_local(async move {
            let Some(connector) = HostConnector::detect() else {
                set_error.set(Some(ERR_WALLET_UNAVAILABLE.to_string()));
                return;
            };
            if let Err(e) = connector.request_connect().await {
                log!("error connecting wallet: {}", e);
                set_error.set(Some(e));
                return;
            }
            match connector.active_address().await {
                Ok(addr) => {
                    set_address.set(addr);
                    set_error.set(None);
                }
                Err(e) => set_error.set(Some(e)),
            }
        });
    };

    let open_widget = {
        let session = Rc::clone(&session);
        move |_| {
            set_is_loading.set(true);
            set_error.set(None);

            let config = widget_config(address.get_untracked(), &fiat_amount.get_untracked());
            let live = RampSession::open(&config, move |event| {
                if matches!(event, WidgetEvent::WidgetClose | WidgetEvent::WidgetError) {
                    set_is_loading.set(false);
                }
            });
            match live {
                Ok(live) => *session.borrow_mut() = Some(live),
                Err(e) => {
                    log!("error opening Ramp widget: {}", e);
                    set_is_loading.set(false);
                    set_error.set(Some(ERR_WIDGET_OPEN_FAILED.to_string()));
                }
            }
        }
    };

    {
        // on_cleanup requires Send + Sync; this runs on the single wasm thread.
        let session = SendWrapper::new(Rc::clone(&session));
        on_cleanup(move || {
            session.borrow_mut().take();
        });
    }

    let on_amount_input = move |ev: web_sys::Event| {
        let value = event_target_value(&ev);
        if is_valid_fiat_amount(&value) {
            set_fiat_amount.set(value);
        }
    };

    view! {
        <div class="card">
            <div class="card-header">
                <h2>"Crypto Purchase"</h2>
                <p>"Buy crypto directly on Base network"</p>
            </div>

            <div class="card-body">
                {move || error.get().map(|err| view! {
                    <div class="error">
                        <p>{err}</p>
                    </div>
                })}

                {move || match address.get() {
                    Some(addr) => view! {
                        <div class="banner banner-connected">
                            <p class="banner-title">"Wallet Connected"</p>
                            <p class="banner-address">{truncate_address(&addr)}</p>
                        </div>
                    }.into_any(),
                    None => view! {
                        <div class="banner banner-disconnected">
                            <div>
                                <p class="banner-title">"Wallet not connected"</p>
                                <p class="banner-hint">"Connect to pre-fill your address"</p>
                            </div>
                            <button class="btn btn-small" on:click=connect_wallet>
                                "Connect"
                            </button>
                        </div>
                    }.into_any(),
                }}

                <div class="asset-card">
                    <div class="asset-symbol">{asset_symbol(TARGET_ASSET)}</div>
                    <div class="asset-name">"Binance Coin"</div>
                </div>

                <div class="fiat-card">
                    <div class="fiat-symbol">{FIAT_CURRENCY}</div>
                    <div class="fiat-name">"Polish Zloty"</div>
                </div>

                <div class="field">
                    <label>"Amount (Optional)"</label>
                    <div class="amount-input">
                        <input
                            type="number"
                            min="0"
                            step="0.01"
                            placeholder="Enter amount"
                            prop:value=move || fiat_amount.get()
                            on:input=on_amount_input
                        />
                        <span class="amount-currency">{FIAT_CURRENCY}</span>
                    </div>
                </div>

                <button
                    class="btn btn-primary"
                    on:click=open_widget
                    disabled=move || is_loading.get()
                >
                    {move || if is_loading.get() {
                        "Opening Ramp...".to_string()
                    } else {
                        format!("Buy {} on Base", asset_symbol(TARGET_ASSET))
                    }}
                </button>
            </div>

            <div class="card-footer">
                <p>"Powered by Ramp Network - Secure & Fast"</p>
            </div>
        </div>
    }
}
