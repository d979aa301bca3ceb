//! Enhanced purchase form
//!
//! Layers wallet-status monitoring and a client-side transaction ledger
//! on top of the basic flow: a 2-second poll loop reconciles the
//! connection state, connector events short-circuit the wait, and every
//! widget event is folded into the ledger shown under the History tab.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Interval;
use leptos::logging::log;
use leptos::prelude::*;
use send_wrapper::SendWrapper;

use crate::services::connector::{ConnectorEvents, HostConnector};
use crate::services::ramp::RampSession;
use crate::state::purchase::{
    apply_widget_event, build_widget_config, PurchaseState, TxStatus, ERR_WIDGET_OPEN_FAILED,
};
use crate::state::wallet::{ConnectionState, StatusMonitor};
use crate::utils::amount::is_valid_fiat_amount;
use crate::utils::constants::{FIAT_CURRENCY, TARGET_ASSET, WALLET_POLL_INTERVAL_MS};
use crate::utils::format::{asset_symbol, format_timestamp, truncate_address};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Tab {
    Buy,
    History,
}

fn status_class(status: TxStatus) -> &'static str {
    match status {
        TxStatus::Completed => "status-badge status-completed",
        TxStatus::Pending => "status-badge status-pending",
        TxStatus::Failed => "status-badge status-failed",
    }
}

#[component]
pub fn EnhancedBuyForm() -> impl IntoView {
    let (connection, set_connection) = signal(ConnectionState::default());
    let (purchase, set_purchase) = signal(PurchaseState::default());
    let (fiat_amount, set_fiat_amount) = signal(String::new());
    let (active_tab, set_active_tab) = signal(Tab::Buy);

    let monitor = Rc::new(StatusMonitor::new(HostConnector::detect(), move |state| {
        set_connection.set(state);
    }));
    let session: Rc<RefCell<Option<RampSession>>> = Rc::new(RefCell::new(None));

    // First probe right away, then the steady poll loop.
    {
        let monitor = Rc::clone(&monitor);
        leptos::task::spawn_local(async move { monitor.refresh_status().await });
    }
    let poll = {
        let monitor = Rc::clone(&monitor);
        Interval::new(WALLET_POLL_INTERVAL_MS, move || {
            let monitor = Rc::clone(&monitor);
            leptos::task::spawn_local(async move { monitor.refresh_status().await });
        })
    };

    let events = {
        let on_accounts = Rc::clone(&monitor);
        let on_disconnect = Rc::clone(&monitor);
        ConnectorEvents::subscribe(
            move |_| {
                let monitor = Rc::clone(&on_accounts);
                leptos::task::spawn_local(async move {
                    monitor.handle_accounts_changed().await;
                });
            },
            move |_| on_disconnect.handle_disconnected(),
        )
    };

    {
        // on_cleanup requires Send + Sync; this runs on the single wasm thread.
        let owned = SendWrapper::new((poll, events, Rc::clone(&session)));
        on_cleanup(move || {
            let (poll, events, session) = owned.take();
            poll.cancel();
            drop(events);
            // Dropping the session tears the widget down, best-effort.
            session.borrow_mut().take();
        });
    }

    let connect_wallet = {
        // The reactive view closures below require Send + Sync handlers.
        let monitor = SendWrapper::new(Rc::clone(&monitor));
        move |_| {
            let monitor = Rc::clone(&monitor);
            leptos::task::spawn_local(async move { monitor.connect().await });
        }
    };

    let open_widget = {
        let session = SendWrapper::new(Rc::clone(&session));
        move |_| {
            let config = match build_widget_config(
                &connection.get_untracked(),
                &fiat_amount.get_untracked(),
            ) {
                Ok(config) => config,
                Err(e) => {
                    set_purchase.update(|p| p.last_error = Some(e));
                    return;
                }
            };

            // A new session replaces any previous one outright.
            session.borrow_mut().take();
            set_purchase.update(|p| {
                p.is_loading = true;
                p.last_error = None;
            });

            let live = RampSession::open(&config, move |event| {
                log!("widget event: {:?}", event);
                set_purchase.update(|p| apply_widget_event(p, event));
            });
            match live {
                Ok(live) => *session.borrow_mut() = Some(live),
                Err(e) => {
                    log!("failed to open purchase widget: {}", e);
                    set_purchase.update(|p| {
                        p.is_loading = false;
                        p.last_error = Some(ERR_WIDGET_OPEN_FAILED.to_string());
                    });
                }
            }
        }
    };

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

            <div class="tabs">
                <button
                    class=move || if active_tab.get() == Tab::Buy { "tab tab-active" } else { "tab" }
                    on:click=move |_| set_active_tab.set(Tab::Buy)
                >
                    "Buy Crypto"
                </button>
                <button
                    class=move || if active_tab.get() == Tab::History { "tab tab-active" } else { "tab" }
                    on:click=move |_| set_active_tab.set(Tab::History)
                >
                    {move || format!("History ({})", purchase.with(|p| p.ledger.len()))}
                </button>
            </div>

            <div class="card-body">
                {move || if active_tab.get() == Tab::Buy {
                    let connect = connect_wallet.clone();
                    let open = open_widget.clone();
                    view! {
                        <div>
                            {move || {
                                let msg = purchase.with(|p| p.last_error.clone())
                                    .or_else(|| connection.with(|c| c.last_error.clone()));
                                msg.map(|err| view! {
                                    <div class="error">
                                        <p>{err}</p>
                                    </div>
                                })
                            }}

                            {move || {
                                let state = connection.get();
                                match state.address.clone() {
                                    Some(addr) => view! {
                                        <div class="banner banner-connected">
                                            <p class="banner-title">"Wallet Connected"</p>
                                            <p class="banner-address">{truncate_address(&addr)}</p>
                                        </div>
                                    }.into_any(),
                                    None => {
                                        let connect = connect.clone();
                                        view! {
                                            <div class="banner banner-disconnected">
                                                <div>
                                                    <p class="banner-title">"Wallet not connected"</p>
                                                    <p class="banner-hint">"Connect to pre-fill your address"</p>
                                                </div>
                                                <button
                                                    class="btn btn-small"
                                                    on:click=connect
                                                    disabled=state.is_connecting
                                                >
                                                    {if state.is_connecting { "Connecting..." } else { "Connect" }}
                                                </button>
                                            </div>
                                        }.into_any()
                                    }
                                }
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
                                <p class="field-hint">
                                    {format!("Enter the amount you want to spend in {}", FIAT_CURRENCY)}
                                </p>
                            </div>

                            <button
                                class="btn btn-primary"
                                on:click=open
                                disabled=move || purchase.with(|p| p.is_loading)
                            >
                                {move || if purchase.with(|p| p.is_loading) {
                                    "Opening Ramp...".to_string()
                                } else {
                                    format!("Buy {} on Base", asset_symbol(TARGET_ASSET))
                                }}
                            </button>
                        </div>
                    }.into_any()
                } else {
                    view! {
                        <div>
                            {move || purchase.with(|p| {
                                if p.ledger.is_empty() {
                                    view! {
                                        <div class="empty-history">
                                            <p>"No transactions yet"</p>
                                            <p class="field-hint">"Your purchase history will appear here"</p>
                                        </div>
                                    }.into_any()
                                } else {
                                    let rows = p.ledger.entries().iter().map(|tx| {
                                        let symbol = asset_symbol(&tx.asset).to_string();
                                        view! {
                                            <div class="tx-row">
                                                <div class="tx-row-top">
                                                    <div>
                                                        <p class="tx-title">{format!("{} Purchase", symbol)}</p>
                                                        <p class="tx-time">{format_timestamp(tx.timestamp_ms)}</p>
                                                    </div>
                                                    <span class=status_class(tx.status)>{tx.status.as_str()}</span>
                                                </div>
                                                <div class="tx-row-bottom">
                                                    <span>{format!("{} {}", tx.fiat_amount, tx.fiat_currency)}</span>
                                                    <span class="tx-amount">{format!("{} {}", tx.amount, symbol)}</span>
                                                </div>
                                            </div>
                                        }
                                    }).collect_view();
                                    view! { <div class="tx-list">{rows}</div> }.into_any()
                                }
                            })}
                        </div>
                    }.into_any()
                }}
            </div>

            <div class="card-footer">
                <p>"Powered by Ramp Network - Secure & Fast"</p>
            </div>
        </div>
    }
}
