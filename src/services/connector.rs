//! Host Wallet Connector via wasm-bindgen
//!
//! Resolves the active account address from whatever the embedding host
//! exposes. Hosts differ by version: some provide a MiniKit-style object
//! with address accessors, others only an injected EIP-1193 provider, so
//! every entry point probes both.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::state::wallet::WalletConnector;

#[wasm_bindgen(inline_js = "
export function hasWalletConnector() {
    return !!(window.miniKit || window.ethereum);
}

export async function walletAddress() {
    // MiniKit-style host object; accessor name varies across versions
    if (window.miniKit) {
        const kit = window.miniKit;
        if (typeof kit.getDefaultAddress === 'function') {
            const addr = await kit.getDefaultAddress();
            if (addr) { return addr; }
        }
        if (typeof kit.getAddress === 'function') {
            const addr = await kit.getAddress();
            if (addr) { return addr; }
        }
    }

    // Injected EIP-1193 provider
    if (window.ethereum && typeof window.ethereum.request === 'function') {
        const accounts = await window.ethereum.request({ method: 'eth_accounts' });
        if (accounts && accounts.length > 0) {
            return accounts[0];
        }
    }

    return null;
}

export async function walletConnect() {
    if (window.miniKit && typeof window.miniKit.connect === 'function') {
        await window.miniKit.connect();
        return null;
    }
    if (window.ethereum && typeof window.ethereum.request === 'function') {
        await window.ethereum.request({ method: 'eth_requestAccounts' });
        return null;
    }
    throw new Error('no wallet connector available');
}

export function onWalletEvent(name, handler) {
    const provider = window.miniKit || window.ethereum;
    if (provider && typeof provider.on === 'function') {
        provider.on(name, handler);
        return true;
    }
    return false;
}

export function offWalletEvent(name, handler) {
    const provider = window.miniKit || window.ethereum;
    if (provider && typeof provider.removeListener === 'function') {
        provider.removeListener(name, handler);
    }
}
")]
extern "C" {
    /// Whether the host exposes any wallet connector at all.
    pub fn hasWalletConnector() -> bool;

    /// Resolve the active account address (null when none).
    #[wasm_bindgen(catch)]
    pub async fn walletAddress() -> Result<JsValue, JsValue>;

    /// Ask the host to establish a connection.
    #[wasm_bindgen(catch)]
    pub async fn walletConnect() -> Result<JsValue, JsValue>;

    /// Subscribe to a connector event; returns false when the provider
    /// has no event emitter.
    pub fn onWalletEvent(name: &str, handler: &js_sys::Function) -> bool;

    /// Remove a previously registered handler.
    pub fn offWalletEvent(name: &str, handler: &js_sys::Function);
}

/// Pull a readable message out of a JS fault.
pub(crate) fn js_error_message(e: JsValue) -> String {
    if let Some(msg) = e.as_string() {
        return msg;
    }
    js_sys::Reflect::get(&e, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| format!("wallet error: {:?}", e))
}

/// Capability adapter over the host wallet glue.
pub struct HostConnector;

impl HostConnector {
    /// Present only when the host actually exposes a connector object.
    pub fn detect() -> Option<Self> {
        hasWalletConnector().then_some(HostConnector)
    }
}

impl WalletConnector for HostConnector {
    async fn active_address(&self) -> Result<Option<String>, String> {
        let value = walletAddress().await.map_err(js_error_message)?;
        Ok(value.as_string().filter(|s| !s.is_empty()))
    }

    async fn request_connect(&self) -> Result<(), String> {
        walletConnect().await.map_err(js_error_message)?;
        Ok(())
    }
}

/// Live connector event subscriptions. Dropping the value unsubscribes
/// both handlers and releases the closures.
pub struct ConnectorEvents {
    accounts_changed: Closure<dyn FnMut(JsValue)>,
    disconnect: Closure<dyn FnMut(JsValue)>,
    active: bool,
}

impl ConnectorEvents {
    pub fn subscribe(
        on_accounts_changed: impl FnMut(JsValue) + 'static,
        on_disconnect: impl FnMut(JsValue) + 'static,
    ) -> Self {
        let accounts_changed = Closure::new(on_accounts_changed);
        let disconnect = Closure::new(on_disconnect);
        let a = onWalletEvent("accountsChanged", accounts_changed.as_ref().unchecked_ref());
        let b = onWalletEvent("disconnect", disconnect.as_ref().unchecked_ref());
        if !a && !b {
            log::debug!("wallet connector has no event emitter; relying on polling");
        }
        Self {
            accounts_changed,
            disconnect,
            active: a || b,
        }
    }
}

impl Drop for ConnectorEvents {
    fn drop(&mut self) {
        if self.active {
            offWalletEvent("accountsChanged", self.accounts_changed.as_ref().unchecked_ref());
            offWalletEvent("disconnect", self.disconnect.as_ref().unchecked_ref());
        }
    }
}
