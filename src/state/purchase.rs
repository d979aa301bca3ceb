//! Purchase session state: the widget event stream and the transaction
//! ledger.
//!
//! The widget emits untyped `{type, payload}` events; they are classified
//! into [`WidgetEvent`] and folded into [`PurchaseState`] by a plain
//! reducer, so the whole flow is testable without a browser.

use serde::{Deserialize, Deserializer, Serialize};

use crate::state::wallet::ConnectionState;
use crate::utils::constants::{
    FIAT_CURRENCY, HOST_APP_NAME, HOST_LOGO_URL, RAMP_URL, TARGET_ASSET,
};
use crate::utils::time::now_ms;

pub const ERR_NOT_CONNECTED: &str = "connect your wallet first";
pub const ERR_WIDGET_OPEN_FAILED: &str = "failed to open purchase widget";
pub const ERR_WIDGET_RUNTIME: &str = "purchase widget reported an error";

/// Lifecycle of one purchase attempt. Terminal states never revert.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxStatus {
    Pending,
    Completed,
    Failed,
}

impl TxStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TxStatus::Pending => "pending",
            TxStatus::Completed => "completed",
            TxStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, TxStatus::Pending)
    }
}

/// One ledger entry. Amounts stay strings end to end; they come from the
/// widget as display values, not as numbers we do arithmetic on.
#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub asset: String,
    pub amount: String,
    pub fiat_amount: String,
    pub fiat_currency: String,
    pub status: TxStatus,
    pub timestamp_ms: f64,
}

/// In-memory record of purchase attempts, newest first.
///
/// At most one entry per widget-assigned id; existing entries only ever
/// change status (and pick up a crypto amount once reported).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ledger {
    entries: Vec<Transaction>,
}

impl Ledger {
    pub fn entries(&self) -> &[Transaction] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a pending entry for a newly created purchase. A repeated
    /// event carrying an id we already track is ignored.
    pub fn record_created(&mut self, details: &PurchaseDetails) -> bool {
        let id = details
            .id
            .clone()
            .unwrap_or_else(|| format!("local-{}", now_ms() as u64));
        if self.entries.iter().any(|tx| tx.id == id) {
            return false;
        }
        self.entries.insert(
            0,
            Transaction {
                id,
                asset: TARGET_ASSET.to_string(),
                amount: details.crypto_amount.clone().unwrap_or_default(),
                fiat_amount: details.fiat_amount.clone().unwrap_or_default(),
                fiat_currency: details
                    .fiat_currency
                    .clone()
                    .unwrap_or_else(|| FIAT_CURRENCY.to_string()),
                status: TxStatus::Pending,
                timestamp_ms: now_ms(),
            },
        );
        true
    }

    /// Keyed terminal-status update. Unknown ids and already-settled
    /// entries are left alone.
    pub fn settle(&mut self, id: &str, status: TxStatus, amount: Option<&str>) -> bool {
        match self.entries.iter_mut().find(|tx| tx.id == id) {
            Some(tx) if !tx.status.is_terminal() => {
                tx.status = status;
                if let Some(amount) = amount {
                    tx.amount = amount.to_string();
                }
                true
            }
            _ => false,
        }
    }
}

/// Purchase fields of interest inside a widget event payload.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct PurchaseDetails {
    #[serde(default, deserialize_with = "stringly")]
    pub id: Option<String>,
    #[serde(
        default,
        rename = "cryptoAmount",
        deserialize_with = "stringly"
    )]
    pub crypto_amount: Option<String>,
    #[serde(
        default,
        rename = "fiatValue",
        alias = "fiatAmount",
        deserialize_with = "stringly"
    )]
    pub fiat_amount: Option<String>,
    #[serde(default, rename = "fiatCurrency")]
    pub fiat_currency: Option<String>,
}

/// Widget payloads are untyped on the JS side; numeric fields show up as
/// either strings or numbers depending on SDK version. Take both.
fn stringly<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Stringly {
        Text(String),
        Int(i64),
        Num(f64),
    }

    Ok(match Option::<Stringly>::deserialize(de)? {
        None => None,
        Some(Stringly::Text(s)) => Some(s),
        Some(Stringly::Int(i)) => Some(i.to_string()),
        Some(Stringly::Num(n)) => Some(n.to_string()),
    })
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct EventPayload {
    #[serde(default)]
    pub purchase: Option<PurchaseDetails>,
}

/// Wire shape of a widget event, before classification.
#[derive(Clone, Debug, Deserialize)]
pub struct RawWidgetEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Option<EventPayload>,
}

/// The widget event kinds we act on. Everything unrecognized lands in
/// `Unknown` so new SDK event types cannot break the flow.
#[derive(Clone, Debug, PartialEq)]
pub enum WidgetEvent {
    WidgetClose,
    WidgetError,
    PurchaseCreated(Option<PurchaseDetails>),
    PurchaseSuccessful(Option<PurchaseDetails>),
    PurchaseFailed(Option<PurchaseDetails>),
    Unknown(String),
}

impl From<RawWidgetEvent> for WidgetEvent {
    fn from(raw: RawWidgetEvent) -> Self {
        let purchase = raw.payload.and_then(|p| p.purchase);
        match raw.kind.as_str() {
            "WIDGET_CLOSE" => WidgetEvent::WidgetClose,
            "WIDGET_ERROR" => WidgetEvent::WidgetError,
            "PURCHASE_CREATED" => WidgetEvent::PurchaseCreated(purchase),
            "PURCHASE_SUCCESSFUL" => WidgetEvent::PurchaseSuccessful(purchase),
            "PURCHASE_FAILED" => WidgetEvent::PurchaseFailed(purchase),
            _ => WidgetEvent::Unknown(raw.kind),
        }
    }
}

/// Everything the enhanced form tracks about the purchase side.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PurchaseState {
    pub is_loading: bool,
    pub last_error: Option<String>,
    pub ledger: Ledger,
}

/// Fold one widget event into the purchase state.
pub fn apply_widget_event(state: &mut PurchaseState, event: WidgetEvent) {
    match event {
        WidgetEvent::WidgetClose => state.is_loading = false,
        WidgetEvent::WidgetError => {
            state.is_loading = false;
            state.last_error = Some(ERR_WIDGET_RUNTIME.to_string());
        }
        WidgetEvent::PurchaseCreated(Some(details)) => {
            state.ledger.record_created(&details);
        }
        WidgetEvent::PurchaseCreated(None) => {}
        WidgetEvent::PurchaseSuccessful(details) => {
            settle_from(state, details.as_ref(), TxStatus::Completed);
        }
        WidgetEvent::PurchaseFailed(details) => {
            settle_from(state, details.as_ref(), TxStatus::Failed);
        }
        WidgetEvent::Unknown(kind) => log::debug!("ignoring widget event {kind}"),
    }
}

fn settle_from(state: &mut PurchaseState, details: Option<&PurchaseDetails>, status: TxStatus) {
    let Some(id) = details.and_then(|d| d.id.as_deref()) else {
        return;
    };
    let amount = details.and_then(|d| d.crypto_amount.as_deref());
    if !state.ledger.settle(id, status, amount) {
        log::debug!("terminal event for unknown purchase {id}");
    }
}

/// Configuration record handed to the on-ramp SDK constructor.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    pub url: String,
    pub host_app_name: String,
    pub host_logo_url: String,
    pub default_flow: String,
    pub enabled_flows: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_address: Option<String>,
    pub swap_asset: String,
    pub fiat_currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiat_value: Option<String>,
    pub variant: String,
}

/// Assemble the widget configuration. The address is optional here; the
/// basic form lets the widget ask the user for one instead.
pub fn widget_config(user_address: Option<String>, fiat_amount: &str) -> WidgetConfig {
    WidgetConfig {
        url: RAMP_URL.to_string(),
        host_app_name: HOST_APP_NAME.to_string(),
        host_logo_url: HOST_LOGO_URL.to_string(),
        default_flow: "ONRAMP".to_string(),
        enabled_flows: vec!["ONRAMP".to_string()],
        user_address,
        swap_asset: TARGET_ASSET.to_string(),
        fiat_currency: FIAT_CURRENCY.to_string(),
        fiat_value: (!fiat_amount.is_empty()).then(|| fiat_amount.to_string()),
        variant: "auto".to_string(),
    }
}

/// Gatekeeper for the enhanced form: a session only opens against a
/// connected wallet.
pub fn build_widget_config(
    conn: &ConnectionState,
    fiat_amount: &str,
) -> Result<WidgetConfig, String> {
    if !conn.is_connected() {
        return Err(ERR_NOT_CONNECTED.to_string());
    }
    Ok(widget_config(conn.address.clone(), fiat_amount))
}
