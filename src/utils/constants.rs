//! Application constants

/// Hosted on-ramp widget endpoint.
pub const RAMP_URL: &str = "https://app.ramp.network";

/// Host identity shown inside the widget flow.
pub const HOST_APP_NAME: &str = "Base Mini App";
pub const HOST_LOGO_URL: &str = "/logo.png";

// Fixed trade legs for this build: no asset or currency selection in the UI.
/// Asset+network tag understood by the widget.
pub const TARGET_ASSET: &str = "BNB_BASE";
/// Fiat currency charged to the user.
pub const FIAT_CURRENCY: &str = "PLN";

// UI constants
pub const WALLET_POLL_INTERVAL_MS: u32 = 2_000;
/// Pause after a connect request before re-probing, so the host side
/// has a chance to propagate the new account.
pub const CONNECT_GRACE_MS: u32 = 500;
