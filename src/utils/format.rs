//! # Formatting Utilities
//!
//! Display formatting for wallet addresses, asset tags and ledger
//! timestamps.

/// Format a wallet address by showing the first `prefix_len` and last
/// `suffix_len` characters.
///
/// If the address is shorter than `prefix_len + suffix_len`, it is
/// returned as-is.
///
/// # Examples
///
/// ```rust
/// use onramp_miniapp::utils::format::format_address;
///
/// let addr = "0x4bbeEB066eD09B7AEd07bF39EEe0460DFa261520";
/// assert_eq!(format_address(addr, 6, 4), "0x4bbe...1520");
/// assert_eq!(format_address("short", 4, 4), "short");
/// ```
pub fn format_address(address: &str, prefix_len: usize, suffix_len: usize) -> String {
    let address_len = address.len();

    // Guard against lengths exceeding the address to prevent slice panics.
    // Hex addresses are ASCII-only, so byte indexing is safe.
    if address_len <= prefix_len + suffix_len
        || prefix_len >= address_len
        || suffix_len >= address_len
    {
        return address.to_string();
    }

    let prefix = &address[..prefix_len];
    let suffix = &address[address_len - suffix_len..];

    format!("{}...{}", prefix, suffix)
}

/// Format a wallet address with the default 6-character prefix and
/// 4-character suffix used across the UI.
pub fn truncate_address(address: &str) -> String {
    format_address(address, 6, 4)
}

/// Symbol part of an asset+network composite tag ("BNB_BASE" -> "BNB").
pub fn asset_symbol(asset: &str) -> &str {
    asset.split('_').next().unwrap_or(asset)
}

/// Render a ledger timestamp for display.
#[cfg(target_arch = "wasm32")]
pub fn format_timestamp(ms: f64) -> String {
    let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(ms));
    String::from(date.to_locale_string("default", &wasm_bindgen::JsValue::UNDEFINED))
}

/// Render a ledger timestamp for display.
#[cfg(not(target_arch = "wasm32"))]
pub fn format_timestamp(ms: f64) -> String {
    format!("{:.0}", ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_address() {
        let addr = "0x4bbeEB066eD09B7AEd07bF39EEe0460DFa261520";
        assert_eq!(format_address(addr, 6, 4), "0x4bbe...1520");
        assert_eq!(format_address(addr, 4, 4), "0x4b...1520");
        assert_eq!(format_address("short", 4, 4), "short");
    }

    #[test]
    fn test_truncate_address() {
        let addr = "0x4bbeEB066eD09B7AEd07bF39EEe0460DFa261520";
        assert_eq!(truncate_address(addr), "0x4bbe...1520");
    }

    #[test]
    fn test_asset_symbol() {
        assert_eq!(asset_symbol("BNB_BASE"), "BNB");
        assert_eq!(asset_symbol("ETH"), "ETH");
    }
}
