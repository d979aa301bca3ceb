//! Application state: wallet connection monitoring and the purchase ledger.

pub mod purchase;
pub mod wallet;
