//! UI Components

pub mod buy_form;
pub mod enhanced_buy_form;

pub use buy_form::BuyForm;
pub use enhanced_buy_form::EnhancedBuyForm;
