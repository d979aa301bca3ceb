//! Shared helpers: constants, input validation, formatting, clock access.

pub mod amount;
pub mod constants;
pub mod format;
pub mod time;
