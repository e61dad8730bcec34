//! CLI command implementations.

pub mod boards;
pub mod check;
pub mod common;
pub mod diff;
pub mod ports;
pub mod reload;
pub mod run;
pub mod status;
