//! Scan, annotate and export inventory items.
//!
//! Tasks group scanned items. Codes arrive from a capture adapter or are
//! typed in by hand, get annotated with a location, notes and a condition,
//! and are exported as CSV or a spreadsheet.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod export;
pub mod inventory;
pub mod logger;
pub mod session;
pub mod state;
pub mod store;
pub mod utils;
