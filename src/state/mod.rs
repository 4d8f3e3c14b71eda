//! Application state management module.
//!
//! This module contains the in-memory state behind a scanning session:
//! - `State`, holding the active task, its loaded items and UI flags
//! - Navigation types (`ScanStatus`, `Modal`)
//! - The item form draft (`ItemForm`)
//! - State error handling
//!
//! `State` is a cache of what the store holds for the active task. Only
//! `Session` changes the cached records, and only after the store accepted
//! the change.

mod error;
mod form;
mod navigation;
mod state_impl;

pub use error::StateError;
pub use form::ItemForm;
pub use navigation::{Modal, ScanStatus};
pub use state_impl::State;
