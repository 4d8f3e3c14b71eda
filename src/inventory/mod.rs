//! Inventory data model.
//!
//! Tasks group scanned items; items carry the decoded code plus the
//! location, notes and condition annotations a user adds afterwards.

mod resource;

pub use resource::*;
