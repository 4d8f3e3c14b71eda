//! Navigation-related state types.
//!
//! This module contains the scan lifecycle status and the modal forms that
//! can be open over the main screen.

/// Specifying the capture lifecycle.
///
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum ScanStatus {
    #[default]
    Idle,
    Capturing,
}

/// Specifying the different modal forms.
///
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Modal {
    TaskForm,
    ItemForm,
}
