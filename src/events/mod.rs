//! Event handling module.
//!
//! This module contains the scan capture pipeline:
//! - Capture adapters: devices pushing scan events into a bounded channel
//! - Scan handling: turning decoded codes into recorded items

mod capture;
mod scan;

pub use capture::{
    CaptureAdapter, CaptureConfig, CaptureError, CaptureResult, LineCapture, LineSource,
    ScanEvent, ThreadLines,
};
pub use scan::{Handler, Scanner};
