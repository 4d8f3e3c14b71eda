use super::capture::{CaptureAdapter, CaptureConfig, CaptureResult, ScanEvent};
use crate::error::AppResult;
use crate::inventory::{ItemDetails, ScannedData, ScannedItem};
use crate::session::Session;
use crate::state::{ScanStatus, StateError};
use log::*;
use tokio::sync::mpsc;

/// Owns a capture adapter and the receiving end of its event channel.
///
pub struct Scanner<A> {
    adapter: A,
    config: CaptureConfig,
    events: Option<mpsc::Receiver<ScanEvent>>,
    status: ScanStatus,
}

impl<A: CaptureAdapter> Scanner<A> {
    pub fn new(adapter: A, config: CaptureConfig) -> Self {
        Scanner {
            adapter,
            config,
            events: None,
            status: ScanStatus::Idle,
        }
    }

    pub fn status(&self) -> ScanStatus {
        self.status
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Start capturing. A scanner that is already capturing is stopped and
    /// restarted with a fresh channel.
    ///
    pub async fn start(&mut self) -> CaptureResult<()> {
        if self.status == ScanStatus::Capturing {
            self.stop().await?;
        }
        let (tx, rx) = mpsc::channel(self.config.buffer.max(1));
        self.adapter.start(&self.config, tx).await?;
        self.events = Some(rx);
        self.status = ScanStatus::Capturing;
        Ok(())
    }

    /// Next event from the device, `None` once the channel closed or the
    /// scanner is idle.
    ///
    pub async fn next_event(&mut self) -> Option<ScanEvent> {
        match self.events.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }

    /// Stop capturing and release the device. Stopping an idle scanner
    /// does nothing.
    ///
    pub async fn stop(&mut self) -> CaptureResult<()> {
        if self.status == ScanStatus::Idle {
            return Ok(());
        }
        self.events = None;
        self.status = ScanStatus::Idle;
        self.adapter.stop().await
    }
}

/// Specify struct for turning scan events into recorded items.
///
pub struct Handler<'a, A> {
    session: &'a mut Session,
    scanner: &'a mut Scanner<A>,
}

impl<'a, A: CaptureAdapter> Handler<'a, A> {
    pub fn new(session: &'a mut Session, scanner: &'a mut Scanner<A>) -> Self {
        Handler { session, scanner }
    }

    /// Start capturing for the active task.
    ///
    pub async fn start(&mut self) -> AppResult<()> {
        if self.session.state().current_task().is_none() {
            return Err(StateError::NoActiveTask.into());
        }
        if let Err(e) = self.scanner.start().await {
            error!("Error starting capture: {}", e);
            self.session.state_mut().set_scan_status(ScanStatus::Idle);
            return Err(e.into());
        }
        self.session
            .state_mut()
            .set_scan_status(ScanStatus::Capturing);
        info!("Scanning started.");
        Ok(())
    }

    /// Stop capturing. The state is idle afterwards even if the device
    /// reported an error while releasing.
    ///
    pub async fn stop(&mut self) -> AppResult<()> {
        let result = self.scanner.stop().await;
        self.session.state_mut().set_scan_status(ScanStatus::Idle);
        result?;
        Ok(())
    }

    /// Handle one scan event, returning the item it recorded if any.
    ///
    pub async fn handle(&mut self, event: ScanEvent) -> AppResult<Option<ScannedItem>> {
        match event {
            ScanEvent::Decoded { text, format } => {
                debug!("Processing decoded scan event '{}' ({})...", text, format);
                if !self.scanner.config().continuous {
                    self.stop().await?;
                }
                let item = self
                    .session
                    .add_scanned_item(ScannedData::decoded(text, format), ItemDetails::default())
                    .await?;
                Ok(Some(item))
            }
            ScanEvent::Miss(reason) => {
                trace!("Scan miss: {}", reason);
                Ok(None)
            }
            ScanEvent::Ended => {
                debug!("Processing capture end event...");
                self.stop().await?;
                Ok(None)
            }
        }
    }

    /// Capture until the scanner goes idle, returning every recorded item.
    ///
    pub async fn run(&mut self) -> AppResult<Vec<ScannedItem>> {
        self.start().await?;
        let mut recorded = vec![];
        while self.scanner.status() == ScanStatus::Capturing {
            let event = self.scanner.next_event().await.unwrap_or(ScanEvent::Ended);
            match self.handle(event).await {
                Ok(Some(item)) => recorded.push(item),
                Ok(None) => {}
                Err(e) => {
                    if let Err(stop_error) = self.stop().await {
                        warn!("Error stopping capture: {}", stop_error);
                    }
                    return Err(e);
                }
            }
        }
        info!("Scanning stopped with {} item(s) recorded.", recorded.len());
        Ok(recorded)
    }
}
