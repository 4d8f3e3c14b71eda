//! Scan capture adapters.
//!
//! An adapter owns the capture device and pushes decoded codes into a
//! bounded channel. `LineCapture` reads one code per line from a line
//! source, which is how keyboard-wedge and serial barcode scanners deliver
//! their output; `LineCapture::stdin()` wires it to the terminal.
//!
//! Terminal input is read on a detached OS thread. A blocking read cannot be
//! cancelled, so it must not live on the runtime's blocking pool, which the
//! runtime waits for at shutdown.

use async_trait::async_trait;
use log::*;
use std::io::{self, BufRead};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Errors raised while starting or stopping a capture device.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// Device could not be opened
    #[error("Capture device unavailable: {0}")]
    Unavailable(String),

    /// Start requested while the device is already capturing
    #[error("Capture already running")]
    AlreadyRunning,

    /// I/O failure on the device
    #[error("Capture I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CaptureResult<T> = Result<T, CaptureError>;

/// Specify different scan event types.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// A code was decoded
    Decoded { text: String, format: String },
    /// A frame produced nothing usable; expected noise while scanning
    Miss(String),
    /// The device has no more input
    Ended,
}

/// Settings handed to an adapter when capture starts.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Symbology label attached to codes the device does not identify
    pub format_label: String,
    /// Capacity of the event channel
    pub buffer: usize,
    /// Keep capturing after a code was recorded
    pub continuous: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        CaptureConfig {
            format_label: "Unknown".to_string(),
            buffer: 16,
            continuous: false,
        }
    }
}

/// Capture device seam.
///
/// `start` must not be called twice without a `stop` in between, and `stop`
/// must release the device before it returns.
#[async_trait]
pub trait CaptureAdapter: Send {
    async fn start(
        &mut self,
        config: &CaptureConfig,
        events: mpsc::Sender<ScanEvent>,
    ) -> CaptureResult<()>;

    async fn stop(&mut self) -> CaptureResult<()>;
}

/// Source of text lines. `next_line` must be cancel safe: dropping the
/// future must not lose a line.
///
#[async_trait]
pub trait LineSource: Send + 'static {
    async fn next_line(&mut self) -> io::Result<Option<String>>;
}

#[async_trait]
impl<R> LineSource for Lines<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    async fn next_line(&mut self) -> io::Result<Option<String>> {
        Lines::next_line(self).await
    }
}

/// Lines read by a detached thread from a blocking reader.
///
pub struct ThreadLines {
    lines: mpsc::Receiver<io::Result<String>>,
}

impl ThreadLines {
    pub fn spawn<R>(reader: R) -> io::Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(1);
        std::thread::Builder::new()
            .name("line-capture".to_string())
            .spawn(move || {
                for line in reader.lines() {
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
            })?;
        Ok(ThreadLines { lines: rx })
    }
}

#[async_trait]
impl LineSource for ThreadLines {
    async fn next_line(&mut self) -> io::Result<Option<String>> {
        self.lines.recv().await.transpose()
    }
}

/// Adapter reading one code per line. Blank lines count as misses.
///
pub struct LineCapture<S> {
    source: Option<S>,
    worker: Option<(oneshot::Sender<()>, JoinHandle<S>)>,
}

impl<R> LineCapture<Lines<R>>
where
    R: AsyncBufRead + Unpin,
{
    pub fn new(reader: R) -> Self {
        LineCapture::from_source(reader.lines())
    }
}

impl LineCapture<ThreadLines> {
    pub fn stdin() -> CaptureResult<Self> {
        let source = ThreadLines::spawn(io::BufReader::new(io::stdin()))?;
        Ok(LineCapture::from_source(source))
    }
}

impl<S> LineCapture<S> {
    pub fn from_source(source: S) -> Self {
        LineCapture {
            source: Some(source),
            worker: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }
}

#[async_trait]
impl<S: LineSource> CaptureAdapter for LineCapture<S> {
    async fn start(
        &mut self,
        config: &CaptureConfig,
        events: mpsc::Sender<ScanEvent>,
    ) -> CaptureResult<()> {
        if self.worker.is_some() {
            return Err(CaptureError::AlreadyRunning);
        }
        let mut source = self
            .source
            .take()
            .ok_or_else(|| CaptureError::Unavailable("input source was lost".to_string()))?;
        let format = config.format_label.clone();
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    _ = &mut stop_rx => break,
                    line = source.next_line() => match line {
                        Ok(Some(line)) => {
                            let text = line.trim();
                            if text.is_empty() {
                                ScanEvent::Miss("blank line".to_string())
                            } else {
                                ScanEvent::Decoded {
                                    text: text.to_string(),
                                    format: format.clone(),
                                }
                            }
                        }
                        Ok(None) => ScanEvent::Ended,
                        Err(e) => ScanEvent::Miss(format!("unreadable input: {}", e)),
                    },
                };
                let ended = event == ScanEvent::Ended;
                if events.send(event).await.is_err() || ended {
                    break;
                }
            }
            source
        });

        self.worker = Some((stop_tx, handle));
        debug!("Line capture started");
        Ok(())
    }

    async fn stop(&mut self) -> CaptureResult<()> {
        if let Some((stop_tx, handle)) = self.worker.take() {
            let _ = stop_tx.send(());
            let source = handle
                .await
                .map_err(|e| CaptureError::Unavailable(format!("capture worker failed: {}", e)))?;
            self.source = Some(source);
            debug!("Line capture stopped");
        }
        Ok(())
    }
}
