//! # Platform Capabilities
//!
//! The camera, barcode scanner and NFC writer are supplied by the host
//! platform. The controller only talks to them through these traits.
//!
//! ```text
//! ┌───────────────────┐  start(sink) / stop()   ┌────────────────────────┐
//! │                   │ ──────────────────────► │ BarcodeScanner         │
//! │                   │ ◄── sink.detected() ─── │   (any thread, N times)│
//! │                   │                         └────────────────────────┘
//! │ SessionController │  status() / request     ┌────────────────────────┐
//! │   (one task)      │ ──────────────────────► │ CameraAccess           │
//! │                   │                         └────────────────────────┘
//! │                   │  begin_write(url, ..)   ┌────────────────────────┐
//! │                   │ ──────────────────────► │ NfcWriter              │
//! │                   │ ◄── completion.complete │   (exactly once)       │
//! └───────────────────┘                         └────────────────────────┘
//! ```
//!
//! Every callback funnels into the controller's callback channel, so it is
//! safe to call from any thread, including ones tokio does not own.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use tagwriter_core::{CameraAuthorization, WriteFailure, WriteOutcome};

/// A capability call that failed outright instead of answering.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct CapabilityError(pub String);

// =============================================================================
// Capability Traits
// =============================================================================

#[async_trait]
pub trait CameraAccess: Send + Sync {
    /// Current permission, read without prompting.
    fn status(&self) -> CameraAuthorization;

    /// Prompts the user. `Ok(true)` when access was granted.
    async fn request_access(&self) -> Result<bool, CapabilityError>;
}

pub trait BarcodeScanner: Send + Sync {
    /// Starts capture. Decoded QR payloads go to `sink`, possibly many times.
    fn start(&self, sink: DetectionSink);

    fn stop(&self);
}

pub trait NfcWriter: Send + Sync {
    fn is_available(&self) -> bool;

    /// Starts a reader session that writes `url` as a single URI record.
    ///
    /// `prompt` is the text shown while waiting for a tag. The outcome is
    /// reported through `completion`.
    fn begin_write(&self, url: &str, prompt: &str, completion: WriteCompletion);
}

// =============================================================================
// Callback Plumbing
// =============================================================================

/// Messages from capabilities back to the controller task.
#[derive(Debug)]
pub(crate) enum Callback {
    Detection(String),
    CameraResolved(Result<bool, CapabilityError>),
    WriteCompleted { attempt: u64, outcome: WriteOutcome },
}

/// Where the scanner reports decoded payloads. Cheap to clone.
#[derive(Debug, Clone)]
pub struct DetectionSink {
    tx: mpsc::UnboundedSender<Callback>,
}

impl DetectionSink {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Callback>) -> Self {
        DetectionSink { tx }
    }

    pub fn detected(&self, payload: impl Into<String>) {
        if self.tx.send(Callback::Detection(payload.into())).is_err() {
            debug!("Detection after controller shutdown");
        }
    }
}

/// Reports the outcome of one write attempt.
///
/// `complete` consumes the handle, so an attempt cannot finish twice.
/// Dropping it unused reports `Failure(Unknown)`, so a session never stays
/// stuck in `Writing`.
#[derive(Debug)]
pub struct WriteCompletion {
    attempt: u64,
    tx: Option<mpsc::UnboundedSender<Callback>>,
}

impl WriteCompletion {
    pub(crate) fn new(attempt: u64, tx: mpsc::UnboundedSender<Callback>) -> Self {
        WriteCompletion {
            attempt,
            tx: Some(tx),
        }
    }

    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    pub fn complete(mut self, outcome: WriteOutcome) {
        self.send(outcome);
    }

    fn send(&mut self, outcome: WriteOutcome) {
        if let Some(tx) = self.tx.take() {
            let attempt = self.attempt;
            if tx.send(Callback::WriteCompleted { attempt, outcome }).is_err() {
                debug!(attempt, "Write outcome after controller shutdown");
            }
        }
    }
}

impl Drop for WriteCompletion {
    fn drop(&mut self) {
        if self.tx.is_some() {
            warn!(attempt = self.attempt, "Write completion dropped without an outcome");
            self.send(WriteOutcome::Failure(WriteFailure::Unknown));
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
