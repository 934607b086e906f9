//! # Session Controller
//!
//! Runs the scan-to-write [`SessionMachine`] on a single task and executes
//! its effects against the platform capabilities.
//!
//! ## Task Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  SessionHandle ── Command (bounded mpsc, with reply) ──┐                │
//! │                                                        ▼                │
//! │  DetectionSink ─┐                              ┌───────────────┐        │
//! │  WriteCompletion├─ Callback (unbounded mpsc) ─►│ controller    │        │
//! │  camera request ┘                              │ task          │        │
//! │                                                │ SessionMachine│        │
//! │                                                └──┬─────────┬──┘        │
//! │                          watch<SessionSnapshot> ◄─┘         └─► broadcast<Notice>
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The controller task is the only place session state changes, so every
//! transition is serialized no matter which thread a callback came from.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use tagwriter_core::{
    Effect, Notice, SessionEvent, SessionMachine, SessionSnapshot, SessionState, WriteOutcome,
};

use crate::capability::{
    BarcodeScanner, Callback, CameraAccess, DetectionSink, NfcWriter, WriteCompletion,
};
use crate::config::SessionSettings;
use crate::error::{SessionError, SessionResult};

/// The platform capabilities a session needs.
#[derive(Clone)]
pub struct Capabilities {
    pub camera: Arc<dyn CameraAccess>,
    pub scanner: Arc<dyn BarcodeScanner>,
    pub nfc: Arc<dyn NfcWriter>,
}

// =============================================================================
// Commands
// =============================================================================

type Reply = oneshot::Sender<SessionResult<()>>;

#[derive(Debug)]
enum Command {
    StartScanning(Reply),
    StopScanning(Reply),
    RequestWrite(Reply),
    Reset(Reply),
    Shutdown,
}

// =============================================================================
// Handle
// =============================================================================

/// Cloneable front door to a running session controller.
#[derive(Clone)]
pub struct SessionHandle {
    cmd_tx: mpsc::Sender<Command>,
    callback_tx: mpsc::UnboundedSender<Callback>,
    state_rx: watch::Receiver<SessionSnapshot>,
    notice_tx: broadcast::Sender<Notice>,
}

impl SessionHandle {
    async fn call(&self, make: fn(Reply) -> Command) -> SessionResult<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.cmd_tx.send(make(reply_tx)).await?;
        reply_rx.await?
    }

    /// Opens the scanner, asking for camera permission first if needed.
    pub async fn start_scanning(&self) -> SessionResult<()> {
        self.call(Command::StartScanning).await
    }

    /// Closes the scanner without a result.
    pub async fn stop_scanning(&self) -> SessionResult<()> {
        self.call(Command::StopScanning).await
    }

    /// Writes the detected URL to a tag.
    pub async fn request_write(&self) -> SessionResult<()> {
        self.call(Command::RequestWrite).await
    }

    /// Clears a finished session.
    pub async fn reset(&self) -> SessionResult<()> {
        self.call(Command::Reset).await
    }

    /// Feeds a decoded payload in, as the scanner would.
    pub fn on_detection(&self, payload: impl Into<String>) {
        self.detection_sink().detected(payload);
    }

    /// Reports a write outcome for `attempt`, as the NFC writer would.
    pub fn on_write_outcome(&self, attempt: u64, outcome: WriteOutcome) {
        WriteCompletion::new(attempt, self.callback_tx.clone()).complete(outcome);
    }

    pub fn detection_sink(&self) -> DetectionSink {
        DetectionSink::new(self.callback_tx.clone())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state_rx.borrow().clone()
    }

    /// Receives every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state_rx.clone()
    }

    /// Receives notices published from now on.
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.notice_tx.subscribe()
    }

    /// Stops the controller. Scanning is stopped first.
    pub async fn shutdown(&self) -> SessionResult<()> {
        self.cmd_tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| SessionError::ShuttingDown)
    }
}

// =============================================================================
// Controller
// =============================================================================

pub struct SessionController {
    machine: SessionMachine,
    capabilities: Capabilities,
    write_prompt: String,
    callback_tx: mpsc::UnboundedSender<Callback>,
    state_tx: watch::Sender<SessionSnapshot>,
    notice_tx: broadcast::Sender<Notice>,
}

impl SessionController {
    /// Spawns the controller task and returns its handle.
    ///
    /// Zero channel sizes in `settings` are raised to one.
    pub fn start(capabilities: Capabilities, settings: &SessionSettings) -> (SessionHandle, JoinHandle<()>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(settings.command_buffer.max(1));
        let (callback_tx, callback_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SessionSnapshot::default());
        let (notice_tx, _) = broadcast::channel(settings.notice_capacity.max(1));

        let controller = SessionController {
            machine: SessionMachine::new(),
            capabilities,
            write_prompt: settings.write_prompt.clone(),
            callback_tx: callback_tx.clone(),
            state_tx,
            notice_tx: notice_tx.clone(),
        };

        let task = tokio::spawn(controller.run(cmd_rx, callback_rx));

        let handle = SessionHandle {
            cmd_tx,
            callback_tx,
            state_rx,
            notice_tx,
        };
        (handle, task)
    }

    async fn run(
        mut self,
        mut cmd_rx: mpsc::Receiver<Command>,
        mut callback_rx: mpsc::UnboundedReceiver<Callback>,
    ) {
        info!("Session controller started");

        loop {
            // Capability callbacks drain before the next user command.
            tokio::select! {
                biased;
                Some(callback) = callback_rx.recv() => self.handle_callback(callback),
                cmd = cmd_rx.recv() => match cmd {
                    Some(Command::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd),
                },
            }
        }

        if *self.machine.state() == SessionState::Scanning {
            self.capabilities.scanner.stop();
        }
        info!("Session controller stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        let (event, reply) = match cmd {
            Command::StartScanning(reply) => (
                SessionEvent::StartScanning {
                    camera: self.capabilities.camera.status(),
                },
                reply,
            ),
            Command::StopScanning(reply) => (SessionEvent::StopScanning, reply),
            Command::RequestWrite(reply) => (
                SessionEvent::RequestWrite {
                    nfc_available: self.capabilities.nfc.is_available(),
                },
                reply,
            ),
            Command::Reset(reply) => (SessionEvent::Reset, reply),
            Command::Shutdown => return,
        };

        let result = self.apply(event);
        // The caller may have stopped waiting.
        let _ = reply.send(result);
    }

    fn handle_callback(&mut self, callback: Callback) {
        let event = match callback {
            Callback::Detection(payload) => SessionEvent::Detection { payload },
            Callback::CameraResolved(Ok(granted)) => SessionEvent::CameraAccessResolved { granted },
            Callback::CameraResolved(Err(e)) => {
                warn!(error = %e, "Camera permission request failed");
                SessionEvent::CameraAccessFailed
            }
            Callback::WriteCompleted { attempt, outcome } => {
                SessionEvent::WriteCompleted { attempt, outcome }
            }
        };

        // Callbacks are never rejected, only ignored.
        let _ = self.apply(event);
    }

    /// Runs one event through the machine, then its effects, then publishes.
    fn apply(&mut self, event: SessionEvent) -> SessionResult<()> {
        let from = self.machine.state().name();
        let label = event_label(&event);

        let transition = match self.machine.handle(event) {
            Ok(t) => t,
            Err(e) => {
                debug!(state = from, event = label, "Rejected session action");
                return Err(e.into());
            }
        };

        if transition.ignored {
            debug!(state = from, event = label, "Ignored out-of-state event");
            return Ok(());
        }

        debug!(
            from,
            to = self.machine.state().name(),
            event = label,
            "Session transition"
        );

        for effect in transition.effects {
            self.run_effect(effect);
        }

        if let Some(notice) = transition.notice {
            // No subscribers is fine; notices are not replayed.
            let _ = self.notice_tx.send(notice);
        }

        self.state_tx.send_replace(self.machine.snapshot());
        Ok(())
    }

    fn run_effect(&self, effect: Effect) {
        match effect {
            Effect::StartCapture => {
                self.capabilities
                    .scanner
                    .start(DetectionSink::new(self.callback_tx.clone()));
            }
            Effect::StopCapture => self.capabilities.scanner.stop(),
            Effect::RequestCameraAccess => {
                let camera = Arc::clone(&self.capabilities.camera);
                let tx = self.callback_tx.clone();
                tokio::spawn(async move {
                    let result = camera.request_access().await;
                    let _ = tx.send(Callback::CameraResolved(result));
                });
            }
            Effect::BeginWrite { url, attempt } => {
                info!(attempt, url = %url, "Starting NFC write");
                let completion = WriteCompletion::new(attempt, self.callback_tx.clone());
                self.capabilities
                    .nfc
                    .begin_write(&url, &self.write_prompt, completion);
            }
        }
    }
}

fn event_label(event: &SessionEvent) -> &'static str {
    match event {
        SessionEvent::StartScanning { .. } => "start_scanning",
        SessionEvent::CameraAccessResolved { .. } => "camera_resolved",
        SessionEvent::CameraAccessFailed => "camera_failed",
        SessionEvent::Detection { .. } => "detection",
        SessionEvent::StopScanning => "stop_scanning",
        SessionEvent::RequestWrite { .. } => "request_write",
        SessionEvent::WriteCompleted { .. } => "write_completed",
        SessionEvent::Reset => "reset",
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
