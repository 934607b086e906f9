//! # Scan-to-Write Session State Machine
//!
//! The pure half of the session controller. [`SessionMachine::handle`] takes
//! one event, updates the state, and returns the side effects the caller must
//! run against the camera / scanner / NFC capabilities. No I/O happens here.
//!
//! ## State Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌──────┐ start (authorized) ┌──────────┐ valid URL ┌──────────────┐   │
//! │   │ Idle │ ─────────────────► │ Scanning │ ────────► │ Detected(url)│   │
//! │   └──────┘                    └──────────┘           └──────┬───────┘   │
//! │     ▲  │ start (denied)         │    ▲ invalid code         │           │
//! │     │  ▼                        │    └──(notice)            │ write     │
//! │     │ ┌────────────────┐  stop  │                           ▼           │
//! │     │ │ Failed(reason) │ ◄──────┼───── NFC unavailable ─────┤           │
//! │     │ └────────────────┘        │                    ┌──────┴──────┐    │
//! │     │         ▲                 ▼                    │ Writing(url)│    │
//! │     │         └──── failure ─────────────────────────┤             │    │
//! │     │                                                └──┬───────┬──┘    │
//! │     └──────────────── cancelled (silent) ───────────────┘       │       │
//! │     ▲                                                   success │       │
//! │     │ reset            ┌───────────┐                            │       │
//! │     └───────────────── │ Succeeded │ ◄──────────────────────────┘       │
//! │                        └───────────┘   (URL cleared)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Callback Gating
//! Detection callbacks are honoured only in `Scanning`; write outcomes only
//! in `Writing` and only for the current attempt number. Anything else is
//! reported back as [`Transition::ignored`] and leaves the machine untouched.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::validation::validate_scan_payload;

// =============================================================================
// Capability Vocabulary
// =============================================================================

/// Camera permission as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CameraAuthorization {
    Authorized,
    Denied,
    Restricted,
    Undetermined,
}

/// Why a present tag refused the write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TagWriteBlock {
    ReadOnly,
    NotNdefCompliant,
}

impl std::fmt::Display for TagWriteBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagWriteBlock::ReadOnly => write!(f, "Tag is read-only"),
            TagWriteBlock::NotNdefCompliant => write!(f, "Tag is not NDEF compliant"),
        }
    }
}

/// Failure kinds reported by the NFC-write capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum WriteFailure {
    ConnectionError,
    TagNotWritable(TagWriteBlock),
    WriteError,
    InvalidPayload,
    Unknown,
}

/// Result of one write attempt. User cancellation is its own outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
    Success,
    Cancelled,
    Failure(WriteFailure),
}

// =============================================================================
// Failure Reasons
// =============================================================================

/// Why a session ended in `Failed`. Display text is the user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    #[error("Please allow Camera access in Settings to scan QR codes.")]
    CameraDenied,

    #[error("Unable to request camera access. Please try again.")]
    CameraRequestFailed,

    #[error("NFC not available. Use a real device with NFC and ensure capability is enabled.")]
    NfcUnavailable,

    #[error("Connection error. Please try again.")]
    NfcConnectionError,

    #[error("{0}")]
    NfcTagNotWritable(TagWriteBlock),

    #[error("Failed to write URL to NFC tag. Please try again.")]
    NfcWriteError,

    #[error("Invalid URL format")]
    NfcInvalidPayload,

    #[error("Unknown tag status")]
    NfcUnknown,
}

impl FailureReason {
    /// Short heading for the alert.
    pub const fn title(&self) -> &'static str {
        match self {
            FailureReason::CameraDenied => "Camera Access Needed",
            FailureReason::CameraRequestFailed => "Camera Error",
            FailureReason::NfcUnavailable => "NFC Not Available",
            FailureReason::NfcTagNotWritable(_) => "Tag Not Writable",
            FailureReason::NfcConnectionError
            | FailureReason::NfcWriteError
            | FailureReason::NfcInvalidPayload
            | FailureReason::NfcUnknown => "Write Failed",
        }
    }
}

impl From<WriteFailure> for FailureReason {
    fn from(failure: WriteFailure) -> Self {
        match failure {
            WriteFailure::ConnectionError => FailureReason::NfcConnectionError,
            WriteFailure::TagNotWritable(block) => FailureReason::NfcTagNotWritable(block),
            WriteFailure::WriteError => FailureReason::NfcWriteError,
            WriteFailure::InvalidPayload => FailureReason::NfcInvalidPayload,
            WriteFailure::Unknown => FailureReason::NfcUnknown,
        }
    }
}

// =============================================================================
// Session State
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Scanning,
    Detected {
        url: String,
    },
    Writing {
        url: String,
        attempt: u64,
    },
    Succeeded,
    Failed {
        reason: FailureReason,
    },
}

impl SessionState {
    pub const fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Scanning => "scanning",
            SessionState::Detected { .. } => "detected",
            SessionState::Writing { .. } => "writing",
            SessionState::Succeeded => "succeeded",
            SessionState::Failed { .. } => "failed",
        }
    }

    /// The URL awaiting or undergoing a write.
    pub fn detected_url(&self) -> Option<&str> {
        match self {
            SessionState::Detected { url } | SessionState::Writing { url, .. } => Some(url),
            _ => None,
        }
    }

    /// Scanning and Writing own a live capability.
    pub const fn is_busy(&self) -> bool {
        matches!(self, SessionState::Scanning | SessionState::Writing { .. })
    }
}

/// What the UI renders: the state plus the permission spinner flag.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub detected_url: Option<String>,
    pub permission_pending: bool,
}

// =============================================================================
// Events, Effects, Notices
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// User asked to scan; carries the camera status read at that moment.
    StartScanning { camera: CameraAuthorization },
    /// The outstanding permission request was answered.
    CameraAccessResolved { granted: bool },
    /// The outstanding permission request errored instead of answering.
    CameraAccessFailed,
    Detection { payload: String },
    StopScanning,
    RequestWrite { nfc_available: bool },
    WriteCompleted { attempt: u64, outcome: WriteOutcome },
    Reset,
}

/// Side effects for the caller to run, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartCapture,
    StopCapture,
    RequestCameraAccess,
    BeginWrite { url: String, attempt: u64 },
}

/// One-shot messages for the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    CodeDetected { url: String },
    InvalidCode,
    WriteSucceeded,
    SessionFailed { reason: FailureReason },
}

impl Notice {
    pub fn title(&self) -> &'static str {
        match self {
            Notice::CodeDetected { .. } => "QR Code Detected",
            Notice::InvalidCode => "Invalid QR Code",
            Notice::WriteSucceeded => "Success",
            Notice::SessionFailed { reason } => reason.title(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            Notice::CodeDetected { url } => format!("URL found: {}", url),
            Notice::InvalidCode => {
                "The scanned QR code does not contain a valid URL".to_string()
            }
            Notice::WriteSucceeded => "URL successfully written to NFC tag!".to_string(),
            Notice::SessionFailed { reason } => reason.to_string(),
        }
    }
}

/// The result of handling one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    pub effects: Vec<Effect>,
    pub notice: Option<Notice>,
    /// The event did not apply to the current state and changed nothing.
    pub ignored: bool,
}

impl Transition {
    fn ignored() -> Self {
        Transition {
            ignored: true,
            ..Default::default()
        }
    }

    fn effects(effects: Vec<Effect>) -> Self {
        Transition {
            effects,
            ..Default::default()
        }
    }

    fn with_notice(mut self, notice: Notice) -> Self {
        self.notice = Some(notice);
        self
    }
}

/// A user action that is not valid in the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {action} while {state}")]
pub struct InvalidTransition {
    pub state: &'static str,
    pub action: &'static str,
}

// =============================================================================
// Session Machine
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct SessionMachine {
    state: SessionState,
    permission_pending: bool,
    last_attempt: u64,
}

impl SessionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn permission_pending(&self) -> bool {
        self.permission_pending
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state.clone(),
            detected_url: self.state.detected_url().map(str::to_string),
            permission_pending: self.permission_pending,
        }
    }

    fn reject(&self, action: &'static str) -> Result<Transition, InvalidTransition> {
        Err(InvalidTransition {
            state: self.state.name(),
            action,
        })
    }

    fn fail(&mut self, reason: FailureReason) -> Transition {
        self.state = SessionState::Failed { reason };
        Transition::default().with_notice(Notice::SessionFailed { reason })
    }

    /// Applies one event.
    ///
    /// User actions in the wrong state return `Err` and change nothing.
    /// Capability callbacks in the wrong state return an ignored transition.
    pub fn handle(&mut self, event: SessionEvent) -> Result<Transition, InvalidTransition> {
        match event {
            SessionEvent::StartScanning { camera } => self.start_scanning(camera),
            SessionEvent::CameraAccessResolved { granted } => Ok(self.camera_resolved(granted)),
            SessionEvent::CameraAccessFailed => Ok(self.camera_failed()),
            SessionEvent::Detection { payload } => Ok(self.detection(&payload)),
            SessionEvent::StopScanning => Ok(self.stop_scanning()),
            SessionEvent::RequestWrite { nfc_available } => self.request_write(nfc_available),
            SessionEvent::WriteCompleted { attempt, outcome } => {
                Ok(self.write_completed(attempt, outcome))
            }
            SessionEvent::Reset => self.reset(),
        }
    }

    fn start_scanning(&mut self, camera: CameraAuthorization) -> Result<Transition, InvalidTransition> {
        if self.permission_pending {
            return Ok(Transition::ignored());
        }
        if self.state.is_busy() {
            return self.reject("start scanning");
        }

        // A new scan discards whatever the previous session left behind.
        self.state = SessionState::Idle;

        match camera {
            CameraAuthorization::Authorized => {
                self.state = SessionState::Scanning;
                Ok(Transition::effects(vec![Effect::StartCapture]))
            }
            CameraAuthorization::Undetermined => {
                self.permission_pending = true;
                Ok(Transition::effects(vec![Effect::RequestCameraAccess]))
            }
            CameraAuthorization::Denied | CameraAuthorization::Restricted => {
                Ok(self.fail(FailureReason::CameraDenied))
            }
        }
    }

    fn camera_resolved(&mut self, granted: bool) -> Transition {
        if !self.permission_pending {
            return Transition::ignored();
        }
        self.permission_pending = false;

        if granted {
            self.state = SessionState::Scanning;
            Transition::effects(vec![Effect::StartCapture])
        } else {
            self.fail(FailureReason::CameraDenied)
        }
    }

    fn camera_failed(&mut self) -> Transition {
        if !self.permission_pending {
            return Transition::ignored();
        }
        self.permission_pending = false;
        self.fail(FailureReason::CameraRequestFailed)
    }

    fn detection(&mut self, payload: &str) -> Transition {
        if self.state != SessionState::Scanning {
            return Transition::ignored();
        }

        match validate_scan_payload(payload) {
            Ok(url) => {
                self.state = SessionState::Detected { url: url.clone() };
                Transition::effects(vec![Effect::StopCapture])
                    .with_notice(Notice::CodeDetected { url })
            }
            Err(_) => Transition::default().with_notice(Notice::InvalidCode),
        }
    }

    fn stop_scanning(&mut self) -> Transition {
        // Closing the scanner while the permission prompt is up abandons it;
        // the late answer is then ignored.
        if self.permission_pending {
            self.permission_pending = false;
            return Transition::default();
        }
        if self.state != SessionState::Scanning {
            return Transition::ignored();
        }
        self.state = SessionState::Idle;
        Transition::effects(vec![Effect::StopCapture])
    }

    fn request_write(&mut self, nfc_available: bool) -> Result<Transition, InvalidTransition> {
        let url = match &self.state {
            SessionState::Detected { url } => url.clone(),
            _ => return self.reject("write a tag"),
        };

        if !nfc_available {
            return Ok(self.fail(FailureReason::NfcUnavailable));
        }

        self.last_attempt += 1;
        let attempt = self.last_attempt;
        self.state = SessionState::Writing {
            url: url.clone(),
            attempt,
        };
        Ok(Transition::effects(vec![Effect::BeginWrite { url, attempt }]))
    }

    fn write_completed(&mut self, attempt: u64, outcome: WriteOutcome) -> Transition {
        match &self.state {
            SessionState::Writing { attempt: current, .. } if *current == attempt => {}
            _ => return Transition::ignored(),
        }

        match outcome {
            WriteOutcome::Success => {
                self.state = SessionState::Succeeded;
                Transition::default().with_notice(Notice::WriteSucceeded)
            }
            WriteOutcome::Cancelled => {
                self.state = SessionState::Idle;
                Transition::default()
            }
            WriteOutcome::Failure(kind) => self.fail(kind.into()),
        }
    }

    fn reset(&mut self) -> Result<Transition, InvalidTransition> {
        match self.state {
            SessionState::Succeeded | SessionState::Failed { .. } => {
                self.state = SessionState::Idle;
                Ok(Transition::default())
            }
            SessionState::Idle => Ok(Transition::ignored()),
            _ => self.reject("reset"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://example.com/menu";

    fn scanning() -> SessionMachine {
        let mut machine = SessionMachine::new();
        machine
            .handle(SessionEvent::StartScanning {
                camera: CameraAuthorization::Authorized,
            })
            .unwrap();
        machine
    }

    fn detected() -> SessionMachine {
        let mut machine = scanning();
        machine
            .handle(SessionEvent::Detection {
                payload: URL.to_string(),
            })
            .unwrap();
        machine
    }

    fn writing() -> (SessionMachine, u64) {
        let mut machine = detected();
        let t = machine
            .handle(SessionEvent::RequestWrite { nfc_available: true })
            .unwrap();
        let attempt = match &t.effects[..] {
            [Effect::BeginWrite { attempt, .. }] => *attempt,
            other => panic!("unexpected effects {other:?}"),
        };
        (machine, attempt)
    }

    #[test]
    fn test_authorized_start_begins_capture() {
        let mut machine = SessionMachine::new();
        let t = machine
            .handle(SessionEvent::StartScanning {
                camera: CameraAuthorization::Authorized,
            })
            .unwrap();
        assert_eq!(machine.state(), &SessionState::Scanning);
        assert_eq!(t.effects, vec![Effect::StartCapture]);
    }

    #[test]
    fn test_denied_and_restricted_fail() {
        for camera in [CameraAuthorization::Denied, CameraAuthorization::Restricted] {
            let mut machine = SessionMachine::new();
            let t = machine.handle(SessionEvent::StartScanning { camera }).unwrap();
            assert_eq!(
                machine.state(),
                &SessionState::Failed {
                    reason: FailureReason::CameraDenied
                }
            );
            assert!(t.effects.is_empty());
            assert!(t.notice.is_some());
        }
    }

    #[test]
    fn test_undetermined_requests_once() {
        let mut machine = SessionMachine::new();
        let start = SessionEvent::StartScanning {
            camera: CameraAuthorization::Undetermined,
        };
        let t = machine.handle(start.clone()).unwrap();
        assert_eq!(t.effects, vec![Effect::RequestCameraAccess]);
        assert!(machine.permission_pending());

        let again = machine.handle(start).unwrap();
        assert!(again.ignored);
        assert!(again.effects.is_empty());

        let t = machine
            .handle(SessionEvent::CameraAccessResolved { granted: true })
            .unwrap();
        assert_eq!(t.effects, vec![Effect::StartCapture]);
        assert_eq!(machine.state(), &SessionState::Scanning);
        assert!(!machine.permission_pending());
    }

    #[test]
    fn test_permission_refused_or_errored() {
        let mut machine = SessionMachine::new();
        machine
            .handle(SessionEvent::StartScanning {
                camera: CameraAuthorization::Undetermined,
            })
            .unwrap();
        machine
            .handle(SessionEvent::CameraAccessResolved { granted: false })
            .unwrap();
        assert_eq!(
            machine.state(),
            &SessionState::Failed {
                reason: FailureReason::CameraDenied
            }
        );

        let mut machine = SessionMachine::new();
        machine
            .handle(SessionEvent::StartScanning {
                camera: CameraAuthorization::Undetermined,
            })
            .unwrap();
        machine.handle(SessionEvent::CameraAccessFailed).unwrap();
        assert_eq!(
            machine.state(),
            &SessionState::Failed {
                reason: FailureReason::CameraRequestFailed
            }
        );
    }

    #[test]
    fn test_only_web_urls_are_detected() {
        let mut machine = scanning();
        for payload in ["not a url", "ftp://x.com", "mailto:a@b.c", ""] {
            let t = machine
                .handle(SessionEvent::Detection {
                    payload: payload.to_string(),
                })
                .unwrap();
            assert_eq!(machine.state(), &SessionState::Scanning);
            assert_eq!(t.notice, Some(Notice::InvalidCode));
            assert!(t.effects.is_empty());
        }

        let t = machine
            .handle(SessionEvent::Detection {
                payload: URL.to_string(),
            })
            .unwrap();
        assert_eq!(
            machine.state(),
            &SessionState::Detected {
                url: URL.to_string()
            }
        );
        assert_eq!(t.effects, vec![Effect::StopCapture]);
    }

    #[test]
    fn test_detection_after_detected_is_ignored() {
        let mut machine = detected();
        let t = machine
            .handle(SessionEvent::Detection {
                payload: "https://other.example".to_string(),
            })
            .unwrap();
        assert!(t.ignored);
        assert_eq!(machine.snapshot().detected_url.as_deref(), Some(URL));
    }

    #[test]
    fn test_write_without_nfc_fails_without_effects() {
        let mut machine = detected();
        let t = machine
            .handle(SessionEvent::RequestWrite {
                nfc_available: false,
            })
            .unwrap();
        assert!(t.effects.is_empty());
        assert_eq!(
            machine.state(),
            &SessionState::Failed {
                reason: FailureReason::NfcUnavailable
            }
        );
    }

    #[test]
    fn test_success_clears_url_and_blocks_rewrite() {
        let (mut machine, attempt) = writing();
        let t = machine
            .handle(SessionEvent::WriteCompleted {
                attempt,
                outcome: WriteOutcome::Success,
            })
            .unwrap();
        assert_eq!(t.notice, Some(Notice::WriteSucceeded));
        assert_eq!(machine.state(), &SessionState::Succeeded);
        assert_eq!(machine.snapshot().detected_url, None);

        let err = machine
            .handle(SessionEvent::RequestWrite { nfc_available: true })
            .unwrap_err();
        assert_eq!(err.state, "succeeded");
    }

    #[test]
    fn test_failure_kinds_map_to_reasons() {
        let (mut machine, attempt) = writing();
        machine
            .handle(SessionEvent::WriteCompleted {
                attempt,
                outcome: WriteOutcome::Failure(WriteFailure::TagNotWritable(
                    TagWriteBlock::ReadOnly,
                )),
            })
            .unwrap();
        let reason = FailureReason::NfcTagNotWritable(TagWriteBlock::ReadOnly);
        assert_eq!(machine.state(), &SessionState::Failed { reason });
        assert_eq!(reason.to_string(), "Tag is read-only");
    }

    #[test]
    fn test_cancel_returns_to_idle_silently() {
        let (mut machine, attempt) = writing();
        let t = machine
            .handle(SessionEvent::WriteCompleted {
                attempt,
                outcome: WriteOutcome::Cancelled,
            })
            .unwrap();
        assert_eq!(t, Transition::default());
        assert_eq!(machine.snapshot(), SessionSnapshot::default());
    }

    #[test]
    fn test_stale_attempt_is_ignored() {
        let (mut machine, attempt) = writing();
        let t = machine
            .handle(SessionEvent::WriteCompleted {
                attempt: attempt + 7,
                outcome: WriteOutcome::Success,
            })
            .unwrap();
        assert!(t.ignored);
        assert!(matches!(machine.state(), SessionState::Writing { .. }));
    }

    #[test]
    fn test_detection_while_writing_is_ignored() {
        let (mut machine, _) = writing();
        let t = machine
            .handle(SessionEvent::Detection {
                payload: "https://late.example".to_string(),
            })
            .unwrap();
        assert!(t.ignored);
        assert_eq!(machine.state().detected_url(), Some(URL));
    }

    #[test]
    fn test_reset_rules() {
        let mut machine = detected();
        assert!(machine.handle(SessionEvent::Reset).is_err());

        machine
            .handle(SessionEvent::RequestWrite {
                nfc_available: false,
            })
            .unwrap();
        machine.handle(SessionEvent::Reset).unwrap();
        assert_eq!(machine.snapshot(), SessionSnapshot::default());
    }

    #[test]
    fn test_start_while_busy_is_rejected() {
        let mut machine = scanning();
        let err = machine
            .handle(SessionEvent::StartScanning {
                camera: CameraAuthorization::Authorized,
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "cannot start scanning while scanning");
    }

    #[test]
    fn test_stop_scanning() {
        let mut machine = scanning();
        let t = machine.handle(SessionEvent::StopScanning).unwrap();
        assert_eq!(t.effects, vec![Effect::StopCapture]);
        assert_eq!(machine.state(), &SessionState::Idle);
        assert!(machine.handle(SessionEvent::StopScanning).unwrap().ignored);
    }

    #[test]
    fn test_stop_while_permission_pending_drops_late_grant() {
        let mut machine = SessionMachine::new();
        machine
            .handle(SessionEvent::StartScanning {
                camera: CameraAuthorization::Undetermined,
            })
            .unwrap();

        let t = machine.handle(SessionEvent::StopScanning).unwrap();
        assert!(!t.ignored);
        assert!(t.effects.is_empty());
        assert!(!machine.permission_pending());

        let late = machine
            .handle(SessionEvent::CameraAccessResolved { granted: true })
            .unwrap();
        assert!(late.ignored);
        assert_eq!(machine.state(), &SessionState::Idle);
    }

    #[test]
    fn test_snapshot_serializes_with_state_tag() {
        let machine = detected();
        let json = serde_json::to_value(machine.snapshot()).unwrap();
        assert_eq!(json["state"]["state"], "detected");
        assert_eq!(json["detected_url"], URL);
    }
}
