//! Acquisition session state machine
//!
//! Pure state: decides what an observed clipboard value means for the current
//! mode. Side effects (transforming, writing the clipboard, place lookups,
//! persisting) are carried out by the monitor according to the returned
//! [`Observation`].

use geoshift_common::geo::{classify, CoordinateToken};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Clipboard values longer than this are never inspected
pub const MAX_CLIPBOARD_CHARS: usize = 5000;

/// Acquisition mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Stopped,
    Working,
    CalibratingAwaitingFirst,
    CalibratingAwaitingSecond,
}

impl Mode {
    /// Status name reported by the API
    pub fn status_name(&self) -> &'static str {
        match self {
            Mode::Stopped => "stopped",
            Mode::Working => "working",
            Mode::CalibratingAwaitingFirst | Mode::CalibratingAwaitingSecond => "calibrating",
        }
    }

    pub fn is_calibrating(&self) -> bool {
        matches!(
            self,
            Mode::CalibratingAwaitingFirst | Mode::CalibratingAwaitingSecond
        )
    }
}

/// What the monitor must do with an observed value
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    /// Nothing to do
    Ignored,
    /// Working mode: convert this coordinate and write the result back
    Convert(CoordinateToken),
    /// First half of a calibration pair stored
    Pending,
    /// Second value has the same precision class; pending value kept
    SameKind,
    /// Both halves present and of different classes
    PairReady { first: String, second: String },
}

/// Observation loop bookkeeping
#[derive(Debug)]
pub(crate) struct LoopHandle {
    pub token: CancellationToken,
    pub generation: u64,
}

/// Per-run acquisition state; not persisted
#[derive(Debug)]
pub struct Session {
    mode: Mode,
    pending: Option<String>,
    last_clipboard: String,
    last_input: String,
    last_output: String,
    status_message: String,
    pub(crate) observer: Option<LoopHandle>,
    next_generation: u64,
}

/// Snapshot for the status endpoint
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub status: &'static str,
    pub last_found: String,
    pub last_result: String,
    pub calibration_status: bool,
    pub calibration_message: String,
    pub pending_first_present: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            mode: Mode::Stopped,
            pending: None,
            last_clipboard: String::new(),
            last_input: String::new(),
            last_output: String::new(),
            status_message: String::new(),
            observer: None,
            next_generation: 0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            status: self.mode.status_name(),
            last_found: self.last_input.clone(),
            last_result: self.last_output.clone(),
            calibration_status: self.mode.is_calibrating(),
            calibration_message: self.status_message.clone(),
            pending_first_present: self.pending.is_some(),
        }
    }

    /// Enter working mode. Returns true if a new observation loop is needed.
    pub fn start_working(&mut self) -> bool {
        match self.mode {
            Mode::Working => {}
            Mode::Stopped => {
                self.mode = Mode::Working;
                self.status_message.clear();
            }
            Mode::CalibratingAwaitingFirst | Mode::CalibratingAwaitingSecond => {
                self.mode = Mode::Working;
                self.pending = None;
                self.status_message.clear();
            }
        }
        self.observer.is_none()
    }

    /// Enter calibration mode, dropping any half pair. Returns true if a new
    /// observation loop is needed.
    pub fn start_calibration(&mut self) -> bool {
        self.mode = Mode::CalibratingAwaitingFirst;
        self.pending = None;
        self.status_message = "Calibration mode. Copy the first coordinate...".to_string();
        self.observer.is_none()
    }

    /// Stop and detach the observation loop; the caller cancels the returned
    /// token.
    pub fn stop(&mut self) -> Option<CancellationToken> {
        self.mode = Mode::Stopped;
        self.pending = None;
        self.status_message.clear();
        self.observer.take().map(|h| h.token)
    }

    /// Register a freshly spawned loop and return its generation.
    pub(crate) fn attach_observer(&mut self, token: CancellationToken) -> u64 {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.observer = Some(LoopHandle { token, generation });
        generation
    }

    /// Loop `generation` died; fall back to Stopped if it is still current.
    pub(crate) fn observer_failed(&mut self, generation: u64, reason: &str) {
        if !self.is_current(generation) {
            return;
        }
        self.observer = None;
        self.mode = Mode::Stopped;
        self.pending = None;
        self.status_message = format!("Monitoring stopped: {}", reason);
    }

    /// Classify a newly observed clipboard value against the current mode.
    pub fn observe(&mut self, text: &str) -> Observation {
        if text.is_empty() || text.chars().count() > MAX_CLIPBOARD_CHARS {
            return Observation::Ignored;
        }
        if text == self.last_clipboard {
            return Observation::Ignored;
        }
        self.last_clipboard = text.to_string();

        let Some(token) = CoordinateToken::extract(text) else {
            return Observation::Ignored;
        };

        match self.mode {
            Mode::Stopped => Observation::Ignored,
            Mode::Working => {
                if token.lat_text.len() < 2 && token.lon_text.len() < 2 {
                    return Observation::Ignored;
                }
                Observation::Convert(token)
            }
            Mode::CalibratingAwaitingFirst => {
                let text = token.text();
                let kind = classify(&text);
                info!(kind = kind.label(), "Calibration: first coordinate received");
                self.status_message = format!(
                    "Got {}. Copy {}...",
                    kind.label(),
                    kind.counterpart_hint()
                );
                self.pending = Some(text);
                self.mode = Mode::CalibratingAwaitingSecond;
                Observation::Pending
            }
            Mode::CalibratingAwaitingSecond => {
                let second = token.text();
                let Some(first) = self.pending.clone() else {
                    // Pending lost without a transition; treat as a first value.
                    self.mode = Mode::CalibratingAwaitingFirst;
                    self.last_clipboard.clear();
                    return self.observe(text);
                };

                if first == second {
                    debug!("Calibration: same coordinate pasted twice, skipping");
                    return Observation::Ignored;
                }

                let (first_kind, second_kind) = (classify(&first), classify(&second));
                if first_kind == second_kind {
                    info!(kind = first_kind.label(), "Calibration: both coordinates same kind, rejected");
                    self.status_message = format!(
                        "Both coordinates are {}! Need a Google + Yandex pair",
                        first_kind.label()
                    );
                    return Observation::SameKind;
                }

                self.status_message = "Looking up location...".to_string();
                Observation::PairReady { first, second }
            }
        }
    }

    /// Working mode: record a conversion. `output` is what was written to the
    /// clipboard, so the loop does not pick it up again.
    pub fn record_conversion(&mut self, input: String, output: String) {
        self.last_clipboard = output.clone();
        self.last_input = input;
        self.last_output = output;
    }

    /// Whether `generation` is the loop currently attached.
    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.observer.as_ref().map(|h| h.generation) == Some(generation)
    }

    /// Calibration pair stored by loop `generation`; wait for the next pair.
    ///
    /// A completion from a loop that has since been stopped or replaced
    /// leaves the current session alone.
    pub(crate) fn finish_pair(&mut self, generation: u64, place: &str) {
        if !self.is_current(generation) {
            debug!(generation, "Pair finished by a stale loop, session unchanged");
            return;
        }
        if self.mode != Mode::CalibratingAwaitingSecond {
            return;
        }
        self.pending = None;
        self.mode = Mode::CalibratingAwaitingFirst;
        self.status_message = format!("Added: {}. Copy the next pair...", place);
    }
}
