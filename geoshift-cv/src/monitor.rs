//! Clipboard observation loop
//!
//! A single cancellable task polls the clipboard, feeds every change to the
//! [`Session`] state machine and performs the resulting side effects: writing
//! conversions back to the clipboard in working mode, and resolving, looking up
//! and storing calibration pairs in calibration mode.
//!
//! The loop is fail-stop: any clipboard or task error ends it and the session
//! falls back to Stopped until an operator starts it again.

use std::sync::Arc;
use std::time::{Duration, Instant};

use geoshift_common::geo::{resolve, transform, CoordinatePoint};
use geoshift_common::CalibrationPoint;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::clipboard::{Clipboard, ClipboardError};
use crate::enrichment::resolve_place;
use crate::geocode::PlaceLookup;
use crate::session::{Observation, Session, StatusSnapshot};
use crate::SharedStore;

/// Observation loop failure
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),

    #[error("Clipboard task failed: {0}")]
    Task(#[from] JoinError),
}

/// Clipboard polling cadence
#[derive(Debug, Clone, Copy)]
pub struct PollTiming {
    /// Delay between clipboard reads
    pub poll_interval: Duration,
    /// Longest single wait before re-checking for cancellation
    pub wait_timeout: Duration,
}

impl Default for PollTiming {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            wait_timeout: Duration::from_secs(1),
        }
    }
}

/// Transform `point` with the store's current anchors, formatted "lat, lon".
pub async fn convert_point(store: &SharedStore, point: CoordinatePoint) -> String {
    let anchors = store.lock().await.anchors();
    transform(point, &anchors).to_fixed()
}

/// Owns the acquisition session and the observation loop
#[derive(Clone)]
pub struct Monitor {
    session: Arc<Mutex<Session>>,
    store: SharedStore,
    clipboard: Arc<dyn Clipboard>,
    places: Arc<dyn PlaceLookup>,
    timing: PollTiming,
}

impl Monitor {
    pub fn new(
        store: SharedStore,
        clipboard: Arc<dyn Clipboard>,
        places: Arc<dyn PlaceLookup>,
        timing: PollTiming,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session::new())),
            store,
            clipboard,
            places,
            timing,
        }
    }

    /// Enter working mode, starting the loop if it is not running.
    pub async fn start(&self) {
        let mut session = self.session.lock().await;
        if session.start_working() {
            self.spawn_observer(&mut session);
        }
        info!("Monitoring started (working)");
    }

    /// Enter calibration mode, starting the loop if it is not running.
    pub async fn start_calibration(&self) {
        let mut session = self.session.lock().await;
        if session.start_calibration() {
            self.spawn_observer(&mut session);
        }
        info!("Monitoring started (calibration)");
    }

    /// Stop observing. An in-flight pair completion still finishes.
    pub async fn stop(&self) {
        let token = self.session.lock().await.stop();
        if let Some(token) = token {
            token.cancel();
        }
        info!("Monitoring stopped");
    }

    pub async fn status(&self) -> StatusSnapshot {
        self.session.lock().await.snapshot()
    }

    pub async fn is_observing(&self) -> bool {
        self.session.lock().await.observer.is_some()
    }

    fn spawn_observer(&self, session: &mut Session) {
        let token = CancellationToken::new();
        let generation = session.attach_observer(token.clone());

        let observer = tokio::spawn(self.clone().run(token, generation));

        // A panic inside the loop must still reset the session.
        let session = Arc::clone(&self.session);
        tokio::spawn(async move {
            if let Err(e) = observer.await {
                error!(error = %e, "Observation loop aborted");
                session.lock().await.observer_failed(generation, &e.to_string());
            }
        });
    }

    async fn run(self, token: CancellationToken, generation: u64) {
        info!(generation, "Observation loop started");

        loop {
            let changed = tokio::select! {
                _ = token.cancelled() => break,
                changed = self.wait_for_change() => changed,
            };

            let result = match changed {
                Ok(Some(text)) => self.handle_text(&text, generation).await,
                Ok(None) => Ok(()),
                Err(e) => Err(e),
            };

            if let Err(e) = result {
                error!(error = %e, generation, "Observation loop failed");
                self.session
                    .lock()
                    .await
                    .observer_failed(generation, &e.to_string());
                return;
            }
        }

        info!(generation, "Observation loop stopped");
    }

    /// Wait until the clipboard differs from its content at call time.
    ///
    /// Returns `None` once the wait timeout elapses without a change.
    async fn wait_for_change(&self) -> Result<Option<String>, MonitorError> {
        let initial = self.read_clipboard().await?;
        let started = Instant::now();

        loop {
            tokio::time::sleep(self.timing.poll_interval).await;

            let current = self.read_clipboard().await?;
            if current != initial {
                return Ok(Some(current));
            }
            if started.elapsed() >= self.timing.wait_timeout {
                return Ok(None);
            }
        }
    }

    async fn read_clipboard(&self) -> Result<String, MonitorError> {
        let clipboard = Arc::clone(&self.clipboard);
        Ok(tokio::task::spawn_blocking(move || clipboard.read_text()).await??)
    }

    async fn write_clipboard(&self, text: String) -> Result<(), MonitorError> {
        let clipboard = Arc::clone(&self.clipboard);
        Ok(tokio::task::spawn_blocking(move || clipboard.write_text(&text)).await??)
    }

    /// Process one clipboard value observed by loop `generation`.
    pub(crate) async fn handle_text(&self, text: &str, generation: u64) -> Result<(), MonitorError> {
        let observation = self.session.lock().await.observe(text);
        debug!(chars = text.len(), ?observation, "Clipboard changed");

        match observation {
            Observation::Convert(token) => {
                let Some(point) = token.point() else {
                    return Ok(());
                };
                let output = convert_point(&self.store, point).await;
                self.write_clipboard(output.clone()).await?;

                info!(input = %token.text(), output = %output, "Converted coordinates");
                self.session
                    .lock()
                    .await
                    .record_conversion(token.text(), output);
            }
            Observation::PairReady { first, second } => {
                self.complete_pair(&first, &second, generation).await
            }
            Observation::Ignored | Observation::Pending | Observation::SameKind => {}
        }
        Ok(())
    }

    /// Order the pair, look up its place and store it.
    ///
    /// Blocks the loop for the lookup, including the geocoder's rate delay.
    /// The point is stored even if the loop was stopped meanwhile.
    async fn complete_pair(&self, first: &str, second: &str, generation: u64) {
        let anchors = self.store.lock().await.anchors();
        let resolution = resolve(first, second, &anchors);
        if resolution.is_ambiguous() {
            warn!(?resolution, "Calibration pair order guessed from model residual");
        }

        let place = resolve_place(self.places.as_ref(), &resolution.source).await;
        let point = CalibrationPoint::new(resolution.source, resolution.target, place.clone());

        if let Err(e) = self.store.lock().await.append(point) {
            warn!(error = %e, "Calibration point kept in memory but not saved");
        }

        self.session.lock().await.finish_pair(generation, &place);
    }
}
