//! Place-name enrichment worker
//!
//! Backfills missing place names. Points are queued by text identity and
//! processed strictly one at a time in FIFO order by a single task, so the
//! geocoder's rate limit holds. The store lock is never held across a lookup.

use std::sync::Arc;

use geoshift_common::calibration::PLACE_NOT_FOUND;
use geoshift_common::geo::parse_loose;
use geoshift_common::PointKey;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::geocode::PlaceLookup;
use crate::SharedStore;

/// Place for a source coordinate text; unparseable text is not looked up.
pub async fn resolve_place(places: &dyn PlaceLookup, source: &str) -> String {
    match parse_loose(source) {
        Some(point) => places.lookup(point).await,
        None => PLACE_NOT_FOUND.to_string(),
    }
}

/// Producer side of the enrichment queue
#[derive(Clone)]
pub struct EnrichmentQueue {
    tx: mpsc::UnboundedSender<PointKey>,
}

impl EnrichmentQueue {
    /// Start the worker task and return the queue feeding it.
    pub fn spawn(store: SharedStore, places: Arc<dyn PlaceLookup>) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_worker(rx, store, places));
        (Self { tx }, handle)
    }

    /// Queue a point for lookup. Returns false if the worker has exited.
    pub fn enqueue(&self, key: PointKey) -> bool {
        self.tx.send(key).is_ok()
    }
}

async fn run_worker(
    mut rx: mpsc::UnboundedReceiver<PointKey>,
    store: SharedStore,
    places: Arc<dyn PlaceLookup>,
) {
    info!("Enrichment worker started");

    while let Some(key) = rx.recv().await {
        let Some(point) = store.lock().await.get(&key) else {
            debug!(source = %key.source, "Point deleted before enrichment, skipping");
            continue;
        };

        let place = resolve_place(places.as_ref(), &point.source).await;

        match store.lock().await.set_place(&key, &place) {
            Ok(true) => info!(source = %key.source, place = %place, "Place updated"),
            Ok(false) => debug!(source = %key.source, "Point deleted during lookup"),
            Err(e) => warn!(error = %e, "Place updated in memory but not saved"),
        }
    }

    info!("Enrichment worker stopped");
}
