//! Flat-file calibration store
//!
//! The in-memory collection is the working copy; every mutation rewrites the
//! JSON document before returning. When a write fails the in-memory change is
//! kept and the error is returned so callers can report it.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::{
    is_loading_place, needs_place, seed, CalibrationPoint, ImportCandidate, PointKey,
    PLACE_LOADING,
};
use crate::geo::{Anchor, CoordinatePoint};
use crate::Result;

/// Ordered collection of calibration points backed by a JSON file
#[derive(Debug)]
pub struct CalibrationStore {
    path: PathBuf,
    points: Vec<CalibrationPoint>,
}

impl CalibrationStore {
    /// Empty store bound to `path`; nothing is read until [`load`](Self::load).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            points: Vec::new(),
        }
    }

    /// Bind to `path` and load it, seeding the built-in points if absent.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let mut store = Self::new(path);
        store.load()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the in-memory collection with the persisted one.
    ///
    /// A missing file is first created with the built-in calibration set.
    /// In-flight place markers left by an earlier run are cleared. On error
    /// the in-memory collection is left untouched.
    pub fn load(&mut self) -> Result<usize> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "Calibration file missing, seeding built-in points");
            write_atomically(&self.path, &seed::builtin_points())?;
        }

        let content = fs::read_to_string(&self.path)?;
        let mut points: Vec<CalibrationPoint> = serde_json::from_str(&content)?;

        for point in points.iter_mut().filter(|p| is_loading_place(&p.place)) {
            point.place.clear();
        }

        self.points = points;
        info!(points = self.points.len(), path = %self.path.display(), "Loaded calibration points");
        Ok(self.points.len())
    }

    /// Rewrite the whole collection to disk.
    pub fn save(&self) -> Result<()> {
        write_atomically(&self.path, &self.points)?;
        debug!(points = self.points.len(), "Saved calibration points");
        Ok(())
    }

    /// Add a point and persist.
    pub fn append(&mut self, point: CalibrationPoint) -> Result<()> {
        info!(source = %point.source, target = %point.target, place = %point.place, "Adding calibration point");
        self.points.push(point);
        self.save()
    }

    /// Remove every point matching one of `criteria`; one save afterwards.
    pub fn delete_batch(&mut self, criteria: &[PointKey]) -> Result<usize> {
        let before = self.points.len();
        self.points
            .retain(|point| !criteria.iter().any(|key| key.matches(point)));
        let removed = before - self.points.len();

        info!(removed, requested = criteria.len(), "Deleted calibration points");
        self.save()?;
        Ok(removed)
    }

    /// Append candidates not already present; one save afterwards.
    ///
    /// Returns the number of points actually added.
    pub fn import(&mut self, candidates: Vec<ImportCandidate>) -> Result<usize> {
        let mut added = 0;

        for candidate in candidates {
            let (Some(source), Some(target)) = (candidate.source, candidate.target) else {
                debug!("Skipping import candidate without source/target");
                continue;
            };

            let key = PointKey::new(source, target);
            if self.points.iter().any(|p| key.matches(p)) {
                continue;
            }

            self.points.push(CalibrationPoint {
                source: key.source,
                target: key.target,
                place: candidate.place.unwrap_or_default(),
            });
            added += 1;
        }

        info!(added, "Imported calibration points");
        self.save()?;
        Ok(added)
    }

    /// Points usable as interpolation anchors.
    ///
    /// Entries whose text does not parse are skipped here but stay stored.
    pub fn anchors(&self) -> Vec<Anchor> {
        self.points
            .iter()
            .filter_map(|p| {
                let source = p.source.parse::<CoordinatePoint>().ok()?;
                let target = p.target.parse::<CoordinatePoint>().ok()?;
                Some(Anchor { source, target })
            })
            .collect()
    }

    /// Snapshot of all points in insertion order.
    pub fn points(&self) -> Vec<CalibrationPoint> {
        self.points.clone()
    }

    pub fn get(&self, key: &PointKey) -> Option<CalibrationPoint> {
        self.points.iter().find(|p| key.matches(p)).cloned()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Set the place of every point matching `key` and persist.
    ///
    /// Returns false when no point matches (deleted meanwhile).
    pub fn set_place(&mut self, key: &PointKey, place: &str) -> Result<bool> {
        let mut found = false;
        for point in self.points.iter_mut().filter(|p| key.matches(p)) {
            point.place = place.to_string();
            found = true;
        }

        if found {
            self.save()?;
        }
        Ok(found)
    }

    /// Mark every point lacking a place as loading and return copies of them.
    ///
    /// Loading markers are cleared on the next load, so a failed save here is
    /// only logged.
    pub fn mark_for_enrichment(&mut self) -> Vec<CalibrationPoint> {
        let mut marked = Vec::new();
        for point in self.points.iter_mut().filter(|p| needs_place(&p.place)) {
            point.place = PLACE_LOADING.to_string();
            marked.push(point.clone());
        }

        if !marked.is_empty() {
            if let Err(e) = self.save() {
                warn!(error = %e, "Failed to save loading markers");
            }
        }
        marked
    }

    /// GeoJSON FeatureCollection of the stored source coordinates.
    pub fn geojson(&self) -> serde_json::Value {
        super::geojson::feature_collection(&self.points)
    }
}

/// Write to a sibling temp file, then rename over the target.
fn write_atomically(path: &Path, points: &[CalibrationPoint]) -> Result<()> {
    let json = serde_json::to_string_pretty(points)?;

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, json)?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        warn!(error = %e, path = %path.display(), "Failed to replace calibration file");
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}
