//! Integration tests for geoshift-cv API endpoints
//!
//! Each test builds the router over a calibration file in a temp folder, an
//! in-memory clipboard and a canned place lookup, so nothing touches the
//! desktop clipboard or the network.

use std::sync::Arc;
use std::time::Duration;

use axum::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use geoshift_common::{CalibrationPoint, CalibrationStore, CoordinatePoint};
use geoshift_cv::clipboard::{Clipboard, MemoryClipboard};
use geoshift_cv::geocode::PlaceLookup;
use geoshift_cv::monitor::PollTiming;
use geoshift_cv::{build_router, AppState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

const NOVOSIBIRSK_GOOGLE: &str = "54.99665704896515, 82.80454371555194";
const NOVOSIBIRSK_YANDEX: &str = "54.996659, 82.804552";

/// Test helper: place lookup that always answers the same place
struct FixedLookup;

#[async_trait]
impl PlaceLookup for FixedLookup {
    async fn lookup(&self, _point: CoordinatePoint) -> String {
        "Novosibirsk, Russia".to_string()
    }
}

/// Test helper: app over a calibration file holding `points`
struct TestApp {
    _dir: TempDir,
    state: AppState,
    clipboard: Arc<MemoryClipboard>,
}

impl TestApp {
    fn new(points: &[CalibrationPoint]) -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("calibration.json");
        std::fs::write(&path, serde_json::to_string(points).unwrap()).unwrap();

        let clipboard = Arc::new(MemoryClipboard::new());
        let state = AppState::new(
            CalibrationStore::open(&path).unwrap(),
            clipboard.clone(),
            Arc::new(FixedLookup),
            PollTiming {
                poll_interval: Duration::from_millis(5),
                wait_timeout: Duration::from_secs(10),
            },
        );

        Self {
            _dir: dir,
            state,
            clipboard,
        }
    }

    async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = build_router(self.state.clone())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        (status, extract_json(response.into_body()).await)
    }
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn novosibirsk() -> CalibrationPoint {
    CalibrationPoint::new(NOVOSIBIRSK_GOOGLE, NOVOSIBIRSK_YANDEX, "Novosibirsk, Russia")
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new(&[]);
    let (status, body) = app.request("GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "geoshift-cv");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_buildinfo_endpoint() {
    let app = TestApp::new(&[]);
    let (status, body) = app.request("GET", "/api/buildinfo", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["git_hash"].is_string());
    assert!(body["build_profile"].is_string());
}

// =============================================================================
// Conversion
// =============================================================================

#[tokio::test]
async fn test_convert_exact_anchor_returns_its_target() {
    let app = TestApp::new(&[novosibirsk()]);
    let (status, body) = app
        .request(
            "POST",
            "/api/convert",
            Some(json!({ "coords": format!("see {} here", NOVOSIBIRSK_GOOGLE) })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["result"], NOVOSIBIRSK_YANDEX);
}

#[tokio::test]
async fn test_convert_without_anchors_uses_linear_fallback() {
    let app = TestApp::new(&[]);
    let (_, body) = app
        .request("POST", "/api/convert", Some(json!({ "coords": "56.5, 60.5" })))
        .await;

    let expected = geoshift_common::geo::transform::linear_fallback(CoordinatePoint::new(56.5, 60.5)).to_fixed();
    assert_eq!(body["success"], true);
    assert_eq!(body["result"], expected);
}

#[tokio::test]
async fn test_convert_rejects_text_without_coordinates() {
    let app = TestApp::new(&[]);
    let (status, body) = app
        .request("POST", "/api/convert", Some(json!({ "coords": "hello world" })))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid coordinate format");
}

#[tokio::test]
async fn test_clipboard_copy_writes_text() {
    let app = TestApp::new(&[]);
    let (_, body) = app
        .request("POST", "/api/clipboard/copy", Some(json!({ "text": NOVOSIBIRSK_YANDEX })))
        .await;

    assert_eq!(body["success"], true);
    assert_eq!(app.clipboard.read_text().unwrap(), NOVOSIBIRSK_YANDEX);
}

// =============================================================================
// Monitoring control
// =============================================================================

#[tokio::test]
async fn test_status_reports_mode_and_count() {
    let app = TestApp::new(&[novosibirsk()]);

    let (_, body) = app.request("GET", "/api/status", None).await;
    assert_eq!(body["status"], "stopped");
    assert_eq!(body["points_count"], 1);
    assert_eq!(body["calibration_status"], false);
    assert_eq!(body["pending_first_present"], false);

    app.request("POST", "/api/calibration/start", None).await;
    let (_, body) = app.request("GET", "/api/status", None).await;
    assert_eq!(body["status"], "calibrating");
    assert_eq!(body["calibration_status"], true);

    let (_, body) = app.request("POST", "/api/monitoring/stop", None).await;
    assert_eq!(body["success"], true);
    let (_, body) = app.request("GET", "/api/status", None).await;
    assert_eq!(body["status"], "stopped");
}

#[tokio::test]
async fn test_working_mode_converts_clipboard() {
    let app = TestApp::new(&[novosibirsk()]);
    app.request("POST", "/api/monitoring/start", None).await;

    // Let the loop take its baseline before the change
    tokio::time::sleep(Duration::from_millis(30)).await;
    app.clipboard.write_text(NOVOSIBIRSK_GOOGLE).unwrap();

    let mut body = Value::Null;
    for _ in 0..200 {
        let (_, status) = app.request("GET", "/api/status", None).await;
        if status["last_result"] == NOVOSIBIRSK_YANDEX {
            body = status;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(app.clipboard.read_text().unwrap(), NOVOSIBIRSK_YANDEX);
    assert_eq!(body["status"], "working");
    assert_eq!(body["last_found"], NOVOSIBIRSK_GOOGLE);
    assert_eq!(body["last_result"], NOVOSIBIRSK_YANDEX);

    app.request("POST", "/api/monitoring/stop", None).await;
}

#[tokio::test]
async fn test_calibration_pair_from_clipboard() {
    let app = TestApp::new(&[]);
    app.request("POST", "/api/calibration/start", None).await;

    tokio::time::sleep(Duration::from_millis(30)).await;
    // Low-precision half first; the pair is still stored source-first
    app.clipboard.write_text(NOVOSIBIRSK_YANDEX).unwrap();

    for _ in 0..200 {
        let (_, body) = app.request("GET", "/api/status", None).await;
        if body["pending_first_present"] == true {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    app.clipboard.write_text(NOVOSIBIRSK_GOOGLE).unwrap();

    let mut points = Value::Null;
    for _ in 0..200 {
        let (_, body) = app.request("GET", "/api/calibration/data", None).await;
        if body.as_array().map_or(false, |a| !a.is_empty()) {
            points = body;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let points = points.as_array().expect("calibration point was not added");
    assert_eq!(points.len(), 1);
    assert_eq!(points[0]["source"], NOVOSIBIRSK_GOOGLE);
    assert_eq!(points[0]["target"], NOVOSIBIRSK_YANDEX);
    assert_eq!(points[0]["place"], "Novosibirsk, Russia");

    let mut status = Value::Null;
    for _ in 0..200 {
        let (_, body) = app.request("GET", "/api/status", None).await;
        if body["pending_first_present"] == false {
            status = body;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(status["status"], "calibrating");
    assert_eq!(
        status["calibration_message"],
        "Added: Novosibirsk, Russia. Copy the next pair..."
    );

    app.request("POST", "/api/monitoring/stop", None).await;
}

// =============================================================================
// Calibration data
// =============================================================================

#[tokio::test]
async fn test_import_skips_duplicates() {
    let app = TestApp::new(&[novosibirsk()]);
    let (_, body) = app
        .request(
            "POST",
            "/api/calibration/import",
            Some(json!([
                { "source": NOVOSIBIRSK_GOOGLE, "target": NOVOSIBIRSK_YANDEX },
                { "google": "56.82811805737119, 60.61426164412377", "yandex": "56.828118, 60.614262", "location": "Yekaterinburg" },
                { "source": "1.123456789, 2.123456789" }
            ])),
        )
        .await;

    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 1);

    let (_, points) = app.request("POST", "/api/calibration/export", None).await;
    let points = points.as_array().unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[1]["place"], "Yekaterinburg");
}

#[tokio::test]
async fn test_delete_matches_text_exactly() {
    let app = TestApp::new(&[
        CalibrationPoint::new("56.5, 60.1", "56.49, 60.12", ""),
        CalibrationPoint::new("56.50, 60.10", "56.49, 60.12", ""),
    ]);

    let (_, body) = app
        .request(
            "DELETE",
            "/api/calibration/data",
            Some(json!([{ "source": "56.5, 60.1", "target": "56.49, 60.12" }])),
        )
        .await;
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 1);

    let (_, points) = app.request("GET", "/api/calibration/data", None).await;
    assert_eq!(points.as_array().unwrap().len(), 1);
    assert_eq!(points[0]["source"], "56.50, 60.10");
}

#[tokio::test]
async fn test_delete_empty_list_fails() {
    let app = TestApp::new(&[novosibirsk()]);
    let (_, body) = app
        .request("DELETE", "/api/calibration/data", Some(json!([])))
        .await;

    assert_eq!(body["success"], false);
    assert_eq!(app.state.store.lock().await.len(), 1);
}

#[tokio::test]
async fn test_save_and_load_roundtrip_through_disk() {
    let app = TestApp::new(&[novosibirsk()]);

    let (_, body) = app.request("POST", "/api/calibration/save", None).await;
    assert_eq!(body["success"], true);

    let path = app.state.store.lock().await.path().to_path_buf();
    std::fs::write(&path, "[]").unwrap();

    let (_, body) = app.request("POST", "/api/calibration/load", None).await;
    assert_eq!(body["success"], true);
    assert_eq!(app.state.store.lock().await.len(), 0);
}

#[tokio::test]
async fn test_load_keeps_monitoring_mode() {
    let app = TestApp::new(&[novosibirsk()]);
    app.request("POST", "/api/calibration/start", None).await;

    let (_, body) = app.request("POST", "/api/calibration/load", None).await;
    assert_eq!(body["success"], true);

    let (_, status) = app.request("GET", "/api/status", None).await;
    assert_eq!(status["status"], "calibrating");
    assert_eq!(status["points_count"], 1);

    app.request("POST", "/api/monitoring/stop", None).await;
}

#[tokio::test]
async fn test_load_malformed_file_reports_failure() {
    let app = TestApp::new(&[novosibirsk()]);
    let path = app.state.store.lock().await.path().to_path_buf();
    std::fs::write(&path, "{ broken").unwrap();

    let (_, body) = app.request("POST", "/api/calibration/load", None).await;
    assert_eq!(body["success"], false);
    assert_eq!(app.state.store.lock().await.len(), 1);
}

#[tokio::test]
async fn test_geojson_export() {
    let app = TestApp::new(&[novosibirsk()]);
    let (status, body) = app.request("GET", "/api/calibration/geojson", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "FeatureCollection");
    let features = body["features"].as_array().unwrap();
    assert_eq!(features.len(), 1);
    let coordinates = &features[0]["geometry"]["coordinates"];
    assert_eq!(coordinates[0], 82.80454371555194);
    assert_eq!(coordinates[1], 54.99665704896515);
}

#[tokio::test]
async fn test_update_locations_backfills_places() {
    let app = TestApp::new(&[
        CalibrationPoint::new(NOVOSIBIRSK_GOOGLE, NOVOSIBIRSK_YANDEX, ""),
        CalibrationPoint::new("56.82811805737119, 60.61426164412377", "56.828118, 60.614262", "Yekaterinburg"),
        CalibrationPoint::new("55.75393791003225, 37.62063613176245", "55.753938, 37.620636", "Lookup failed"),
    ]);

    let (_, body) = app
        .request("POST", "/api/calibration/update-locations", None)
        .await;
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 2);
    assert_eq!(body["message"], "Queued: 2");

    let mut places = Vec::new();
    for _ in 0..200 {
        places = app
            .state
            .store
            .lock()
            .await
            .points()
            .into_iter()
            .map(|p| p.place)
            .collect();
        if places.iter().all(|p| p != "Loading...") {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(
        places,
        vec!["Novosibirsk, Russia", "Yekaterinburg", "Novosibirsk, Russia"]
    );
}

#[tokio::test]
async fn test_index_page_served() {
    let app = TestApp::new(&[]);
    let response = build_router(app.state.clone())
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("GeoShift"));
}
