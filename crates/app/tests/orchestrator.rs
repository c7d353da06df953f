//! Workflow scenarios for [`Orchestrator`] with a scripted host and store.
//!
//! No network and no browser: the host returns canned tabs/images/selection
//! outcomes, the store records what would have been persisted.

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use assert_matches::assert_matches;
use serde_json::{json, Value};

use tabcap_app::config::AppConfig;
use tabcap_app::error::CaptureError;
use tabcap_app::orchestrator::{Orchestrator, ThumbnailOutcome};
use tabcap_app::session::BackendStatus;
use tabcap_app::store::CaptureStore;
use tabcap_capture::crop::{decode_data_uri, encode_png_data_uri};
use tabcap_capture::host::{BrowserHost, HostError, TabInfo};
use tabcap_capture::selector::SelectionOutcome;
use tabcap_core::geometry::PixelRect;
use tabcap_core::record::{CaptureRecord, ImageRef};
use tabcap_rest::RestError;

// ---------------------------------------------------------------------------
// Scripted host and store
// ---------------------------------------------------------------------------

struct MockHost {
    tab: Option<TabInfo>,
    image: String,
    selection: SelectionOutcome,
    capture_calls: AtomicUsize,
    selection_calls: AtomicUsize,
    opened: Mutex<Vec<String>>,
}

impl MockHost {
    fn on_page(url: &str) -> Self {
        Self {
            tab: Some(TabInfo {
                id: 1,
                window_id: 10,
                url: url.into(),
            }),
            image: "data:image/png;base64,AAAA".into(),
            selection: SelectionOutcome::Cancelled,
            capture_calls: AtomicUsize::new(0),
            selection_calls: AtomicUsize::new(0),
            opened: Mutex::new(Vec::new()),
        }
    }

    fn with_image(mut self, image: &ImageRef) -> Self {
        self.image = image.as_str().to_string();
        self
    }

    fn with_selection(mut self, selection: SelectionOutcome) -> Self {
        self.selection = selection;
        self
    }
}

#[async_trait::async_trait]
impl BrowserHost for MockHost {
    async fn active_tab(&self) -> Result<TabInfo, HostError> {
        self.tab.clone().ok_or(HostError::NoActiveTab)
    }

    async fn capture_visible_tab(&self, _tab: &TabInfo) -> Result<ImageRef, HostError> {
        self.capture_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ImageRef::new(self.image.clone()))
    }

    async fn run_selection(&self, _tab: &TabInfo) -> Result<SelectionOutcome, HostError> {
        self.selection_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.selection)
    }

    async fn open_url(&self, url: &str) -> Result<(), HostError> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

struct MockStore {
    /// Representation the next insert returns; `Err(status)` fails it.
    insert_result: Mutex<Result<Option<Value>, u16>>,
    inserted: Mutex<Vec<CaptureRecord>>,
    ping_ok: bool,
}

impl MockStore {
    fn returning(representation: Value) -> Self {
        Self {
            insert_result: Mutex::new(Ok(Some(representation))),
            inserted: Mutex::new(Vec::new()),
            ping_ok: true,
        }
    }

    fn failing(status: u16) -> Self {
        Self {
            insert_result: Mutex::new(Err(status)),
            inserted: Mutex::new(Vec::new()),
            ping_ok: false,
        }
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::returning(json!([{"id": 1}]))
    }
}

#[async_trait::async_trait]
impl CaptureStore for MockStore {
    async fn insert_capture(&self, record: &CaptureRecord) -> Result<Option<Value>, RestError> {
        self.inserted.lock().unwrap().push(record.clone());
        match &*self.insert_result.lock().unwrap() {
            Ok(data) => Ok(data.clone()),
            Err(status) => Err(RestError::Api {
                status: *status,
                body: "mock failure".into(),
            }),
        }
    }

    async fn ping(&self) -> Result<(), RestError> {
        if self.ping_ok {
            Ok(())
        } else {
            Err(RestError::Api {
                status: 503,
                body: "down".into(),
            })
        }
    }
}

fn config() -> AppConfig {
    AppConfig {
        backend_url: "https://backend.example/rest/v1".into(),
        api_key: "key".into(),
        app_url: "https://app.example".into(),
        capture_route: "/capture".into(),
        table: "captures".into(),
    }
}

/// A decodable 100x80 PNG screenshot.
fn png_screenshot() -> ImageRef {
    let img = image::RgbaImage::from_pixel(100, 80, image::Rgba([10, 20, 30, 255]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    encode_png_data_uri(&bytes)
}

// ---------------------------------------------------------------------------
// Scenario: screenshot on a normal page
// ---------------------------------------------------------------------------

#[tokio::test]
async fn screenshot_succeeds_and_enables_controls() {
    let host = MockHost::on_page("https://example.com");
    let store = MockStore::default();
    let mut orchestrator = Orchestrator::new(&host, &store, config());

    orchestrator.capture_screenshot().await.expect("capture");

    let session = orchestrator.session();
    assert!(!session.screenshot().unwrap().is_empty());
    assert_eq!(session.page_url(), "https://example.com");
    assert!(!session.captured_at().is_empty());
    assert!(session.controls().thumbnail);
    assert!(session.controls().save);
}

// ---------------------------------------------------------------------------
// Scenario: screenshot on a browser-internal page
// ---------------------------------------------------------------------------

#[tokio::test]
async fn restricted_page_fails_without_touching_state() {
    let host = MockHost::on_page("chrome://extensions");
    let store = MockStore::default();
    let mut orchestrator = Orchestrator::new(&host, &store, config());

    let err = orchestrator.capture_screenshot().await.unwrap_err();
    assert_matches!(err, CaptureError::RestrictedPage { ref url } if url == "chrome://extensions");

    // The host was never asked to rasterize, and controls stay in the prior
    // state.
    assert_eq!(host.capture_calls.load(Ordering::SeqCst), 0);
    assert!(orchestrator.session().screenshot().is_none());
    assert!(!orchestrator.session().controls().save);
    // The failed attempt also released the advisory lock.
    assert!(orchestrator.session().controls().screenshot);
}

#[tokio::test]
async fn missing_tab_surfaces_no_active_tab() {
    let mut host = MockHost::on_page("https://example.com");
    host.tab = None;
    let store = MockStore::default();
    let mut orchestrator = Orchestrator::new(&host, &store, config());

    let err = orchestrator.capture_screenshot().await.unwrap_err();
    assert_matches!(err, CaptureError::Host(HostError::NoActiveTab));
}

// ---------------------------------------------------------------------------
// Scenario: thumbnail flow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn thumbnail_without_screenshot_warns_and_skips_selection() {
    let host = MockHost::on_page("https://example.com");
    let store = MockStore::default();
    let mut orchestrator = Orchestrator::new(&host, &store, config());

    let err = orchestrator.capture_thumbnail().await.unwrap_err();
    assert_matches!(err, CaptureError::ScreenshotRequired);
    assert_eq!(host.selection_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cancelled_selection_is_an_outcome_not_an_error() {
    let host = MockHost::on_page("https://example.com")
        .with_image(&png_screenshot())
        .with_selection(SelectionOutcome::Cancelled);
    let store = MockStore::default();
    let mut orchestrator = Orchestrator::new(&host, &store, config());

    orchestrator.capture_screenshot().await.expect("capture");
    let outcome = orchestrator.capture_thumbnail().await.expect("thumbnail");

    assert_eq!(outcome, ThumbnailOutcome::Cancelled);
    assert!(orchestrator.session().thumbnail().is_none());
}

#[tokio::test]
async fn selected_area_becomes_a_cropped_thumbnail() {
    let host = MockHost::on_page("https://example.com")
        .with_image(&png_screenshot())
        .with_selection(SelectionOutcome::Selected {
            rect: PixelRect::new(10, 10, 20, 20),
        });
    let store = MockStore::default();
    let mut orchestrator = Orchestrator::new(&host, &store, config());

    orchestrator.capture_screenshot().await.expect("capture");
    let outcome = orchestrator.capture_thumbnail().await.expect("thumbnail");
    assert_eq!(outcome, ThumbnailOutcome::Created);

    let thumbnail = orchestrator.session().thumbnail().expect("thumbnail set");
    let bytes = decode_data_uri(thumbnail).expect("data uri");
    let img = image::load_from_memory(&bytes).expect("png");
    assert_eq!((img.width(), img.height()), (20, 20));
}

// ---------------------------------------------------------------------------
// Scenario: save
// ---------------------------------------------------------------------------

#[tokio::test]
async fn save_without_screenshot_issues_no_store_call() {
    let host = MockHost::on_page("https://example.com");
    let store = MockStore::default();
    let mut orchestrator = Orchestrator::new(&host, &store, config());

    let err = orchestrator.save().await.unwrap_err();
    assert_matches!(err, CaptureError::ScreenshotRequired);
    assert!(store.inserted.lock().unwrap().is_empty());
    assert!(host.opened.lock().unwrap().is_empty());
}

#[tokio::test]
async fn save_redirects_with_the_assigned_id_and_resets() {
    let host = MockHost::on_page("https://example.com/page");
    let store = MockStore::returning(json!([{"id": 42}]));
    let mut orchestrator = Orchestrator::new(&host, &store, config());

    orchestrator.capture_screenshot().await.expect("capture");
    let saved = orchestrator.save().await.expect("save");

    assert_eq!(saved.id, 42);
    assert_eq!(saved.redirect, "https://app.example/capture?capture_id=42");
    assert_eq!(*host.opened.lock().unwrap(), vec![saved.redirect.clone()]);

    // Persisted record carries the page context.
    let inserted = store.inserted.lock().unwrap();
    assert_eq!(inserted.len(), 1);
    assert_eq!(inserted[0].url, "https://example.com/page");
    assert!(inserted[0].thumbnail_url.is_none());
    assert!(!inserted[0].datetime.is_empty());

    // Session is ready for the next capture.
    let session = orchestrator.session();
    assert!(session.screenshot().is_none());
    assert!(session.thumbnail().is_none());
    assert_eq!(session.backend(), BackendStatus::Connected);
    assert!(!session.controls().save);
}

#[tokio::test]
async fn failed_insert_keeps_the_screenshot_and_marks_backend() {
    let host = MockHost::on_page("https://example.com");
    let store = MockStore::failing(500);
    let mut orchestrator = Orchestrator::new(&host, &store, config());

    orchestrator.capture_screenshot().await.expect("capture");
    let err = orchestrator.save().await.unwrap_err();

    assert_matches!(err, CaptureError::Rest(RestError::Api { status: 500, .. }));
    assert!(host.opened.lock().unwrap().is_empty());
    // The screenshot survives so the user can retry.
    assert!(orchestrator.session().screenshot().is_some());
    assert_eq!(orchestrator.session().backend(), BackendStatus::Error);
}

#[tokio::test]
async fn insert_without_an_id_is_missing_identifier() {
    let host = MockHost::on_page("https://example.com");
    let store = MockStore::returning(json!([]));
    let mut orchestrator = Orchestrator::new(&host, &store, config());

    orchestrator.capture_screenshot().await.expect("capture");
    let err = orchestrator.save().await.unwrap_err();

    assert_matches!(err, CaptureError::MissingIdentifier);
    assert!(host.opened.lock().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Backend probe
// ---------------------------------------------------------------------------

#[tokio::test]
async fn backend_probe_records_status() {
    let host = MockHost::on_page("https://example.com");
    let store = MockStore::failing(503);
    let mut orchestrator = Orchestrator::new(&host, &store, config());

    assert_eq!(orchestrator.check_backend().await, BackendStatus::Error);
    assert_eq!(orchestrator.session().backend(), BackendStatus::Error);
}
