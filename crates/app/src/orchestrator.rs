//! Drives the capture workflow end to end.
//!
//! Sequence per user action: capture screenshot (refusing browser-internal
//! pages), optionally select-and-crop a thumbnail, save the record, redirect
//! to the companion app, reset for the next capture. Each operation takes
//! the session's advisory lock for its duration; failures surface as
//! [`CaptureError`] and leave state untouched except the failing step's own
//! output.

use serde::Deserialize;
use serde_json::Value;

use tabcap_capture::crop::crop_image;
use tabcap_capture::host::BrowserHost;
use tabcap_capture::selector::SelectionOutcome;
use tabcap_core::record::{CaptureRecord, InsertedCapture};
use tabcap_core::scheme::is_restricted_url;
use tabcap_core::types::RecordId;

use crate::config::AppConfig;
use crate::error::CaptureError;
use crate::session::{BackendStatus, CaptureSession};
use crate::store::CaptureStore;

/// How a thumbnail request ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThumbnailOutcome {
    Created,
    /// The user aborted the selection; not an error.
    Cancelled,
}

/// A successful save: the assigned id and where the user was sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Saved {
    pub id: RecordId,
    pub redirect: String,
}

/// The capture workflow: host on one side, store on the other, session
/// state in the middle.
pub struct Orchestrator<H, S> {
    host: H,
    store: S,
    config: AppConfig,
    session: CaptureSession,
}

impl<H: BrowserHost, S: CaptureStore> Orchestrator<H, S> {
    pub fn new(host: H, store: S, config: AppConfig) -> Self {
        Self {
            host,
            store,
            config,
            session: CaptureSession::new(),
        }
    }

    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    /// Record the active tab's URL in the session (tab switches and loads).
    pub async fn refresh_page_url(&mut self) -> Result<(), CaptureError> {
        let tab = self.host.active_tab().await?;
        tracing::debug!(url = %tab.url, "active tab changed");
        self.session.set_page_url(tab.url);
        Ok(())
    }

    /// Probe the backend and record its status.
    pub async fn check_backend(&mut self) -> BackendStatus {
        let status = match self.store.ping().await {
            Ok(()) => BackendStatus::Connected,
            Err(err) => {
                tracing::warn!(%err, "backend probe failed");
                BackendStatus::Error
            }
        };
        self.session.set_backend(status);
        status
    }

    /// Capture the visible area of the active tab.
    pub async fn capture_screenshot(&mut self) -> Result<(), CaptureError> {
        self.session.begin("screenshot")?;
        let result = self.screenshot_inner().await;
        self.session.finish();
        result
    }

    async fn screenshot_inner(&mut self) -> Result<(), CaptureError> {
        let tab = self.host.active_tab().await?;
        if is_restricted_url(&tab.url) {
            return Err(CaptureError::RestrictedPage { url: tab.url });
        }

        let image = self.host.capture_visible_tab(&tab).await?;
        tracing::info!(url = %tab.url, "screenshot captured");

        self.session.set_page_url(tab.url);
        self.session
            .set_captured_at(chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
        self.session.set_screenshot(image);
        Ok(())
    }

    /// Let the user select an area of the page and crop the screenshot to it.
    pub async fn capture_thumbnail(&mut self) -> Result<ThumbnailOutcome, CaptureError> {
        self.session.begin("thumbnail")?;
        let result = self.thumbnail_inner().await;
        self.session.finish();
        result
    }

    async fn thumbnail_inner(&mut self) -> Result<ThumbnailOutcome, CaptureError> {
        let Some(screenshot) = self.session.screenshot().cloned() else {
            return Err(CaptureError::ScreenshotRequired);
        };

        let tab = self.host.active_tab().await?;
        match self.host.run_selection(&tab).await? {
            SelectionOutcome::Selected { rect } => {
                let thumbnail = crop_image(&screenshot, rect)?;
                tracing::info!(?rect, "thumbnail created");
                self.session.set_thumbnail(thumbnail);
                Ok(ThumbnailOutcome::Created)
            }
            SelectionOutcome::Cancelled => {
                tracing::debug!("area selection cancelled");
                Ok(ThumbnailOutcome::Cancelled)
            }
        }
    }

    /// Persist the capture, redirect to the companion app, and reset the
    /// session for the next capture.
    pub async fn save(&mut self) -> Result<Saved, CaptureError> {
        self.session.begin("save")?;
        let result = self.save_inner().await;
        self.session.finish();
        result
    }

    async fn save_inner(&mut self) -> Result<Saved, CaptureError> {
        let Some(screenshot) = self.session.screenshot().cloned() else {
            return Err(CaptureError::ScreenshotRequired);
        };

        let record = CaptureRecord {
            url: self.session.page_url().to_string(),
            datetime: self.session.captured_at().to_string(),
            screenshot_url: screenshot,
            thumbnail_url: self.session.thumbnail().cloned(),
            created_at: chrono::Utc::now(),
        };

        let data = match self.store.insert_capture(&record).await {
            Ok(data) => data,
            Err(err) => {
                self.session.set_backend(BackendStatus::Error);
                return Err(err.into());
            }
        };
        self.session.set_backend(BackendStatus::Connected);

        let id = extract_record_id(data.as_ref()).ok_or(CaptureError::MissingIdentifier)?;
        let redirect = self.config.capture_redirect(id);
        tracing::info!(id, %redirect, "capture saved");

        self.host.open_url(&redirect).await?;
        self.session.reset_images();
        Ok(Saved { id, redirect })
    }
}

/// Pull the server-assigned id out of an insert representation: either a
/// one-element array of rows or a bare row object, deserialized through
/// [`InsertedCapture`].
fn extract_record_id(data: Option<&Value>) -> Option<RecordId> {
    let row = match data? {
        Value::Array(rows) => rows.first()?,
        row @ Value::Object(_) => row,
        _ => return None,
    };
    InsertedCapture::deserialize(row).ok().map(|row| row.id)
}
