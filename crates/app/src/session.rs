//! In-memory state for the capture workflow.
//!
//! One explicit state object instead of ambient globals: the orchestrator
//! owns a [`CaptureSession`], and UI enablement is derived from it rather
//! than tracked separately.

use serde::Serialize;

use tabcap_core::record::ImageRef;

use crate::error::CaptureError;

/// Reachability of the REST backend, as last observed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendStatus {
    #[default]
    Disconnected,
    Connected,
    Error,
}

/// Which controls the UI should enable right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Controls {
    pub screenshot: bool,
    pub thumbnail: bool,
    pub save: bool,
}

/// Serializable view of the session for UI surfaces.
#[derive(Clone, Debug, Serialize)]
pub struct SessionSnapshot {
    pub page_url: String,
    pub captured_at: String,
    pub backend: BackendStatus,
    pub has_screenshot: bool,
    pub has_thumbnail: bool,
    pub controls: Controls,
}

/// Mutable workflow state: current screenshot, thumbnail, page context, and
/// the advisory in-flight lock keyed by operation name.
#[derive(Debug, Default)]
pub struct CaptureSession {
    screenshot: Option<ImageRef>,
    thumbnail: Option<ImageRef>,
    page_url: String,
    captured_at: String,
    backend: BackendStatus,
    in_flight: Option<&'static str>,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the advisory lock for an operation. Fails with
    /// [`CaptureError::Busy`] while another operation holds it; the UI
    /// disables its controls for the same duration, so this only fires on
    /// racing surfaces.
    pub fn begin(&mut self, op: &'static str) -> Result<(), CaptureError> {
        match self.in_flight {
            Some(current) => Err(CaptureError::Busy(current)),
            None => {
                self.in_flight = Some(op);
                Ok(())
            }
        }
    }

    /// Release the advisory lock.
    pub fn finish(&mut self) {
        self.in_flight = None;
    }

    pub fn screenshot(&self) -> Option<&ImageRef> {
        self.screenshot.as_ref()
    }

    pub fn thumbnail(&self) -> Option<&ImageRef> {
        self.thumbnail.as_ref()
    }

    pub fn page_url(&self) -> &str {
        &self.page_url
    }

    pub fn captured_at(&self) -> &str {
        &self.captured_at
    }

    pub fn backend(&self) -> BackendStatus {
        self.backend
    }

    pub fn set_screenshot(&mut self, image: ImageRef) {
        self.screenshot = Some(image);
    }

    pub fn set_thumbnail(&mut self, image: ImageRef) {
        self.thumbnail = Some(image);
    }

    pub fn set_page_url(&mut self, url: impl Into<String>) {
        self.page_url = url.into();
    }

    pub fn set_captured_at(&mut self, at: impl Into<String>) {
        self.captured_at = at.into();
    }

    pub fn set_backend(&mut self, status: BackendStatus) {
        self.backend = status;
    }

    /// Clear screenshot and thumbnail for the next capture. Page URL and
    /// backend status carry over.
    pub fn reset_images(&mut self) {
        self.screenshot = None;
        self.thumbnail = None;
    }

    /// Derive UI enablement from data state: thumbnail and save need a
    /// screenshot, and everything is disabled while an operation runs.
    pub fn controls(&self) -> Controls {
        let idle = self.in_flight.is_none();
        let has_screenshot = self.screenshot.is_some();
        Controls {
            screenshot: idle,
            thumbnail: idle && has_screenshot,
            save: idle && has_screenshot,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            page_url: self.page_url.clone(),
            captured_at: self.captured_at.clone(),
            backend: self.backend,
            has_screenshot: self.screenshot.is_some(),
            has_thumbnail: self.thumbnail.is_some(),
            controls: self.controls(),
        }
    }
}
