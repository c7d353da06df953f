//! Workflow error taxonomy.
//!
//! Every failure is recovered at the orchestrator boundary and rendered as a
//! user-visible message; none is fatal to the process. There is no retry
//! logic anywhere: a failed step is re-triggered by the user or not at all.

use tabcap_capture::crop::CropError;
use tabcap_capture::host::HostError;
use tabcap_rest::RestError;

/// Everything that can go wrong while driving the capture workflow.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// A REST call failed (transport-level or non-2xx).
    #[error(transparent)]
    Rest(#[from] RestError),

    /// The host boundary failed (includes the no-active-tab case).
    #[error(transparent)]
    Host(#[from] HostError),

    /// Screenshot requested on a browser-internal page.
    #[error("cannot capture a browser-internal page: {url}")]
    RestrictedPage { url: String },

    /// The crop source failed to decode, or cropping failed.
    #[error(transparent)]
    Crop(#[from] CropError),

    /// The insert succeeded but no record id could be extracted from the
    /// response.
    #[error("insert succeeded but the response carried no record id")]
    MissingIdentifier,

    /// Thumbnail or save requested before any screenshot exists.
    #[error("no screenshot to work with")]
    ScreenshotRequired,

    /// Another operation is already in flight.
    #[error("operation already in flight: {0}")]
    Busy(&'static str),
}

impl CaptureError {
    /// Message shown to the user when this error surfaces.
    pub fn user_message(&self) -> String {
        match self {
            CaptureError::Rest(err) => format!("Saving failed: {err}"),
            CaptureError::Host(HostError::NoActiveTab) => "No active tab found.".into(),
            CaptureError::Host(err) => format!("Browser error: {err}"),
            CaptureError::RestrictedPage { .. } => {
                "This page is browser-internal and cannot be captured.".into()
            }
            CaptureError::Crop(CropError::EmptyRegion { .. }) => {
                "The selected area does not overlap the screenshot.".into()
            }
            CaptureError::Crop(_) => "Thumbnail creation failed: could not read the screenshot."
                .into(),
            CaptureError::MissingIdentifier => {
                "The capture was saved, but the backend returned no id.".into()
            }
            CaptureError::ScreenshotRequired => "Please take a screenshot first.".into(),
            CaptureError::Busy(op) => format!("Still working on '{op}', please wait."),
        }
    }
}
