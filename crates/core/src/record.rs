//! The capture record: the persisted unit of work.

use serde::{Deserialize, Serialize};

use crate::types::{RecordId, Timestamp};

/// Reference to an encoded raster image, typically a `data:` URI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for ImageRef {
    fn from(reference: String) -> Self {
        Self(reference)
    }
}

/// One saved capture: page URL, timestamps, screenshot, optional thumbnail.
///
/// Created once per save action and immutable after creation. The backend
/// assigns the row id on insert; `datetime` is the human-readable capture
/// time shown in the UI, `created_at` the machine-readable insert time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaptureRecord {
    pub url: String,
    pub datetime: String,
    pub screenshot_url: ImageRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<ImageRef>,
    pub created_at: Timestamp,
}

/// The representation a successful insert returns: just the assigned id.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct InsertedCapture {
    pub id: RecordId,
}
