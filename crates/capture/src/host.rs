//! The host-environment boundary.
//!
//! Everything tabcap needs from the browser (active-tab lookup, visible-tab
//! rasterization, in-page selection, opening a URL) goes through
//! [`BrowserHost`]. The request/reply shapes are serde types, so the
//! boundary is an explicit message-passing contract that can run over a wire
//! or be replayed from a script in tests.

use serde::{Deserialize, Serialize};

use tabcap_core::record::ImageRef;

use crate::selector::SelectionOutcome;

/// Identity and location of a browser tab.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TabInfo {
    pub id: i64,
    pub window_id: i64,
    pub url: String,
}

/// Errors crossing the host boundary.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The host reports no active tab in the current window.
    #[error("no active tab")]
    NoActiveTab,

    /// The capture call returned an empty image.
    #[error("capture returned an empty image")]
    EmptyCapture,

    /// The transport to the host failed, or the host reported an error.
    #[error("host error: {0}")]
    Transport(String),
}

/// Requests sent to the host environment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HostRequest {
    /// Ask for the active tab of the current window.
    ActiveTab,
    /// Rasterize the visible area of the given window.
    CaptureVisibleTab { window_id: i64 },
    /// Show the selection overlay on the given tab and start streaming
    /// selection events.
    BeginSelection { tab_id: i64 },
    /// Redraw the overlay's live selection box, in logical pixels.
    /// Fire-and-forget: the host sends no reply.
    DrawSelection {
        left: f64,
        top: f64,
        width: f64,
        height: f64,
    },
    /// Tear down the selection overlay.
    EndSelection { tab_id: i64 },
    /// Open a new top-level browsing context at the URL.
    OpenUrl { url: String },
}

/// Replies from the host environment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reply", rename_all = "snake_case")]
pub enum HostReply {
    ActiveTab { tab: Option<TabInfo> },
    Captured { image: String },
    SelectionStarted { device_pixel_ratio: f64 },
    SelectionEnded,
    Opened,
    Error { message: String },
}

/// Capabilities the host environment provides.
///
/// One implementation speaks to a real browser; tests substitute a scripted
/// host. All methods are advisory-sequential: the caller never overlaps two
/// operations (the UI disables its controls while one is in flight).
#[async_trait::async_trait]
pub trait BrowserHost {
    /// The active tab of the current window.
    async fn active_tab(&self) -> Result<TabInfo, HostError>;

    /// Rasterize the visible area of the tab's window.
    async fn capture_visible_tab(&self, tab: &TabInfo) -> Result<ImageRef, HostError>;

    /// Run one area-selection session on the tab: overlay up, events pumped
    /// through the state machine, overlay torn down, outcome returned.
    async fn run_selection(&self, tab: &TabInfo) -> Result<SelectionOutcome, HostError>;

    /// Open a new top-level browsing context at the URL.
    async fn open_url(&self, url: &str) -> Result<(), HostError>;
}

#[async_trait::async_trait]
impl<T: BrowserHost + Sync> BrowserHost for &T {
    async fn active_tab(&self) -> Result<TabInfo, HostError> {
        (**self).active_tab().await
    }

    async fn capture_visible_tab(&self, tab: &TabInfo) -> Result<ImageRef, HostError> {
        (**self).capture_visible_tab(tab).await
    }

    async fn run_selection(&self, tab: &TabInfo) -> Result<SelectionOutcome, HostError> {
        (**self).run_selection(tab).await
    }

    async fn open_url(&self, url: &str) -> Result<(), HostError> {
        (**self).open_url(url).await
    }
}
