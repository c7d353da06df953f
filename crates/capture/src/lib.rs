//! Screenshot capture building blocks.
//!
//! The host environment (the browser) is an external collaborator reached
//! through the [`host::BrowserHost`] trait; the area-selection state machine
//! and the cropper are pure logic that run the same way with or without a
//! real browser on the other side.

pub mod crop;
pub mod host;
pub mod selector;
