//! Shared domain types for the tabcap workspace.
//!
//! Pixel geometry (selection rectangles and bound clamping), the capture
//! record model, and the restricted-URL predicate used when deciding whether
//! a page can be rasterized at all.

pub mod geometry;
pub mod record;
pub mod scheme;
pub mod types;
