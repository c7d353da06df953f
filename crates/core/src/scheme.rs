//! Restricted URL schemes.
//!
//! Browser-internal pages cannot be rasterized by the host environment, so a
//! capture request against one fails before any host call is made.

/// Schemes the host refuses to capture.
const RESTRICTED_SCHEMES: &[&str] = &[
    "chrome",
    "chrome-extension",
    "about",
    "edge",
    "devtools",
    "view-source",
];

/// Whether the given URL points at a browser-internal page.
///
/// Matches on the URL scheme (the part before the first `:`), so
/// `chrome://extensions` is restricted while `https://chrome.example.com`
/// is not. URLs without a scheme are not considered restricted.
pub fn is_restricted_url(url: &str) -> bool {
    match url.split_once(':') {
        Some((scheme, _)) => RESTRICTED_SCHEMES
            .iter()
            .any(|s| scheme.eq_ignore_ascii_case(s)),
        None => false,
    }
}
