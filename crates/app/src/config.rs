use tabcap_core::types::RecordId;

/// Runtime configuration loaded from environment variables.
///
/// The backend URL and API key have no sensible defaults and must be set;
/// everything else defaults to the standard deployment layout.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// REST table-endpoint root, e.g. `https://host/rest/v1`.
    pub backend_url: String,
    /// Static credential sent in both auth headers.
    pub api_key: String,
    /// Companion web application base URL.
    pub app_url: String,
    /// Route on the companion app that receives a capture id
    /// (default: `/capture`).
    pub capture_route: String,
    /// Backend table holding capture records (default: `captures`).
    pub table: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                | Default      |
    /// |------------------------|--------------|
    /// | `TABCAP_BACKEND_URL`   | *(required)* |
    /// | `TABCAP_API_KEY`       | *(required)* |
    /// | `TABCAP_APP_URL`       | *(required)* |
    /// | `TABCAP_CAPTURE_ROUTE` | `/capture`   |
    /// | `TABCAP_TABLE`         | `captures`   |
    pub fn from_env() -> Self {
        let backend_url =
            std::env::var("TABCAP_BACKEND_URL").expect("TABCAP_BACKEND_URL must be set");
        let api_key = std::env::var("TABCAP_API_KEY").expect("TABCAP_API_KEY must be set");
        let app_url = std::env::var("TABCAP_APP_URL").expect("TABCAP_APP_URL must be set");

        let capture_route =
            std::env::var("TABCAP_CAPTURE_ROUTE").unwrap_or_else(|_| "/capture".into());
        let table = std::env::var("TABCAP_TABLE").unwrap_or_else(|_| "captures".into());

        Self {
            backend_url,
            api_key,
            app_url,
            capture_route,
            table,
        }
    }

    /// Companion-app URL for a saved capture:
    /// `<app-base><capture-route>?capture_id=<id>`.
    pub fn capture_redirect(&self, id: RecordId) -> String {
        format!(
            "{}{}?capture_id={id}",
            self.app_url.trim_end_matches('/'),
            self.capture_route
        )
    }
}
