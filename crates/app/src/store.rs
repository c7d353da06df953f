//! Persistence boundary for capture records.
//!
//! The orchestrator talks to a [`CaptureStore`] so its tests run without a
//! network; [`RestStore`] is the production implementation over
//! [`RestClient`].

use serde_json::Value;

use tabcap_core::record::CaptureRecord;
use tabcap_rest::{Query, RestClient, RestError};

/// The two persistence calls the workflow needs.
#[async_trait::async_trait]
pub trait CaptureStore: Send + Sync {
    /// Insert a record, returning whatever representation the backend hands
    /// back (the orchestrator extracts the assigned id from it).
    async fn insert_capture(&self, record: &CaptureRecord) -> Result<Option<Value>, RestError>;

    /// Cheap reachability probe against the captures table.
    async fn ping(&self) -> Result<(), RestError>;
}

#[async_trait::async_trait]
impl<T: CaptureStore> CaptureStore for &T {
    async fn insert_capture(&self, record: &CaptureRecord) -> Result<Option<Value>, RestError> {
        (**self).insert_capture(record).await
    }

    async fn ping(&self) -> Result<(), RestError> {
        (**self).ping().await
    }
}

/// [`CaptureStore`] backed by the REST client.
pub struct RestStore {
    client: RestClient,
    table: String,
}

impl RestStore {
    pub fn new(client: RestClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

#[async_trait::async_trait]
impl CaptureStore for RestStore {
    async fn insert_capture(&self, record: &CaptureRecord) -> Result<Option<Value>, RestError> {
        // A record of strings and one timestamp always serializes.
        let payload =
            serde_json::to_value(record).expect("capture record serializes to JSON");
        let query = Query::table(&self.table).insert(payload);
        self.client.execute(&query).await
    }

    async fn ping(&self) -> Result<(), RestError> {
        let query = Query::table(&self.table).select("id").limit(1);
        self.client.execute(&query).await.map(|_| ())
    }
}
