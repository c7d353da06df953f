/// Server-assigned primary keys on the captures table are BIGSERIAL.
pub type RecordId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
