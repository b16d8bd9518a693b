/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Users live in an external directory; only their id is tracked here.
pub type UserId = DbId;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
