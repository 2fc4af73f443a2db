/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Monetary amounts in whole currency units.
///
/// The EMI calculator rounds to this unit; fractional currency is never
/// stored.
pub type Money = i64;
