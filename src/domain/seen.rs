use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// How long a delivered link stays in the seen store.
pub const RETENTION_DAYS: i64 = 7;

/// A link that has already been delivered, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenRecord {
    pub link: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl SeenRecord {
    pub fn new(link: String, timestamp: DateTime<Utc>) -> Self {
        Self { link, timestamp }
    }

    /// Records strictly newer than `now - 7 days` are retained.
    pub fn is_retained(&self, now: DateTime<Utc>) -> bool {
        self.timestamp > now - Duration::days(RETENTION_DAYS)
    }
}

/// Accepts RFC 3339 as well as offset-less ISO timestamps, which are read as UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let raw = String::deserialize(deserializer)?;

    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| D::Error::custom(format!("invalid timestamp '{}': {}", raw, e)))
}
