use crate::domain::SeenRecord;
use crate::errors::FeederResult;

/// Durable backing for the set of already-delivered links.
#[cfg_attr(test, mockall::automock)]
pub trait SeenStore: Send + Sync {
    /// All persisted records; empty when nothing has been stored yet.
    fn load(&self) -> FeederResult<Vec<SeenRecord>>;

    /// Replace the persisted contents with `records`.
    fn save(&self, records: &[SeenRecord]) -> FeederResult<()>;
}
