use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::domain::{Article, SeenRecord};
use crate::errors::{FeederError, FeederResult};
use crate::storage::traits::SeenStore;

/// Filters out already-delivered links and records the new ones.
///
/// Each call is one load-prune-append-save transaction. Calls are serialized,
/// so the service can be shared between a scheduled run and other callers.
pub struct DedupService<S: SeenStore> {
    store: S,
    lock: Mutex<()>,
}

impl<S: SeenStore> DedupService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// Return the articles not seen before, in input order, and persist them as seen.
    ///
    /// The pruned record set is written back even when nothing is new.
    pub fn filter_and_record(
        &self,
        articles: Vec<Article>,
        now: DateTime<Utc>,
    ) -> FeederResult<Vec<Article>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| FeederError::Store("seen store lock poisoned".to_string()))?;

        let loaded = self.store.load()?;
        let loaded_count = loaded.len();
        let (records, fresh) = partition_new(loaded, articles, now);

        self.store.save(&records)?;

        info!(
            loaded = loaded_count,
            retained = records.len(),
            new = fresh.len(),
            "Updated seen store"
        );
        Ok(fresh)
    }

    /// Same filtering as [`filter_and_record`](Self::filter_and_record) without writing anything.
    pub fn preview(&self, articles: &[Article], now: DateTime<Utc>) -> FeederResult<Vec<Article>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| FeederError::Store("seen store lock poisoned".to_string()))?;

        let (_, fresh) = partition_new(self.store.load()?, articles.to_vec(), now);
        Ok(fresh)
    }
}

/// Drop expired records, then split `articles` into unseen ones while appending a record per unseen link.
fn partition_new(
    loaded: Vec<SeenRecord>,
    articles: Vec<Article>,
    now: DateTime<Utc>,
) -> (Vec<SeenRecord>, Vec<Article>) {
    let mut records: Vec<SeenRecord> = loaded
        .into_iter()
        .filter(|record| record.is_retained(now))
        .collect();

    let mut seen: HashSet<String> = records.iter().map(|r| r.link.clone()).collect();
    let mut fresh = Vec::new();

    for article in articles {
        if seen.insert(article.link.clone()) {
            records.push(SeenRecord::new(article.link.clone(), now));
            fresh.push(article);
        } else {
            debug!(link = %article.link, "Already seen");
        }
    }

    (records, fresh)
}
