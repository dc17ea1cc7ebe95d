use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::SeenRecord;
use crate::errors::{FeederError, FeederResult};
use crate::storage::traits::SeenStore;

/// Seen records kept as a pretty-printed JSON array, rewritten wholesale on save.
#[derive(Debug, Clone)]
pub struct JsonSeenStore {
    path: PathBuf,
}

impl JsonSeenStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SeenStore for JsonSeenStore {
    fn load(&self) -> FeederResult<Vec<SeenRecord>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content).map_err(|e| {
            FeederError::Store(format!("malformed {}: {}", self.path.display(), e))
        })
    }

    fn save(&self, records: &[SeenRecord]) -> FeederResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // Readers never observe a half-written file
        let temp = self.temp_path();
        fs::write(&temp, serde_json::to_string_pretty(records)?)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn setup() -> (TempDir, JsonSeenStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonSeenStore::new(dir.path().join("data").join("seen_articles.json"));
        (dir, store)
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let (_dir, store) = setup();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let (_dir, store) = setup();
        let records = vec![
            SeenRecord::new(
                "https://a.com/1".to_string(),
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            ),
            SeenRecord::new(
                "https://a.com/2".to_string(),
                Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            ),
        ];

        store.save(&records).unwrap();

        assert_eq!(store.load().unwrap(), records);
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_save_overwrites() {
        let (_dir, store) = setup();
        let now = Utc::now();

        store
            .save(&[SeenRecord::new("old".to_string(), now)])
            .unwrap();
        store
            .save(&[SeenRecord::new("new".to_string(), now)])
            .unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].link, "new");
    }

    #[test]
    fn test_reads_records_written_without_offset() {
        let (_dir, store) = setup();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(
            store.path(),
            r#"[{"link": "https://a.com/1", "timestamp": "2024-02-10T08:30:00.000001"}]"#,
        )
        .unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded[0].link, "https://a.com/1");
    }

    #[test]
    fn test_malformed_file_is_store_error() {
        let (_dir, store) = setup();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{\"not\": \"a list\"}").unwrap();

        assert!(matches!(store.load(), Err(FeederError::Store(_))));
    }
}
