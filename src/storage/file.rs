//! File-based storage for staffdrill.
//!
//! Everything lives in one directory (`~/.staffdrill/` by default):
//! `items.json`, `counters.json`, and `config.toml`. Atomic writes are
//! achieved via temp file + rename pattern.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::{staffdrill_home, TrainingConfig};
use crate::core::item::LearningItem;
use crate::error::{Result, StaffError};
use crate::stats::PersistedCounters;
use crate::storage::{ConfigStore, CounterStore, ItemStore};

const ITEMS_FILE: &str = "items.json";
const COUNTERS_FILE: &str = "counters.json";
const CONFIG_FILE: &str = "config.toml";

/// File-based store for the deck, counters, and config.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open the store in the staffdrill home directory.
    ///
    /// Uses `~/.staffdrill/` or `$STAFFDRILL_HOME/`.
    pub fn open_default() -> Result<Self> {
        Self::with_dir(staffdrill_home())
    }

    /// Open the store in a custom directory, creating it if needed.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| StaffError::storage(&dir, e))?;
        }
        Ok(Self { dir })
    }

    /// Directory holding the files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn temp_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!(".{}.tmp", name))
    }

    /// Read a file, or `None` if it does not exist.
    fn read(&self, name: &str) -> Result<Option<String>> {
        let path = self.path(name);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| StaffError::storage(&path, e))
    }

    /// Write a file atomically using temp file + rename.
    fn atomic_write(&self, name: &str, content: &str) -> Result<()> {
        let final_path = self.path(name);
        let temp_path = self.temp_path(name);

        {
            let mut file =
                fs::File::create(&temp_path).map_err(|e| StaffError::storage(&temp_path, e))?;
            file.write_all(content.as_bytes())
                .map_err(|e| StaffError::storage(&temp_path, e))?;
            file.sync_all()
                .map_err(|e| StaffError::storage(&temp_path, e))?;
        }

        // Rename temp file to final path (atomic on POSIX)
        fs::rename(&temp_path, &final_path).map_err(|e| StaffError::storage(&final_path, e))?;
        Ok(())
    }
}

impl ItemStore for FileStore {
    fn load_items(&self) -> Result<Vec<LearningItem>> {
        match self.read(ITEMS_FILE)? {
            Some(content) => Ok(serde_json::from_str(&content)?),
            None => Ok(Vec::new()),
        }
    }

    fn save_items(&self, items: &[LearningItem]) -> Result<()> {
        let json = serde_json::to_string_pretty(items)?;
        self.atomic_write(ITEMS_FILE, &json)
    }
}

impl CounterStore for FileStore {
    fn load_counters(&self) -> Result<Option<PersistedCounters>> {
        match self.read(COUNTERS_FILE)? {
            Some(content) => Ok(Some(serde_json::from_str(&content)?)),
            None => Ok(None),
        }
    }

    fn save_counters(&self, counters: &PersistedCounters) -> Result<()> {
        let json = serde_json::to_string_pretty(counters)?;
        self.atomic_write(COUNTERS_FILE, &json)
    }
}

impl ConfigStore for FileStore {
    fn load_config(&self) -> Result<Option<TrainingConfig>> {
        match self.read(CONFIG_FILE)? {
            Some(content) => TrainingConfig::from_toml(&content).map(Some),
            None => Ok(None),
        }
    }

    fn save_config(&self, config: &TrainingConfig) -> Result<()> {
        let content = config.to_toml()?;
        self.atomic_write(CONFIG_FILE, &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pitch::Clef;
    use crate::storage::traits::tests::{test_config_store, test_counter_store, test_item_store};
    use tempfile::TempDir;

    fn create_test_store() -> (FileStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = FileStore::with_dir(dir.path()).unwrap();
        (store, dir)
    }

    #[test]
    fn test_file_item_store() {
        let (store, _dir) = create_test_store();
        test_item_store(&store);
    }

    #[test]
    fn test_file_counter_store() {
        let (store, _dir) = create_test_store();
        test_counter_store(&store);
    }

    #[test]
    fn test_file_config_store() {
        let (store, _dir) = create_test_store();
        test_config_store(&store);
    }

    #[test]
    fn test_with_dir_creates_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        assert!(!nested.exists());

        let store = FileStore::with_dir(&nested).unwrap();
        assert!(nested.exists());
        assert_eq!(store.dir(), nested.as_path());
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_file() {
        let (store, dir) = create_test_store();
        store.save_config(&TrainingConfig::default()).unwrap();

        assert!(dir.path().join("config.toml").exists());
        assert!(!dir.path().join(".config.toml.tmp").exists());
    }

    #[test]
    fn test_config_file_is_readable_toml() {
        let (store, dir) = create_test_store();
        store.save_config(&TrainingConfig::default()).unwrap();

        let content = fs::read_to_string(dir.path().join("config.toml")).unwrap();
        assert!(content.contains("enabled_clefs"));
        assert!(content.contains("[ranges.treble]"));
    }

    #[test]
    fn test_hand_edited_config() {
        let (store, dir) = create_test_store();
        fs::write(
            dir.path().join("config.toml"),
            "enabled_clefs = [\"bass\"]\nfour_note_mode = true\n",
        )
        .unwrap();

        let config = store.load_config().unwrap().unwrap();
        assert_eq!(config.enabled_clefs, vec![Clef::Bass]);
        assert!(config.four_note_mode);
        assert!(config.ranges.bass.is_some());
    }

    #[test]
    fn test_corrupt_items_is_an_error() {
        let (store, dir) = create_test_store();
        fs::write(dir.path().join("items.json"), "{ not json").unwrap();

        let err = store.load_items().unwrap_err();
        assert!(matches!(err, StaffError::Serde { .. }));
    }

    #[test]
    fn test_corrupt_config_is_an_error() {
        let (store, dir) = create_test_store();
        fs::write(dir.path().join("config.toml"), "enabled_clefs = [[[").unwrap();
        assert!(matches!(
            store.load_config(),
            Err(StaffError::Config { .. })
        ));
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let (store, dir) = create_test_store();
        fs::remove_dir_all(dir.path()).unwrap();

        let result = store.save_counters(&PersistedCounters::new(
            chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        ));
        assert!(matches!(result, Err(StaffError::Storage { .. })));
    }
}
