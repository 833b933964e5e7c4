use super::{PersistedStorage, SetOptions, StoredEntry};
use anyhow::{Context, Result};
use chrono::Utc;
use std::{
    collections::BTreeMap,
    fs::{create_dir_all, read},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};
use tempfile::NamedTempFile;

type Entries = BTreeMap<String, StoredEntry>;

pub struct FileStorage {
    entries: Mutex<Entries>,
    path: PathBuf,
}

impl FileStorage {
    /// Opens the JSON document at `path`. A missing file is an empty store;
    /// an unreadable or unparsable one is logged and also treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let entries = match load_entries(&path) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("Ignoring preference file {:?}: {:#}", path, err);

                Entries::new()
            }
        };

        log::debug!("Opened preference file {:?} ({} entries)", path, entries.len());

        Self {
            entries: Mutex::new(entries),
            path,
        }
    }

    /// Writes a sibling temporary file and renames it over the document, so
    /// an interrupted write never leaves a truncated file behind.
    fn flush(&self, entries: &Entries) -> Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;

        let contents = serde_json::to_vec_pretty(entries)?;

        let mut file = NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to stage a write in {}", parent.display()))?;
        file.write_all(&contents)?;
        file.as_file().sync_all()?;

        file.persist(&self.path)
            .map_err(|err| err.error)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        Ok(())
    }
}

impl PersistedStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let now = Utc::now();

        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value.clone())
    }

    fn set(&self, key: &str, value: &str, options: SetOptions) -> Result<()> {
        let entry = StoredEntry::new(value, options, Utc::now())?;

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        entries.insert(key.to_owned(), entry);

        self.flush(&entries)
    }
}

fn load_entries(path: &Path) -> Result<Entries> {
    let buffer = match read(path) {
        Ok(buffer) => buffer,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Entries::new()),
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to read {}", path.display()))
        }
    };

    serde_json::from_slice(&buffer).with_context(|| format!("Invalid JSON in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::fs::{read_dir, write};

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();

        let storage = FileStorage::open(dir.path().join("prefs.json"));

        assert_eq!(storage.get("theme"), None);
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");

        {
            let storage = FileStorage::open(&path);
            storage
                .set("theme", "dark", SetOptions::expiring_in_days(365))
                .unwrap();
            storage.set("language", "uz", SetOptions::default()).unwrap();
        }

        let storage = FileStorage::open(&path);

        assert_eq!(storage.get("theme").as_deref(), Some("dark"));
        assert_eq!(storage.get("language").as_deref(), Some("uz"));
    }

    #[test]
    fn expired_entry_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let mut entries = Entries::new();
        entries.insert(
            "theme".to_owned(),
            StoredEntry {
                value: "dark".to_owned(),
                expires_at: Some(Utc::now() - Duration::days(1)),
            },
        );
        entries.insert(
            "language".to_owned(),
            StoredEntry {
                value: "en".to_owned(),
                expires_at: None,
            },
        );
        write(&path, serde_json::to_vec(&entries).unwrap()).unwrap();

        let storage = FileStorage::open(&path);

        assert_eq!(storage.get("theme"), None);
        assert_eq!(storage.get("language").as_deref(), Some("en"));
    }

    #[test]
    fn corrupt_file_is_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        write(&path, b"{not json").unwrap();

        let storage = FileStorage::open(&path);

        assert_eq!(storage.get("theme"), None);

        storage.set("theme", "light", SetOptions::default()).unwrap();
        assert_eq!(storage.get("theme").as_deref(), Some("light"));
    }

    #[test]
    fn directory_path_opens_empty_and_rejects_writes() {
        let dir = tempfile::tempdir().unwrap();

        let storage = FileStorage::open(dir.path());

        assert_eq!(storage.get("theme"), None);
        assert!(storage.set("theme", "dark", SetOptions::default()).is_err());
        assert_eq!(storage.get("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn flush_replaces_the_document_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let storage = FileStorage::open(&path);
        storage.set("theme", "dark", SetOptions::default()).unwrap();
        storage.set("theme", "light", SetOptions::default()).unwrap();

        let names: Vec<_> = read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("prefs.json")]);

        let entries: Entries = serde_json::from_slice(&read(&path).unwrap()).unwrap();
        assert_eq!(entries["theme"].value, "light");
    }

    #[test]
    fn unrepresentable_retention_is_reported_and_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let storage = FileStorage::open(&path);

        assert!(storage
            .set("theme", "dark", SetOptions::expiring_in_days(u32::MAX))
            .is_err());
        assert_eq!(storage.get("theme"), None);
        assert!(!path.exists());
    }
}
