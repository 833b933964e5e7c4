use super::{PersistedStorage, SetOptions, StoredEntry};
use anyhow::Result;
use chrono::Utc;
use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, StoredEntry>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<'a>(values: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let storage = Self::new();

        {
            let mut entries = storage.lock();
            for (key, value) in values {
                entries.insert(key.to_owned(), StoredEntry::permanent(value));
            }
        }

        storage
    }

    pub fn entry(&self, key: &str) -> Option<StoredEntry> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, StoredEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PersistedStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        let now = Utc::now();

        self.lock()
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value.clone())
    }

    fn set(&self, key: &str, value: &str, options: SetOptions) -> Result<()> {
        let entry = StoredEntry::new(value, options, Utc::now())?;

        self.lock().insert(key.to_owned(), entry);

        Ok(())
    }
}
