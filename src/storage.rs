mod file;
mod memory;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub use file::FileStorage;
pub use memory::MemoryStorage;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SetOptions {
    pub expires_in_days: Option<u32>,
}

impl SetOptions {
    pub fn expiring_in_days(days: u32) -> Self {
        Self {
            expires_in_days: Some(days),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct StoredEntry {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredEntry {
    /// Fails when the retention window lands past the representable date
    /// range.
    pub fn new(value: &str, options: SetOptions, now: DateTime<Utc>) -> Result<Self> {
        let expires_at = match options.expires_in_days {
            Some(days) => Some(
                Duration::try_days(i64::from(days))
                    .and_then(|window| now.checked_add_signed(window))
                    .ok_or_else(|| anyhow!("Retention of {} days is out of range", days))?,
            ),
            None => None,
        };

        Ok(Self {
            value: value.to_owned(),
            expires_at,
        })
    }

    pub fn permanent(value: &str) -> Self {
        Self {
            value: value.to_owned(),
            expires_at: None,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires_at) if expires_at <= now)
    }
}

/// Client-local durable key-value space.
///
/// Reads never fail: an unreadable, expired or missing entry is `None`.
pub trait PersistedStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str, options: SetOptions) -> Result<()>;
}
