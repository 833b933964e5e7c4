use crate::{
    preferences::{LanguageCode, DEFAULT_LANGUAGE},
    storage::SetOptions,
};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs::read, path::Path};

pub const THEME_RETENTION_DAYS: u32 = 365;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PreferenceConfig {
    pub language: LanguagePolicy,
    pub theme: ThemePolicy,
}

impl PreferenceConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let buffer =
            read(path).with_context(|| format!("Failed to read config {}", path.display()))?;

        let config = serde_json::from_slice(&buffer)
            .with_context(|| format!("Invalid config {}", path.display()))?;

        log::info!("Loaded preference config: {:?}", path);

        Ok(config)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ThemePolicy {
    pub key: String,
    pub retention_days: Option<u32>,
}

impl ThemePolicy {
    pub fn set_options(&self) -> SetOptions {
        SetOptions {
            expires_in_days: self.retention_days,
        }
    }
}

impl Default for ThemePolicy {
    fn default() -> Self {
        Self {
            key: "theme".to_owned(),
            retention_days: Some(THEME_RETENTION_DAYS),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LanguagePolicy {
    pub default_language: LanguageCode,
    pub key: String,
    pub retention_days: Option<u32>,
}

impl LanguagePolicy {
    pub fn set_options(&self) -> SetOptions {
        SetOptions {
            expires_in_days: self.retention_days,
        }
    }
}

impl Default for LanguagePolicy {
    fn default() -> Self {
        Self {
            default_language: LanguageCode::new(DEFAULT_LANGUAGE),
            key: "language".to_owned(),
            retention_days: None,
        }
    }
}
