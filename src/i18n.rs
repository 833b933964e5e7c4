use crate::{locale::LocaleSwitcher, preferences::LanguageCode};
use anyhow::{Context, Result};
use i18n_embed::{
    fluent::{fluent_language_loader, FluentLanguageLoader},
    unic_langid::LanguageIdentifier,
    LanguageLoader,
};
use lazy_static::lazy_static;
use rust_embed::RustEmbed;
use std::sync::{PoisonError, RwLock};

#[derive(RustEmbed)]
#[folder = "i18n/"]
struct Localizations;

lazy_static! {
    pub static ref LANGUAGE_LOADER: FluentLanguageLoader = {
        let loader: FluentLanguageLoader = fluent_language_loader!();

        if let Err(err) = loader.load_fallback_language(&Localizations) {
            log::error!("Failed to load fallback translations: {}", err);
        }

        loader
    };
}

pub struct Language {
    pub id: &'static str,
    pub label: &'static str,
}

/// Bundled translations. Listing only: codes outside this table are still
/// accepted and fall back to English for lookups.
pub const LANGUAGES: [Language; 3] = [
    Language {
        id: "en",
        label: "English (English)",
    },
    Language {
        id: "ru",
        label: "Русский (Russian)",
    },
    Language {
        id: "uz",
        label: "Oʻzbekcha (Uzbek)",
    },
];

pub fn select_locales(request_languages: &[&str]) -> Result<()> {
    let requested_languages = request_languages
        .iter()
        .map(|raw| {
            raw.parse::<LanguageIdentifier>()
                .with_context(|| format!("Invalid language code {:?}", raw))
        })
        .collect::<Result<Vec<_>>>()?;

    i18n_embed::select(&*LANGUAGE_LOADER, &Localizations, &requested_languages)?;

    Ok(())
}

pub fn resolved_language() -> String {
    LANGUAGE_LOADER.current_language().to_string()
}

/// Drives the process-wide fluent loader.
#[derive(Default)]
pub struct FluentLocaleSwitcher {
    active: RwLock<Option<LanguageCode>>,
}

impl FluentLocaleSwitcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last requested locale, whether or not the loader could resolve it.
    pub fn active_locale(&self) -> Option<LanguageCode> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LocaleSwitcher for FluentLocaleSwitcher {
    fn change_active_locale(&self, code: &LanguageCode) -> Result<()> {
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = Some(code.clone());

        select_locales(&[code.as_str()])?;

        log::debug!(
            "Translation loader switched to {} (resolved {})",
            code,
            resolved_language()
        );

        Ok(())
    }
}
