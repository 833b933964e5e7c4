pub mod config;
pub mod event;
pub mod i18n;
pub mod locale;
pub mod preferences;
pub mod provider;
pub mod storage;
pub mod theme;

pub use config::{LanguagePolicy, PreferenceConfig, ThemePolicy};
pub use event::{EventProxy, EventProxyFn, PreferenceEvent, SubscriptionId};
pub use locale::{LocalePreferenceStore, LocaleSwitcher};
pub use preferences::{LanguageCode, Preferences, Theme};
pub use provider::{PreferenceProvider, ProviderSubscription};
pub use storage::{FileStorage, MemoryStorage, PersistedStorage, SetOptions, StoredEntry};
pub use theme::ThemePreferenceStore;
