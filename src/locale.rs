use crate::{
    config::LanguagePolicy,
    event::{EventProxy, PreferenceEvent, SharedEventProxy, SubscriptionId, Subscribers},
    preferences::LanguageCode,
    storage::PersistedStorage,
};
use anyhow::Result;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// The component that resolves text for the active locale.
pub trait LocaleSwitcher: Send + Sync {
    fn change_active_locale(&self, code: &LanguageCode) -> Result<()>;
}

pub struct LocalePreferenceStore {
    language: RwLock<LanguageCode>,
    mutation: Mutex<()>,
    policy: LanguagePolicy,
    storage: Arc<dyn PersistedStorage>,
    subscribers: Subscribers<PreferenceEvent>,
    switcher: Arc<dyn LocaleSwitcher>,
}

impl LocalePreferenceStore {
    /// Reads the stored language and synchronizes the switcher to it before
    /// returning, so no consumer can observe a stale translation state.
    pub fn new(
        policy: LanguagePolicy,
        storage: Arc<dyn PersistedStorage>,
        switcher: Arc<dyn LocaleSwitcher>,
    ) -> Self {
        let language = storage
            .get(&policy.key)
            .map(LanguageCode::from)
            .unwrap_or_else(|| policy.default_language.clone());

        log::debug!("Language preference initialized: {}", language);

        sync_switcher(switcher.as_ref(), &language);

        Self {
            language: RwLock::new(language),
            mutation: Mutex::new(()),
            policy,
            storage,
            subscribers: Subscribers::new(),
            switcher,
        }
    }

    pub fn language(&self) -> LanguageCode {
        self.language
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_language(&self, code: impl Into<LanguageCode>) {
        let code = code.into();

        let _guard = self.mutation.lock().unwrap_or_else(PoisonError::into_inner);

        let changed = {
            // Readers block until both the in-memory value and the switcher agree.
            let mut language = self.language.write().unwrap_or_else(PoisonError::into_inner);
            let changed = *language != code;

            *language = code.clone();
            sync_switcher(self.switcher.as_ref(), &code);

            changed
        };

        if let Err(err) = self
            .storage
            .set(&self.policy.key, code.as_str(), self.policy.set_options())
        {
            log::warn!("Failed to persist language: {:#}", err);
        }

        if changed {
            log::info!("Language switched to {}", code);

            self.subscribers.notify(PreferenceEvent::LanguageChanged(code));
        }
    }

    /// Callbacks run before the mutating call returns and must not mutate
    /// this store.
    pub fn subscribe(
        &self,
        proxy: impl EventProxy<PreferenceEvent> + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.subscribe_shared(Arc::new(proxy))
    }

    pub fn subscribe_shared(&self, proxy: SharedEventProxy<PreferenceEvent>) -> SubscriptionId {
        self.subscribers.add(proxy)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }
}

fn sync_switcher(switcher: &dyn LocaleSwitcher, code: &LanguageCode) {
    if let Err(err) = switcher.change_active_locale(code) {
        log::warn!("Failed to switch translations to {}: {:#}", code, err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use anyhow::anyhow;
    use std::sync::mpsc::channel;

    #[derive(Default)]
    struct RecordingSwitcher {
        calls: Mutex<Vec<LanguageCode>>,
    }

    impl RecordingSwitcher {
        fn calls(&self) -> Vec<LanguageCode> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl LocaleSwitcher for RecordingSwitcher {
        fn change_active_locale(&self, code: &LanguageCode) -> Result<()> {
            self.calls.lock().unwrap().push(code.clone());

            Ok(())
        }
    }

    struct FailingSwitcher;

    impl LocaleSwitcher for FailingSwitcher {
        fn change_active_locale(&self, code: &LanguageCode) -> Result<()> {
            Err(anyhow!("no translations for {}", code))
        }
    }

    #[test]
    fn initialization_syncs_switcher_once() {
        let storage = Arc::new(MemoryStorage::with_values([("language", "uz")]));
        let switcher = Arc::new(RecordingSwitcher::default());

        let store =
            LocalePreferenceStore::new(LanguagePolicy::default(), storage, switcher.clone());

        assert_eq!(store.language().as_str(), "uz");
        assert_eq!(switcher.calls(), vec![LanguageCode::from("uz")]);
    }

    #[test]
    fn configured_default_applies_when_nothing_is_stored() {
        let policy = LanguagePolicy {
            default_language: "en".into(),
            ..LanguagePolicy::default()
        };

        let store = LocalePreferenceStore::new(
            policy,
            Arc::new(MemoryStorage::new()),
            Arc::new(RecordingSwitcher::default()),
        );

        assert_eq!(store.language().as_str(), "en");
    }

    #[test]
    fn set_language_pushes_to_switcher_exactly_once() {
        let switcher = Arc::new(RecordingSwitcher::default());
        let store = LocalePreferenceStore::new(
            LanguagePolicy::default(),
            Arc::new(MemoryStorage::new()),
            switcher.clone(),
        );

        store.set_language("en");

        assert_eq!(
            switcher.calls(),
            vec![LanguageCode::from("ru"), LanguageCode::from("en")]
        );
    }

    #[test]
    fn switcher_failure_is_not_surfaced() {
        let storage = Arc::new(MemoryStorage::new());
        let store = LocalePreferenceStore::new(
            LanguagePolicy::default(),
            storage.clone(),
            Arc::new(FailingSwitcher),
        );

        store.set_language("zz");

        assert_eq!(store.language().as_str(), "zz");
        assert_eq!(storage.get("language").as_deref(), Some("zz"));
    }

    #[test]
    fn language_is_persisted_without_expiry() {
        let storage = Arc::new(MemoryStorage::new());
        let store = LocalePreferenceStore::new(
            LanguagePolicy::default(),
            storage.clone(),
            Arc::new(RecordingSwitcher::default()),
        );

        store.set_language("en");

        let entry = storage.entry("language").unwrap();
        assert_eq!(entry.value, "en");
        assert_eq!(entry.expires_at, None);
    }

    #[test]
    fn subscribers_only_hear_actual_changes() {
        let store = LocalePreferenceStore::new(
            LanguagePolicy::default(),
            Arc::new(MemoryStorage::new()),
            Arc::new(RecordingSwitcher::default()),
        );
        let (tx, rx) = channel();
        store.subscribe(tx);

        store.set_language("ru");
        store.set_language("uz");
        store.set_language("uz");

        assert_eq!(
            rx.try_iter().collect::<Vec<_>>(),
            vec![PreferenceEvent::LanguageChanged("uz".into())]
        );
    }
}
