use crate::{
    config::ThemePolicy,
    event::{EventProxy, PreferenceEvent, SharedEventProxy, SubscriptionId, Subscribers},
    preferences::Theme,
    storage::PersistedStorage,
};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

pub struct ThemePreferenceStore {
    mutation: Mutex<()>,
    policy: ThemePolicy,
    storage: Arc<dyn PersistedStorage>,
    subscribers: Subscribers<PreferenceEvent>,
    theme: RwLock<Theme>,
}

impl ThemePreferenceStore {
    pub fn new(policy: ThemePolicy, storage: Arc<dyn PersistedStorage>) -> Self {
        let theme = match storage.get(&policy.key) {
            Some(raw) => Theme::from_persisted(&raw).unwrap_or_else(|| {
                log::warn!("Unrecognized stored theme {:?}, using default", raw);

                Theme::default()
            }),
            None => Theme::default(),
        };

        log::debug!("Theme preference initialized: {}", theme);

        Self {
            mutation: Mutex::new(()),
            policy,
            storage,
            subscribers: Subscribers::new(),
            theme: RwLock::new(theme),
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

    pub fn theme(&self) -> Theme {
        *self.theme.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Flips the theme and returns the new value. Persistence is best-effort.
    pub fn toggle_theme(&self) -> Theme {
        let _guard = self.mutation.lock().unwrap_or_else(PoisonError::into_inner);

        let theme = {
            let mut current = self.theme.write().unwrap_or_else(PoisonError::into_inner);
            *current = current.toggled();
            *current
        };

        if let Err(err) =
            self.storage
                .set(&self.policy.key, theme.as_str(), self.policy.set_options())
        {
            log::warn!("Failed to persist theme: {:#}", err);
        }

        log::info!("Theme switched to {}", theme);

        self.subscribers.notify(PreferenceEvent::ThemeChanged(theme));

        theme
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }
}
