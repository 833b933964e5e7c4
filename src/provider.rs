use crate::{
    config::PreferenceConfig,
    event::{EventProxy, PreferenceEvent, SharedEventProxy, SubscriptionId},
    locale::{LocalePreferenceStore, LocaleSwitcher},
    preferences::Preferences,
    storage::PersistedStorage,
    theme::ThemePreferenceStore,
};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ProviderSubscription {
    pub locale: SubscriptionId,
    pub theme: SubscriptionId,
}

/// Composition root: owns both stores and hands out shared handles.
pub struct PreferenceProvider {
    locale: Arc<LocalePreferenceStore>,
    theme: Arc<ThemePreferenceStore>,
}

impl PreferenceProvider {
    pub fn new(
        config: PreferenceConfig,
        storage: Arc<dyn PersistedStorage>,
        switcher: Arc<dyn LocaleSwitcher>,
    ) -> Self {
        let theme = Arc::new(ThemePreferenceStore::new(config.theme, Arc::clone(&storage)));
        let locale = Arc::new(LocalePreferenceStore::new(
            config.language,
            storage,
            switcher,
        ));

        Self { locale, theme }
    }

    pub fn locale_store(&self) -> &Arc<LocalePreferenceStore> {
        &self.locale
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            language: self.locale.language(),
            theme: self.theme.theme(),
        }
    }

    pub fn subscribe(
        &self,
        proxy: impl EventProxy<PreferenceEvent> + Send + Sync + 'static,
    ) -> ProviderSubscription {
        let proxy: SharedEventProxy<PreferenceEvent> = Arc::new(proxy);

        ProviderSubscription {
            locale: self.locale.subscribe_shared(Arc::clone(&proxy)),
            theme: self.theme.subscribe_shared(proxy),
        }
    }

    pub fn theme_store(&self) -> &Arc<ThemePreferenceStore> {
        &self.theme
    }

    pub fn unsubscribe(&self, subscription: ProviderSubscription) {
        self.locale.unsubscribe(subscription.locale);
        self.theme.unsubscribe(subscription.theme);
    }
}
