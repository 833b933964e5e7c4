use crate::preferences::{LanguageCode, Theme};
use std::sync::{mpsc::Sender, Arc, Mutex, PoisonError};

#[derive(Clone, Debug, PartialEq)]
pub enum PreferenceEvent {
    LanguageChanged(LanguageCode),
    ThemeChanged(Theme),
}

pub trait EventProxy<T> {
    fn send_event(&self, event: T);
}

impl<T> EventProxy<T> for Sender<T> {
    fn send_event(&self, event: T) {
        if self.send(event).is_err() {
            log::debug!("Dropped preference event: receiver is gone");
        }
    }
}

pub struct EventProxyFn<F> {
    inner: F,
}

impl<T, F> EventProxy<T> for EventProxyFn<F>
where
    F: Fn(T),
{
    fn send_event(&self, event: T) {
        (self.inner)(event);
    }
}

impl<F> EventProxyFn<F> {
    pub fn from_fn(inner: F) -> Self {
        Self { inner }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SubscriptionId(u64);

pub type SharedEventProxy<T> = Arc<dyn EventProxy<T> + Send + Sync>;

pub(crate) struct Subscribers<T> {
    inner: Mutex<SubscriberList<T>>,
}

struct SubscriberList<T> {
    next_id: u64,
    proxies: Vec<(SubscriptionId, SharedEventProxy<T>)>,
}

impl<T: Clone> Subscribers<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SubscriberList {
                next_id: 0,
                proxies: vec![],
            }),
        }
    }

    pub fn add(&self, proxy: SharedEventProxy<T>) -> SubscriptionId {
        let mut list = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        let id = SubscriptionId(list.next_id);
        list.next_id += 1;
        list.proxies.push((id, proxy));

        id
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .proxies
            .len()
    }

    /// Delivers `event` to every subscriber. The list is snapshotted first so
    /// a subscriber may subscribe or unsubscribe from inside its callback.
    pub fn notify(&self, event: T) {
        let proxies: Vec<SharedEventProxy<T>> = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .proxies
            .iter()
            .map(|(_, proxy)| Arc::clone(proxy))
            .collect();

        for proxy in proxies {
            proxy.send_event(event.clone());
        }
    }

    pub fn remove(&self, id: SubscriptionId) -> bool {
        let mut list = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        let before = list.proxies.len();
        list.proxies.retain(|(existing, _)| *existing != id);

        list.proxies.len() != before
    }
}
