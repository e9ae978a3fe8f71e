//! Auth-state listener registry.
//!
//! Listeners are invoked in registration order, outside the registry lock,
//! so a callback may subscribe or unsubscribe without deadlocking.

use crate::types::{AuthChangeEvent, Session};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

/// Callback type for auth state change notifications.
pub type AuthStateCallback = Arc<dyn Fn(AuthChangeEvent, Option<&Session>) + Send + Sync>;

#[derive(Default)]
struct ListenerTable {
    next_id: u64,
    callbacks: BTreeMap<u64, AuthStateCallback>,
}

/// Shared set of auth-state listeners.
#[derive(Clone, Default)]
pub struct AuthListeners {
    inner: Arc<Mutex<ListenerTable>>,
}

impl AuthListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. It stays registered until the returned
    /// [`Subscription`] is released.
    pub fn subscribe(&self, callback: AuthStateCallback) -> Subscription {
        let id = {
            let mut table = self.inner.lock();
            let id = table.next_id;
            table.next_id += 1;
            table.callbacks.insert(id, callback);
            id
        };

        let table: Weak<Mutex<ListenerTable>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(table) = table.upgrade() {
                table.lock().callbacks.remove(&id);
            }
        })
    }

    /// Deliver an event to every registered callback.
    pub fn emit(&self, event: AuthChangeEvent, session: Option<&Session>) {
        let callbacks: Vec<AuthStateCallback> =
            self.inner.lock().callbacks.values().cloned().collect();

        tracing::debug!(event = %event, listeners = callbacks.len(), "Emitting auth state change");

        for callback in callbacks {
            callback(event, session);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle that keeps a listener registered.
///
/// Released exactly once: either explicitly through
/// [`Subscription::unsubscribe`] or when dropped.
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_callback(count: &Arc<AtomicUsize>) -> AuthStateCallback {
        let count = count.clone();
        Arc::new(move |_event: AuthChangeEvent, _session: Option<&Session>| {
            count.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_emit_reaches_all_listeners() {
        let listeners = AuthListeners::new();
        let count = Arc::new(AtomicUsize::new(0));
        let _a = listeners.subscribe(counting_callback(&count));
        let _b = listeners.subscribe(counting_callback(&count));

        listeners.emit(AuthChangeEvent::SignedOut, None);

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let listeners = AuthListeners::new();
        let count = Arc::new(AtomicUsize::new(0));
        let sub = listeners.subscribe(counting_callback(&count));

        sub.unsubscribe();
        listeners.emit(AuthChangeEvent::SignedOut, None);

        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_drop_releases_listener() {
        let listeners = AuthListeners::new();
        {
            let _sub = listeners.subscribe(Arc::new(|_: AuthChangeEvent, _: Option<&Session>| {}));
            assert_eq!(listeners.len(), 1);
        }
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_release_runs_exactly_once() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = released.clone();
        let sub = Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        // unsubscribe consumes the handle; Drop must not release again.
        sub.unsubscribe();

        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscription_outlives_registry() {
        let listeners = AuthListeners::new();
        let sub = listeners.subscribe(Arc::new(|_: AuthChangeEvent, _: Option<&Session>| {}));
        drop(listeners);
        sub.unsubscribe();
    }

    #[test]
    fn test_callback_may_unsubscribe_itself() {
        let listeners = AuthListeners::new();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let slot_in_cb = slot.clone();
        let sub = listeners.subscribe(Arc::new(move |_: AuthChangeEvent, _: Option<&Session>| {
            if let Some(sub) = slot_in_cb.lock().take() {
                sub.unsubscribe();
            }
        }));
        *slot.lock() = Some(sub);

        listeners.emit(AuthChangeEvent::SignedIn, None);

        assert!(listeners.is_empty());
    }
}
