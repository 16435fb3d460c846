use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};
use tracing::{debug, info};

use crate::models::{Notification, NotificationKind};

type Callback = Arc<dyn Fn(&Notification) + Send + Sync>;

struct Listener {
    kind: NotificationKind,
    callback: Callback,
}

#[derive(Default)]
struct HubInner {
    /// User id of the active connection, if any
    connection: RwLock<Option<String>>,
    listeners: RwLock<HashMap<u64, Listener>>,
    next_id: AtomicU64,
}

impl HubInner {
    fn remove(&self, id: u64) -> bool {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some()
    }
}

/// In-process side of the real-time notification channel.
///
/// Tracks connection state and fans published notifications out to
/// registered listeners. Every `on_*` registration returns a [`Subscription`];
/// dropping it unregisters exactly that listener. Teardown order is
/// [`remove_listeners`](Self::remove_listeners) then
/// [`disconnect`](Self::disconnect).
#[derive(Clone, Default)]
pub struct NotificationHub {
    inner: Arc<HubInner>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect on behalf of `user_id`.
    ///
    /// Returns `false` without side effects when already connected for the
    /// same user. Connecting as a different user replaces the connection.
    pub fn connect(&self, user_id: impl Into<String>) -> bool {
        let user_id = user_id.into();
        let mut connection = self
            .inner
            .connection
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if connection.as_deref() == Some(user_id.as_str()) {
            debug!("Notification hub already connected for {}", user_id);
            return false;
        }

        info!("Notification hub connected for {}", user_id);
        *connection = Some(user_id);
        true
    }

    /// Drop the connection. Registered listeners are kept.
    pub fn disconnect(&self) {
        let previous = self
            .inner
            .connection
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(user_id) = previous {
            info!("Notification hub disconnected for {}", user_id);
        }
    }

    pub fn connection_status(&self) -> bool {
        self.inner
            .connection
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn connected_user(&self) -> Option<String> {
        self.inner
            .connection
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn on_notification<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        self.register(NotificationKind::User, Arc::new(callback))
    }

    pub fn on_system_notification<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        self.register(NotificationKind::System, Arc::new(callback))
    }

    /// Unregister every listener; outstanding handles become inert
    pub fn remove_listeners(&self) {
        let mut listeners = self
            .inner
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        debug!("Removing {} notification listeners", listeners.len());
        listeners.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Deliver a notification to the listeners registered for its kind.
    ///
    /// Nothing is delivered while disconnected. Returns the number of
    /// listeners invoked.
    pub fn publish(&self, notification: &Notification) -> usize {
        if !self.connection_status() {
            debug!(
                "Dropping {:?} notification {} while disconnected",
                notification.kind, notification.id
            );
            return 0;
        }

        // Callbacks run outside the lock so they may (un)subscribe
        let callbacks: Vec<Callback> = self
            .inner
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|listener| listener.kind == notification.kind)
            .map(|listener| listener.callback.clone())
            .collect();

        for callback in &callbacks {
            callback(notification);
        }

        callbacks.len()
    }

    fn register(&self, kind: NotificationKind, callback: Callback) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Listener { kind, callback });

        Subscription {
            id,
            hub: Arc::downgrade(&self.inner),
        }
    }
}

/// Handle for one registered listener; dropping it unregisters the listener
#[must_use = "dropping a Subscription immediately unregisters its listener"]
pub struct Subscription {
    id: u64,
    hub: Weak<HubInner>,
}

impl Subscription {
    /// Unregister the listener now
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Whether the listener is still registered
    pub fn is_active(&self) -> bool {
        self.hub.upgrade().is_some_and(|hub| {
            hub.listeners
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .contains_key(&self.id)
        })
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.remove(self.id);
        }
    }
}
