//! The current signed-in user and change notifications for it.
//!
//! This is the library surface for long-lived clients that hold one signed-in
//! user at a time. The HTTP server is stateless and does not use it: requests
//! carry a bearer token and are resolved per call.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tracing::{debug, info};

use super::{IdentityError, IdentityProvider, IdentityUser};

type Listener = Box<dyn FnMut(Option<&IdentityUser>) + Send>;

#[derive(Default)]
struct Inner {
    current: Option<IdentityUser>,
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

impl Inner {
    fn publish(&mut self, user: Option<IdentityUser>) {
        self.current = user;
        let current = self.current.as_ref();
        for (_, listener) in self.listeners.iter_mut() {
            listener(current);
        }
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Holds who is signed in and tells observers whenever that changes.
///
/// Listeners run synchronously while the session is locked, so they must not
/// call back into the session.
#[derive(Clone)]
pub struct IdentitySession {
    provider: Arc<dyn IdentityProvider>,
    inner: Arc<Mutex<Inner>>,
}

impl IdentitySession {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            provider,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    /// Creates the account and signs it in. Provider errors are returned unchanged.
    pub async fn register(&self, email: &str, password: &str) -> Result<IdentityUser, IdentityError> {
        let user = self.provider.register(email, password).await?;
        info!(user_id = %user.id, "session signed up");
        lock(&self.inner).publish(Some(user.clone()));
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<IdentityUser, IdentityError> {
        let user = self.provider.login(email, password).await?;
        info!(user_id = %user.id, "session signed in");
        lock(&self.inner).publish(Some(user.clone()));
        Ok(user)
    }

    pub async fn logout(&self) -> Result<(), IdentityError> {
        let mut inner = lock(&self.inner);
        if inner.current.is_some() {
            inner.publish(None);
            info!("session signed out");
        }
        Ok(())
    }

    pub fn current_user(&self) -> Option<IdentityUser> {
        lock(&self.inner).current.clone()
    }

    /// Calls `callback` now with the current user and again on every sign-in or
    /// sign-out, until the returned handle is dropped or unsubscribed.
    pub fn on_change<F>(&self, mut callback: F) -> Subscription
    where
        F: FnMut(Option<&IdentityUser>) + Send + 'static,
    {
        let mut inner = lock(&self.inner);
        callback(inner.current.as_ref());

        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push((id, Box::new(callback)));
        debug!(listener = id, "identity listener added");

        Subscription {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }
}

/// Handle returned by [`IdentitySession::on_change`].
#[must_use = "dropping the subscription stops notifications"]
pub struct Subscription {
    id: u64,
    inner: Weak<Mutex<Inner>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            lock(&inner).listeners.retain(|(id, _)| *id != self.id);
            debug!(listener = self.id, "identity listener removed");
        }
    }
}
