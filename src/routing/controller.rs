//! Routing state that follows a signed-in [`IdentitySession`].
//!
//! Embedding clients use this to react to sign-in and sign-out. The HTTP
//! server does not hold one; `/session/route` calls [`state_for`] and
//! [`resolve`] per request instead.

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, info};

use super::{resolve, state_for, Resolution, SessionState};
use crate::identity::{IdentitySession, IdentityUser, Subscription};
use crate::profiles::ProfileStore;

/// Follows an [`IdentitySession`] and keeps the routing state current.
///
/// Identity changes are handled one at a time on a single task, so a slow
/// profile lookup never lets an older user overwrite a newer one.
pub struct SessionController {
    session: IdentitySession,
    changes: mpsc::UnboundedSender<Option<IdentityUser>>,
    state: watch::Receiver<SessionState>,
    subscription: Option<Subscription>,
    worker: JoinHandle<()>,
    dev_routes: bool,
}

impl SessionController {
    /// Starts in `Loading` and begins observing `session` right away.
    pub fn start(session: IdentitySession, profiles: ProfileStore, dev_routes: bool) -> Self {
        let (changes, mut rx) = mpsc::unbounded_channel::<Option<IdentityUser>>();
        let (state_tx, state) = watch::channel(SessionState::Loading);

        let worker = tokio::spawn(async move {
            while let Some(user) = rx.recv().await {
                let next = state_for(&profiles, user.as_ref().map(|u| u.id.as_str())).await;
                let prev = state_tx.send_replace(next);
                if prev != next {
                    info!(from = ?prev, to = ?next, "session state changed");
                }
            }
            debug!("session controller worker stopped");
        });

        let tx = changes.clone();
        let subscription = session.on_change(move |user| {
            // only fails once the worker is gone
            let _ = tx.send(user.cloned());
        });

        Self {
            session,
            changes,
            state,
            subscription: Some(subscription),
            worker,
            dev_routes,
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    pub fn resolve(&self, path: &str) -> Resolution {
        resolve(self.state(), path, self.dev_routes)
    }

    /// Re-runs the transition for the current user, e.g. after profile setup
    /// has been saved.
    pub fn recheck(&self) {
        let _ = self.changes.send(self.session.current_user());
    }

    /// Stops observing the identity session. The last state stays readable.
    pub fn shutdown(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
            self.worker.abort();
            debug!("session controller shut down");
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::identity::MemoryIdentityProvider;
    use crate::profiles::ProfilePatch;
    use crate::routing::View;
    use crate::store::MemoryDocumentStore;

    fn setup() -> (IdentitySession, ProfileStore) {
        let session = IdentitySession::new(Arc::new(MemoryIdentityProvider::new()));
        let profiles = ProfileStore::new(Arc::new(MemoryDocumentStore::new()));
        (session, profiles)
    }

    async fn settle(controller: &SessionController, expected: SessionState) {
        let mut rx = controller.subscribe();
        tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|s| *s == expected))
            .await
            .expect("state did not settle in time")
            .expect("controller stopped");
    }

    #[tokio::test]
    async fn walks_through_onboarding() {
        let (session, profiles) = setup();
        let controller = SessionController::start(session.clone(), profiles.clone(), false);
        settle(&controller, SessionState::Unauthenticated).await;
        assert_eq!(controller.resolve("/").view, View::Login);

        let user = session.register("flow@example.com", "password123").await.unwrap();
        settle(&controller, SessionState::AuthenticatedIncomplete).await;
        assert_eq!(controller.resolve("/").view, View::ProfileSetup);

        let patch = ProfilePatch {
            setup_completed: Some(true),
            ..Default::default()
        };
        profiles.create(&user, &patch).await.unwrap();
        controller.recheck();
        settle(&controller, SessionState::AuthenticatedComplete).await;
        assert_eq!(controller.resolve("/login").path, "/");

        session.logout().await.unwrap();
        settle(&controller, SessionState::Unauthenticated).await;
    }

    #[tokio::test]
    async fn shutdown_stops_following_the_session() {
        let (session, profiles) = setup();
        let mut controller = SessionController::start(session.clone(), profiles, false);
        settle(&controller, SessionState::Unauthenticated).await;

        controller.shutdown();
        session.register("late@example.com", "password123").await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(controller.state(), SessionState::Unauthenticated);
    }
}
