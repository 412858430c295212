//! Which screen a visitor may see, given who they are and how far they got
//! through onboarding.

use axum::Router;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::profiles::ProfileStore;
use crate::state::AppState;

pub mod controller;
mod handlers;

pub use controller::SessionController;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionState {
    #[default]
    Loading,
    Unauthenticated,
    AuthenticatedIncomplete,
    AuthenticatedComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    Spinner,
    Login,
    Register,
    ProfileSetup,
    Home,
    Dev,
}

impl View {
    fn for_path(path: &str) -> Option<Self> {
        match path {
            "/login" => Some(View::Login),
            "/register" => Some(View::Register),
            "/profile-setup" => Some(View::ProfileSetup),
            "/" => Some(View::Home),
            _ => None,
        }
    }

    pub fn path(self) -> Option<&'static str> {
        match self {
            View::Login => Some("/login"),
            View::Register => Some("/register"),
            View::ProfileSetup => Some("/profile-setup"),
            View::Home => Some("/"),
            View::Spinner | View::Dev => None,
        }
    }
}

impl SessionState {
    fn allows(self, view: View) -> bool {
        match self {
            SessionState::Loading => false,
            SessionState::Unauthenticated => matches!(view, View::Login | View::Register),
            SessionState::AuthenticatedIncomplete => view == View::ProfileSetup,
            SessionState::AuthenticatedComplete => view == View::Home,
        }
    }

    /// Where a disallowed request ends up.
    fn canonical(self) -> View {
        match self {
            SessionState::Loading => View::Spinner,
            SessionState::Unauthenticated => View::Login,
            SessionState::AuthenticatedIncomplete => View::ProfileSetup,
            SessionState::AuthenticatedComplete => View::Home,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub state: SessionState,
    pub view: View,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirected_from: Option<String>,
}

fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default().trim();
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        "/".to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

fn is_dev_path(path: &str) -> bool {
    path == "/dev" || path.starts_with("/dev/")
}

/// Decides what `path` shows in `state`. While loading nothing is redirected;
/// the spinner covers every path.
pub fn resolve(state: SessionState, path: &str, dev_routes: bool) -> Resolution {
    let path = normalize(path);

    if dev_routes && is_dev_path(&path) {
        return Resolution {
            state,
            view: View::Dev,
            path,
            redirected_from: None,
        };
    }

    if state == SessionState::Loading {
        return Resolution {
            state,
            view: View::Spinner,
            path,
            redirected_from: None,
        };
    }

    match View::for_path(&path).filter(|v| state.allows(*v)) {
        Some(view) => Resolution {
            state,
            view,
            path,
            redirected_from: None,
        },
        None => {
            let view = state.canonical();
            Resolution {
                state,
                view,
                path: view.path().unwrap_or("/").to_string(),
                redirected_from: Some(path),
            }
        }
    }
}

/// Settled state for a user id. A failed profile lookup counts as an
/// unfinished setup.
pub async fn state_for(profiles: &ProfileStore, user_id: Option<&str>) -> SessionState {
    let Some(user_id) = user_id else {
        return SessionState::Unauthenticated;
    };
    match profiles.get(user_id).await {
        Ok(Some(profile)) if profile.setup_completed => SessionState::AuthenticatedComplete,
        Ok(_) => SessionState::AuthenticatedIncomplete,
        Err(e) => {
            warn!(user_id = %user_id, error = %e, "profile lookup failed; treating setup as incomplete");
            SessionState::AuthenticatedIncomplete
        }
    }
}

pub fn router() -> Router<AppState> {
    handlers::routing_routes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_out_users_always_land_on_login() {
        for path in ["/", "/profile-setup", "/anything", "/dev/tools"] {
            let r = resolve(SessionState::Unauthenticated, path, false);
            assert_eq!(r.view, View::Login);
            assert_eq!(r.path, "/login");
            assert_eq!(r.redirected_from.as_deref(), Some(path));
        }
        let r = resolve(SessionState::Unauthenticated, "/register", false);
        assert_eq!(r.view, View::Register);
        assert!(r.redirected_from.is_none());
    }

    #[test]
    fn incomplete_profiles_land_on_setup() {
        for path in ["/", "/login", "/register", "/elsewhere"] {
            let r = resolve(SessionState::AuthenticatedIncomplete, path, false);
            assert_eq!(r.view, View::ProfileSetup);
            assert_eq!(r.path, "/profile-setup");
        }
        let r = resolve(SessionState::AuthenticatedIncomplete, "/profile-setup/", false);
        assert_eq!(r.view, View::ProfileSetup);
        assert!(r.redirected_from.is_none());
    }

    #[test]
    fn complete_profiles_are_sent_home() {
        let r = resolve(SessionState::AuthenticatedComplete, "/login", false);
        assert_eq!(r.view, View::Home);
        assert_eq!(r.path, "/");
        assert_eq!(r.redirected_from.as_deref(), Some("/login"));

        let r = resolve(SessionState::AuthenticatedComplete, "", false);
        assert_eq!(r.view, View::Home);
        assert!(r.redirected_from.is_none());
    }

    #[test]
    fn loading_shows_spinner_everywhere() {
        let r = resolve(SessionState::Loading, "/login?next=/", false);
        assert_eq!(r.view, View::Spinner);
        assert_eq!(r.path, "/login");
        assert!(r.redirected_from.is_none());
    }

    #[test]
    fn dev_paths_pass_through_only_when_enabled() {
        for state in [
            SessionState::Loading,
            SessionState::Unauthenticated,
            SessionState::AuthenticatedIncomplete,
            SessionState::AuthenticatedComplete,
        ] {
            let r = resolve(state, "/dev/storyboard", true);
            assert_eq!(r.view, View::Dev);
            assert_eq!(r.path, "/dev/storyboard");
        }
        let r = resolve(SessionState::AuthenticatedComplete, "/devices", true);
        assert_eq!(r.view, View::Home);
    }

    #[test]
    fn states_serialize_kebab_case() {
        let v = serde_json::to_value(SessionState::AuthenticatedIncomplete).unwrap();
        assert_eq!(v, "authenticated-incomplete");
    }

    #[tokio::test]
    async fn failed_profile_lookup_counts_as_incomplete() {
        use std::sync::Arc;

        use crate::testing::FlakyStore;

        let profiles = ProfileStore::new(Arc::new(FlakyStore::failing_gets()));
        assert_eq!(
            state_for(&profiles, Some("u1")).await,
            SessionState::AuthenticatedIncomplete
        );
        assert_eq!(state_for(&profiles, None).await, SessionState::Unauthenticated);
    }
}
