use axum::Router;

use crate::state::AppState;

mod handlers;
pub mod model;
mod repo;

pub use model::{FitnessGoal, Macros, MacrosPatch, ProfilePatch, UserProfile};
pub use repo::{ProfileError, ProfileStore, USERS_COLLECTION};

pub fn router() -> Router<AppState> {
    handlers::profile_routes()
}
