use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{resolve, state_for, Resolution};
use crate::{identity::MaybeAuthUser, state::AppState};

pub fn routing_routes() -> Router<AppState> {
    Router::new().route("/session/route", get(route_for))
}

#[derive(Debug, Deserialize)]
pub struct RouteParams {
    #[serde(default)]
    pub path: String,
}

#[instrument(skip(state))]
pub async fn route_for(
    State(state): State<AppState>,
    MaybeAuthUser(user_id): MaybeAuthUser,
    Query(params): Query<RouteParams>,
) -> Json<Resolution> {
    let session = state_for(&state.profiles, user_id.as_deref()).await;
    let resolution = resolve(session, &params.path, state.config.dev_routes);
    debug!(state = ?resolution.state, view = ?resolution.view, "route resolved");
    Json(resolution)
}
