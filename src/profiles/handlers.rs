use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::model::{FitnessGoal, GoalPreset, Macros, MacrosPatch, ProfilePatch, UserProfile};
use crate::{errors::AppError, identity::AuthUser, state::AppState};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/profile/setup", post(complete_setup))
        .route("/profile/presets/:goal", get(get_preset))
}

/// Body of the profile-setup form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupRequest {
    pub fitness_goal: FitnessGoal,
    pub calories_goal: u32,
    pub macros: Macros,
}

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub updated: bool,
    pub profile: UserProfile,
}

async fn load(state: &AppState, user_id: &str) -> Result<UserProfile, AppError> {
    state
        .profiles
        .get(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".into()))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(load(&state, &user_id).await?))
}

#[instrument(skip(state, patch))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(patch): Json<ProfilePatch>,
) -> Result<Json<UpdateResponse>, AppError> {
    let updated = state.profiles.update(&user_id, &patch).await?;
    let profile = load(&state, &user_id).await?;
    Ok(Json(UpdateResponse { updated, profile }))
}

#[instrument(skip(state, body))]
pub async fn complete_setup(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<SetupRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let patch = ProfilePatch {
        fitness_goal: Some(body.fitness_goal),
        calories_goal: Some(body.calories_goal),
        macros: Some(MacrosPatch {
            protein: Some(body.macros.protein),
            carbs: Some(body.macros.carbs),
            fat: Some(body.macros.fat),
        }),
        setup_completed: Some(true),
        ..Default::default()
    };
    state.profiles.update(&user_id, &patch).await?;
    info!(user_id = %user_id, goal = %body.fitness_goal, "profile setup completed");
    Ok(Json(load(&state, &user_id).await?))
}

#[instrument]
pub async fn get_preset(Path(goal): Path<FitnessGoal>) -> Json<GoalPreset> {
    Json(goal.preset())
}
