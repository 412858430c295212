//! Developer-only endpoints, mounted when `APP_DEV_ROUTES` is set.

use axum::{extract::Query, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::instrument;

use crate::{
    analysis::{parse, prompt},
    dashboard,
    foods::{catalog, Track},
    profiles::FitnessGoal,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dev/prompt", get(preview_prompt))
        .route("/dev/interpret", get(preview_interpretation))
        .route("/dev/samples", get(sample_data))
}

#[derive(Debug, Deserialize)]
pub struct PromptParams {
    #[serde(default)]
    pub q: String,
    /// A raw model reply to run through the parser.
    #[serde(default)]
    pub reply: String,
}

#[derive(Debug, Serialize)]
pub struct PromptPreview {
    pub query: String,
    pub prompt: String,
}

#[instrument]
pub async fn preview_prompt(Query(params): Query<PromptParams>) -> Json<PromptPreview> {
    Json(PromptPreview {
        prompt: prompt::build_prompt(&params.q),
        query: params.q,
    })
}

/// Shows what a given model reply would turn into, without calling the model.
#[instrument]
pub async fn preview_interpretation(Query(params): Query<PromptParams>) -> Json<Value> {
    Json(json!(parse::interpret(&params.reply, &params.q)))
}

#[instrument]
pub async fn sample_data() -> Json<Value> {
    let presets: Vec<_> = [FitnessGoal::Cutting, FitnessGoal::Bulking, FitnessGoal::Maintenance]
        .into_iter()
        .map(FitnessGoal::preset)
        .collect();

    Json(json!({
        "foods": catalog::SEARCHABLE,
        "recommendations": {
            "cutting": catalog::recommendations(Track::Cutting),
            "bulking": catalog::recommendations(Track::Bulking),
            "health": catalog::recommendations(Track::Health),
        },
        "presets": presets,
        "week": dashboard::sample_week(),
    }))
}
