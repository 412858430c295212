use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::model::FoodAnalysisResult;
use crate::{errors::AppError, identity::AuthUser, state::AppState};

pub fn analysis_routes() -> Router<AppState> {
    Router::new().route("/foods/analyze", post(analyze_food))
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub analysis: FoodAnalysisResult,
    /// The client should offer to try again.
    pub retryable: bool,
}

#[instrument(skip(state, body))]
pub async fn analyze_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let query = body.query.trim();
    if query.is_empty() {
        return Err(AppError::Validation("query must not be empty".into()));
    }

    let analysis = state.analyzer.analyze(query).await?;
    Ok(Json(AnalyzeResponse {
        retryable: analysis.fallback,
        analysis,
    }))
}
