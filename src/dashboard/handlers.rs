use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{daily_summary, sample_week, Consumed, DailySummary, WeeklyProgress};
use crate::{errors::AppError, identity::AuthUser, profiles::UserProfile, state::AppState};

pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard/summary", get(get_summary))
        .route("/dashboard/progress", get(get_progress))
}

/// Amounts eaten so far today; anything omitted counts as zero.
#[derive(Debug, Default, Deserialize)]
pub struct SummaryParams {
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
}

/// A missing profile reads as the defaults, as everywhere else.
#[instrument(skip(state))]
pub async fn get_summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<SummaryParams>,
) -> Result<Json<DailySummary>, AppError> {
    let profile = state
        .profiles
        .get(&user_id)
        .await?
        .unwrap_or_else(|| UserProfile::new(user_id.clone()));
    let consumed = Consumed {
        calories: params.calories.max(0.0),
        protein: params.protein.max(0.0),
        carbs: params.carbs.max(0.0),
        fat: params.fat.max(0.0),
    };
    Ok(Json(daily_summary(&profile, consumed)))
}

#[instrument]
pub async fn get_progress(AuthUser(user_id): AuthUser) -> Json<WeeklyProgress> {
    debug!(user_id = %user_id, "serving sample week");
    Json(sample_week())
}

#[cfg(test)]
mod tests {
    use crate::testing::{body_json, call, signed_up};
    use axum::http::StatusCode;
    use serde_json::Value;

    #[tokio::test]
    async fn summary_reports_remaining_and_percentages() {
        let (app, token) = signed_up("dash@example.com").await;
        let res = call(
            &app,
            "GET",
            "/api/v1/dashboard/summary?calories=1250&protein=75&carbs=150&fat=40",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = body_json(res).await;
        assert_eq!(body["remainingCalories"], 750.0);
        assert_eq!(body["calories"]["percentage"], 63);
        assert_eq!(body["macros"][0]["name"], "Protein");
        assert_eq!(body["macros"][0]["goal"], 120.0);
    }

    #[tokio::test]
    async fn progress_needs_auth() {
        let (app, token) = signed_up("progress@example.com").await;
        let res = call(&app, "GET", "/api/v1/dashboard/progress", None, None).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = call(&app, "GET", "/api/v1/dashboard/progress", Some(&token), None).await;
        let body: Value = body_json(res).await;
        assert_eq!(body["dates"].as_array().unwrap().len(), 7);
        assert_eq!(body["calorieBars"][5], 100.0);
    }
}
