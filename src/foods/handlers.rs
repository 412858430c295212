use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{
    catalog::{self, FoodItem, Track},
    evaluation::{evaluate, MealEvaluation, MealSummary},
};
use crate::{
    errors::AppError,
    identity::{AuthUser, MaybeAuthUser},
    profiles::FitnessGoal,
    state::AppState,
};

pub fn food_routes() -> Router<AppState> {
    Router::new()
        .route("/foods/search", get(search_foods))
        .route("/foods/recommendations", get(recommend_foods))
        .route("/meals/evaluate", post(evaluate_meal))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<FoodItem>,
    /// Nothing matched, so the client should offer AI analysis instead.
    pub suggest_analysis: bool,
}

#[instrument]
pub async fn search_foods(Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let results = catalog::search(&params.q);
    debug!(hits = results.len(), "food search");
    Json(SearchResponse {
        suggest_analysis: results.is_empty() && !params.q.trim().is_empty(),
        results,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationParams {
    pub track: Option<Track>,
    pub remaining_calories: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    pub track: Track,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_calories: Option<i64>,
    pub items: &'static [FoodItem],
}

/// The user's own goal picks the default track; anonymous callers get cutting.
#[instrument(skip(state))]
pub async fn recommend_foods(
    State(state): State<AppState>,
    MaybeAuthUser(user_id): MaybeAuthUser,
    Query(params): Query<RecommendationParams>,
) -> Result<Json<RecommendationResponse>, AppError> {
    let track = match (params.track, user_id) {
        (Some(track), _) => track,
        (None, Some(user_id)) => state
            .profiles
            .get(&user_id)
            .await?
            .map(|p| Track::from(p.fitness_goal))
            .unwrap_or(Track::Cutting),
        (None, None) => Track::Cutting,
    };

    Ok(Json(RecommendationResponse {
        track,
        remaining_calories: params.remaining_calories,
        items: catalog::recommendations(track),
    }))
}

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub meal: MealSummary,
    /// Overrides the goal stored in the profile.
    pub goal: Option<FitnessGoal>,
}

#[instrument(skip(state, body))]
pub async fn evaluate_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<EvaluateRequest>,
) -> Result<Json<MealEvaluation>, AppError> {
    let goal = match body.goal {
        Some(goal) => goal,
        None => state
            .profiles
            .get(&user_id)
            .await?
            .map(|p| p.fitness_goal)
            .unwrap_or_default(),
    };
    Ok(Json(evaluate(&body.meal, goal)))
}

#[cfg(test)]
mod tests {
    use crate::testing::{body_json, call, signed_up};
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn search_without_hits_suggests_analysis() {
        let (app, _) = signed_up("search@example.com").await;

        let res = call(&app, "GET", "/api/v1/foods/search?q=chicken", None, None).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = body_json(res).await;
        assert_eq!(body["results"][0]["name"], "Chicken Breast");
        assert_eq!(body["suggestAnalysis"], false);

        let res = call(&app, "GET", "/api/v1/foods/search?q=durian", None, None).await;
        let body: Value = body_json(res).await;
        assert_eq!(body["results"], json!([]));
        assert_eq!(body["suggestAnalysis"], true);
    }

    #[tokio::test]
    async fn recommendations_follow_profile_goal() {
        let (app, token) = signed_up("recs@example.com").await;

        // fresh profiles are maintenance
        let res = call(&app, "GET", "/api/v1/foods/recommendations", Some(&token), None).await;
        let body: Value = body_json(res).await;
        assert_eq!(body["track"], "health");
        assert_eq!(body["items"].as_array().unwrap().len(), 3);

        let res = call(
            &app,
            "GET",
            "/api/v1/foods/recommendations?track=bulking&remainingCalories=800",
            None,
            None,
        )
        .await;
        let body: Value = body_json(res).await;
        assert_eq!(body["track"], "bulking");
        assert_eq!(body["remainingCalories"], 800);
    }

    #[tokio::test]
    async fn evaluate_uses_profile_goal_unless_overridden() {
        let (app, token) = signed_up("eval@example.com").await;
        let meal = json!({
            "name": "Steak",
            "calories": 580, "protein": 40, "carbs": 45, "fat": 22,
            "category": "bulking"
        });

        let res = call(
            &app,
            "POST",
            "/api/v1/meals/evaluate",
            Some(&token),
            Some(json!({ "meal": meal })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = body_json(res).await;
        assert_eq!(body["aligned"], true);
        assert_eq!(body["goal"], "maintenance");

        let res = call(
            &app,
            "POST",
            "/api/v1/meals/evaluate",
            Some(&token),
            Some(json!({ "meal": meal, "goal": "cutting" })),
        )
        .await;
        let body: Value = body_json(res).await;
        assert_eq!(body["aligned"], false);
        assert_eq!(body["message"], "Not ideal for cutting");
    }
}
