use axum::Router;

use crate::state::AppState;

pub mod catalog;
pub mod evaluation;
mod handlers;

pub use catalog::{FoodItem, Track};
pub use evaluation::{evaluate, MealEvaluation, MealSummary};

pub fn router() -> Router<AppState> {
    handlers::food_routes()
}
