use serde::{Deserialize, Serialize};

use crate::analysis::FoodCategory;
use crate::profiles::FitnessGoal;

/// A meal as the client shows it, usually straight from an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealSummary {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default)]
    pub category: FoodCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealEvaluation {
    pub meal: MealSummary,
    pub goal: FitnessGoal,
    pub category: FoodCategory,
    pub aligned: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<&'static str>,
}

/// Maintenance accepts anything; otherwise the meal's category has to match the goal.
pub fn is_aligned(goal: FitnessGoal, category: FoodCategory) -> bool {
    match goal {
        FitnessGoal::Maintenance => true,
        FitnessGoal::Cutting => category == FoodCategory::Cutting,
        FitnessGoal::Bulking => category == FoodCategory::Bulking,
    }
}

pub fn evaluate(meal: &MealSummary, goal: FitnessGoal) -> MealEvaluation {
    let aligned = is_aligned(goal, meal.category);
    let (message, recommendation) = if aligned {
        (format!("Good for {goal}!"), None)
    } else {
        let advice = match goal {
            FitnessGoal::Cutting => {
                "Consider options with fewer calories and carbs, but higher protein."
            }
            _ => "Consider options with more calories and protein to support muscle growth.",
        };
        (format!("Not ideal for {goal}"), Some(advice))
    };

    MealEvaluation {
        meal: meal.clone(),
        goal,
        category: meal.category,
        aligned,
        message,
        recommendation,
    }
}
