use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Diet category a food suits best. Anything unrecognised is `General`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FoodCategory {
    Cutting,
    Bulking,
    #[default]
    General,
}

impl FoodCategory {
    /// Lenient match used on untrusted input.
    pub fn coerce(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "cutting" => FoodCategory::Cutting,
            "bulking" => FoodCategory::Bulking,
            _ => FoodCategory::General,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FoodCategory::Cutting => "cutting",
            FoodCategory::Bulking => "bulking",
            FoodCategory::General => "general",
        }
    }
}

impl<'de> Deserialize<'de> for FoodCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(FoodCategory::coerce(&raw))
    }
}

impl fmt::Display for FoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nutrition estimate for one query. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodAnalysisResult {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub category: FoodCategory,
    pub reasoning: String,
    /// Set when the model's reply was unusable and this is a placeholder.
    #[serde(default)]
    pub fallback: bool,
}

impl FoodAnalysisResult {
    pub fn fallback(query: &str, reasoning: impl Into<String>) -> Self {
        Self {
            name: query.to_string(),
            calories: 0.0,
            protein: 0.0,
            carbs: 0.0,
            fat: 0.0,
            category: FoodCategory::General,
            reasoning: reasoning.into(),
            fallback: true,
        }
    }

    /// The older heuristic for spotting a placeholder. Prefer `fallback`;
    /// a genuine analysis of water also reads as all zeros.
    pub fn all_macros_zero(&self) -> bool {
        self.calories == 0.0 && self.protein == 0.0 && self.carbs == 0.0 && self.fat == 0.0
    }
}
