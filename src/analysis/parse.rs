//! Turns raw model output into a [`FoodAnalysisResult`].
//!
//! The reply is untrusted text. Every field is checked on its own and anything
//! unusable falls back to a default; a reply with no usable object at all
//! becomes the placeholder result.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

use super::model::{FoodAnalysisResult, FoodCategory};

pub const NO_REASONING: &str = "No reasoning provided.";
pub const FALLBACK_REASONING: &str =
    "The AI model could not produce a valid nutrition estimate for this food. Please try again or rephrase the description.";

const FIELDS: [&str; 7] = ["name", "calories", "protein", "carbs", "fat", "category", "reasoning"];

/// Strict parse first, then the widest `{...}` span in the text.
fn extract_object(raw: &str) -> Option<Map<String, Value>> {
    lazy_static! {
        static ref OBJECT_RE: Regex = Regex::new(r"(?s)\{.*\}").unwrap();
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw.trim()) {
        return Some(map);
    }
    let span = OBJECT_RE.find(raw)?;
    match serde_json::from_str::<Value>(span.as_str()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn number(map: &Map<String, Value>, key: &str) -> f64 {
    let n = match map.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|v| v.is_finite() && *v >= 0.0).unwrap_or(0.0)
}

fn text(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Interprets `raw` as the model's answer to `query`. Never fails.
pub fn interpret(raw: &str, query: &str) -> FoodAnalysisResult {
    let Some(map) = extract_object(raw) else {
        return FoodAnalysisResult::fallback(query, FALLBACK_REASONING);
    };
    if !FIELDS.iter().any(|f| map.contains_key(*f)) {
        return FoodAnalysisResult::fallback(query, FALLBACK_REASONING);
    }

    FoodAnalysisResult {
        name: text(&map, "name").unwrap_or_else(|| query.trim().to_string()),
        calories: number(&map, "calories"),
        protein: number(&map, "protein"),
        carbs: number(&map, "carbs"),
        fat: number(&map, "fat"),
        category: map
            .get("category")
            .and_then(Value::as_str)
            .map(FoodCategory::coerce)
            .unwrap_or_default(),
        reasoning: text(&map, "reasoning").unwrap_or_else(|| NO_REASONING.to_string()),
        fallback: false,
    }
}
