//! AI-backed nutrition estimates for free-text food descriptions.

use std::sync::Arc;

use axum::Router;
use tracing::{info, instrument, warn};

use crate::errors::TransportError;
use crate::state::AppState;

mod gemini;
mod handlers;
pub mod model;
pub mod parse;
pub mod prompt;

pub use gemini::{GeminiClient, TextGenerator};
pub use model::{FoodAnalysisResult, FoodCategory};

/// Prompts the model once per call and sanitises whatever comes back.
///
/// No caching and no retry: duplicate queries produce duplicate calls.
#[derive(Clone)]
pub struct FoodAnalyzer {
    model: Arc<dyn TextGenerator>,
}

impl FoodAnalyzer {
    pub fn new(model: Arc<dyn TextGenerator>) -> Self {
        Self { model }
    }

    /// Only transport failures are errors; an unusable reply yields the
    /// placeholder result with `fallback` set.
    #[instrument(skip(self))]
    pub async fn analyze(&self, query: &str) -> Result<FoodAnalysisResult, TransportError> {
        let raw = self.model.generate(&prompt::build_prompt(query)).await?;
        let result = parse::interpret(&raw, query);
        if result.fallback {
            warn!(chars = raw.len(), "model reply unusable; returning fallback");
        } else {
            info!(name = %result.name, category = %result.category, "food analyzed");
        }
        Ok(result)
    }
}

pub fn router() -> Router<AppState> {
    handlers::analysis_routes()
}
