/// Builds the instruction sent to the model for a free-text dish or ingredient list.
pub fn build_prompt(query: &str) -> String {
    let query = query.trim();
    format!(
        r#"You are a nutrition assistant. Estimate the nutritional content of the following food: "{query}".

If a portion size is given, estimate for that portion; otherwise estimate per 100 g.

Respond with ONLY a single JSON object and nothing else: no prose before or after it, no markdown, no code fences.
The object must have exactly these fields:
{{
  "name": string, a short name for the food,
  "calories": number, kilocalories,
  "protein": number, grams,
  "carbs": number, grams,
  "fat": number, grams,
  "category": one of "cutting", "bulking", "general",
  "reasoning": string, one or two sentences explaining the category
}}

Category meanings:
- "cutting": low in calories and high in protein, suited to weight loss.
- "bulking": calorie-dense and high in protein, suited to muscle gain.
- "general": balanced nutrition that fits neither extreme."#
    )
}
