//! Static sample foods for search and recommendations.

use serde::{Deserialize, Serialize};

use crate::analysis::FoodCategory;
use crate::profiles::FitnessGoal;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    pub id: &'static str,
    pub name: &'static str,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub category: FoodCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<&'static str>,
}

#[allow(clippy::too_many_arguments)]
const fn item(
    id: &'static str,
    name: &'static str,
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
    category: FoodCategory,
    image_url: Option<&'static str>,
) -> FoodItem {
    FoodItem {
        id,
        name,
        calories,
        protein,
        carbs,
        fat,
        category,
        image_url,
    }
}

pub static SEARCHABLE: [FoodItem; 6] = [
    item("1", "Chicken Breast", 165.0, 31.0, 0.0, 3.6, FoodCategory::Cutting, None),
    item("2", "Brown Rice", 216.0, 5.0, 45.0, 1.8, FoodCategory::General, None),
    item("3", "Salmon", 208.0, 20.0, 0.0, 13.0, FoodCategory::Bulking, None),
    item("4", "Avocado", 240.0, 3.0, 12.0, 22.0, FoodCategory::Bulking, None),
    item("5", "Broccoli", 55.0, 3.7, 11.0, 0.6, FoodCategory::Cutting, None),
    item("6", "Greek Yogurt", 100.0, 17.0, 6.0, 0.4, FoodCategory::Cutting, None),
];

static CUTTING_PICKS: [FoodItem; 3] = [
    item("r1", "Grilled Chicken Salad", 320.0, 35.0, 12.0, 14.0, FoodCategory::Cutting,
        Some("https://images.unsplash.com/photo-1546069901-ba9599a7e63c?w=300&q=80")),
    item("r2", "Salmon with Steamed Vegetables", 380.0, 32.0, 15.0, 18.0, FoodCategory::Cutting,
        Some("https://images.unsplash.com/photo-1467003909585-2f8a72700288?w=300&q=80")),
    item("r3", "Greek Yogurt with Berries", 220.0, 18.0, 24.0, 5.0, FoodCategory::Cutting,
        Some("https://images.unsplash.com/photo-1488477181946-6428a0291777?w=300&q=80")),
];

static BULKING_PICKS: [FoodItem; 3] = [
    item("r4", "Protein Smoothie with Banana", 450.0, 30.0, 55.0, 10.0, FoodCategory::Bulking,
        Some("https://images.unsplash.com/photo-1577805947697-89e18249d767?w=300&q=80")),
    item("r5", "Steak with Sweet Potato", 580.0, 40.0, 45.0, 22.0, FoodCategory::Bulking,
        Some("https://images.unsplash.com/photo-1544025162-d76694265947?w=300&q=80")),
    item("r6", "Peanut Butter Oatmeal", 520.0, 20.0, 65.0, 18.0, FoodCategory::Bulking,
        Some("https://images.unsplash.com/photo-1495214783159-3503fd1b572d?w=300&q=80")),
];

static HEALTH_PICKS: [FoodItem; 3] = [
    item("r7", "Quinoa Bowl with Avocado", 380.0, 15.0, 45.0, 16.0, FoodCategory::General,
        Some("https://images.unsplash.com/photo-1512621776951-a57141f2eefd?w=300&q=80")),
    item("r8", "Mediterranean Salad", 310.0, 12.0, 30.0, 15.0, FoodCategory::General,
        Some("https://images.unsplash.com/photo-1540420773420-3366772f4999?w=300&q=80")),
    item("r9", "Vegetable Soup with Lentils", 250.0, 14.0, 35.0, 5.0, FoodCategory::General,
        Some("https://images.unsplash.com/photo-1547592180-85f173990554?w=300&q=80")),
];

/// Recommendation tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    Cutting,
    Bulking,
    Health,
}

impl From<FitnessGoal> for Track {
    fn from(goal: FitnessGoal) -> Self {
        match goal {
            FitnessGoal::Cutting => Track::Cutting,
            FitnessGoal::Bulking => Track::Bulking,
            FitnessGoal::Maintenance => Track::Health,
        }
    }
}

/// Case-insensitive substring match on food names. Blank queries match nothing.
pub fn search(query: &str) -> Vec<FoodItem> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    SEARCHABLE
        .iter()
        .filter(|f| f.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

pub fn recommendations(track: Track) -> &'static [FoodItem] {
    match track {
        Track::Cutting => &CUTTING_PICKS,
        Track::Bulking => &BULKING_PICKS,
        Track::Health => &HEALTH_PICKS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_ignores_case_and_surrounding_space() {
        let hits = search("  RICE ");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Brown Rice");

        let hits = search("o");
        assert!(hits.iter().any(|f| f.name == "Salmon"));
        assert!(hits.iter().any(|f| f.name == "Broccoli"));
    }

    #[test]
    fn blank_or_unknown_search_is_empty() {
        assert!(search("   ").is_empty());
        assert!(search("durian").is_empty());
    }

    #[test]
    fn maintenance_maps_to_health_track() {
        assert_eq!(Track::from(FitnessGoal::Maintenance), Track::Health);
        let picks = recommendations(Track::from(FitnessGoal::Bulking));
        assert_eq!(picks.len(), 3);
        assert!(picks.iter().all(|f| f.category == FoodCategory::Bulking));
    }
}
