//! Daily summary and weekly progress figures for the home screen.

use axum::Router;
use serde::Serialize;

use crate::profiles::{FitnessGoal, UserProfile};
use crate::state::AppState;

mod handlers;

/// `consumed / goal` as a whole percentage, capped at 100. A zero goal reads as 0.
pub fn percentage(consumed: f64, goal: f64) -> u32 {
    if goal <= 0.0 || !consumed.is_finite() {
        return 0;
    }
    (consumed / goal * 100.0).round().clamp(0.0, 100.0) as u32
}

/// Bar heights as a percentage of the tallest value.
pub fn bar_heights(values: &[f64]) -> Vec<f64> {
    let max = values.iter().copied().fold(0.0_f64, f64::max);
    values
        .iter()
        .map(|v| if max > 0.0 { v / max * 100.0 } else { 0.0 })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Consumed {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub name: &'static str,
    pub consumed: f64,
    pub goal: f64,
    pub percentage: u32,
}

impl Metric {
    fn new(name: &'static str, consumed: f64, goal: f64) -> Self {
        Self {
            name,
            consumed,
            goal,
            percentage: percentage(consumed, goal),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub fitness_goal: FitnessGoal,
    pub calories: Metric,
    /// Negative once the goal is exceeded.
    pub remaining_calories: f64,
    pub macros: Vec<Metric>,
}

pub fn daily_summary(profile: &UserProfile, consumed: Consumed) -> DailySummary {
    let goal = f64::from(profile.calories_goal);
    DailySummary {
        fitness_goal: profile.fitness_goal,
        calories: Metric::new("Calories", consumed.calories, goal),
        remaining_calories: goal - consumed.calories,
        macros: vec![
            Metric::new("Protein", consumed.protein, f64::from(profile.macros.protein)),
            Metric::new("Carbs", consumed.carbs, f64::from(profile.macros.carbs)),
            Metric::new("Fat", consumed.fat, f64::from(profile.macros.fat)),
        ],
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacroSplit {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl MacroSplit {
    /// Each macro's share of the day's grams, in percent.
    fn of(protein: f64, carbs: f64, fat: f64) -> Self {
        let total = protein + carbs + fat;
        if total <= 0.0 {
            return Self { protein: 0.0, carbs: 0.0, fat: 0.0 };
        }
        Self {
            protein: protein / total * 100.0,
            carbs: carbs / total * 100.0,
            fat: fat / total * 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyProgress {
    pub dates: Vec<&'static str>,
    pub calories: Vec<f64>,
    pub calorie_bars: Vec<f64>,
    pub macro_splits: Vec<MacroSplit>,
    pub goal_progress: u32,
}

const WEEK: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const SAMPLE_CALORIES: [f64; 7] = [1800.0, 2100.0, 1950.0, 2200.0, 1700.0, 2300.0, 2000.0];
const SAMPLE_PROTEIN: [f64; 7] = [120.0, 130.0, 125.0, 140.0, 110.0, 150.0, 135.0];
const SAMPLE_CARBS: [f64; 7] = [180.0, 210.0, 195.0, 220.0, 170.0, 230.0, 200.0];
const SAMPLE_FAT: [f64; 7] = [60.0, 70.0, 65.0, 75.0, 55.0, 80.0, 70.0];

/// Placeholder week until meal logging exists.
pub fn sample_week() -> WeeklyProgress {
    WeeklyProgress {
        dates: WEEK.to_vec(),
        calories: SAMPLE_CALORIES.to_vec(),
        calorie_bars: bar_heights(&SAMPLE_CALORIES),
        macro_splits: (0..WEEK.len())
            .map(|i| MacroSplit::of(SAMPLE_PROTEIN[i], SAMPLE_CARBS[i], SAMPLE_FAT[i]))
            .collect(),
        goal_progress: percentage(75.0, 100.0),
    }
}

pub fn router() -> Router<AppState> {
    handlers::dashboard_routes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_and_caps() {
        assert_eq!(percentage(1250.0, 2000.0), 63);
        assert_eq!(percentage(75.0, 120.0), 63);
        assert_eq!(percentage(2500.0, 2000.0), 100);
        assert_eq!(percentage(10.0, 0.0), 0);
    }

    #[test]
    fn bars_scale_to_the_tallest_value() {
        assert_eq!(bar_heights(&[50.0, 100.0, 0.0]), vec![50.0, 100.0, 0.0]);
        assert_eq!(bar_heights(&[0.0, 0.0]), vec![0.0, 0.0]);
        assert!(bar_heights(&[]).is_empty());
    }

    #[test]
    fn summary_uses_profile_goals() {
        let profile = UserProfile::new("u1");
        let s = daily_summary(
            &profile,
            Consumed { calories: 2100.0, protein: 75.0, carbs: 150.0, fat: 40.0 },
        );
        assert_eq!(s.remaining_calories, -100.0);
        assert_eq!(s.calories.percentage, 100);
        let pct: Vec<u32> = s.macros.iter().map(|m| m.percentage).collect();
        assert_eq!(pct, vec![63, 75, 62]);
    }

    #[test]
    fn sample_week_peaks_on_saturday() {
        let week = sample_week();
        assert_eq!(week.calorie_bars[5], 100.0);
        assert_eq!(week.macro_splits.len(), 7);
        let s = &week.macro_splits[0];
        assert!((s.protein + s.carbs + s.fat - 100.0).abs() < 1e-9);
    }
}
