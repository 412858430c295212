use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ValidationError;
use crate::identity::IdentityUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitnessGoal {
    Cutting,
    Bulking,
    #[default]
    Maintenance,
}

impl FitnessGoal {
    pub fn as_str(self) -> &'static str {
        match self {
            FitnessGoal::Cutting => "cutting",
            FitnessGoal::Bulking => "bulking",
            FitnessGoal::Maintenance => "maintenance",
        }
    }

    /// Starting targets offered when a user picks this goal.
    pub fn preset(self) -> GoalPreset {
        let (calories_goal, protein, carbs, fat) = match self {
            FitnessGoal::Cutting => (1800, 150, 150, 50),
            FitnessGoal::Bulking => (2500, 180, 300, 70),
            FitnessGoal::Maintenance => (2000, 120, 200, 65),
        };
        GoalPreset {
            fitness_goal: self,
            calories_goal,
            macros: Macros { protein, carbs, fat },
        }
    }
}

impl fmt::Display for FitnessGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Daily macronutrient targets in grams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Macros {
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalPreset {
    pub fitness_goal: FitnessGoal,
    pub calories_goal: u32,
    pub macros: Macros,
}

/// A user's nutrition goals. Every field is populated once it leaves the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub fitness_goal: FitnessGoal,
    pub calories_goal: u32,
    pub macros: Macros,
    pub setup_completed: bool,
}

impl UserProfile {
    pub fn new(id: impl Into<String>) -> Self {
        let preset = FitnessGoal::default().preset();
        Self {
            id: id.into(),
            display_name: None,
            email: None,
            fitness_goal: preset.fitness_goal,
            calories_goal: preset.calories_goal,
            macros: preset.macros,
            setup_completed: false,
        }
    }

    pub fn for_user(user: &IdentityUser) -> Self {
        Self {
            display_name: user.display_name.clone(),
            email: user.email.clone(),
            ..Self::new(user.id.clone())
        }
    }

    /// Rebuilds a profile from a stored document, filling anything missing or
    /// malformed with defaults.
    pub fn from_document(id: &str, doc: &Value) -> Self {
        let mut profile = Self::new(id);
        let Some(map) = doc.as_object() else {
            return profile;
        };

        profile.display_name = field(map, "displayName");
        profile.email = field(map, "email");
        if let Some(goal) = field(map, "fitnessGoal") {
            profile.fitness_goal = goal;
        }
        if let Some(calories) = field::<u32>(map, "caloriesGoal").filter(|c| *c > 0) {
            profile.calories_goal = calories;
        }
        if let Some(macros) = field::<MacrosPatch>(map, "macros") {
            profile.macros = macros.complete();
        }
        if let Some(done) = field(map, "setupCompleted") {
            profile.setup_completed = done;
        }
        profile
    }

    pub fn apply(&mut self, patch: &ProfilePatch) {
        if let Some(name) = &patch.display_name {
            self.display_name = Some(name.clone());
        }
        if let Some(email) = &patch.email {
            self.email = Some(email.clone());
        }
        if let Some(goal) = patch.fitness_goal {
            self.fitness_goal = goal;
        }
        if let Some(calories) = patch.calories_goal {
            self.calories_goal = calories;
        }
        if let Some(macros) = patch.macros {
            self.macros = macros.complete();
        }
        if let Some(done) = patch.setup_completed {
            self.setup_completed = done;
        }
    }
}

fn field<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Option<T> {
    map.get(key)
        .and_then(|v| serde_json::from_value(v.clone()).ok())
}

/// Macro targets as supplied by a caller; absent entries become 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct MacrosPatch {
    pub protein: Option<u32>,
    pub carbs: Option<u32>,
    pub fat: Option<u32>,
}

impl MacrosPatch {
    pub fn complete(self) -> Macros {
        Macros {
            protein: self.protein.unwrap_or(0),
            carbs: self.carbs.unwrap_or(0),
            fat: self.fat.unwrap_or(0),
        }
    }
}

/// Partial profile update. Keys that are not listed here are dropped on
/// deserialization, and `id` can never be changed through a patch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub fitness_goal: Option<FitnessGoal>,
    pub calories_goal: Option<u32>,
    pub macros: Option<MacrosPatch>,
    pub setup_completed: Option<bool>,
}

impl ProfilePatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.calories_goal == Some(0) {
            return Err(ValidationError("caloriesGoal must be greater than zero".into()));
        }
        if matches!(&self.display_name, Some(n) if n.trim().is_empty()) {
            return Err(ValidationError("displayName must not be blank".into()));
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self == &ProfilePatch::default()
    }

    /// The fields this patch sets, shaped as a document fragment. `macros` is
    /// always a full triple.
    pub fn to_document(&self) -> Value {
        let mut doc = Map::new();
        if let Some(name) = &self.display_name {
            doc.insert("displayName".into(), Value::from(name.clone()));
        }
        if let Some(email) = &self.email {
            doc.insert("email".into(), Value::from(email.clone()));
        }
        if let Some(goal) = self.fitness_goal {
            doc.insert("fitnessGoal".into(), Value::from(goal.as_str()));
        }
        if let Some(calories) = self.calories_goal {
            doc.insert("caloriesGoal".into(), Value::from(calories));
        }
        if let Some(macros) = self.macros {
            let m = macros.complete();
            doc.insert(
                "macros".into(),
                serde_json::json!({ "protein": m.protein, "carbs": m.carbs, "fat": m.fat }),
            );
        }
        if let Some(done) = self.setup_completed {
            doc.insert("setupCompleted".into(), Value::from(done));
        }
        Value::Object(doc)
    }
}
