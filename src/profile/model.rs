use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::metabolism::calc::{ActivityLevel, FitnessGoal, Gender, MacroGoals};

/// The single user's profile, persisted as one JSON blob. The derived
/// block is recomputed on every save, never edited directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub activity_level: ActivityLevel,
    pub fitness_goal: FitnessGoal,
    #[serde(default)]
    pub dietary_restrictions: BTreeSet<String>,

    // derived
    pub bmi: f64,
    pub bmr: f64,
    pub tdee: f64,
    pub calorie_goal: f64,
    pub macro_goals: MacroGoals,
    pub water_l: f64,
}
