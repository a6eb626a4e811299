use serde::{Deserialize, Serialize};
use tracing::warn;

pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
pub const KCAL_PER_G_CARBS: f64 = 4.0;
pub const KCAL_PER_G_FAT: f64 = 9.0;

const DEFAULT_WEIGHT_KG: f64 = 70.0;
const DEFAULT_HEIGHT_CM: f64 = 170.0;
const KCAL_PER_STEP_PER_KG: f64 = 0.0005;
const STRIDE_HEIGHT_FACTOR: f64 = 0.42;
const WATER_L_PER_KG: f64 = 0.033;
const MIN_CALORIE_GOAL: f64 = 1200.0;
const MAX_SURPLUS_KCAL: f64 = 1000.0;
const FAT_MIN_G_PER_KG: f64 = 0.8;
const FAT_FRACTION_OF_CALORIES: f64 = 0.25;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Self::Male,
            "female" | "f" => Self::Female,
            "other" => Self::Other,
            unknown => {
                warn!(gender = %unknown, "unknown gender, defaulting to other");
                Self::Other
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "sedentary" => Self::Sedentary,
            "light" | "lightly_active" => Self::Light,
            "moderate" | "moderately_active" => Self::Moderate,
            "active" => Self::Active,
            "very_active" => Self::VeryActive,
            unknown => {
                warn!(activity_level = %unknown, "unknown activity level, defaulting to sedentary");
                Self::Sedentary
            }
        }
    }

    /// TDEE multiplier over BMR.
    pub fn factor(self) -> f64 {
        match self {
            Self::Sedentary => 1.2,
            Self::Light => 1.375,
            Self::Moderate => 1.55,
            Self::Active => 1.725,
            Self::VeryActive => 1.9,
        }
    }

    fn water_factor(self) -> f64 {
        match self {
            Self::Sedentary => 1.0,
            Self::Light => 1.1,
            Self::Moderate => 1.2,
            Self::Active => 1.3,
            Self::VeryActive => 1.4,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FitnessGoal {
    Lose,
    Maintain,
    Gain,
}

impl FitnessGoal {
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "lose" | "lose_weight" => Self::Lose,
            "maintain" => Self::Maintain,
            "gain" | "gain_weight" | "build_muscle" => Self::Gain,
            unknown => {
                warn!(fitness_goal = %unknown, "unknown fitness goal, defaulting to maintain");
                Self::Maintain
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct MacroGoals {
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

/// Body Mass Index, rounded to one decimal.
pub fn calculate_bmi(weight_kg: f64, height_cm: f64) -> f64 {
    if weight_kg <= 0.0 || height_cm <= 0.0 {
        warn!(weight_kg, height_cm, "bmi: invalid input, returning 0");
        return 0.0;
    }
    let height_m = height_cm / 100.0;
    let bmi = weight_kg / (height_m * height_m);
    (bmi * 10.0).round() / 10.0
}

/// Resting energy expenditure per Mifflin-St Jeor (1990).
///
/// Policy: `other` uses the female offset.
pub fn calculate_bmr(weight_kg: f64, height_cm: f64, age: u32, gender: Gender) -> f64 {
    if weight_kg <= 0.0 || height_cm <= 0.0 || age == 0 {
        warn!(weight_kg, height_cm, age, "bmr: invalid input, returning 0");
        return 0.0;
    }
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    let offset = match gender {
        Gender::Male => 5.0,
        Gender::Female | Gender::Other => -161.0,
    };
    base + offset
}

/// Total daily energy expenditure: BMR scaled by the activity factor.
pub fn calculate_tdee(bmr: f64, activity: ActivityLevel) -> f64 {
    if bmr <= 0.0 {
        warn!(bmr, "tdee: invalid bmr, returning 0");
        return 0.0;
    }
    bmr * activity.factor()
}

/// Daily calorie target for the fitness goal.
///
/// Deficits never go below 1200 kcal, surpluses never exceed TDEE + 1000.
pub fn calculate_calorie_goal(tdee: f64, goal: FitnessGoal) -> f64 {
    if tdee <= 0.0 {
        warn!(tdee, "calorie goal: invalid tdee, returning 0");
        return 0.0;
    }
    match goal {
        FitnessGoal::Lose => (tdee * 0.8).round().max(MIN_CALORIE_GOAL),
        FitnessGoal::Maintain => tdee,
        FitnessGoal::Gain => (tdee * 1.1).round().min(tdee + MAX_SURPLUS_KCAL),
    }
}

/// Splits the calorie goal into whole-gram macro targets.
///
/// Protein scales with body weight per goal, fat takes the larger of a
/// 0.8 g/kg floor and a quarter of calories, carbs absorb the remainder
/// (never negative). Protein and fat are rounded before the carb
/// remainder is taken, keeping `4p + 4c + 9f` within rounding tolerance
/// of the goal whenever the carb floor is not hit.
pub fn calculate_macro_goals(calorie_goal: f64, goal: FitnessGoal, weight_kg: f64) -> MacroGoals {
    if calorie_goal <= 0.0 || weight_kg <= 0.0 {
        warn!(calorie_goal, weight_kg, "macro goals: invalid input, returning zeros");
        return MacroGoals::default();
    }
    let protein_per_kg = match goal {
        FitnessGoal::Lose => 2.2,
        FitnessGoal::Maintain => 1.8,
        FitnessGoal::Gain => 2.0,
    };
    let protein_g = (weight_kg * protein_per_kg).round();
    let fat_g = (weight_kg * FAT_MIN_G_PER_KG)
        .max(calorie_goal * FAT_FRACTION_OF_CALORIES / KCAL_PER_G_FAT)
        .round();
    let remaining =
        calorie_goal - protein_g * KCAL_PER_G_PROTEIN - fat_g * KCAL_PER_G_FAT;
    let carbs_g = (remaining / KCAL_PER_G_CARBS).round().max(0.0);
    MacroGoals {
        protein_g,
        carbs_g,
        fat_g,
    }
}

/// Linear step-to-calorie model; weight defaults to 70 kg when unset.
pub fn calculate_calories_burned(steps: u32, weight_kg: Option<f64>) -> f64 {
    let weight = weight_kg.filter(|w| *w > 0.0).unwrap_or(DEFAULT_WEIGHT_KG);
    f64::from(steps) * weight * KCAL_PER_STEP_PER_KG
}

/// Distance covered in km, stride estimated from height (default 170 cm).
pub fn steps_to_distance_km(steps: u32, height_cm: Option<f64>) -> f64 {
    let height = height_cm.filter(|h| *h > 0.0).unwrap_or(DEFAULT_HEIGHT_CM);
    let stride_m = STRIDE_HEIGHT_FACTOR * height / 100.0;
    f64::from(steps) * stride_m / 1000.0
}

/// Daily water target in liters, scaled by activity, rounded to 2 decimals.
pub fn calculate_water_intake(weight_kg: f64, activity: Option<ActivityLevel>) -> f64 {
    if weight_kg <= 0.0 {
        warn!(weight_kg, "water intake: invalid weight, returning 0");
        return 0.0;
    }
    let factor = activity.unwrap_or(ActivityLevel::Sedentary).water_factor();
    let liters = weight_kg * WATER_L_PER_KG * factor;
    (liters * 100.0).round() / 100.0
}
