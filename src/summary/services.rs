use serde::Serialize;

use crate::foodlog::entry::FoodLogEntry;
use crate::metabolism::calc::{KCAL_PER_G_CARBS, KCAL_PER_G_FAT, KCAL_PER_G_PROTEIN};

/// A day's consumed totals against the calorie goal. Percentages are each
/// macro's share of total macro calories (4/4/9 kcal per gram), all zero
/// when nothing with macros was logged.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DailyAggregate {
    pub calories_consumed: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
    pub sugar_g: f64,
    pub calories_goal: f64,
    pub calories_remaining: f64,
    pub protein_percent: u32,
    pub carbs_percent: u32,
    pub fat_percent: u32,
}

/// Pure fold of a day's entries plus the calorie goal. Never fails; an
/// empty day against a zero goal is simply all zeros.
pub fn aggregate(entries: &[FoodLogEntry], calorie_goal: f64) -> DailyAggregate {
    let mut agg = DailyAggregate {
        calories_goal: calorie_goal,
        ..DailyAggregate::default()
    };
    for e in entries {
        agg.calories_consumed += e.calories;
        agg.protein_g += e.protein;
        agg.carbs_g += e.carbs;
        agg.fat_g += e.fat;
        agg.fiber_g += e.fiber;
        agg.sugar_g += e.sugar;
    }
    agg.calories_remaining = (calorie_goal - agg.calories_consumed).max(0.0);

    let protein_kcal = agg.protein_g * KCAL_PER_G_PROTEIN;
    let carbs_kcal = agg.carbs_g * KCAL_PER_G_CARBS;
    let fat_kcal = agg.fat_g * KCAL_PER_G_FAT;
    let total_kcal = protein_kcal + carbs_kcal + fat_kcal;
    if total_kcal > 0.0 {
        agg.protein_percent = (protein_kcal / total_kcal * 100.0).round() as u32;
        agg.carbs_percent = (carbs_kcal / total_kcal * 100.0).round() as u32;
        agg.fat_percent = (fat_kcal / total_kcal * 100.0).round() as u32;
    }
    agg
}
