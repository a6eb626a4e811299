use serde::{Deserialize, Serialize};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::warn;

/// `YYYY-MM-DD`, the partition key format. Lexicographic order on these
/// strings is calendar order.
pub const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    #[default]
    Snack,
}

impl MealType {
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Self::Breakfast,
            "lunch" => Self::Lunch,
            "dinner" => Self::Dinner,
            "snack" => Self::Snack,
            unknown => {
                warn!(meal_type = %unknown, "unknown meal type, defaulting to snack");
                Self::Snack
            }
        }
    }
}

/// One logged food item. Missing numeric fields deserialize to 0 so a
/// partially written blob still loads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FoodLogEntry {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub fiber: f64,
    #[serde(default)]
    pub sugar: f64,
    #[serde(default)]
    pub meal_type: MealType,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl FoodLogEntry {
    /// Partition key: the calendar date of the timestamp in its recorded
    /// offset, so derivation is deterministic from the stored string.
    pub fn log_date(&self) -> String {
        let date = self.timestamp.date();
        format!(
            "{:04}-{:02}-{:02}",
            date.year(),
            u8::from(date.month()),
            date.day()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn log_date_uses_recorded_offset() {
        let entry = FoodLogEntry {
            id: "a".into(),
            name: "toast".into(),
            calories: 120.0,
            protein: 4.0,
            carbs: 20.0,
            fat: 2.0,
            fiber: 1.0,
            sugar: 1.0,
            meal_type: MealType::Breakfast,
            timestamp: datetime!(2024-01-01 23:30 -5),
        };
        // 04:30 UTC next day, but the recorded local date wins
        assert_eq!(entry.log_date(), "2024-01-01");
    }

    #[test]
    fn missing_numeric_fields_default_to_zero() {
        let entry: FoodLogEntry = serde_json::from_str(
            r#"{"id":"x","name":"apple","timestamp":"2024-03-05T12:00:00Z"}"#,
        )
        .expect("entry should parse");
        assert_eq!(entry.calories, 0.0);
        assert_eq!(entry.sugar, 0.0);
        assert_eq!(entry.meal_type, MealType::Snack);
        assert_eq!(entry.log_date(), "2024-03-05");
    }
}
