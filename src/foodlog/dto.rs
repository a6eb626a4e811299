use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct NewEntryRequest {
    /// Absent id means "create"; a known id replaces the stored entry.
    pub id: Option<String>,
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
    pub meal_type: Option<String>,
    /// RFC 3339 instant; the log date is derived from it.
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: String,
    pub end: String,
}
