use serde::Deserialize;

/// Profile upsert payload. Enum-ish fields arrive as free strings from
/// the client and are parsed leniently, falling back with a logged
/// warning rather than rejecting the save.
#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub activity_level: String,
    pub fitness_goal: String,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
}
