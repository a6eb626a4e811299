use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct StepsQuery {
    pub steps: u32,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct StepsReport {
    pub steps: u32,
    pub calories_burned: f64,
    pub distance_km: f64,
}
