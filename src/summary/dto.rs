use serde::Serialize;

use super::services::DailyAggregate;

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub date: String,
    #[serde(flatten)]
    pub totals: DailyAggregate,
}
