use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily physical health values typed in by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressInput {
    pub steps: u32,
    pub hours_slept: f32,
    /// Free-form quality label such as "Good", "Okay" or "Poor".
    pub sleep_quality: String,
}

/// A row of the progress table.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProgressRecord {
    pub user_id: String,
    /// Serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub steps: u32,
    pub hours_slept: f32,
    pub sleep_quality: String,
}

impl ProgressRecord {
    pub fn from_input(user_id: impl Into<String>, date: NaiveDate, input: ProgressInput) -> Self {
        Self {
            user_id: user_id.into(),
            date,
            steps: input.steps,
            hours_slept: input.hours_slept,
            sleep_quality: input.sleep_quality,
        }
    }
}
