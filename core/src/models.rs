use anyhow::{Result, bail};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;

/// The planning week runs Friday through Thursday.
pub const WEEK_ANCHOR: Weekday = Weekday::Fri;

/// Default number of recent consumptions shown per substance.
pub const RECENT_CONSUMPTIONS: i64 = 5;

/// Default number of past productivity entries shown.
pub const PRODUCTIVITY_HISTORY: i64 = 30;

#[derive(Debug, Clone, Serialize)]
pub struct RoutineTemplateItem {
    pub id: i64,
    pub item_name: String,
    pub position: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoutineItem {
    pub id: i64,
    pub date: NaiveDate,
    pub item_name: String,
    pub done: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Reason {
    pub id: i64,
    pub text: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: i64,
    pub date: NaiveDate,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub done: bool,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub date: NaiveDate,
    pub title: String,
    pub time: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Substance {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Consumption {
    pub id: i64,
    pub substance_id: i64,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewConsumption {
    pub substance_id: i64,
    pub date: NaiveDate,
    pub quantity: Option<String>,
    pub note: Option<String>,
}

/// A substance paired with its most recent consumption entries.
#[derive(Debug, Clone, Serialize)]
pub struct SubstanceLog {
    pub substance: Substance,
    pub recent: Vec<Consumption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductivityEntry {
    pub id: i64,
    pub date: NaiveDate,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Objectives {
    pub id: i64,
    pub studies_progress: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub studies_notes: Option<String>,
    pub current_weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_hours: Option<f64>,
    pub food_satisfaction: i64,
}

/// One of the four mutually exclusive objective update groups. Each variant
/// touches only its own columns; the others are left untouched.
#[derive(Debug, Clone)]
pub enum ObjectivesUpdate {
    Studies { progress: i64, notes: Option<String> },
    Weight(f64),
    Sleep(f64),
    Food(i64),
}

#[derive(Debug, Clone, Serialize)]
pub struct ImmigrationStep {
    pub id: i64,
    pub title: String,
    pub done: bool,
    pub position: i64,
}

/// The tasks of one day inside a planning week.
#[derive(Debug, Clone, Serialize)]
pub struct DayPlan {
    pub date: NaiveDate,
    pub tasks: Vec<Task>,
}

/// Reject empty or whitespace-only input, returning the trimmed text.
pub fn validate_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("{field} must not be empty");
    }
    Ok(trimmed.to_string())
}

/// The most recent `anchor` weekday at or before `today`.
///
/// When `today` falls on the anchor day the offset is zero and `today`
/// itself is returned.
#[must_use]
pub fn week_start(today: NaiveDate, anchor: Weekday) -> NaiveDate {
    let back =
        (today.weekday().num_days_from_monday() + 7 - anchor.num_days_from_monday()) % 7;
    today - Duration::days(i64::from(back))
}

/// The 7 consecutive dates starting at the week's anchor day.
#[must_use]
pub fn week_window(today: NaiveDate, anchor: Weekday) -> [NaiveDate; 7] {
    let start = week_start(today, anchor);
    std::array::from_fn(|i| start + Duration::days(i as i64))
}
