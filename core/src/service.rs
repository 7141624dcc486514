use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;

use crate::db::Database;
use crate::models::{
    Consumption, DayPlan, ImmigrationStep, NewConsumption, NewTask, Objectives, ObjectivesUpdate,
    PRODUCTIVITY_HISTORY, ProductivityEntry, RECENT_CONSUMPTIONS, Reason, RoutineItem, Substance,
    SubstanceLog, Task, WEEK_ANCHOR, validate_text, week_window,
};

/// One facade over the store, one method group per feature.
///
/// Dates arriving as raw strings from a boundary are parsed here
/// (`%Y-%m-%d`); a malformed date is an error for the caller to surface.
pub struct TrackerService {
    db: Database,
}

impl TrackerService {
    pub fn new(db_path: &Path) -> Result<Self> {
        let db = Database::open(db_path)?;
        Ok(Self { db })
    }

    pub fn new_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self { db })
    }

    // --- Routine ---

    pub fn routine_for(&self, date: NaiveDate) -> Result<Vec<RoutineItem>> {
        self.db.ensure_routine(date)
    }

    pub fn toggle_routine_item(&self, id: i64) -> Result<bool> {
        self.db.toggle_routine_item(id)
    }

    // --- Reasons ---

    pub fn list_reasons(&self) -> Result<Vec<Reason>> {
        self.db.list_reasons()
    }

    pub fn add_reason(&self, text: &str) -> Result<Reason> {
        let text = validate_text("reason text", text)?;
        self.db.add_reason(&text)
    }

    pub fn delete_reason(&self, id: i64) -> Result<bool> {
        self.db.delete_reason(id)
    }

    // --- Objectives ---

    pub fn objectives(&self) -> Result<Objectives> {
        self.db.objectives()
    }

    pub fn update_objectives(&self, update: &ObjectivesUpdate) -> Result<Objectives> {
        self.db.update_objectives(update)
    }

    pub fn list_immigration_steps(&self) -> Result<Vec<ImmigrationStep>> {
        self.db.list_immigration_steps()
    }

    pub fn toggle_immigration_step(&self, id: i64) -> Result<bool> {
        self.db.toggle_immigration_step(id)
    }

    pub fn add_immigration_step(&self, title: &str) -> Result<ImmigrationStep> {
        let title = validate_text("step title", title)?;
        self.db.add_immigration_step(&title)
    }

    // --- Planner ---

    /// The Friday-to-Thursday window around `today`, each day paired with
    /// its tasks in window order.
    pub fn plan_week(&self, today: NaiveDate) -> Result<Vec<DayPlan>> {
        week_window(today, WEEK_ANCHOR)
            .into_iter()
            .map(|date| {
                Ok(DayPlan {
                    date,
                    tasks: self.db.tasks_for_date(date)?,
                })
            })
            .collect()
    }

    pub fn add_task(&self, date: &str, title: &str, time: Option<String>) -> Result<Task> {
        let date = parse_date(date)?;
        let title = validate_text("task title", title)?;
        self.db.insert_task(&NewTask { date, title, time })
    }

    pub fn toggle_task(&self, id: i64) -> Result<bool> {
        self.db.toggle_task(id)
    }

    // --- Sobriety ---

    pub fn list_substances(&self) -> Result<Vec<Substance>> {
        self.db.list_substances()
    }

    pub fn get_substance(&self, id: i64) -> Result<Option<Substance>> {
        self.db.get_substance(id)
    }

    pub fn add_substance(&self, name: &str) -> Result<Substance> {
        let name = validate_text("substance name", name)?;
        self.db.add_substance(&name)
    }

    pub fn recent_consumptions(&self, substance_id: i64, limit: i64) -> Result<Vec<Consumption>> {
        self.db.recent_consumptions(substance_id, limit)
    }

    pub fn add_consumption(
        &self,
        substance_id: i64,
        date: &str,
        quantity: Option<String>,
        note: Option<String>,
    ) -> Result<Consumption> {
        let date = parse_date(date)?;
        self.db.insert_consumption(&NewConsumption {
            substance_id,
            date,
            quantity,
            note,
        })
    }

    /// Every substance paired with its most recent consumptions — the
    /// sobriety page payload.
    pub fn sobriety_overview(&self) -> Result<Vec<SubstanceLog>> {
        self.db
            .list_substances()?
            .into_iter()
            .map(|substance| {
                let recent = self
                    .db
                    .recent_consumptions(substance.id, RECENT_CONSUMPTIONS)?;
                Ok(SubstanceLog { substance, recent })
            })
            .collect()
    }

    // --- Productivity ---

    pub fn productivity_for(&self, date: NaiveDate) -> Result<Option<ProductivityEntry>> {
        self.db.productivity_for(date)
    }

    pub fn productivity_history(&self, today: NaiveDate) -> Result<Vec<ProductivityEntry>> {
        self.db.productivity_history(today, PRODUCTIVITY_HISTORY)
    }

    pub fn save_productivity(
        &self,
        date: &str,
        score: f64,
        note: Option<&str>,
    ) -> Result<ProductivityEntry> {
        let date = parse_date(date)?;
        self.db.upsert_productivity(date, score, note)
    }
}

fn parse_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("Invalid date '{date}'. Use YYYY-MM-DD"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn routine_ensure_is_idempotent_through_service() {
        let svc = TrackerService::new_in_memory().unwrap();
        let day = date(2024, 6, 15);

        assert_eq!(svc.routine_for(day).unwrap().len(), 5);
        assert_eq!(svc.routine_for(day).unwrap().len(), 5);
    }

    #[test]
    fn add_task_rejects_bad_date() {
        let svc = TrackerService::new_in_memory().unwrap();
        assert!(svc.add_task("not-a-date", "Gym", None).is_err());
        assert!(svc.add_task("2024-13-40", "Gym", None).is_err());
        assert!(svc.add_task("2024-06-15", "Gym", None).is_ok());
    }

    #[test]
    fn add_task_rejects_blank_title() {
        let svc = TrackerService::new_in_memory().unwrap();
        assert!(svc.add_task("2024-06-15", "   ", None).is_err());
    }

    #[test]
    fn add_reason_rejects_blank_text() {
        let svc = TrackerService::new_in_memory().unwrap();
        assert!(svc.add_reason("  ").is_err());
        assert!(svc.add_reason("For my future").is_ok());
    }

    #[test]
    fn plan_week_groups_tasks_in_window_order() {
        let svc = TrackerService::new_in_memory().unwrap();
        // Monday 2024-06-17 → window is Friday 06-14 .. Thursday 06-20
        let monday = date(2024, 6, 17);

        svc.add_task("2024-06-14", "Groceries", None).unwrap();
        svc.add_task("2024-06-20", "Laundry", Some("18:00".to_string()))
            .unwrap();
        // Outside the window
        svc.add_task("2024-06-21", "Next week", None).unwrap();

        let week = svc.plan_week(monday).unwrap();
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, date(2024, 6, 14));
        assert_eq!(week[6].date, date(2024, 6, 20));

        assert_eq!(week[0].tasks.len(), 1);
        assert_eq!(week[0].tasks[0].title, "Groceries");
        assert_eq!(week[6].tasks.len(), 1);
        assert_eq!(week[6].tasks[0].time.as_deref(), Some("18:00"));
        for day in &week[1..6] {
            assert!(day.tasks.is_empty());
        }
    }

    #[test]
    fn save_productivity_parses_and_upserts() {
        let svc = TrackerService::new_in_memory().unwrap();

        assert!(svc.save_productivity("garbage", 5.0, None).is_err());

        svc.save_productivity("2024-06-15", 6.0, None).unwrap();
        let entry = svc
            .save_productivity("2024-06-15", 8.0, Some("good day"))
            .unwrap();
        assert_eq!(entry.score, 8.0);

        let today = date(2024, 6, 15);
        assert!(svc.productivity_history(today).unwrap().is_empty());
        assert_eq!(svc.productivity_for(today).unwrap().unwrap().score, 8.0);
    }

    #[test]
    fn add_consumption_rejects_bad_date() {
        let svc = TrackerService::new_in_memory().unwrap();
        let substance = svc.add_substance("Nicotine").unwrap();
        assert!(
            svc.add_consumption(substance.id, "15/06/2024", None, None)
                .is_err()
        );
        assert!(
            svc.add_consumption(substance.id, "2024-06-15", None, None)
                .is_ok()
        );
    }

    #[test]
    fn sobriety_overview_pairs_substances_with_recent() {
        let svc = TrackerService::new_in_memory().unwrap();
        let nicotine = svc.add_substance("Nicotine").unwrap();
        svc.add_substance("Alcohol").unwrap();

        for day in 1..=8 {
            svc.add_consumption(nicotine.id, &format!("2024-06-{day:02}"), None, None)
                .unwrap();
        }

        let overview = svc.sobriety_overview().unwrap();
        assert_eq!(overview.len(), 2);
        assert_eq!(overview[0].substance.name, "Nicotine");
        assert_eq!(overview[0].recent.len(), 5);
        assert_eq!(overview[0].recent[0].date, date(2024, 6, 8));
        assert!(overview[1].recent.is_empty());
    }

    #[test]
    fn objectives_roundtrip_through_service() {
        let svc = TrackerService::new_in_memory().unwrap();
        let obj = svc.objectives().unwrap();
        assert_eq!(obj.current_weight, 87.0);

        let obj = svc
            .update_objectives(&ObjectivesUpdate::Weight(85.0))
            .unwrap();
        assert_eq!(obj.current_weight, 85.0);

        let steps = svc.list_immigration_steps().unwrap();
        assert_eq!(steps.len(), 6);
        assert!(svc.toggle_immigration_step(steps[0].id).unwrap());
        assert!(svc.add_immigration_step("  ").is_err());
    }
}
