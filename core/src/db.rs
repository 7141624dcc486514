use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use rusqlite::{Connection, OptionalExtension, params};

use crate::models::{
    Consumption, ImmigrationStep, NewConsumption, NewTask, Objectives, ObjectivesUpdate,
    ProductivityEntry, Reason, RoutineItem, RoutineTemplateItem, Substance, Task,
};

/// The fixed morning routine, copied into `routine_daily` once per day.
const ROUTINE_TEMPLATE_DEFAULTS: [&str; 5] = [
    "Shower",
    "Brush teeth",
    "Tidy the room",
    "Check nails",
    "Put on perfume",
];

/// The immigration checklist seeded on first run (Express Entry process).
const IMMIGRATION_STEP_DEFAULTS: [&str; 6] = [
    "Express Entry profile assessment",
    "Language test (IELTS/TEF)",
    "Educational credential assessment (ECA)",
    "Create Express Entry profile",
    "Receive invitation to apply (ITA)",
    "Submit permanent residence application",
];

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        db.seed_defaults()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        db.seed_defaults()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS routine_template (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    item_name TEXT NOT NULL,
                    position INTEGER NOT NULL DEFAULT 0
                );

                CREATE TABLE IF NOT EXISTS routine_daily (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    date TEXT NOT NULL,
                    item_name TEXT NOT NULL,
                    done INTEGER NOT NULL DEFAULT 0
                );

                CREATE TABLE IF NOT EXISTS reasons (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    text TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS tasks (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    date TEXT NOT NULL,
                    title TEXT NOT NULL,
                    time TEXT,
                    done INTEGER NOT NULL DEFAULT 0
                );

                CREATE TABLE IF NOT EXISTS substances (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS consumptions (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    substance_id INTEGER NOT NULL REFERENCES substances(id),
                    date TEXT NOT NULL,
                    quantity TEXT,
                    note TEXT
                );

                CREATE TABLE IF NOT EXISTS productivity (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    date TEXT NOT NULL UNIQUE,
                    score REAL NOT NULL,
                    note TEXT
                );

                CREATE TABLE IF NOT EXISTS objectives (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    studies_progress INTEGER NOT NULL DEFAULT 0,
                    studies_notes TEXT,
                    current_weight REAL NOT NULL DEFAULT 87.0,
                    sleep_hours REAL,
                    food_satisfaction INTEGER NOT NULL DEFAULT 5
                );

                CREATE TABLE IF NOT EXISTS immigration_steps (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    title TEXT NOT NULL,
                    done INTEGER NOT NULL DEFAULT 0,
                    position INTEGER NOT NULL DEFAULT 0
                );

                CREATE INDEX IF NOT EXISTS idx_routine_daily_date ON routine_daily(date);
                CREATE INDEX IF NOT EXISTS idx_tasks_date ON tasks(date);
                CREATE INDEX IF NOT EXISTS idx_consumptions_substance ON consumptions(substance_id);
                CREATE INDEX IF NOT EXISTS idx_productivity_date ON productivity(date);

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    /// Insert the fixed defaults into any table that is still empty.
    ///
    /// Guarded by count-equals-zero checks rather than a migration version,
    /// so re-running against a populated store changes nothing.
    fn seed_defaults(&self) -> Result<()> {
        let templates: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM routine_template", [], |row| row.get(0))?;
        if templates == 0 {
            for (i, item) in ROUTINE_TEMPLATE_DEFAULTS.iter().enumerate() {
                self.conn.execute(
                    "INSERT INTO routine_template (item_name, position) VALUES (?1, ?2)",
                    params![item, i as i64],
                )?;
            }
        }

        let objectives: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM objectives", [], |row| row.get(0))?;
        if objectives == 0 {
            self.conn
                .execute("INSERT INTO objectives DEFAULT VALUES", [])?;
        }

        let steps: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM immigration_steps", [], |row| row.get(0))?;
        if steps == 0 {
            for (i, title) in IMMIGRATION_STEP_DEFAULTS.iter().enumerate() {
                self.conn.execute(
                    "INSERT INTO immigration_steps (title, position) VALUES (?1, ?2)",
                    params![title, i as i64],
                )?;
            }
        }

        Ok(())
    }

    // --- Row mapping helpers ---

    fn parse_date_column(text: &str) -> NaiveDate {
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .unwrap_or_else(|_| NaiveDate::from_ymd_opt(2000, 1, 1).expect("valid date"))
    }

    fn routine_item_from_row(row: &rusqlite::Row) -> rusqlite::Result<RoutineItem> {
        let date_str: String = row.get(1)?;
        Ok(RoutineItem {
            id: row.get(0)?,
            date: Self::parse_date_column(&date_str),
            item_name: row.get(2)?,
            done: row.get(3)?,
        })
    }

    fn task_from_row(row: &rusqlite::Row) -> rusqlite::Result<Task> {
        let date_str: String = row.get(1)?;
        Ok(Task {
            id: row.get(0)?,
            date: Self::parse_date_column(&date_str),
            title: row.get(2)?,
            time: row.get(3)?,
            done: row.get(4)?,
        })
    }

    fn consumption_from_row(row: &rusqlite::Row) -> rusqlite::Result<Consumption> {
        let date_str: String = row.get(2)?;
        Ok(Consumption {
            id: row.get(0)?,
            substance_id: row.get(1)?,
            date: Self::parse_date_column(&date_str),
            quantity: row.get(3)?,
            note: row.get(4)?,
        })
    }

    fn productivity_from_row(row: &rusqlite::Row) -> rusqlite::Result<ProductivityEntry> {
        let date_str: String = row.get(1)?;
        Ok(ProductivityEntry {
            id: row.get(0)?,
            date: Self::parse_date_column(&date_str),
            score: row.get(2)?,
            note: row.get(3)?,
        })
    }

    fn objectives_from_row(row: &rusqlite::Row) -> rusqlite::Result<Objectives> {
        Ok(Objectives {
            id: row.get(0)?,
            studies_progress: row.get(1)?,
            studies_notes: row.get(2)?,
            current_weight: row.get(3)?,
            sleep_hours: row.get(4)?,
            food_satisfaction: row.get(5)?,
        })
    }

    fn step_from_row(row: &rusqlite::Row) -> rusqlite::Result<ImmigrationStep> {
        Ok(ImmigrationStep {
            id: row.get(0)?,
            title: row.get(1)?,
            done: row.get(2)?,
            position: row.get(3)?,
        })
    }

    // --- Routine ---

    pub fn routine_template(&self) -> Result<Vec<RoutineTemplateItem>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, item_name, position FROM routine_template ORDER BY position")?;
        let items = stmt
            .query_map([], |row| {
                Ok(RoutineTemplateItem {
                    id: row.get(0)?,
                    item_name: row.get(1)?,
                    position: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// The checklist for `date`, created from the template on first access.
    ///
    /// Idempotent per day: once the day's rows exist, further calls only
    /// read them back.
    pub fn ensure_routine(&self, date: NaiveDate) -> Result<Vec<RoutineItem>> {
        let date_str = date.format("%Y-%m-%d").to_string();
        let existing: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM routine_daily WHERE date = ?1",
            params![date_str],
            |row| row.get(0),
        )?;

        if existing == 0 {
            for item in self.routine_template()? {
                self.conn.execute(
                    "INSERT INTO routine_daily (date, item_name) VALUES (?1, ?2)",
                    params![date_str, item.item_name],
                )?;
            }
        }

        let mut stmt = self.conn.prepare(
            "SELECT id, date, item_name, done FROM routine_daily WHERE date = ?1 ORDER BY id",
        )?;
        let items = stmt
            .query_map(params![date_str], Self::routine_item_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// Flip one checklist item; returns false when the id does not exist.
    pub fn toggle_routine_item(&self, id: i64) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE routine_daily SET done = NOT done WHERE id = ?1",
            params![id],
        )?;
        Ok(changed > 0)
    }

    // --- Reasons ---

    pub fn list_reasons(&self) -> Result<Vec<Reason>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, text, created_at FROM reasons")?;
        let reasons = stmt
            .query_map([], |row| {
                Ok(Reason {
                    id: row.get(0)?,
                    text: row.get(1)?,
                    created_at: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(reasons)
    }

    pub fn add_reason(&self, text: &str) -> Result<Reason> {
        let now = Local::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO reasons (text, created_at) VALUES (?1, ?2)",
            params![text, now],
        )?;
        let id = self.conn.last_insert_rowid();
        Ok(Reason {
            id,
            text: text.to_string(),
            created_at: now,
        })
    }

    pub fn delete_reason(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM reasons WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    // --- Objectives ---

    /// The singleton objectives row, re-created with defaults if missing.
    ///
    /// Normally unreachable past `seed_defaults`, but safe to call any
    /// number of times — it never creates a second row.
    pub fn objectives(&self) -> Result<Objectives> {
        let existing = self
            .conn
            .query_row(
                "SELECT id, studies_progress, studies_notes, current_weight, sleep_hours,
                        food_satisfaction
                 FROM objectives LIMIT 1",
                [],
                Self::objectives_from_row,
            )
            .optional()?;

        if let Some(obj) = existing {
            return Ok(obj);
        }

        self.conn
            .execute("INSERT INTO objectives DEFAULT VALUES", [])?;
        self.conn
            .query_row(
                "SELECT id, studies_progress, studies_notes, current_weight, sleep_hours,
                        food_satisfaction
                 FROM objectives LIMIT 1",
                [],
                Self::objectives_from_row,
            )
            .context("objectives row missing after insert")
    }

    /// Apply one update group to the singleton row, leaving the other
    /// columns untouched.
    pub fn update_objectives(&self, update: &ObjectivesUpdate) -> Result<Objectives> {
        let current = self.objectives()?;
        match update {
            ObjectivesUpdate::Studies { progress, notes } => {
                self.conn.execute(
                    "UPDATE objectives SET studies_progress = ?1, studies_notes = ?2 WHERE id = ?3",
                    params![progress, notes, current.id],
                )?;
            }
            ObjectivesUpdate::Weight(kg) => {
                self.conn.execute(
                    "UPDATE objectives SET current_weight = ?1 WHERE id = ?2",
                    params![kg, current.id],
                )?;
            }
            ObjectivesUpdate::Sleep(hours) => {
                self.conn.execute(
                    "UPDATE objectives SET sleep_hours = ?1 WHERE id = ?2",
                    params![hours, current.id],
                )?;
            }
            ObjectivesUpdate::Food(score) => {
                self.conn.execute(
                    "UPDATE objectives SET food_satisfaction = ?1 WHERE id = ?2",
                    params![score, current.id],
                )?;
            }
        }
        self.objectives()
    }

    pub fn list_immigration_steps(&self) -> Result<Vec<ImmigrationStep>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, done, position FROM immigration_steps ORDER BY position",
        )?;
        let steps = stmt
            .query_map([], Self::step_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(steps)
    }

    pub fn toggle_immigration_step(&self, id: i64) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE immigration_steps SET done = NOT done WHERE id = ?1",
            params![id],
        )?;
        Ok(changed > 0)
    }

    /// Append a step at the end of the checklist (`position = current count`).
    /// Steps are never deleted, so positions are never renumbered.
    pub fn add_immigration_step(&self, title: &str) -> Result<ImmigrationStep> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM immigration_steps", [], |row| row.get(0))?;
        self.conn.execute(
            "INSERT INTO immigration_steps (title, position) VALUES (?1, ?2)",
            params![title, count],
        )?;
        let id = self.conn.last_insert_rowid();
        Ok(ImmigrationStep {
            id,
            title: title.to_string(),
            done: false,
            position: count,
        })
    }

    // --- Planner ---

    pub fn tasks_for_date(&self, date: NaiveDate) -> Result<Vec<Task>> {
        let date_str = date.format("%Y-%m-%d").to_string();
        let mut stmt = self.conn.prepare(
            "SELECT id, date, title, time, done FROM tasks WHERE date = ?1 ORDER BY id",
        )?;
        let tasks = stmt
            .query_map(params![date_str], Self::task_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    pub fn insert_task(&self, task: &NewTask) -> Result<Task> {
        let date_str = task.date.format("%Y-%m-%d").to_string();
        self.conn.execute(
            "INSERT INTO tasks (date, title, time) VALUES (?1, ?2, ?3)",
            params![date_str, task.title, task.time],
        )?;
        let id = self.conn.last_insert_rowid();
        Ok(Task {
            id,
            date: task.date,
            title: task.title.clone(),
            time: task.time.clone(),
            done: false,
        })
    }

    pub fn toggle_task(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute("UPDATE tasks SET done = NOT done WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    // --- Sobriety ---

    pub fn list_substances(&self) -> Result<Vec<Substance>> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM substances")?;
        let substances = stmt
            .query_map([], |row| {
                Ok(Substance {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(substances)
    }

    pub fn get_substance(&self, id: i64) -> Result<Option<Substance>> {
        let substance = self
            .conn
            .query_row(
                "SELECT id, name FROM substances WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Substance {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(substance)
    }

    pub fn add_substance(&self, name: &str) -> Result<Substance> {
        self.conn
            .execute("INSERT INTO substances (name) VALUES (?1)", params![name])?;
        Ok(Substance {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    /// The `limit` most recent consumptions of one substance, newest date
    /// first. Same-date ties break arbitrarily.
    pub fn recent_consumptions(&self, substance_id: i64, limit: i64) -> Result<Vec<Consumption>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, substance_id, date, quantity, note FROM consumptions
             WHERE substance_id = ?1 ORDER BY date DESC LIMIT ?2",
        )?;
        let consumptions = stmt
            .query_map(params![substance_id, limit], Self::consumption_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(consumptions)
    }

    pub fn insert_consumption(&self, consumption: &NewConsumption) -> Result<Consumption> {
        let date_str = consumption.date.format("%Y-%m-%d").to_string();
        self.conn.execute(
            "INSERT INTO consumptions (substance_id, date, quantity, note) VALUES (?1, ?2, ?3, ?4)",
            params![
                consumption.substance_id,
                date_str,
                consumption.quantity,
                consumption.note
            ],
        )?;
        Ok(Consumption {
            id: self.conn.last_insert_rowid(),
            substance_id: consumption.substance_id,
            date: consumption.date,
            quantity: consumption.quantity.clone(),
            note: consumption.note.clone(),
        })
    }

    // --- Productivity ---

    pub fn productivity_for(&self, date: NaiveDate) -> Result<Option<ProductivityEntry>> {
        let date_str = date.format("%Y-%m-%d").to_string();
        let entry = self
            .conn
            .query_row(
                "SELECT id, date, score, note FROM productivity WHERE date = ?1",
                params![date_str],
                Self::productivity_from_row,
            )
            .optional()?;
        Ok(entry)
    }

    /// Up to `limit` entries strictly before `today`, newest first.
    pub fn productivity_history(&self, today: NaiveDate, limit: i64) -> Result<Vec<ProductivityEntry>> {
        let date_str = today.format("%Y-%m-%d").to_string();
        let mut stmt = self.conn.prepare(
            "SELECT id, date, score, note FROM productivity
             WHERE date < ?1 ORDER BY date DESC LIMIT ?2",
        )?;
        let entries = stmt
            .query_map(params![date_str, limit], Self::productivity_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Insert the day's entry, or overwrite score and note if one exists.
    pub fn upsert_productivity(
        &self,
        date: NaiveDate,
        score: f64,
        note: Option<&str>,
    ) -> Result<ProductivityEntry> {
        let date_str = date.format("%Y-%m-%d").to_string();
        self.conn.execute(
            "INSERT INTO productivity (date, score, note) VALUES (?1, ?2, ?3)
             ON CONFLICT(date) DO UPDATE SET score = excluded.score, note = excluded.note",
            params![date_str, score, note],
        )?;
        self.productivity_for(date)?
            .context("productivity row missing after upsert")
    }

    #[cfg(test)]
    pub(crate) fn count(&self, table: &str) -> i64 {
        self.conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewConsumption, NewTask};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn fresh_store_is_seeded() {
        let db = Database::open_in_memory().unwrap();

        assert_eq!(db.count("routine_template"), 5);
        assert_eq!(db.count("objectives"), 1);
        assert_eq!(db.count("immigration_steps"), 6);

        assert_eq!(db.count("routine_daily"), 0);
        assert_eq!(db.count("reasons"), 0);
        assert_eq!(db.count("tasks"), 0);
        assert_eq!(db.count("substances"), 0);
        assert_eq!(db.count("consumptions"), 0);
        assert_eq!(db.count("productivity"), 0);

        let obj = db.objectives().unwrap();
        assert_eq!(obj.current_weight, 87.0);
        assert_eq!(obj.food_satisfaction, 5);
        assert_eq!(obj.studies_progress, 0);
        assert!(obj.sleep_hours.is_none());
        assert!(obj.studies_notes.is_none());
    }

    #[test]
    fn seeding_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        db.seed_defaults().unwrap();
        db.seed_defaults().unwrap();

        assert_eq!(db.count("routine_template"), 5);
        assert_eq!(db.count("objectives"), 1);
        assert_eq!(db.count("immigration_steps"), 6);
    }

    #[test]
    fn template_is_ordered_by_position() {
        let db = Database::open_in_memory().unwrap();
        let template = db.routine_template().unwrap();
        assert_eq!(template.len(), 5);
        assert_eq!(template[0].item_name, "Shower");
        assert_eq!(template[4].item_name, "Put on perfume");
        for (i, item) in template.iter().enumerate() {
            assert_eq!(item.position, i as i64);
        }
    }

    #[test]
    fn ensure_routine_copies_template_once() {
        let db = Database::open_in_memory().unwrap();
        let day = date(2024, 6, 15);

        let first = db.ensure_routine(day).unwrap();
        assert_eq!(first.len(), 5);
        assert!(first.iter().all(|item| !item.done));
        assert!(first.iter().all(|item| item.date == day));

        // Second call on the same date observes, not duplicates
        let second = db.ensure_routine(day).unwrap();
        assert_eq!(second.len(), 5);
        assert_eq!(db.count("routine_daily"), 5);
    }

    #[test]
    fn ensure_routine_is_per_date() {
        let db = Database::open_in_memory().unwrap();
        db.ensure_routine(date(2024, 6, 15)).unwrap();
        db.ensure_routine(date(2024, 6, 16)).unwrap();
        assert_eq!(db.count("routine_daily"), 10);
    }

    #[test]
    fn toggle_routine_item_flips_and_reports() {
        let db = Database::open_in_memory().unwrap();
        let items = db.ensure_routine(date(2024, 6, 15)).unwrap();
        let id = items[0].id;

        assert!(db.toggle_routine_item(id).unwrap());
        let items = db.ensure_routine(date(2024, 6, 15)).unwrap();
        assert!(items[0].done);

        assert!(db.toggle_routine_item(id).unwrap());
        let items = db.ensure_routine(date(2024, 6, 15)).unwrap();
        assert!(!items[0].done);

        // Unknown id is a reported no-op
        assert!(!db.toggle_routine_item(9999).unwrap());
    }

    #[test]
    fn reasons_add_list_delete() {
        let db = Database::open_in_memory().unwrap();
        let reason = db.add_reason("For my family").unwrap();
        db.add_reason("For my health").unwrap();

        let all = db.list_reasons().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].text, "For my family");
        assert!(!all[0].created_at.is_empty());

        assert!(db.delete_reason(reason.id).unwrap());
        assert!(!db.delete_reason(reason.id).unwrap());
        assert_eq!(db.list_reasons().unwrap().len(), 1);
    }

    #[test]
    fn objectives_never_duplicates() {
        let db = Database::open_in_memory().unwrap();
        let first = db.objectives().unwrap();
        for _ in 0..10 {
            let again = db.objectives().unwrap();
            assert_eq!(again.id, first.id);
        }
        assert_eq!(db.count("objectives"), 1);
    }

    #[test]
    fn objectives_update_groups_are_independent() {
        let db = Database::open_in_memory().unwrap();

        let obj = db
            .update_objectives(&ObjectivesUpdate::Studies {
                progress: 40,
                notes: Some("Chapter 3 done".to_string()),
            })
            .unwrap();
        assert_eq!(obj.studies_progress, 40);
        assert_eq!(obj.studies_notes.as_deref(), Some("Chapter 3 done"));
        assert_eq!(obj.current_weight, 87.0);

        let obj = db.update_objectives(&ObjectivesUpdate::Weight(84.5)).unwrap();
        assert_eq!(obj.current_weight, 84.5);
        assert_eq!(obj.studies_progress, 40);

        let obj = db.update_objectives(&ObjectivesUpdate::Sleep(7.5)).unwrap();
        assert_eq!(obj.sleep_hours, Some(7.5));

        let obj = db.update_objectives(&ObjectivesUpdate::Food(8)).unwrap();
        assert_eq!(obj.food_satisfaction, 8);
        assert_eq!(obj.current_weight, 84.5);
        assert_eq!(db.count("objectives"), 1);
    }

    #[test]
    fn immigration_step_append_goes_last() {
        let db = Database::open_in_memory().unwrap();
        let step = db.add_immigration_step("Medical exam").unwrap();
        assert_eq!(step.position, 6);

        let steps = db.list_immigration_steps().unwrap();
        assert_eq!(steps.len(), 7);
        assert_eq!(steps.last().unwrap().title, "Medical exam");
        assert_eq!(steps.last().unwrap().position, 6);
    }

    #[test]
    fn immigration_step_toggle() {
        let db = Database::open_in_memory().unwrap();
        let steps = db.list_immigration_steps().unwrap();
        let id = steps[0].id;

        assert!(db.toggle_immigration_step(id).unwrap());
        assert!(db.list_immigration_steps().unwrap()[0].done);
        assert!(!db.toggle_immigration_step(9999).unwrap());
    }

    #[test]
    fn tasks_insert_and_filter_by_date() {
        let db = Database::open_in_memory().unwrap();
        let d1 = date(2024, 6, 14);
        let d2 = date(2024, 6, 15);

        db.insert_task(&NewTask {
            date: d1,
            title: "Call the bank".to_string(),
            time: Some("09:30".to_string()),
        })
        .unwrap();
        db.insert_task(&NewTask {
            date: d2,
            title: "Gym".to_string(),
            time: None,
        })
        .unwrap();

        let tasks = db.tasks_for_date(d1).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Call the bank");
        assert_eq!(tasks[0].time.as_deref(), Some("09:30"));
        assert!(!tasks[0].done);

        assert_eq!(db.tasks_for_date(d2).unwrap().len(), 1);
        assert!(db.tasks_for_date(date(2024, 6, 16)).unwrap().is_empty());
    }

    #[test]
    fn duplicate_tasks_are_allowed() {
        let db = Database::open_in_memory().unwrap();
        let task = NewTask {
            date: date(2024, 6, 15),
            title: "Gym".to_string(),
            time: None,
        };
        db.insert_task(&task).unwrap();
        db.insert_task(&task).unwrap();
        assert_eq!(db.tasks_for_date(date(2024, 6, 15)).unwrap().len(), 2);
    }

    #[test]
    fn toggle_task_flips_and_reports() {
        let db = Database::open_in_memory().unwrap();
        let task = db
            .insert_task(&NewTask {
                date: date(2024, 6, 15),
                title: "Gym".to_string(),
                time: None,
            })
            .unwrap();

        assert!(db.toggle_task(task.id).unwrap());
        assert!(db.tasks_for_date(task.date).unwrap()[0].done);
        assert!(!db.toggle_task(9999).unwrap());
    }

    #[test]
    fn recent_consumptions_limit_and_order() {
        let db = Database::open_in_memory().unwrap();
        let substance = db.add_substance("Nicotine").unwrap();

        // 8 entries, one per day
        for day in 1..=8 {
            db.insert_consumption(&NewConsumption {
                substance_id: substance.id,
                date: date(2024, 6, day),
                quantity: None,
                note: None,
            })
            .unwrap();
        }

        let recent = db.recent_consumptions(substance.id, 5).unwrap();
        assert_eq!(recent.len(), 5);
        let dates: Vec<NaiveDate> = recent.iter().map(|c| c.date).collect();
        assert_eq!(
            dates,
            vec![
                date(2024, 6, 8),
                date(2024, 6, 7),
                date(2024, 6, 6),
                date(2024, 6, 5),
                date(2024, 6, 4),
            ]
        );
    }

    #[test]
    fn recent_consumptions_returns_fewer_when_short() {
        let db = Database::open_in_memory().unwrap();
        let substance = db.add_substance("Alcohol").unwrap();
        db.insert_consumption(&NewConsumption {
            substance_id: substance.id,
            date: date(2024, 6, 1),
            quantity: Some("1 beer".to_string()),
            note: Some("Birthday party".to_string()),
        })
        .unwrap();

        let recent = db.recent_consumptions(substance.id, 5).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].quantity.as_deref(), Some("1 beer"));
        assert_eq!(recent[0].note.as_deref(), Some("Birthday party"));
    }

    #[test]
    fn substance_lookup() {
        let db = Database::open_in_memory().unwrap();
        let substance = db.add_substance("Caffeine").unwrap();
        assert_eq!(db.get_substance(substance.id).unwrap().unwrap().name, "Caffeine");
        assert!(db.get_substance(9999).unwrap().is_none());
    }

    #[test]
    fn productivity_upsert_keeps_one_row_per_date() {
        let db = Database::open_in_memory().unwrap();
        let day = date(2024, 6, 15);

        db.upsert_productivity(day, 6.0, Some("slow start")).unwrap();
        let entry = db.upsert_productivity(day, 8.5, Some("better afternoon")).unwrap();

        assert_eq!(db.count("productivity"), 1);
        assert_eq!(entry.score, 8.5);
        assert_eq!(entry.note.as_deref(), Some("better afternoon"));
    }

    #[test]
    fn productivity_for_absent_date_is_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.productivity_for(date(2024, 6, 15)).unwrap().is_none());
    }

    #[test]
    fn productivity_history_excludes_today_and_caps() {
        let db = Database::open_in_memory().unwrap();
        let today = date(2024, 6, 15);

        db.upsert_productivity(today, 9.0, None).unwrap();
        for day in 1..=14 {
            db.upsert_productivity(date(2024, 6, day), f64::from(day), None)
                .unwrap();
        }

        let history = db.productivity_history(today, 30).unwrap();
        assert_eq!(history.len(), 14);
        assert!(history.iter().all(|e| e.date < today));
        assert_eq!(history[0].date, date(2024, 6, 14));

        let capped = db.productivity_history(today, 5).unwrap();
        assert_eq!(capped.len(), 5);
        assert_eq!(capped[0].date, date(2024, 6, 14));
        assert_eq!(capped[4].date, date(2024, 6, 10));
    }
}
