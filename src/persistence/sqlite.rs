use super::{PersistenceResult, PlanStore};
use crate::backlog::Lesson;
use crate::calculations::daily_allocator::DayPlan;
use crate::calendar::StudyCalendar;
use crate::params::PlanParameters;
use crate::plan::StudyPlan;
use crate::review::{ReviewEvent, ReviewMap};
use serde::{Deserialize, Serialize};
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::Mutex;

/// Plan-wide fields stored in the single metadata row; the per-day rows hold
/// the allocation itself.
#[derive(Serialize, Deserialize)]
struct PlanHeader {
    params: PlanParameters,
    calendar: StudyCalendar,
    removed_lessons: Vec<Lesson>,
    removed_modules: Vec<String>,
    unallocated: Vec<Lesson>,
    complete: bool,
}

pub struct SqlitePlanStore {
    connection: Mutex<Connection>,
}

impl SqlitePlanStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS plan_metadata (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                header_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS plan_days (
                date TEXT PRIMARY KEY,
                day_json TEXT NOT NULL,
                reviews_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn save_header(&self, tx: &rusqlite::Transaction, plan: &StudyPlan) -> PersistenceResult<()> {
        let header = PlanHeader {
            params: plan.params().clone(),
            calendar: plan.calendar().clone(),
            removed_lessons: plan.removed_lessons().to_vec(),
            removed_modules: plan.removed_modules().to_vec(),
            unallocated: plan.unallocated().to_vec(),
            complete: plan.is_complete(),
        };
        let json = serde_json::to_string(&header)?;
        tx.execute("DELETE FROM plan_metadata", [])?;
        tx.execute(
            "INSERT INTO plan_metadata (id, header_json) VALUES (1, ?1)",
            params![json],
        )?;
        Ok(())
    }

    fn save_days(&self, tx: &rusqlite::Transaction, plan: &StudyPlan) -> PersistenceResult<()> {
        tx.execute("DELETE FROM plan_days", [])?;
        let mut stmt = tx.prepare(
            "INSERT INTO plan_days (date, day_json, reviews_json) VALUES (?1, ?2, ?3)",
        )?;
        for day in plan.days() {
            let reviews: Vec<ReviewEvent> = plan
                .reviews()
                .get(&day.date)
                .cloned()
                .unwrap_or_default();
            let day_json = serde_json::to_string(day)?;
            let reviews_json = serde_json::to_string(&reviews)?;
            stmt.execute(params![
                day.date.format("%Y-%m-%d").to_string(),
                day_json,
                reviews_json
            ])?;
        }
        Ok(())
    }
}

impl PlanStore for SqlitePlanStore {
    fn save_plan(&self, plan: &StudyPlan) -> PersistenceResult<()> {
        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;
        self.save_header(&tx, plan)?;
        self.save_days(&tx, plan)?;
        tx.commit()?;
        Ok(())
    }

    fn load_plan(&self) -> PersistenceResult<Option<StudyPlan>> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");

        let mut stmt = conn.prepare("SELECT header_json FROM plan_metadata WHERE id = 1")?;
        let header_json_opt: Option<String> = stmt.query_row([], |row| row.get(0)).optional()?;

        let Some(header_json) = header_json_opt else {
            return Ok(None);
        };
        let header: PlanHeader = serde_json::from_str(&header_json)?;

        let mut stmt =
            conn.prepare("SELECT day_json, reviews_json FROM plan_days ORDER BY date ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut days: Vec<DayPlan> = Vec::new();
        let mut reviews = ReviewMap::new();
        for row in rows {
            let (day_json, reviews_json) = row?;
            let day: DayPlan = serde_json::from_str(&day_json)?;
            let events: Vec<ReviewEvent> = serde_json::from_str(&reviews_json)?;
            if !events.is_empty() {
                reviews.insert(day.date, events);
            }
            days.push(day);
        }

        Ok(Some(StudyPlan::from_parts(
            header.params,
            header.calendar,
            days,
            reviews,
            header.removed_lessons,
            header.removed_modules,
            header.unallocated,
            header.complete,
        )))
    }
}
