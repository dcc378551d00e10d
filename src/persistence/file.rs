use super::{PersistenceError, PersistenceResult};
use crate::backlog::{LessonRecord, WeightTable};
use crate::plan::StudyPlan;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Load the ordered lesson list from a CSV file with the columns
/// `lesson,module,duration_min`.
pub fn load_lessons_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<LessonRecord>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut records = Vec::new();
    for record in reader.deserialize::<LessonRecord>() {
        records.push(record?);
    }

    if records.is_empty() {
        return Err(PersistenceError::InvalidData(
            "lesson file contained no lessons".into(),
        ));
    }

    super::validate_lessons(&records)?;
    Ok(records)
}

/// Load the module weight table from a CSV file. The first column must be
/// `module`; every further column is one exam type with integer weights.
pub fn load_weight_table_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<WeightTable> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader.headers()?.clone();
    let mut columns = headers.iter();
    match columns.next() {
        Some("module") => {}
        other => {
            return Err(PersistenceError::InvalidData(format!(
                "weight table must start with a 'module' column, found '{}'",
                other.unwrap_or("")
            )));
        }
    }
    let exam_types: Vec<String> = columns.map(str::to_string).collect();
    if exam_types.is_empty() {
        return Err(PersistenceError::InvalidData(
            "weight table has no exam type columns".into(),
        ));
    }

    let mut table = WeightTable::new(exam_types);
    for record in reader.records() {
        let record = record?;
        let mut fields = record.iter();
        let module = fields.next().unwrap_or("").trim();
        if module.is_empty() {
            return Err(PersistenceError::InvalidData(
                "weight table row with empty module name".into(),
            ));
        }

        let mut weights = Vec::with_capacity(record.len().saturating_sub(1));
        for field in fields {
            let weight: i32 = field.trim().parse().map_err(|err| {
                PersistenceError::InvalidData(format!(
                    "invalid weight '{field}' for module '{module}': {err}"
                ))
            })?;
            if weight < 0 {
                return Err(PersistenceError::InvalidData(format!(
                    "module '{module}' has negative weight {weight}"
                )));
            }
            weights.push(weight);
        }

        table
            .insert(module, weights)
            .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
    }

    Ok(table)
}

pub fn save_plan_to_json<P: AsRef<Path>>(plan: &StudyPlan, path: P) -> PersistenceResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, plan)?;
    Ok(())
}

pub fn load_plan_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<StudyPlan> {
    let file = File::open(path)?;
    let plan: StudyPlan = serde_json::from_reader(file)?;
    Ok(plan)
}

/// One allocated lesson in the flat CSV export consumed by the rendering
/// collaborators. Days without lessons produce no rows.
#[derive(Serialize, Deserialize)]
struct PlanCsvRecord {
    week: i64,
    date: String,
    phase: String,
    module: String,
    lesson: String,
    duration_min: i64,
    questions_min: i64,
    review_min: i64,
}

pub fn save_plan_to_csv<P: AsRef<Path>>(plan: &StudyPlan, path: P) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for day in plan.days() {
        let week = plan.calendar().week_number(day.date).unwrap_or(0);
        for lesson in &day.lessons {
            writer.serialize(PlanCsvRecord {
                week,
                date: format_date(day.date),
                phase: day.phase.as_str().to_string(),
                module: lesson.module.clone(),
                lesson: lesson.name.clone(),
                duration_min: lesson.duration_min,
                questions_min: day.questions_min,
                review_min: day.review_min,
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
