use crate::backlog::LessonRecord;
use crate::plan::StudyPlan;
use serde_json::Error as SerdeJsonError;
use std::collections::HashSet;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum PersistenceError {
    Serialization(SerdeJsonError),
    Io(io::Error),
    #[cfg(feature = "sqlite")]
    Sqlite(rusqlite::Error),
    Csv(csv::Error),
    InvalidData(String),
    NotFound,
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Serialization(err) => write!(f, "serialization error: {err}"),
            PersistenceError::Io(err) => write!(f, "io error: {err}"),
            #[cfg(feature = "sqlite")]
            PersistenceError::Sqlite(err) => write!(f, "sqlite error: {err}"),
            PersistenceError::Csv(err) => write!(f, "csv error: {err}"),
            PersistenceError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            PersistenceError::NotFound => write!(f, "no plan stored"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<SerdeJsonError> for PersistenceError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Serialization(value)
    }
}

impl From<io::Error> for PersistenceError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<csv::Error> for PersistenceError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Storage backend for computed plans.
pub trait PlanStore {
    fn save_plan(&self, plan: &StudyPlan) -> PersistenceResult<()>;
    fn load_plan(&self) -> PersistenceResult<Option<StudyPlan>>;
}

/// Reject lesson rows the engine cannot work with: blank names, blank module
/// references, negative durations, and duplicate (module, lesson) pairs.
pub fn validate_lessons(records: &[LessonRecord]) -> PersistenceResult<()> {
    let mut seen: HashSet<(&str, &str)> = HashSet::with_capacity(records.len());
    for record in records {
        if record.lesson.trim().is_empty() {
            return Err(PersistenceError::InvalidData(
                "lesson row with empty name".into(),
            ));
        }
        if record.module.trim().is_empty() {
            return Err(PersistenceError::InvalidData(format!(
                "lesson '{}' has no module",
                record.lesson
            )));
        }
        if record.duration_min < 0 {
            return Err(PersistenceError::InvalidData(format!(
                "lesson '{}' has negative duration {}",
                record.lesson, record.duration_min
            )));
        }
        if !seen.insert((record.module.as_str(), record.lesson.as_str())) {
            return Err(PersistenceError::InvalidData(format!(
                "duplicate lesson '{}' in module '{}'",
                record.lesson, record.module
            )));
        }
    }
    Ok(())
}

#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod file;

pub use file::{
    load_lessons_from_csv, load_plan_from_json, load_weight_table_from_csv, save_plan_to_csv,
    save_plan_to_json,
};
