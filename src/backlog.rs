use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;

/// A single lesson waiting for a study-day slot. Immutable once built; the
/// weight is copied from the owning module at build time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub name: String,
    pub module: String,
    pub duration_min: i64,
    pub weight: i32,
}

impl Lesson {
    pub fn new(
        name: impl Into<String>,
        module: impl Into<String>,
        duration_min: i64,
        weight: i32,
    ) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            duration_min,
            weight,
        }
    }
}

/// Raw lesson row as supplied by the loader, before weights are applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonRecord {
    pub lesson: String,
    pub module: String,
    pub duration_min: i64,
}

/// Module weights, one column per exam type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightTable {
    exam_types: Vec<String>,
    rows: Vec<WeightRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct WeightRow {
    module: String,
    weights: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BacklogError {
    UnknownExamType(String),
    WeightCountMismatch {
        module: String,
        expected: usize,
        got: usize,
    },
}

impl fmt::Display for BacklogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BacklogError::UnknownExamType(exam_type) => {
                write!(f, "unknown exam type '{exam_type}'")
            }
            BacklogError::WeightCountMismatch {
                module,
                expected,
                got,
            } => write!(
                f,
                "module '{module}' has {got} weight values, expected {expected}"
            ),
        }
    }
}

impl std::error::Error for BacklogError {}

impl WeightTable {
    pub fn new(exam_types: Vec<String>) -> Self {
        Self {
            exam_types,
            rows: Vec::new(),
        }
    }

    pub fn exam_types(&self) -> &[String] {
        &self.exam_types
    }

    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|row| row.module.as_str())
    }

    pub fn insert(
        &mut self,
        module: impl Into<String>,
        weights: Vec<i32>,
    ) -> Result<(), BacklogError> {
        let module = module.into();
        if weights.len() != self.exam_types.len() {
            return Err(BacklogError::WeightCountMismatch {
                module,
                expected: self.exam_types.len(),
                got: weights.len(),
            });
        }
        self.rows.push(WeightRow { module, weights });
        Ok(())
    }

    pub fn weight_for(&self, module: &str, exam_type: &str) -> Option<i32> {
        let idx = self.exam_index(exam_type)?;
        self.rows
            .iter()
            .find(|row| row.module == module)
            .map(|row| row.weights[idx])
    }

    fn exam_index(&self, exam_type: &str) -> Option<usize> {
        self.exam_types.iter().position(|t| t == exam_type)
    }
}

/// Report-only module ranking entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSummary {
    pub module: String,
    pub weight: i32,
    pub total_min: i64,
}

/// Ordered lesson backlog for one exam type, plus the per-module side maps
/// used for reporting and capacity fitting.
#[derive(Debug, Clone)]
pub struct BacklogBundle {
    /// Lessons in source order, restricted to modules with positive weight.
    pub lessons: Vec<Lesson>,
    /// Weight per surviving module.
    pub weights: HashMap<String, i32>,
    /// Aggregate lesson minutes per surviving module.
    pub module_costs: HashMap<String, i64>,
    /// Modules ranked by weight descending, cost ascending. Reporting only;
    /// allocation order is the lessons' source order.
    pub ranking: Vec<ModuleSummary>,
}

/// Filter the lesson list down to modules with a positive weight for
/// `exam_type`, preserving source order. Lessons whose module has no row in
/// the weight table are dropped as well.
pub fn build_backlog(
    table: &WeightTable,
    records: &[LessonRecord],
    exam_type: &str,
) -> Result<BacklogBundle, BacklogError> {
    let idx = table
        .exam_index(exam_type)
        .ok_or_else(|| BacklogError::UnknownExamType(exam_type.to_string()))?;

    let mut weights: HashMap<String, i32> = HashMap::new();
    for row in &table.rows {
        if row.weights[idx] > 0 {
            weights.insert(row.module.clone(), row.weights[idx]);
        }
    }

    let mut module_costs: HashMap<String, i64> = HashMap::new();
    for record in records {
        if weights.contains_key(&record.module) {
            *module_costs.entry(record.module.clone()).or_insert(0) += record.duration_min;
        }
    }

    let lessons: Vec<Lesson> = records
        .iter()
        .filter_map(|record| {
            weights.get(&record.module).map(|&weight| Lesson {
                name: record.lesson.clone(),
                module: record.module.clone(),
                duration_min: record.duration_min,
                weight,
            })
        })
        .collect();

    let mut ranking: Vec<ModuleSummary> = weights
        .iter()
        .map(|(module, &weight)| ModuleSummary {
            module: module.clone(),
            weight,
            total_min: module_costs.get(module).copied().unwrap_or(0),
        })
        .collect();
    ranking.sort_by(|a, b| {
        b.weight
            .cmp(&a.weight)
            .then(a.total_min.cmp(&b.total_min))
            .then(a.module.cmp(&b.module))
    });

    Ok(BacklogBundle {
        lessons,
        weights,
        module_costs,
        ranking,
    })
}

/// FIFO queue of pending lessons, consumed destructively front to back.
#[derive(Debug, Clone, Default)]
pub struct Backlog {
    queue: VecDeque<Lesson>,
}

impl Backlog {
    pub fn new(lessons: impl IntoIterator<Item = Lesson>) -> Self {
        Self {
            queue: lessons.into_iter().collect(),
        }
    }

    pub fn front(&self) -> Option<&Lesson> {
        self.queue.front()
    }

    pub fn pop_front(&mut self) -> Option<Lesson> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn into_lessons(self) -> Vec<Lesson> {
        self.queue.into_iter().collect()
    }
}
