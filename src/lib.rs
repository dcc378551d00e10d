pub mod backlog;
pub mod calculations;
pub mod calendar;
pub mod params;
pub mod persistence;
pub mod phase;
pub mod plan;
pub mod review;

pub use backlog::{
    Backlog, BacklogBundle, BacklogError, Lesson, LessonRecord, ModuleSummary, WeightTable,
    build_backlog,
};
pub use calculations::capacity_fitter::{CapacityFitter, FitOutcome};
pub use calculations::daily_allocator::{AllocationOutcome, DailyAllocator, DayPlan};
pub use calendar::StudyCalendar;
pub use params::{DEFAULT_REVIEW_OFFSETS, PlanParameters, PlanParametersError};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqlitePlanStore;
pub use persistence::{
    PersistenceError, PlanStore, load_lessons_from_csv, load_plan_from_json,
    load_weight_table_from_csv, save_plan_to_csv, save_plan_to_json, validate_lessons,
};
pub use phase::Phase;
pub use plan::{PlanError, PlanSummary, PlanTotals, StudyPlan};
pub use review::{ReviewEvent, ReviewMap, remap_reviews};
