use crate::backlog::{BacklogBundle, Lesson};
use crate::calculations::capacity_fitter::{CapacityFitter, FitOutcome};
use crate::calculations::daily_allocator::DayPlan;
use crate::calendar::StudyCalendar;
use crate::params::{PlanParameters, PlanParametersError};
use crate::review::{ReviewEvent, ReviewMap, remap_reviews};
use chrono::NaiveDate;
use log::info;
use polars::prelude::PlSmallStr;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone)]
pub enum PlanError {
    Parameters(PlanParametersError),
    EmptyCalendar,
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::Parameters(err) => write!(f, "{err}"),
            PlanError::EmptyCalendar => {
                write!(f, "no study days fall inside the configured date range")
            }
        }
    }
}

impl std::error::Error for PlanError {}

impl From<PlanParametersError> for PlanError {
    fn from(value: PlanParametersError) -> Self {
        Self::Parameters(value)
    }
}

/// Aggregate minute totals over a whole plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanTotals {
    /// Total minutes of scheduled lessons.
    pub lesson_minutes: i64,
    /// Total question plus review minutes across all days.
    pub practice_review_minutes: i64,
    pub total_weeks: i64,
}

/// Compact run description for logs and the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSummary {
    pub study_day_count: usize,
    pub scheduled_lesson_count: usize,
    pub removed_module_count: usize,
    pub complete: bool,
    pub first_day: Option<NaiveDate>,
    pub last_day: Option<NaiveDate>,
    pub totals: PlanTotals,
}

impl PlanSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("days={}", self.study_day_count));
        parts.push(format!("lessons={}", self.scheduled_lesson_count));
        parts.push(format!("weeks={}", self.totals.total_weeks));
        parts.push(format!("lesson_min={}", self.totals.lesson_minutes));
        parts.push(format!(
            "practice_review_min={}",
            self.totals.practice_review_minutes
        ));
        if self.complete && self.removed_module_count == 0 {
            parts.push("complete".to_string());
        } else {
            parts.push(format!("abridged(-{} modules)", self.removed_module_count));
        }
        parts.join(", ")
    }
}

/// A fully simulated study plan: the calendar, the per-day allocation, the
/// remapped review map, and whatever the capacity fitter had to drop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyPlan {
    params: PlanParameters,
    calendar: StudyCalendar,
    days: Vec<DayPlan>,
    reviews: ReviewMap,
    removed_lessons: Vec<Lesson>,
    removed_modules: Vec<String>,
    unallocated: Vec<Lesson>,
    complete: bool,
}

impl StudyPlan {
    /// Validate, generate the calendar, run the capacity fitter and remap
    /// the review events onto study days.
    pub fn build(params: PlanParameters, bundle: &BacklogBundle) -> Result<Self, PlanError> {
        params.validate()?;

        let calendar = StudyCalendar::generate(
            params.start_date,
            params.exam_date,
            params.days_per_week,
            &params.fixed_weekdays,
        );
        if calendar.is_empty() {
            return Err(PlanError::EmptyCalendar);
        }

        let fitter = CapacityFitter::new(&calendar, &params);
        let FitOutcome {
            complete,
            days,
            raw_reviews,
            removed_lessons,
            removed_modules,
            unallocated,
        } = fitter.execute(&bundle.lessons);
        let reviews = remap_reviews(raw_reviews, &calendar);

        info!(
            "study plan built: {} days, complete={}, removed_modules={}",
            days.len(),
            complete,
            removed_modules.len()
        );

        Ok(Self {
            params,
            calendar,
            days,
            reviews,
            removed_lessons,
            removed_modules,
            unallocated,
            complete,
        })
    }

    pub(crate) fn from_parts(
        params: PlanParameters,
        calendar: StudyCalendar,
        days: Vec<DayPlan>,
        reviews: ReviewMap,
        removed_lessons: Vec<Lesson>,
        removed_modules: Vec<String>,
        unallocated: Vec<Lesson>,
        complete: bool,
    ) -> Self {
        Self {
            params,
            calendar,
            days,
            reviews,
            removed_lessons,
            removed_modules,
            unallocated,
            complete,
        }
    }

    pub fn params(&self) -> &PlanParameters {
        &self.params
    }

    pub fn calendar(&self) -> &StudyCalendar {
        &self.calendar
    }

    pub fn days(&self) -> &[DayPlan] {
        &self.days
    }

    pub fn day_on(&self, date: NaiveDate) -> Option<&DayPlan> {
        self.days.iter().find(|day| day.date == date)
    }

    pub fn reviews(&self) -> &ReviewMap {
        &self.reviews
    }

    /// Reviews due on `date`, heaviest modules first (the order they are
    /// listed in the rendered schedule).
    pub fn reviews_on(&self, date: NaiveDate) -> Vec<ReviewEvent> {
        let mut events = self.reviews.get(&date).cloned().unwrap_or_default();
        events.sort_by(|a, b| {
            b.weight
                .cmp(&a.weight)
                .then_with(|| a.module.cmp(&b.module))
                .then_with(|| a.lesson.cmp(&b.lesson))
        });
        events
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// True when the fit only succeeded by dropping modules.
    pub fn is_abridged(&self) -> bool {
        !self.removed_lessons.is_empty()
    }

    pub fn removed_lessons(&self) -> &[Lesson] {
        &self.removed_lessons
    }

    pub fn removed_modules(&self) -> &[String] {
        &self.removed_modules
    }

    pub fn unallocated(&self) -> &[Lesson] {
        &self.unallocated
    }

    /// Removed lessons grouped by module, for checklist rendering.
    pub fn removed_by_module(&self) -> BTreeMap<String, Vec<Lesson>> {
        let mut grouped: BTreeMap<String, Vec<Lesson>> = BTreeMap::new();
        for lesson in &self.removed_lessons {
            grouped
                .entry(lesson.module.clone())
                .or_default()
                .push(lesson.clone());
        }
        grouped
    }

    pub fn totals(&self) -> PlanTotals {
        let lesson_minutes = self.days.iter().map(DayPlan::lesson_minutes).sum();
        let practice_review_minutes = self
            .days
            .iter()
            .map(|day| day.questions_min + day.review_min)
            .sum();
        PlanTotals {
            lesson_minutes,
            practice_review_minutes,
            total_weeks: self.calendar.total_weeks(),
        }
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            study_day_count: self.days.len(),
            scheduled_lesson_count: self.days.iter().map(|day| day.lessons.len()).sum(),
            removed_module_count: self.removed_modules.len(),
            complete: self.complete,
            first_day: self.calendar.first(),
            last_day: self.calendar.last(),
            totals: self.totals(),
        }
    }

    /// Flat tabular view of the plan, one row per allocated lesson, for the
    /// rendering collaborators (spreadsheet/document writers).
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut weeks: Vec<i64> = Vec::new();
        let mut dates: Vec<i32> = Vec::new();
        let mut phases: Vec<&str> = Vec::new();
        let mut modules: Vec<&str> = Vec::new();
        let mut lessons: Vec<&str> = Vec::new();
        let mut durations: Vec<i64> = Vec::new();
        let mut questions: Vec<i64> = Vec::new();
        let mut review: Vec<i64> = Vec::new();

        for day in &self.days {
            let week = self.calendar.week_number(day.date).unwrap_or(0);
            for lesson in &day.lessons {
                weeks.push(week);
                dates.push(Self::date_to_i32(day.date));
                phases.push(day.phase.as_str());
                modules.push(lesson.module.as_str());
                lessons.push(lesson.name.as_str());
                durations.push(lesson.duration_min);
                questions.push(day.questions_min);
                review.push(day.review_min);
            }
        }

        let date_series =
            Series::new(PlSmallStr::from_static("date"), dates).cast(&DataType::Date)?;

        DataFrame::new(vec![
            Series::new(PlSmallStr::from_static("week"), weeks).into_column(),
            date_series.into_column(),
            Series::new(PlSmallStr::from_static("phase"), phases).into_column(),
            Series::new(PlSmallStr::from_static("module"), modules).into_column(),
            Series::new(PlSmallStr::from_static("lesson"), lessons).into_column(),
            Series::new(PlSmallStr::from_static("duration_min"), durations).into_column(),
            Series::new(PlSmallStr::from_static("questions_min"), questions).into_column(),
            Series::new(PlSmallStr::from_static("review_min"), review).into_column(),
        ])
    }

    /// Scheduled lesson minutes per calendar week, ascending by week.
    pub fn weekly_minutes(&self) -> PolarsResult<DataFrame> {
        self.to_dataframe()?
            .lazy()
            .group_by([col("week")])
            .agg([col("duration_min").sum().alias("lesson_min")])
            .sort(["week"], Default::default())
            .collect()
    }

    fn date_to_i32(date: NaiveDate) -> i32 {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid epoch date");
        (date - epoch).num_days() as i32
    }
}
