use super::daily_allocator::{DailyAllocator, DayPlan};
use crate::backlog::Lesson;
use crate::calendar::StudyCalendar;
use crate::params::PlanParameters;
use crate::review::ReviewMap;
use log::debug;
use std::collections::HashMap;

/// Outcome of the fit-or-shrink loop.
#[derive(Debug, Clone)]
pub struct FitOutcome {
    /// True when every remaining lesson found a slot.
    pub complete: bool,
    pub days: Vec<DayPlan>,
    pub raw_reviews: ReviewMap,
    /// Lessons dropped with their modules, in removal order.
    pub removed_lessons: Vec<Lesson>,
    pub removed_modules: Vec<String>,
    /// Lessons that fit nowhere even after all removals; normally empty.
    pub unallocated: Vec<Lesson>,
}

/// Re-runs the allocator, dropping whole modules by ascending priority until
/// the backlog fits the calendar or nothing is left to drop.
///
/// Every retry is a full simulation from scratch on a reduced copy of the
/// backlog; retries are strictly sequential. The removal order is fixed once
/// from the original backlog: lowest weight first, ties broken by larger
/// aggregate duration.
pub struct CapacityFitter<'a> {
    calendar: &'a StudyCalendar,
    params: &'a PlanParameters,
}

impl<'a> CapacityFitter<'a> {
    pub fn new(calendar: &'a StudyCalendar, params: &'a PlanParameters) -> Self {
        Self { calendar, params }
    }

    pub fn execute(&self, lessons: &[Lesson]) -> FitOutcome {
        let allocator = DailyAllocator::new(self.calendar, self.params);

        let outcome = allocator.execute(lessons);
        if outcome.is_complete() {
            return FitOutcome {
                complete: true,
                days: outcome.days,
                raw_reviews: outcome.raw_reviews,
                removed_lessons: Vec::new(),
                removed_modules: Vec::new(),
                unallocated: Vec::new(),
            };
        }

        let removal_order = Self::removal_order(lessons);
        let mut working: Vec<Lesson> = lessons.to_vec();
        let mut removed_modules: Vec<String> = Vec::new();
        let mut last = outcome;

        for module in removal_order {
            working.retain(|lesson| lesson.module != module);
            removed_modules.push(module.clone());
            debug!(
                "capacity fit: removed module '{}', retrying with {} lessons",
                module,
                working.len()
            );
            last = allocator.execute(&working);
            if last.is_complete() {
                return FitOutcome {
                    complete: true,
                    days: last.days,
                    raw_reviews: last.raw_reviews,
                    removed_lessons: Self::lessons_of(lessons, &removed_modules),
                    removed_modules,
                    unallocated: Vec::new(),
                };
            }
        }

        FitOutcome {
            complete: false,
            days: last.days,
            raw_reviews: last.raw_reviews,
            removed_lessons: Self::lessons_of(lessons, &removed_modules),
            removed_modules,
            unallocated: last.unallocated,
        }
    }

    /// Weight and aggregate duration are taken once from the original
    /// backlog and never recomputed between retries.
    fn removal_order(lessons: &[Lesson]) -> Vec<String> {
        let mut weights: HashMap<&str, i32> = HashMap::new();
        let mut costs: HashMap<&str, i64> = HashMap::new();
        for lesson in lessons {
            weights.entry(lesson.module.as_str()).or_insert(lesson.weight);
            *costs.entry(lesson.module.as_str()).or_insert(0) += lesson.duration_min;
        }

        let mut modules: Vec<&str> = weights.keys().copied().collect();
        modules.sort_by(|a, b| {
            weights[a]
                .cmp(&weights[b])
                .then(costs[b].cmp(&costs[a]))
                .then(a.cmp(b))
        });
        modules.into_iter().map(String::from).collect()
    }

    fn lessons_of(lessons: &[Lesson], modules: &[String]) -> Vec<Lesson> {
        lessons
            .iter()
            .filter(|lesson| modules.iter().any(|module| *module == lesson.module))
            .cloned()
            .collect()
    }
}
