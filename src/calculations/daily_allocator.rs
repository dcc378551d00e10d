use crate::backlog::{Backlog, Lesson};
use crate::calendar::StudyCalendar;
use crate::params::PlanParameters;
use crate::phase::{FIRST_DAY_FRACTIONS, Phase, QuotaFractions, REVIEW_BORROW_RATIO};
use crate::review::{ReviewEvent, ReviewMap};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Tolerance for "does the next lesson still fit" comparisons, so rounding
/// noise never forces a spurious carryover.
const EPSILON: f64 = 1e-6;

/// One simulated study day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPlan {
    pub date: NaiveDate,
    pub phase: Phase,
    /// Lessons assigned to this day, in allocation order.
    pub lessons: Vec<Lesson>,
    pub questions_min: i64,
    pub review_min: i64,
}

impl DayPlan {
    pub fn lesson_minutes(&self) -> i64 {
        self.lessons.iter().map(|lesson| lesson.duration_min).sum()
    }
}

/// Result of one full pass over the calendar.
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    pub days: Vec<DayPlan>,
    /// Review events keyed by their raw target date (watch date + offset),
    /// before remapping onto study days.
    pub raw_reviews: ReviewMap,
    /// Lessons left over after the last day; empty iff the run completed.
    pub unallocated: Vec<Lesson>,
}

impl AllocationOutcome {
    pub fn is_complete(&self) -> bool {
        self.unallocated.is_empty()
    }
}

/// Simulates the calendar day by day against the phase quota tables.
///
/// Each day spends its lesson quota first, then bounded slices of the
/// question and review quotas ("borrowing"), on the backlog's front lessons
/// in order. A lesson too large even for full borrowing is deferred once and
/// then force-allocated at the start of the next day, with the uncoverable
/// remainder charged against that day's question/review totals.
pub struct DailyAllocator<'a> {
    calendar: &'a StudyCalendar,
    params: &'a PlanParameters,
}

impl<'a> DailyAllocator<'a> {
    pub fn new(calendar: &'a StudyCalendar, params: &'a PlanParameters) -> Self {
        Self { calendar, params }
    }

    /// Run the simulation over a copy of `lessons`. Pure with respect to its
    /// inputs; the capacity fitter relies on that to re-run it from scratch.
    pub fn execute(&self, lessons: &[Lesson]) -> AllocationOutcome {
        let total_days = self.calendar.len();
        let mut backlog = Backlog::new(lessons.iter().cloned());
        let mut days: Vec<DayPlan> = Vec::with_capacity(total_days);
        let mut raw_reviews = ReviewMap::new();
        let mut must_force_carryover = false;

        for (index, date) in self.calendar.iter().enumerate() {
            let phase = Phase::of(index, total_days);
            let fractions = if index == 0 {
                FIRST_DAY_FRACTIONS
            } else {
                phase.fractions()
            };
            let mut budget = DayBudget::new(self.params.daily_minutes, fractions, phase);
            let mut allocated: Vec<Lesson> = Vec::new();

            if must_force_carryover {
                must_force_carryover = false;
                self.force_front(&mut backlog, &mut budget, &mut allocated, date, &mut raw_reviews);
            }

            while let Some(front) = backlog.front() {
                let duration = front.duration_min as f64;
                if duration <= budget.available() + EPSILON {
                    budget.consume_fitting(duration);
                    let lesson = backlog.pop_front().expect("front lesson just inspected");
                    self.emit_reviews(&lesson, date, &mut raw_reviews);
                    allocated.push(lesson);
                } else {
                    must_force_carryover = true;
                    break;
                }
            }

            // A study day never stays empty while lessons remain.
            if allocated.is_empty() && !backlog.is_empty() {
                must_force_carryover = false;
                self.force_front(&mut backlog, &mut budget, &mut allocated, date, &mut raw_reviews);
            }

            let (questions_min, review_min) = budget.settle();
            days.push(DayPlan {
                date,
                phase,
                lessons: allocated,
                questions_min,
                review_min,
            });
        }

        AllocationOutcome {
            days,
            raw_reviews,
            unallocated: backlog.into_lessons(),
        }
    }

    fn force_front(
        &self,
        backlog: &mut Backlog,
        budget: &mut DayBudget,
        allocated: &mut Vec<Lesson>,
        date: NaiveDate,
        raw_reviews: &mut ReviewMap,
    ) {
        let Some(lesson) = backlog.pop_front() else {
            return;
        };
        budget.absorb_forced(lesson.duration_min as f64);
        self.emit_reviews(&lesson, date, raw_reviews);
        allocated.push(lesson);
    }

    fn emit_reviews(&self, lesson: &Lesson, watched_on: NaiveDate, raw_reviews: &mut ReviewMap) {
        for &offset in &self.params.review_offsets {
            let target = watched_on + Duration::days(offset);
            raw_reviews.entry(target).or_default().push(ReviewEvent {
                lesson: lesson.name.clone(),
                module: lesson.module.clone(),
                weight: lesson.weight,
                watched_on,
            });
        }
    }
}

/// Minute ledger for a single day: remaining lesson quota, borrow headroom
/// against the question and review quotas, and any force debt.
struct DayBudget {
    lesson_quota: f64,
    question_quota: f64,
    review_quota: f64,
    max_borrow_q: f64,
    max_borrow_r: f64,
    borrowed_q: f64,
    borrowed_r: f64,
    force_debt: f64,
    phase: Phase,
}

impl DayBudget {
    fn new(daily_minutes: i64, fractions: QuotaFractions, phase: Phase) -> Self {
        let budget = daily_minutes as f64;
        let question_quota = budget * fractions.questions;
        let review_quota = budget * fractions.review;
        Self {
            lesson_quota: budget * fractions.lessons,
            question_quota,
            review_quota,
            max_borrow_q: question_quota * phase.question_borrow_ratio(),
            max_borrow_r: review_quota * REVIEW_BORROW_RATIO,
            borrowed_q: 0.0,
            borrowed_r: 0.0,
            force_debt: 0.0,
            phase,
        }
    }

    fn question_headroom(&self) -> f64 {
        (self.max_borrow_q - self.borrowed_q).max(0.0)
    }

    fn review_headroom(&self) -> f64 {
        (self.max_borrow_r - self.borrowed_r).max(0.0)
    }

    /// Minutes a lesson may consume without incurring force debt.
    fn available(&self) -> f64 {
        self.lesson_quota + self.question_headroom() + self.review_headroom()
    }

    /// Consume a duration known to fit within [`DayBudget::available`].
    /// Borrowed minutes come from the question quota first, then review.
    fn consume_fitting(&mut self, duration: f64) {
        let mut need = (duration - self.lesson_quota).max(0.0);

        let take_q = need.min(self.question_headroom());
        self.borrowed_q += take_q;
        need -= take_q;

        let take_r = need.min(self.review_headroom());
        self.borrowed_r += take_r;

        self.lesson_quota =
            (self.lesson_quota - (duration - (take_q + take_r)).max(0.0)).max(0.0);
    }

    /// Consume a duration regardless of fit; the remainder that even full
    /// borrowing cannot cover becomes force debt.
    fn absorb_forced(&mut self, duration: f64) {
        let use_lessons = self.lesson_quota.min(duration);
        self.lesson_quota -= use_lessons;
        let mut remaining = duration - use_lessons;

        let use_q = remaining.min(self.question_headroom());
        self.borrowed_q += use_q;
        remaining -= use_q;

        let use_r = remaining.min(self.review_headroom());
        self.borrowed_r += use_r;
        remaining -= use_r;

        if remaining > EPSILON {
            self.force_debt += remaining;
        }
    }

    /// Redistribute unspent lesson minutes per the phase's residual policy
    /// and close out the day's question/review totals. Force debt is charged
    /// half against each bucket.
    fn settle(mut self) -> (i64, i64) {
        let (to_questions, to_review) = self.phase.residual_split();
        self.question_quota += self.lesson_quota * to_questions;
        self.review_quota += self.lesson_quota * to_review;
        self.lesson_quota = 0.0;

        let questions = (self.question_quota - self.borrowed_q - self.force_debt / 2.0)
            .round()
            .max(0.0) as i64;
        let review = (self.review_quota - self.borrowed_r - self.force_debt / 2.0)
            .round()
            .max(0.0) as i64;
        (questions, review)
    }
}
