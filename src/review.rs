use crate::calendar::StudyCalendar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One pending spaced-repetition visit to a lesson watched earlier. The watch
/// date is kept so callers can render "watched N days ago" captions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEvent {
    pub lesson: String,
    pub module: String,
    pub weight: i32,
    pub watched_on: NaiveDate,
}

impl ReviewEvent {
    /// Whole days between the watch date and `on`.
    pub fn days_since_watch(&self, on: NaiveDate) -> i64 {
        (on - self.watched_on).num_days()
    }
}

/// Review events keyed by date, in chronological order.
pub type ReviewMap = BTreeMap<NaiveDate, Vec<ReviewEvent>>;

/// Remap raw review targets onto real study days.
///
/// A target that is itself a study day stays put; a target between study days
/// moves forward to the next one; a target past the last study day is
/// dropped, as is anything that has no study day left to land on.
pub fn remap_reviews(raw: ReviewMap, calendar: &StudyCalendar) -> ReviewMap {
    let mut remapped = ReviewMap::new();
    for (target, events) in raw {
        if let Some(day) = calendar.next_on_or_after(target) {
            remapped.entry(day).or_default().extend(events);
        }
    }
    remapped
}
