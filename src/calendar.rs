use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Ordered, duplicate-free sequence of study dates.
///
/// Weeks are delimited Sunday through Saturday. A calendar is generated once
/// from the configured date range and never changes afterwards; day indexes
/// (and therefore phases) are stable for the life of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyCalendar {
    days: Vec<NaiveDate>,
}

impl StudyCalendar {
    /// Build the calendar for an inclusive date range.
    ///
    /// With `fixed_weekdays` given, every in-range date of each week whose
    /// weekday is in the set becomes a study day. Without it, the first
    /// `days_per_week` chronological dates of each week are taken — weeks
    /// start on Sunday, so Sunday is picked first. A zero `days_per_week`
    /// yields an empty calendar.
    pub fn generate(
        start: NaiveDate,
        end: NaiveDate,
        days_per_week: u32,
        fixed_weekdays: &[Weekday],
    ) -> Self {
        if days_per_week == 0 {
            return Self { days: Vec::new() };
        }

        let use_fixed = !fixed_weekdays.is_empty();
        let mut days: Vec<NaiveDate> = Vec::new();
        let mut cursor = start;
        while cursor <= end {
            let wstart = Self::week_start(cursor);
            let mut week_days: Vec<NaiveDate> = Vec::new();
            for offset in 0..7 {
                let candidate = wstart + Duration::days(offset);
                if candidate < start || candidate > end {
                    continue;
                }
                if !use_fixed || fixed_weekdays.contains(&candidate.weekday()) {
                    week_days.push(candidate);
                }
            }
            if !use_fixed {
                week_days.truncate(days_per_week as usize);
            }
            days.extend(week_days);
            cursor = wstart + Duration::days(7);
        }

        days.sort_unstable();
        days.dedup();
        Self { days }
    }

    /// Build a calendar from explicit dates (sorted and deduplicated).
    pub fn from_days(mut days: Vec<NaiveDate>) -> Self {
        days.sort_unstable();
        days.dedup();
        Self { days }
    }

    /// The Sunday that opens the week containing `date`.
    pub fn week_start(date: NaiveDate) -> NaiveDate {
        let since_sunday = (date.weekday().num_days_from_monday() + 1) % 7;
        date - Duration::days(i64::from(since_sunday))
    }

    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn first(&self) -> Option<NaiveDate> {
        self.days.first().copied()
    }

    pub fn last(&self) -> Option<NaiveDate> {
        self.days.last().copied()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.days.binary_search(&date).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.iter().copied()
    }

    /// First study day at or after `target`, if any remains.
    pub fn next_on_or_after(&self, target: NaiveDate) -> Option<NaiveDate> {
        let idx = self.days.partition_point(|day| *day < target);
        self.days.get(idx).copied()
    }

    /// Number of calendar weeks spanned, counting the weeks of the first and
    /// last study day inclusively.
    pub fn total_weeks(&self) -> i64 {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => {
                (Self::week_start(last) - Self::week_start(first)).num_days() / 7 + 1
            }
            _ => 0,
        }
    }

    /// 1-based week number of `date`, counted from the calendar's first week.
    pub fn week_number(&self, date: NaiveDate) -> Option<i64> {
        self.first()
            .map(|first| (Self::week_start(date) - Self::week_start(first)).num_days() / 7 + 1)
    }

    /// Study days grouped by week, each entry keyed by the week's Sunday.
    pub fn weeks(&self) -> Vec<(NaiveDate, Vec<NaiveDate>)> {
        let mut out: Vec<(NaiveDate, Vec<NaiveDate>)> = Vec::new();
        for &day in &self.days {
            let wstart = Self::week_start(day);
            match out.last_mut() {
                Some((current, buf)) if *current == wstart => buf.push(day),
                _ => out.push((wstart, vec![day])),
            }
        }
        out
    }
}
