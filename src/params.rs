use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Spaced-repetition offsets applied when none are configured explicitly.
pub const DEFAULT_REVIEW_OFFSETS: [i64; 5] = [1, 3, 7, 14, 30];

/// Everything the engine needs to know about one plan run. The engine assumes
/// validated parameters; call [`PlanParameters::validate`] first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanParameters {
    /// Column of the weight table used to select and weigh modules.
    pub exam_type: String,
    pub start_date: NaiveDate,
    /// Exam date; also the inclusive end of the study calendar.
    pub exam_date: NaiveDate,
    pub daily_minutes: i64,
    pub days_per_week: u32,
    /// Fixed study weekdays. Empty means "take the first `days_per_week`
    /// dates of each week".
    pub fixed_weekdays: Vec<Weekday>,
    /// Day offsets after a watched lesson at which it resurfaces for review.
    pub review_offsets: Vec<i64>,
}

impl Default for PlanParameters {
    fn default() -> Self {
        Self {
            exam_type: "TEA".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 11, 1).expect("valid default start date"),
            exam_date: NaiveDate::from_ymd_opt(2025, 12, 31).expect("valid default exam date"),
            daily_minutes: 180,
            days_per_week: 5,
            fixed_weekdays: Vec::new(),
            review_offsets: DEFAULT_REVIEW_OFFSETS.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanParametersError {
    StartAfterExam {
        start: NaiveDate,
        exam: NaiveDate,
    },
    NonPositiveDailyMinutes(i64),
    ZeroDaysPerWeek,
    NonPositiveReviewOffset(i64),
}

impl fmt::Display for PlanParametersError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanParametersError::StartAfterExam { start, exam } => {
                write!(f, "start date {start} must be on or before exam date {exam}")
            }
            PlanParametersError::NonPositiveDailyMinutes(minutes) => {
                write!(f, "daily study minutes must be positive (got {minutes})")
            }
            PlanParametersError::ZeroDaysPerWeek => {
                write!(f, "study days per week must be positive")
            }
            PlanParametersError::NonPositiveReviewOffset(offset) => {
                write!(f, "review offsets must be positive day counts (got {offset})")
            }
        }
    }
}

impl std::error::Error for PlanParametersError {}

impl PlanParameters {
    pub fn validate(&self) -> Result<(), PlanParametersError> {
        if self.start_date > self.exam_date {
            return Err(PlanParametersError::StartAfterExam {
                start: self.start_date,
                exam: self.exam_date,
            });
        }
        if self.daily_minutes <= 0 {
            return Err(PlanParametersError::NonPositiveDailyMinutes(
                self.daily_minutes,
            ));
        }
        if self.days_per_week == 0 {
            return Err(PlanParametersError::ZeroDaysPerWeek);
        }
        for &offset in &self.review_offsets {
            if offset < 1 {
                return Err(PlanParametersError::NonPositiveReviewOffset(offset));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_parameters_validate() {
        assert!(PlanParameters::default().validate().is_ok());
    }

    #[test]
    fn validation_rejects_inverted_dates() {
        let mut params = PlanParameters::default();
        params.start_date = params.exam_date + chrono::Duration::days(1);
        assert!(matches!(
            params.validate(),
            Err(PlanParametersError::StartAfterExam { .. })
        ));
    }

    #[test]
    fn validation_rejects_zero_budget_and_days() {
        let mut params = PlanParameters::default();
        params.daily_minutes = 0;
        assert!(matches!(
            params.validate(),
            Err(PlanParametersError::NonPositiveDailyMinutes(0))
        ));

        let mut params = PlanParameters::default();
        params.days_per_week = 0;
        assert_eq!(params.validate(), Err(PlanParametersError::ZeroDaysPerWeek));
    }

    #[test]
    fn validation_rejects_non_positive_offsets() {
        let mut params = PlanParameters::default();
        params.review_offsets = vec![1, 0, 7];
        assert_eq!(
            params.validate(),
            Err(PlanParametersError::NonPositiveReviewOffset(0))
        );
    }
}
