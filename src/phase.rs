use serde::{Deserialize, Serialize};

/// Chronological quartile of the study calendar. The phase decides how each
/// day's minute budget splits between lessons (A), practice questions (Q) and
/// spaced review (R).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Inicio,
    Meio,
    Final,
    Preprova,
}

/// Budget fractions for one study day. The three values sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuotaFractions {
    pub lessons: f64,
    pub questions: f64,
    pub review: f64,
}

/// The very first study day front-loads lessons and questions; spaced review
/// only starts from day two.
pub const FIRST_DAY_FRACTIONS: QuotaFractions = QuotaFractions {
    lessons: 0.80,
    questions: 0.20,
    review: 0.00,
};

/// Fraction of the review quota that may be borrowed to absorb an oversized
/// lesson. Unlike the question ceiling this one does not vary by phase.
pub const REVIEW_BORROW_RATIO: f64 = 0.10;

impl Phase {
    /// Classify a study day by its chronological index.
    ///
    /// `q = total_days / 4`; indexes below `q`, `2q` and `3q` map to the
    /// first three phases and everything else to `Preprova`. With fewer than
    /// four study days `q` is zero, so every day counts as `Preprova`.
    pub fn of(index: usize, total_days: usize) -> Self {
        if total_days == 0 {
            return Phase::Inicio;
        }
        let q = total_days / 4;
        if index < q {
            Phase::Inicio
        } else if index < 2 * q {
            Phase::Meio
        } else if index < 3 * q {
            Phase::Final
        } else {
            Phase::Preprova
        }
    }

    pub fn fractions(self) -> QuotaFractions {
        match self {
            Phase::Inicio => QuotaFractions {
                lessons: 0.75,
                questions: 0.15,
                review: 0.10,
            },
            Phase::Meio => QuotaFractions {
                lessons: 0.65,
                questions: 0.15,
                review: 0.20,
            },
            Phase::Final => QuotaFractions {
                lessons: 0.60,
                questions: 0.15,
                review: 0.25,
            },
            Phase::Preprova => QuotaFractions {
                lessons: 0.50,
                questions: 0.15,
                review: 0.30,
            },
        }
    }

    /// Fraction of the question quota that may be borrowed to absorb an
    /// oversized lesson.
    pub fn question_borrow_ratio(self) -> f64 {
        match self {
            Phase::Inicio => 0.40,
            Phase::Meio => 0.30,
            Phase::Final => 0.20,
            Phase::Preprova => 0.15,
        }
    }

    /// How unspent lesson minutes redistribute into questions and review at
    /// the end of a day.
    pub fn residual_split(self) -> (f64, f64) {
        match self {
            Phase::Inicio => (1.00, 0.00),
            Phase::Meio => (0.70, 0.30),
            Phase::Final => (0.50, 0.50),
            Phase::Preprova => (0.30, 0.70),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Inicio => "inicio",
            Phase::Meio => "meio",
            Phase::Final => "final",
            Phase::Preprova => "preprova",
        }
    }
}
