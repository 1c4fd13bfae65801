use serde::Serialize;

/// Relative importance of the additive criteria for one grade level.
///
/// The exploratory triple deliberately totals 0.93; the remaining share is not
/// assigned to any criterion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradeWeights {
    pub academic: f64,
    pub interest: f64,
    pub ec: f64,
}

impl GradeWeights {
    /// Grades 9 and 10: interest leads.
    pub const EXPLORATORY: Self = Self {
        academic: 0.30,
        interest: 0.60,
        ec: 0.03,
    };

    /// Grade 11 onward: admission realism leads.
    pub const APPLICATION: Self = Self {
        academic: 0.80,
        interest: 0.10,
        ec: 0.10,
    };

    pub fn for_grade(grade_level: i64) -> Self {
        if grade_level <= 10 {
            Self::EXPLORATORY
        } else {
            Self::APPLICATION
        }
    }

    pub fn total(&self) -> f64 {
        self.academic + self.interest + self.ec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn younger_grades_favour_interest() {
        for grade in [9, 10] {
            let weights = GradeWeights::for_grade(grade);
            assert_eq!(weights, GradeWeights::EXPLORATORY);
            assert!(weights.interest > weights.academic);
        }
        assert!((GradeWeights::EXPLORATORY.total() - 0.93).abs() < 1e-9);
    }

    #[test]
    fn application_years_favour_academics() {
        for grade in [11, 12] {
            assert_eq!(GradeWeights::for_grade(grade), GradeWeights::APPLICATION);
        }
        assert!((GradeWeights::APPLICATION.total() - 1.0).abs() < 1e-9);
    }
}
