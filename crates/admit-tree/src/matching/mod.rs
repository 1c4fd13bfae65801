//! Program ranking engine.
//!
//! A ranking pass is a pure function of one normalized profile and one catalog
//! snapshot: nothing is cached or shared between calls, so concurrent requests
//! need no coordination.

mod academic;
mod aggregate;
mod criteria;
mod profile;
mod weights;

#[cfg(test)]
mod tests;

pub use academic::{
    competitiveness_bonus, course_penalty, grade_score, missing_courses, score_academic,
    AcademicFit, AverageRange, ACADEMIC_CEILING, GRACE_BAND, MISSING_COURSE_PENALTY,
};
pub use aggregate::{rescale, round_to, score_program, sort_descending, ScoreBreakdown, ScoredResult};
pub use criteria::{
    coop_multiplier, ec_score, interest_score, COOP_FORCED, COOP_MATCH, COOP_UNAVAILABLE,
};
pub use profile::{
    missing_request_fields, CourseRecord, Extracurricular, StudentProfile, ValidationError,
    REQUIRED_PROFILE_FIELDS,
};
pub use weights::GradeWeights;

use serde::Serialize;
use tracing::debug;

use crate::catalog::Catalog;

/// Outcome of one ranking pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    pub weights: GradeWeights,
    pub results: Vec<ScoredResult>,
    /// Programs left out for lacking a usable average range.
    pub unscored: usize,
}

impl Ranking {
    pub fn total_programs(&self) -> usize {
        self.results.len()
    }

    pub fn top(&self, limit: usize) -> &[ScoredResult] {
        &self.results[..limit.min(self.results.len())]
    }
}

/// Scores every program in `catalog` for `profile`, best first.
pub fn rank_programs(profile: &StudentProfile, catalog: &Catalog) -> Ranking {
    let weights = GradeWeights::for_grade(profile.grade_level);
    let mut results = Vec::with_capacity(catalog.program_count());
    let mut unscored = 0usize;

    for institution in catalog.institutions() {
        for program in &institution.programs {
            match score_program(profile, weights, institution, program) {
                Some(result) => results.push(result),
                None => {
                    debug!(
                        institution = %institution.name,
                        program = %program.name,
                        "program has no usable average range"
                    );
                    unscored += 1;
                }
            }
        }
    }

    sort_descending(&mut results);
    rescale(&mut results);

    Ranking {
        weights,
        results,
        unscored,
    }
}
