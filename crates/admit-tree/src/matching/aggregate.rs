use std::cmp::Ordering;

use serde::Serialize;

use super::academic::score_academic;
use super::criteria::{coop_multiplier, ec_score, interest_score};
use super::profile::StudentProfile;
use super::weights::GradeWeights;
use crate::catalog::{Institution, Program};

const SCORE_CEILING: f64 = 100.0;

/// Per-criterion values behind a final score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub academic: f64,
    pub interest: f64,
    pub ec: f64,
    pub coop_fit: f64,
}

/// One ranked (institution, program) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredResult {
    #[serde(rename = "university")]
    pub institution: String,
    pub program: String,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    /// Required courses the student has not taken (reported from grade 11).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_courses: Vec<String>,
}

/// Scores one program, or returns `None` when it has no usable average range.
pub fn score_program(
    profile: &StudentProfile,
    weights: GradeWeights,
    institution: &Institution,
    program: &Program,
) -> Option<ScoredResult> {
    let range = program.average_range()?;

    let academic = score_academic(profile, range, &program.required_courses);
    let interest = interest_score(&profile.major_interests, &program.interests);
    let ec = ec_score(profile.best_ec_level(), institution.ec_quality);
    let coop = coop_multiplier(profile.wants_coop, institution.coop_options_for(program));

    let base = academic.score * weights.academic + interest * weights.interest + ec * weights.ec;
    let score = base * coop * 100.0;

    Some(ScoredResult {
        institution: institution.name.clone(),
        program: program.name.clone(),
        score: round_to(score, 1),
        breakdown: ScoreBreakdown {
            academic: round_to(academic.score, 2),
            interest: round_to(interest, 2),
            ec: round_to(ec, 2),
            coop_fit: round_to(coop, 2),
        },
        missing_courses: academic.missing_courses,
    })
}

/// Orders results best-first; equal scores keep catalog order.
pub fn sort_descending(results: &mut [ScoredResult]) {
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}

/// Scales every score by `100 / top` when the top score exceeds 100.
///
/// Expects `results` sorted best-first. Applying it to an already rescaled set
/// changes nothing.
pub fn rescale(results: &mut [ScoredResult]) {
    let Some(top) = results.first().map(|result| result.score) else {
        return;
    };
    if top <= SCORE_CEILING {
        return;
    }

    let factor = SCORE_CEILING / top;
    for result in results.iter_mut() {
        result.score = round_to(result.score * factor, 1);
    }
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(program: &str, score: f64) -> ScoredResult {
        ScoredResult {
            institution: "University of Windsor".to_string(),
            program: program.to_string(),
            score,
            breakdown: ScoreBreakdown {
                academic: 1.0,
                interest: 1.0,
                ec: 1.0,
                coop_fit: 1.0,
            },
            missing_courses: Vec::new(),
        }
    }

    fn scores(results: &[ScoredResult]) -> Vec<f64> {
        results.iter().map(|result| result.score).collect()
    }

    #[test]
    fn sort_is_stable_for_ties() {
        let mut results = vec![
            result("Civil", 70.0),
            result("Mechanical", 88.0),
            result("Electrical", 70.0),
        ];
        sort_descending(&mut results);

        let order: Vec<&str> = results.iter().map(|r| r.program.as_str()).collect();
        assert_eq!(order, ["Mechanical", "Civil", "Electrical"]);
    }

    #[test]
    fn rescale_caps_the_top_score_at_one_hundred() {
        let mut results = vec![result("A", 120.0), result("B", 60.0), result("C", 30.0)];
        rescale(&mut results);
        assert_eq!(scores(&results), [100.0, 50.0, 25.0]);
    }

    #[test]
    fn rescale_is_idempotent() {
        let mut results = vec![result("A", 113.4), result("B", 97.2), result("C", 41.0)];
        rescale(&mut results);
        let once = scores(&results);
        rescale(&mut results);
        assert_eq!(scores(&results), once);
        assert_eq!(once[0], 100.0);
    }

    #[test]
    fn rescale_leaves_in_range_results_alone() {
        let mut results = vec![result("A", 93.0), result("B", 12.5)];
        rescale(&mut results);
        assert_eq!(scores(&results), [93.0, 12.5]);

        let mut empty: Vec<ScoredResult> = Vec::new();
        rescale(&mut empty);
        assert!(empty.is_empty());
    }

    #[test]
    fn rounds_to_requested_places() {
        assert_eq!(round_to(92.99999999999999, 1), 93.0);
        assert_eq!(round_to(0.7777, 2), 0.78);
    }
}
