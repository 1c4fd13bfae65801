use std::collections::BTreeSet;

pub const COOP_MATCH: f64 = 1.00;
pub const COOP_UNAVAILABLE: f64 = 0.85;
pub const COOP_FORCED: f64 = 0.92;

const EC_SURPLUS_STEP: f64 = 0.05;
const EC_SHORTFALL_STEP: f64 = 0.2;

/// Share of the program's interest keywords the student also holds.
///
/// A program that declares no keywords scores 0.0.
pub fn interest_score(student: &BTreeSet<String>, program: &BTreeSet<String>) -> f64 {
    if program.is_empty() {
        return 0.0;
    }

    let matched = program.intersection(student).count();
    matched as f64 / program.len() as f64
}

/// Compares the student's strongest activity against the institution's expectation.
///
/// Meeting the bar scores 1.0 with a 5% bonus per surplus level; each level short
/// costs 20%, floored at 0. The gap is taken in `f64` so any pair of
/// levels is accepted.
pub fn ec_score(best_level: i64, threshold: i64) -> f64 {
    let gap = best_level as f64 - threshold as f64;
    if gap >= 0.0 {
        1.0 + EC_SURPLUS_STEP * gap
    } else {
        (1.0 + EC_SHORTFALL_STEP * gap).max(0.0)
    }
}

/// Multiplier applied to the weighted sum for co-op alignment.
///
/// `offered` is expected lower-cased (`"yes"` / `"no"`).
pub fn coop_multiplier(wants_coop: bool, offered: &BTreeSet<String>) -> f64 {
    match (wants_coop, offered.contains("yes"), offered.contains("no")) {
        (true, true, _) => COOP_MATCH,
        (true, false, _) => COOP_UNAVAILABLE,
        (false, _, true) => COOP_MATCH,
        (false, _, false) => COOP_FORCED,
    }
}
