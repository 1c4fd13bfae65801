use serde::Serialize;

use super::profile::{CourseRecord, StudentProfile};

/// Points below the published minimum that still earn partial credit.
pub const GRACE_BAND: f64 = 5.0;
/// Share of the academic score lost per missing prerequisite at grade 12.
pub const MISSING_COURSE_PENALTY: f64 = 0.15;
/// Upper bound on the academic score, bonus included.
pub const ACADEMIC_CEILING: f64 = 1.30;

const PARTIAL_BONUS_WINDOW: f64 = 2.0;
const PARTIAL_BONUS_SCALE: f64 = 0.5;
const GENERIC_REQUIREMENT_MARKERS: [&str; 5] =
    ["one more", "additional", "any u", "any m", "another"];

/// Published `[low, high]` admission band for a program.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AverageRange {
    pub low: f64,
    pub high: f64,
}

impl AverageRange {
    /// Returns `None` for non-finite bounds or `low > high`.
    pub fn new(low: f64, high: f64) -> Option<Self> {
        (low.is_finite() && high.is_finite() && low <= high).then_some(Self { low, high })
    }

    /// Expands a single published value into `[v - 2, v + 2]`.
    pub fn around(center: f64) -> Option<Self> {
        Self::new(center - 2.0, center + 2.0)
    }
}

/// Academic criterion output. `score` may exceed 1.0 up to [`ACADEMIC_CEILING`].
#[derive(Debug, Clone, PartialEq)]
pub struct AcademicFit {
    pub score: f64,
    pub missing_courses: Vec<String>,
}

pub fn score_academic(
    profile: &StudentProfile,
    range: AverageRange,
    required_courses: &[String],
) -> AcademicFit {
    let base = grade_score(profile.average, range);

    let missing_courses = if profile.grade_level >= 11 {
        missing_courses(required_courses, &profile.courses_taken)
    } else {
        Vec::new()
    };
    let penalty = course_penalty(profile.grade_level, missing_courses.len());
    let bonus = competitiveness_bonus(profile.average, range.high);

    AcademicFit {
        score: (base * penalty + bonus).min(ACADEMIC_CEILING),
        missing_courses,
    }
}

/// Linear interpolation of `average` across `[low - GRACE_BAND, high]` onto `[0, 1]`.
pub fn grade_score(average: f64, range: AverageRange) -> f64 {
    let floor = range.low - GRACE_BAND;
    if average >= range.high {
        1.0
    } else if average < floor {
        0.0
    } else {
        (average - floor) / (range.high - floor)
    }
}

/// Required courses with no matching alternative among the courses taken.
///
/// Generic placeholders ("one more U/M", "any M course") are never reported.
pub fn missing_courses(required: &[String], taken: &[CourseRecord]) -> Vec<String> {
    let taken: Vec<String> = taken
        .iter()
        .map(|course| course.code.trim().to_lowercase())
        .filter(|code| !code.is_empty())
        .collect();

    required
        .iter()
        .map(|requirement| requirement.trim())
        .filter(|requirement| !is_generic_requirement(requirement))
        .filter(|requirement| {
            let alternatives: Vec<String> = requirement
                .split('/')
                .map(|alternative| alternative.trim().to_lowercase())
                .filter(|alternative| !alternative.is_empty())
                .collect();
            !alternatives.is_empty() && !satisfied_by(&alternatives, &taken)
        })
        .map(str::to_string)
        .collect()
}

/// Grade 12 loses 15% per missing course; grade 11 shortfalls are only reported.
pub fn course_penalty(grade_level: i64, missing: usize) -> f64 {
    if grade_level >= 12 {
        (1.0 - MISSING_COURSE_PENALTY * missing as f64).max(0.0)
    } else {
        1.0
    }
}

pub fn competitiveness_bonus(average: f64, high: f64) -> f64 {
    let base = tier_base(high);
    let window_start = high - PARTIAL_BONUS_WINDOW;

    if average >= high {
        base
    } else if average >= window_start {
        let proximity = (average - window_start) / PARTIAL_BONUS_WINDOW;
        base * proximity * PARTIAL_BONUS_SCALE
    } else {
        0.0
    }
}

fn tier_base(high: f64) -> f64 {
    if high >= 95.0 {
        0.20 + 0.10 * ((high - 95.0) / 5.0)
    } else if high >= 90.0 {
        0.10 + 0.10 * ((high - 90.0) / 5.0)
    } else if high >= 85.0 {
        0.05 + 0.05 * ((high - 85.0) / 5.0)
    } else if high >= 80.0 {
        0.02 + 0.03 * ((high - 80.0) / 5.0)
    } else {
        0.0
    }
}

fn is_generic_requirement(requirement: &str) -> bool {
    let lowered = requirement.to_lowercase();
    GENERIC_REQUIREMENT_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}

fn satisfied_by(alternatives: &[String], taken: &[String]) -> bool {
    alternatives.iter().any(|alternative| {
        taken
            .iter()
            .any(|code| code.contains(alternative.as_str()) || alternative.contains(code.as_str()))
    })
}
