use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

/// Fields a ranking request must carry, in the order they are reported when absent.
pub const REQUIRED_PROFILE_FIELDS: [&str; 6] = [
    "grade_level",
    "average",
    "wants_coop",
    "extra_curriculars",
    "major_interests",
    "courses_taken",
];

const COURSE_CODE_KEYS: [&str; 3] = ["course_code", "code", "name"];

/// A completed course and the mark the student earned in it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseRecord {
    pub code: String,
    pub grade: f64,
}

/// A self-reported activity and its leadership level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extracurricular {
    pub name: String,
    pub level: i64,
}

/// Canonical student profile produced by [`StudentProfile::from_value`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentProfile {
    pub grade_level: i64,
    pub average: f64,
    pub wants_coop: bool,
    pub extra_curriculars: Vec<Extracurricular>,
    pub major_interests: BTreeSet<String>,
    pub courses_taken: Vec<CourseRecord>,
}

impl StudentProfile {
    /// Coerces a loosely-typed JSON profile into canonical shape.
    ///
    /// Scalar fields (`grade_level`, `average`, `wants_coop`) must be present and
    /// well-typed. Collection fields never fail: entries that match no accepted
    /// shape are dropped, and a missing or wrong-typed collection becomes empty.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let fields = value.as_object().ok_or(ValidationError::NotAnObject)?;

        let missing: Vec<String> = ["grade_level", "average", "wants_coop"]
            .iter()
            .filter(|field| fields.get(**field).map_or(true, Value::is_null))
            .map(|field| field.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields { missing });
        }

        let grade_level = fields
            .get("grade_level")
            .and_then(integer)
            .ok_or(ValidationError::InvalidField {
                field: "grade_level",
                expected: "an integer",
            })?;
        let average = fields
            .get("average")
            .and_then(Value::as_f64)
            .filter(|value| value.is_finite())
            .ok_or(ValidationError::InvalidField {
                field: "average",
                expected: "a number",
            })?;
        let wants_coop = fields
            .get("wants_coop")
            .and_then(Value::as_bool)
            .ok_or(ValidationError::InvalidField {
                field: "wants_coop",
                expected: "a boolean",
            })?;

        Ok(Self {
            grade_level,
            average,
            wants_coop,
            extra_curriculars: collect_entries(fields, "extra_curriculars", extracurricular_entry),
            major_interests: interests(fields.get("major_interests")),
            courses_taken: collect_entries(fields, "courses_taken", course_entry),
        })
    }

    /// Highest leadership level across all activities, or 0 with none reported.
    pub fn best_ec_level(&self) -> i64 {
        self.extra_curriculars
            .iter()
            .map(|activity| activity.level)
            .max()
            .unwrap_or(0)
    }
}

/// Required request fields whose keys are absent from `payload`.
///
/// A key present as `null` is not reported here; null scalars are rejected
/// by [`StudentProfile::from_value`] and null collections normalize to empty.
pub fn missing_request_fields(payload: &Value) -> Vec<String> {
    let Some(fields) = payload.as_object() else {
        return REQUIRED_PROFILE_FIELDS.iter().map(|f| f.to_string()).collect();
    };

    REQUIRED_PROFILE_FIELDS
        .iter()
        .filter(|field| !fields.contains_key(**field))
        .map(|field| field.to_string())
        .collect()
}

/// Rejection raised when a profile cannot be normalized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("profile payload must be a JSON object")]
    NotAnObject,
    #[error("missing required fields: {}", .missing.join(", "))]
    MissingFields { missing: Vec<String> },
    #[error("field '{field}' must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
}

fn collect_entries<T>(
    fields: &Map<String, Value>,
    field: &'static str,
    parse: fn(&Value) -> Option<T>,
) -> Vec<T> {
    let Some(entries) = fields.get(field).and_then(Value::as_array) else {
        return Vec::new();
    };

    let parsed: Vec<T> = entries.iter().filter_map(parse).collect();
    let dropped = entries.len() - parsed.len();
    if dropped > 0 {
        debug!(field, dropped, "skipped malformed profile entries");
    }
    parsed
}

fn course_entry(entry: &Value) -> Option<CourseRecord> {
    match entry {
        Value::Array(pair) if pair.len() == 2 => Some(CourseRecord {
            code: label(&pair[0])?,
            grade: number(&pair[1])?,
        }),
        Value::Object(fields) => {
            let code = COURSE_CODE_KEYS
                .iter()
                .find_map(|key| fields.get(*key).and_then(label))?;
            let grade = fields.get("grade").and_then(number)?;
            Some(CourseRecord { code, grade })
        }
        _ => None,
    }
}

fn extracurricular_entry(entry: &Value) -> Option<Extracurricular> {
    match entry {
        Value::Array(pair) if pair.len() == 2 => Some(Extracurricular {
            name: label(&pair[0])?,
            level: integer(&pair[1])?,
        }),
        Value::Object(fields) => Some(Extracurricular {
            name: fields.get("name").and_then(label)?,
            level: fields.get("level").and_then(integer)?,
        }),
        _ => None,
    }
}

fn interests(value: Option<&Value>) -> BTreeSet<String> {
    match value {
        Some(Value::String(single)) => keyword(single).into_iter().collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(text) => keyword(text),
                Value::Number(number) => Some(number.to_string()),
                _ => None,
            })
            .collect(),
        _ => BTreeSet::new(),
    }
}

fn keyword(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

fn label(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|value| value.is_finite())
}

fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|value| value.fract() == 0.0 && value.is_finite())
                .map(|value| value as i64)
        }),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}
