//! Typed view over the institution/program catalog document.
//!
//! The store keeps one mapping keyed by institution name, with a few metadata keys
//! mixed in. [`Catalog::from_document`] separates the two, coerces loosely-typed
//! fields, and decides per [`CatalogMode`] whether an incomplete institution is
//! skipped or rejected.

pub mod provider;
pub mod report;

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::matching::AverageRange;

pub use provider::{CatalogProvider, InMemoryCatalog, JsonFileCatalog};

/// Top-level keys that describe the document rather than an institution.
pub const METADATA_KEYS: [&str; 2] = ["_id", "apply_deadline"];

/// How structurally incomplete institutions are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogMode {
    #[default]
    Lenient,
    Strict,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub name: String,
    /// Numbers exactly as published; see [`Program::average_range`].
    pub recommended_average: Vec<f64>,
    pub required_courses: Vec<String>,
    pub interests: BTreeSet<String>,
    pub outcomes: Vec<String>,
    /// Program-specific co-op tracks, overriding the institution's when present.
    pub coop_options: Option<BTreeSet<String>>,
    pub notes: Option<String>,
}

impl Program {
    /// Usable admission band, or `None` when the program cannot be scored.
    pub fn average_range(&self) -> Option<AverageRange> {
        match self.recommended_average.as_slice() {
            [] => None,
            [single] => AverageRange::around(*single),
            [low, high, ..] => AverageRange::new(*low, *high),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Institution {
    pub name: String,
    /// Leadership level the institution expects from applicants.
    pub ec_quality: i64,
    pub coop_options: BTreeSet<String>,
    pub steps: Vec<String>,
    pub programs: Vec<Program>,
}

impl Institution {
    pub fn coop_options_for<'a>(&'a self, program: &'a Program) -> &'a BTreeSet<String> {
        program.coop_options.as_ref().unwrap_or(&self.coop_options)
    }
}

/// Entry excluded from the catalog because it was structurally incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    pub institution: String,
    pub program: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Catalog {
    apply_deadline: Option<String>,
    institutions: Vec<Institution>,
    skipped: Vec<SkippedEntry>,
}

impl Catalog {
    pub fn new(institutions: Vec<Institution>) -> Self {
        Self {
            apply_deadline: None,
            institutions,
            skipped: Vec::new(),
        }
    }

    pub fn from_document(document: &Value, mode: CatalogMode) -> Result<Self, CatalogError> {
        let entries = document.as_object().ok_or(CatalogError::NotAnObject)?;

        let apply_deadline = entries
            .get("apply_deadline")
            .and_then(Value::as_str)
            .map(str::to_string);

        let mut catalog = Catalog {
            apply_deadline,
            ..Catalog::default()
        };
        let mut seen = 0usize;

        for (name, record) in entries {
            if METADATA_KEYS.contains(&name.as_str()) {
                continue;
            }
            seen += 1;

            match parse_institution(name, record, &mut catalog.skipped) {
                Ok(institution) => catalog.institutions.push(institution),
                Err(error) if mode == CatalogMode::Strict => return Err(error),
                Err(error) => {
                    warn!(institution = %name, %error, "skipping incomplete institution");
                    catalog.skipped.push(SkippedEntry {
                        institution: name.clone(),
                        program: None,
                        reason: error.to_string(),
                    });
                }
            }
        }

        if seen == 0 {
            return Err(CatalogError::Empty(
                "document contains no institutions".to_string(),
            ));
        }
        if catalog.institutions.is_empty() {
            return Err(CatalogError::Empty(format!(
                "none of the {seen} institution(s) in the document are usable"
            )));
        }
        if catalog.program_count() == 0 {
            return Err(CatalogError::Empty(format!(
                "the {} usable institution(s) list no programs",
                catalog.institutions.len()
            )));
        }

        Ok(catalog)
    }

    pub fn apply_deadline(&self) -> Option<&str> {
        self.apply_deadline.as_deref()
    }

    pub fn institutions(&self) -> &[Institution] {
        &self.institutions
    }

    pub fn skipped(&self) -> &[SkippedEntry] {
        &self.skipped
    }

    pub fn program_count(&self) -> usize {
        self.institutions
            .iter()
            .map(|institution| institution.programs.len())
            .sum()
    }
}

/// Failure to obtain or interpret the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog store unreachable: {0}")]
    Unreachable(String),
    #[error("catalog store refused access: {0}")]
    Unauthorized(String),
    #[error("catalog is empty: {0}")]
    Empty(String),
    #[error("catalog snapshot is not valid JSON: {0}")]
    Malformed(String),
    #[error("catalog document must be a JSON object")]
    NotAnObject,
    #[error("institution '{institution}' has invalid '{field}': {reason}")]
    InvalidInstitution {
        institution: String,
        field: &'static str,
        reason: String,
    },
}

impl CatalogError {
    /// Whether the failure lies with the store rather than with the data it returned.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            CatalogError::Unreachable(_) | CatalogError::Unauthorized(_)
        )
    }
}

fn parse_institution(
    name: &str,
    record: &Value,
    skipped: &mut Vec<SkippedEntry>,
) -> Result<Institution, CatalogError> {
    let invalid = |field: &'static str, reason: &str| CatalogError::InvalidInstitution {
        institution: name.to_string(),
        field,
        reason: reason.to_string(),
    };

    let fields = record
        .as_object()
        .ok_or_else(|| invalid("record", "expected a mapping"))?;

    let ec_quality = match fields.get("ec_quality") {
        None | Some(Value::Null) => return Err(invalid("ec_quality", "missing")),
        Some(value) => integer(value).ok_or_else(|| invalid("ec_quality", "expected an integer"))?,
    };

    let no_programs = Map::new();
    let programs = match fields.get("programs") {
        None => return Err(invalid("programs", "missing")),
        Some(Value::Null) => &no_programs,
        Some(Value::Object(programs)) => programs,
        Some(_) => return Err(invalid("programs", "expected a mapping")),
    };

    let coop_options = coop_field(fields).unwrap_or_default();

    let mut parsed = Vec::with_capacity(programs.len());
    for (program_name, details) in programs {
        match details.as_object() {
            Some(details) => parsed.push(parse_program(program_name, details)),
            None => {
                warn!(institution = %name, program = %program_name, "skipping malformed program");
                skipped.push(SkippedEntry {
                    institution: name.to_string(),
                    program: Some(program_name.clone()),
                    reason: "program record is not a mapping".to_string(),
                });
            }
        }
    }

    Ok(Institution {
        name: name.to_string(),
        ec_quality,
        coop_options,
        steps: strings(fields.get("steps")),
        programs: parsed,
    })
}

fn parse_program(name: &str, details: &Map<String, Value>) -> Program {
    let recommended_average = match details.get("recommended_average") {
        Some(Value::Array(values)) => values
            .iter()
            .map(Value::as_f64)
            .collect::<Option<Vec<f64>>>()
            .unwrap_or_default(),
        Some(Value::Number(single)) => single.as_f64().into_iter().collect(),
        _ => Vec::new(),
    };

    Program {
        name: name.to_string(),
        recommended_average,
        required_courses: strings(details.get("required_courses")),
        interests: strings(details.get("interests"))
            .into_iter()
            .map(|interest| interest.trim().to_lowercase())
            .filter(|interest| !interest.is_empty())
            .collect(),
        outcomes: strings(details.get("outcomes")),
        coop_options: coop_field(details),
        notes: details
            .get("notes")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

/// Reads `co-op` (or `co_op`) as a lower-cased set from a string or list.
fn coop_field(fields: &Map<String, Value>) -> Option<BTreeSet<String>> {
    let raw = fields
        .get("co-op")
        .or_else(|| fields.get("co_op"))
        .filter(|value| !value.is_null())?;

    let options = match raw {
        Value::Array(items) => items.iter().map(scalar_text).collect::<Vec<_>>(),
        other => vec![scalar_text(other)],
    };

    Some(
        options
            .into_iter()
            .map(|option| option.trim().to_lowercase())
            .filter(|option| !option.is_empty())
            .collect(),
    )
}

fn strings(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(scalar_text)
            .collect(),
        Some(Value::String(single)) => vec![single.clone()],
        _ => Vec::new(),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|number| number.fract() == 0.0)
            .map(|number| number as i64)
    })
}
