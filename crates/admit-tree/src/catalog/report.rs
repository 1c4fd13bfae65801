use std::fmt::Write as _;
use std::io;

use chrono::NaiveDate;
use serde::Serialize;

use super::{Catalog, Institution, Program};

const REPORT_TITLE: &str = "University Program Catalog";
const PAGE_BREAK: char = '\u{0c}';

/// Printable plain-text rendering of the catalog, one page per institution.
pub fn render_text_report(catalog: &Catalog, generated_on: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{REPORT_TITLE}");
    let _ = writeln!(
        out,
        "Admission processes, averages, requirements, and career outcomes."
    );
    let _ = writeln!(out, "Generated {generated_on}");

    for institution in catalog.institutions() {
        out.push('\n');
        out.push(PAGE_BREAK);
        out.push('\n');
        render_institution(&mut out, catalog.apply_deadline(), institution);
    }

    out
}

fn render_institution(out: &mut String, deadline: Option<&str>, institution: &Institution) {
    let _ = writeln!(out, "{}", institution.name);
    let _ = writeln!(out, "{}", "=".repeat(institution.name.chars().count()));

    if let Some(deadline) = deadline {
        let _ = writeln!(out, "Application Deadline: {deadline}");
    }
    if !institution.coop_options.is_empty() {
        let options: Vec<&str> = institution.coop_options.iter().map(String::as_str).collect();
        let _ = writeln!(out, "Co-op Available: {}", options.join(", "));
    }
    let _ = writeln!(
        out,
        "Extracurricular Quality Rating: {}/5",
        institution.ec_quality
    );

    if !institution.steps.is_empty() {
        let _ = writeln!(out, "\nSteps to Apply:");
        for step in &institution.steps {
            let _ = writeln!(out, "  {}", strip_markup(step));
        }
    }

    for program in &institution.programs {
        out.push('\n');
        render_program(out, program);
    }
}

fn render_program(out: &mut String, program: &Program) {
    let name = program.name.trim();
    let _ = writeln!(out, "{name}");
    let _ = writeln!(out, "{}", "-".repeat(name.chars().count()));
    let _ = writeln!(out, "Recommended Average: {}", average_label(program));

    render_list(out, "Required Courses", &program.required_courses);
    let interests: Vec<String> = program.interests.iter().cloned().collect();
    render_list(out, "Key Areas of Study", &interests);
    render_list(out, "Career Outcomes", &program.outcomes);

    if let Some(notes) = &program.notes {
        let _ = writeln!(out, "Notes: {notes}");
    }
}

fn render_list(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "{heading}:");
    for item in items {
        let _ = writeln!(out, "  • {item}");
    }
}

fn average_label(program: &Program) -> String {
    match program.recommended_average.as_slice() {
        [] => "N/A".to_string(),
        [single] => format!("{single}%"),
        [low, high, ..] => format!("{low}% - {high}%"),
    }
}

/// Removes inline `<tag>` markup carried in catalog step text.
pub fn strip_markup(text: &str) -> String {
    let mut plain = String::with_capacity(text.len());
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => plain.push(ch),
            _ => {}
        }
    }
    plain
}

#[derive(Debug, Serialize)]
struct ProgramRow<'a> {
    institution: &'a str,
    program: &'a str,
    recommended_average: String,
    required_courses: String,
    interests: String,
    outcomes: String,
    co_op: String,
    ec_quality: i64,
}

/// Writes one CSV row per program.
pub fn write_csv<W: io::Write>(catalog: &Catalog, writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for institution in catalog.institutions() {
        for program in &institution.programs {
            let coop: Vec<&str> = institution
                .coop_options_for(program)
                .iter()
                .map(String::as_str)
                .collect();
            let interests: Vec<&str> = program.interests.iter().map(String::as_str).collect();

            csv_writer.serialize(ProgramRow {
                institution: &institution.name,
                program: program.name.trim(),
                recommended_average: average_label(program),
                required_courses: program.required_courses.join("; "),
                interests: interests.join("; "),
                outcomes: program.outcomes.join("; "),
                co_op: coop.join("; "),
                ec_quality: institution.ec_quality,
            })?;
        }
    }

    csv_writer.flush()?;
    Ok(())
}
