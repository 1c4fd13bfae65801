use crate::infra::catalog_source;
use admit_tree::catalog::report::{render_text_report, write_csv};
use admit_tree::catalog::{Catalog, CatalogProvider, JsonFileCatalog};
use admit_tree::config::{AppConfig, CatalogConfig};
use admit_tree::error::AppError;
use admit_tree::matching::{Ranking, ScoredResult};
use admit_tree::recommend::RecommendationService;
use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};
use serde::Serialize;
use serde_json::Value;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// JSON file holding the student profile
    #[arg(long)]
    pub(crate) profile: PathBuf,
    /// Catalog snapshot file or directory (defaults to APP_CATALOG_PATH)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Reject the catalog if any institution is incomplete
    #[arg(long)]
    pub(crate) strict: bool,
    /// Show only the best N programs
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Print the ranking as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum ReportFormat {
    #[default]
    Text,
    Csv,
}

#[derive(Args, Debug)]
pub(crate) struct CatalogReportArgs {
    /// Catalog snapshot file or directory (defaults to APP_CATALOG_PATH)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Reject the catalog if any institution is incomplete
    #[arg(long)]
    pub(crate) strict: bool,
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub(crate) format: ReportFormat,
    /// Write to this file instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Generation date printed on the report (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
struct RankOutput<'a> {
    total_programs: usize,
    unscored: usize,
    rankings: &'a [ScoredResult],
}

pub(crate) fn run_rank(args: RankArgs) -> Result<(), AppError> {
    let RankArgs {
        profile,
        catalog,
        strict,
        limit,
        json,
    } = args;

    let config = AppConfig::load()?;
    let source = catalog_source(config.catalog, catalog, strict);
    let payload: Value = serde_json::from_reader(File::open(&profile)?)?;

    let service = RecommendationService::new(
        Arc::new(JsonFileCatalog::new(source.path.clone())),
        source.mode,
    );
    let ranking = service.recommend(&payload)?;
    let shown = ranking.top(limit.unwrap_or(ranking.total_programs()));

    if json {
        let output = RankOutput {
            total_programs: ranking.total_programs(),
            unscored: ranking.unscored,
            rankings: shown,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render_ranking_table(&ranking, shown));
    }

    Ok(())
}

pub(crate) fn run_catalog_report(args: CatalogReportArgs) -> Result<(), AppError> {
    let CatalogReportArgs {
        catalog,
        strict,
        format,
        output,
        date,
    } = args;

    let config = AppConfig::load()?;
    let catalog = load_catalog(&catalog_source(config.catalog, catalog, strict))?;
    let generated_on = date.unwrap_or_else(|| Local::now().date_naive());

    let sink: Box<dyn Write> = match &output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };
    write_report(&catalog, format, generated_on, sink)?;

    if let Some(path) = output {
        eprintln!(
            "Wrote {} programs across {} institutions to {}",
            catalog.program_count(),
            catalog.institutions().len(),
            path.display()
        );
    }

    Ok(())
}

pub(crate) fn load_catalog(source: &CatalogConfig) -> Result<Catalog, AppError> {
    let document = JsonFileCatalog::new(source.path.clone()).latest_document()?;
    Ok(Catalog::from_document(&document, source.mode)?)
}

pub(crate) fn write_report<W: Write>(
    catalog: &Catalog,
    format: ReportFormat,
    generated_on: NaiveDate,
    mut sink: W,
) -> Result<(), AppError> {
    match format {
        ReportFormat::Text => {
            sink.write_all(render_text_report(catalog, generated_on).as_bytes())?;
            sink.flush()?;
        }
        ReportFormat::Csv => write_csv(catalog, sink)?,
    }
    Ok(())
}

pub(crate) fn render_ranking_table(ranking: &Ranking, shown: &[ScoredResult]) -> String {
    let mut out = String::new();
    let weights = ranking.weights;
    let _ = writeln!(
        out,
        "Weights: academic {:.2} | interest {:.2} | extracurricular {:.2}",
        weights.academic, weights.interest, weights.ec
    );
    let _ = writeln!(
        out,
        "Showing {} of {} ranked programs ({} without a usable average)",
        shown.len(),
        ranking.total_programs(),
        ranking.unscored
    );

    for (position, result) in shown.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {:>5.1}  {} - {}",
            position + 1,
            result.score,
            result.institution,
            result.program
        );
        let breakdown = &result.breakdown;
        let _ = writeln!(
            out,
            "       academic {:.2} | interest {:.2} | ec {:.2} | co-op {:.2}",
            breakdown.academic, breakdown.interest, breakdown.ec, breakdown.coop_fit
        );
        if !result.missing_courses.is_empty() {
            let _ = writeln!(out, "       missing: {}", result.missing_courses.join(", "));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use admit_tree::catalog::CatalogMode;
    use admit_tree::matching::{rank_programs, StudentProfile};
    use serde_json::json;
    use std::io::Write as _;

    fn catalog_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        let document = json!({
            "apply_deadline": "January 15",
            "McMaster University": {
                "ec_quality": 4,
                "co-op": ["yes"],
                "steps": ["<b>1. OUAC:</b> Submit your application."],
                "programs": {
                    "Engineering I": {
                        "recommended_average": [88, 92],
                        "required_courses": ["ENG4U", "MHF4U", "SCH4U"],
                        "interests": ["design"],
                        "outcomes": ["Engineer"]
                    }
                }
            }
        });
        file.write_all(document.to_string().as_bytes())
            .expect("write catalog");
        file
    }

    fn source(path: PathBuf) -> CatalogConfig {
        CatalogConfig {
            path,
            mode: CatalogMode::Lenient,
        }
    }

    #[test]
    fn table_lists_missing_courses() {
        let file = catalog_file();
        let catalog = load_catalog(&source(file.path().to_path_buf())).expect("catalog loads");
        let profile = StudentProfile::from_value(&json!({
            "grade_level": 12,
            "average": 90,
            "wants_coop": true,
            "extra_curriculars": [["Robotics", 4]],
            "major_interests": ["design"],
            "courses_taken": [["ENG4U", 90], ["MHF4U", 92]]
        }))
        .expect("profile parses");

        let ranking = rank_programs(&profile, &catalog);
        let table = render_ranking_table(&ranking, ranking.top(5));

        assert!(table.starts_with("Weights: academic 0.80"));
        assert!(table.contains("Showing 1 of 1 ranked programs"));
        assert!(table.contains("McMaster University - Engineering I"));
        assert!(table.contains("missing: SCH4U"));
    }

    #[test]
    fn report_formats_write_to_sink() {
        let file = catalog_file();
        let catalog = load_catalog(&source(file.path().to_path_buf())).expect("catalog loads");
        let date = NaiveDate::from_ymd_opt(2025, 10, 1).expect("valid date");

        let mut text = Vec::new();
        write_report(&catalog, ReportFormat::Text, date, &mut text).expect("text report");
        let text = String::from_utf8(text).expect("utf8");
        assert!(text.contains("Generated 2025-10-01"));
        assert!(text.contains("1. OUAC: Submit your application."));

        let mut csv = Vec::new();
        write_report(&catalog, ReportFormat::Csv, date, &mut csv).expect("csv report");
        let csv = String::from_utf8(csv).expect("utf8");
        let mut lines = csv.lines();
        assert!(lines
            .next()
            .is_some_and(|header| header.starts_with("institution,program")));
        assert!(lines
            .next()
            .is_some_and(|row| row.starts_with("McMaster University,Engineering I")));
    }

    #[test]
    fn missing_catalog_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = load_catalog(&source(dir.path().join("absent.json"))).expect_err("no file");
        assert!(matches!(err, AppError::Catalog(_)));
    }
}
