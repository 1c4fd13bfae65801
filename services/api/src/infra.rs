use admit_tree::catalog::CatalogMode;
use admit_tree::config::CatalogConfig;
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Applies command-line catalog overrides on top of the configured source.
pub(crate) fn catalog_source(
    mut config: CatalogConfig,
    path: Option<PathBuf>,
    strict: bool,
) -> CatalogConfig {
    if let Some(path) = path {
        config.path = path;
    }
    if strict {
        config.mode = CatalogMode::Strict;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates() {
        assert_eq!(
            parse_date(" 2025-01-15 "),
            Ok(NaiveDate::from_ymd_opt(2025, 1, 15).expect("valid date"))
        );
        assert!(parse_date("15/01/2025").is_err());
    }

    #[test]
    fn flags_override_configured_catalog() {
        let configured = CatalogConfig {
            path: PathBuf::from("data/catalog.sample.json"),
            mode: CatalogMode::Lenient,
        };

        let unchanged = catalog_source(configured.clone(), None, false);
        assert_eq!(unchanged.path, configured.path);
        assert_eq!(unchanged.mode, CatalogMode::Lenient);

        let overridden = catalog_source(configured, Some(PathBuf::from("/tmp/snapshots")), true);
        assert_eq!(overridden.path, PathBuf::from("/tmp/snapshots"));
        assert_eq!(overridden.mode, CatalogMode::Strict);
    }
}
