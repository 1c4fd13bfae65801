use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::catalog::{Catalog, CatalogError, CatalogMode, CatalogProvider};
use crate::matching::{
    missing_request_fields, rank_programs, Ranking, StudentProfile, ValidationError,
};

/// Number of catalog keys echoed by the catalog health check.
pub const HEALTH_KEY_LIMIT: usize = 10;

/// Validates a ranking request, loads the current catalog, and ranks it.
pub struct RecommendationService<P> {
    provider: Arc<P>,
    mode: CatalogMode,
}

impl<P> RecommendationService<P>
where
    P: CatalogProvider + 'static,
{
    pub fn new(provider: Arc<P>, mode: CatalogMode) -> Self {
        Self { provider, mode }
    }

    pub fn mode(&self) -> CatalogMode {
        self.mode
    }

    /// Ranks programs for a raw request payload.
    ///
    /// The request is validated before the catalog is fetched.
    pub fn recommend(&self, payload: &Value) -> Result<Ranking, RecommendError> {
        let missing = missing_request_fields(payload);
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields { missing }.into());
        }

        let profile = StudentProfile::from_value(payload)?;
        let catalog = self.catalog()?;
        let ranking = rank_programs(&profile, &catalog);

        info!(
            grade_level = profile.grade_level,
            ranked = ranking.total_programs(),
            unscored = ranking.unscored,
            skipped = catalog.skipped().len(),
            "ranked programs"
        );

        Ok(ranking)
    }

    /// Fetches and parses the newest catalog snapshot.
    pub fn catalog(&self) -> Result<Catalog, CatalogError> {
        let document = self.provider.latest_document()?;
        Catalog::from_document(&document, self.mode)
    }

    /// Leading top-level keys of the newest document, for connectivity checks.
    pub fn catalog_keys(&self) -> Result<Vec<String>, CatalogError> {
        let document = self.provider.latest_document()?;
        let keys = document
            .as_object()
            .ok_or(CatalogError::NotAnObject)?
            .keys()
            .take(HEALTH_KEY_LIMIT)
            .cloned()
            .collect();
        Ok(keys)
    }
}

/// Error raised by the recommendation service.
#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
