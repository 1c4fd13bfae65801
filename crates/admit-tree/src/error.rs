use crate::catalog::CatalogError;
use crate::chat::ChatError;
use crate::config::ConfigError;
use crate::matching::ValidationError;
use crate::recommend::RecommendError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Validation(ValidationError),
    Catalog(CatalogError),
    Chat(ChatError),
    Json(serde_json::Error),
    Csv(csv::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Validation(err) => write!(f, "invalid profile: {}", err),
            AppError::Catalog(err) => write!(f, "catalog error: {}", err),
            AppError::Chat(err) => write!(f, "chat error: {}", err),
            AppError::Json(err) => write!(f, "json error: {}", err),
            AppError::Csv(err) => write!(f, "csv error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Validation(err) => Some(err),
            AppError::Catalog(err) => Some(err),
            AppError::Chat(err) => Some(err),
            AppError::Json(err) => Some(err),
            AppError::Csv(err) => Some(err),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Catalog(err) if err.is_upstream() => StatusCode::BAD_GATEWAY,
            AppError::Chat(ChatError::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Chat(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Catalog(_)
            | AppError::Csv(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ValidationError> for AppError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<CatalogError> for AppError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

impl From<RecommendError> for AppError {
    fn from(value: RecommendError) -> Self {
        match value {
            RecommendError::Validation(err) => Self::Validation(err),
            RecommendError::Catalog(err) => Self::Catalog(err),
        }
    }
}

impl From<ChatError> for AppError {
    fn from(value: ChatError) -> Self {
        Self::Chat(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<csv::Error> for AppError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_domain_errors_to_statuses() {
        let missing = AppError::from(RecommendError::Validation(ValidationError::MissingFields {
            missing: vec!["average".to_string()],
        }));
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let upstream = AppError::from(CatalogError::Unreachable("timeout".to_string()));
        assert_eq!(upstream.status(), StatusCode::BAD_GATEWAY);

        let unusable = AppError::from(CatalogError::NotAnObject);
        assert_eq!(unusable.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let chat = AppError::from(ChatError::NotConfigured);
        assert_eq!(chat.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn display_prefixes_the_error_family() {
        let err = AppError::from(CatalogError::Empty("no snapshot".to_string()));
        assert_eq!(err.to_string(), "catalog error: catalog is empty: no snapshot");
    }
}
