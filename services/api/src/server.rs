use crate::cli::ServeArgs;
use crate::infra::{catalog_source, AppState};
use crate::routes::with_service_routes;
use admit_tree::catalog::JsonFileCatalog;
use admit_tree::chat::ChatProxy;
use admit_tree::config::AppConfig;
use admit_tree::error::AppError;
use admit_tree::recommend::RecommendationService;
use admit_tree::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    config.catalog = catalog_source(config.catalog, args.catalog.take(), args.strict);

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let provider = Arc::new(JsonFileCatalog::new(config.catalog.path.clone()));
    let recommendations = Arc::new(RecommendationService::new(provider, config.catalog.mode));
    match recommendations.catalog() {
        Ok(catalog) => info!(
            institutions = catalog.institutions().len(),
            programs = catalog.program_count(),
            skipped = catalog.skipped().len(),
            "catalog snapshot loaded"
        ),
        Err(err) => warn!(
            error = %err,
            path = %config.catalog.path.display(),
            "catalog not usable yet; ranking requests will fail until it is"
        ),
    }

    let chat = Arc::new(ChatProxy::new(&config.chat)?);
    if !chat.is_configured() {
        warn!("chat endpoint not configured; /api/v1/chat will answer with a fallback reply");
    }

    let app = with_service_routes(recommendations, chat)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "program ranking service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
