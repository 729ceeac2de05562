use crate::cli::ServeArgs;
use crate::infra::{
    default_screening_rules, AppState, InMemoryApplicationRepository, InMemoryCvRepository,
    StaticInstructionsSource,
};
use crate::routes::with_screening_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use talent_ai::config::AppConfig;
use talent_ai::error::AppError;
use talent_ai::telemetry;
use talent_ai::workflows::screening::{ProviderCascade, ScreeningService};
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryApplicationRepository::default());
    let cvs = Arc::new(InMemoryCvRepository::default());
    let instructions = Arc::new(StaticInstructionsSource::from_env());
    let cascade = Arc::new(ProviderCascade::from_config(&config.providers)?);
    let screening_service = Arc::new(ScreeningService::new(
        repository,
        cvs,
        instructions,
        cascade,
        default_screening_rules(&config.screening),
    ));

    let app = with_screening_routes(screening_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "screening orchestrator ready");

    axum::serve(listener, app).await?;
    Ok(())
}
