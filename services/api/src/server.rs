use crate::cli::ServeArgs;
use crate::infra::{build_stores, AppState};
use crate::routes::with_inspection_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use inspekta::config::AppConfig;
use inspekta::error::AppError;
use inspekta::inspections::InspectionService;
use inspekta::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
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

    let (premises, configs) = build_stores(&config.stores)?;
    let service = Arc::new(InspectionService::new(Arc::new(premises), Arc::new(configs)));

    let app = with_inspection_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "premise inspection service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
