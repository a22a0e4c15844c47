use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;

mod config;
mod error;
mod insights;
mod pipeline;
mod registry;
mod routes;
mod telemetry;

use config::Config;
use insights::InsightProvider;
use pipeline::DocumentStore;
use registry::{StaticTemplateRegistry, TemplateProvider};
use telemetry::init_telemetry;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub templates: Arc<dyn TemplateProvider>,
    pub insights: Arc<dyn InsightProvider>,
    pub documents: DocumentStore,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let telemetry_guard = init_telemetry(&config)?;

    tracing::info!(
        port = config.port,
        environment = %config.environment,
        "Starting report-assembler"
    );

    let registry = StaticTemplateRegistry::load(config.template_registry_path.as_deref())?;
    let registry_source = config
        .template_registry_path
        .as_deref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "builtin".to_string());
    let template_ids = registry.template_ids().await;
    tracing::info!(
        templates = ?template_ids,
        source = %registry_source,
        "Template registry loaded"
    );

    let insight_provider = insights::build_provider(&config.insight_provider)?;
    tracing::info!(provider = insight_provider.name(), "Insight provider initialized");

    let documents = DocumentStore::new(config.templates_dir.clone(), config.output_dir.clone());
    documents.ensure_output_dir().await?;
    tracing::info!(
        templates_dir = %documents.templates_dir.display(),
        output_dir = %documents.output_dir.display(),
        "Document store ready"
    );

    let state = AppState {
        config: config.clone(),
        templates: Arc::new(registry),
        insights: insight_provider,
        documents,
    };

    let app = routes::create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    telemetry_guard.shutdown();

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
