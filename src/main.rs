use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use dermalens::pipeline::catalog::LabelCatalog;
use dermalens::pipeline::classifier::{self, Classifier};
use dermalens::pipeline::narration::{Narrator, OllamaClient};
use dermalens::pipeline::LesionAnalyzer;
use dermalens::{api, config};

/// Assemble the pipeline from configuration. Blocking: loads the model and
/// probes the narrator once.
fn build_analyzer() -> LesionAnalyzer {
    let catalog = LabelCatalog::new(config::catalog_variant());
    tracing::info!(
        catalog = catalog.variant().name(),
        classes = catalog.len(),
        "Label catalog configured"
    );

    let backend = classifier::load_backend(&config::model_path());
    let classifier = Classifier::new(backend, catalog.len());

    let narrator = Narrator::connect(
        Box::new(OllamaClient::from_env()),
        &config::narrator_model(),
    );

    LesionAnalyzer::new(classifier, narrator, catalog)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    // Model load + narrator probe block; keep them off the async workers.
    let analyzer = tokio::task::spawn_blocking(build_analyzer)
        .await
        .expect("pipeline startup failed");

    let app = api::analysis_router(Arc::new(analyzer));
    let addr = SocketAddr::from(([0, 0, 0, 0], config::port()));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("Cannot bind {addr}: {e}"));
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app).await.expect("server error");
}
