//! Trial Match Prediction Service - Main Entry Point
//!
//! Loads the training artifacts, then serves match predictions over HTTP.

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use trial_match_service::{
    config::AppConfig,
    features::{self, FeatureAssembler},
    metrics::{MetricsReporter, ServiceMetrics},
    models::MatchClassifier,
    server::{self, AppState},
    vectorizer::TfidfVectorizer,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                format!("trial_match_service={}", config.logging.level).parse()?,
            ),
        )
        .init();

    info!("Starting Trial Match Prediction Service");

    // Load training artifacts; any failure here is fatal
    let vectorizer = TfidfVectorizer::load(&config.artifacts.vectorizer_path)?;
    let onehot_columns = features::load_onehot_columns(&config.artifacts.onehot_columns_path)?;
    let assembler = Arc::new(FeatureAssembler::new(onehot_columns, vectorizer));
    info!(
        feature_count = assembler.feature_count(),
        "Feature assembler ready"
    );

    let classifier = Arc::new(MatchClassifier::new(&config)?);

    // Warmup so the first request does not pay session initialization; this
    // also fails fast if the artifacts disagree on feature width
    let warmup = classifier.predict(&vec![0.0; assembler.feature_count()])?;
    info!(probability = warmup.probability, "Warmup inference ok");

    // Initialize metrics and periodic summary reporting
    let metrics = Arc::new(ServiceMetrics::new());
    let metrics_clone = metrics.clone();
    tokio::spawn(async move {
        let reporter = MetricsReporter::new(metrics_clone, 60);
        reporter.start().await;
    });

    let state = AppState {
        assembler,
        classifier,
        metrics,
    };
    let app = server::router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address: {}", e))?;
    info!(%addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
