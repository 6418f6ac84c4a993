mod config;
mod predictor;
mod protocol;
mod server;

use anyhow::Result;
use config::DaemonConfig;
use nextword_core::InputGuard;
use predictor::Predictor;
use server::PredictionServer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = DaemonConfig::load()?;
    info!(
        bind = %config.server.bind,
        request_timeout_ms = config.server.request_timeout_ms,
        backend = ?config.model.backend,
        ollama_model = %config.model.ollama_model,
        corpus = %config.model.corpus_path.display(),
        cache_capacity = config.cache.capacity,
        cache_ttl_secs = config.cache.ttl_secs,
        max_chars = config.guard.max_chars,
        "loaded nextword config"
    );

    let predictor = Predictor::from_config(&config.model, (&config.cache).into()).await;
    let guard = InputGuard::new(config.guard.max_chars);
    let server = PredictionServer::new(config.server.clone(), guard, predictor);
    server.run().await
}
