mod bigram;
mod heuristic;
mod ollama;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
pub use bigram::BigramPredictor;
pub use heuristic::HeuristicPredictor;
use nextword_core::{last_word, CacheConfig, FingerprintCache, Prediction};
pub use ollama::OllamaPredictor;
use tracing::{debug, warn};

use crate::config::{ModelBackend, ModelConfig};
use crate::protocol::SourceKind;

/// What a prediction source gets to look at. Table-driven sources only use
/// `last_word`; the model continues the full `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictContext {
    pub text: String,
    pub last_word: String,
}

#[async_trait]
pub trait PredictorEngine: Send + Sync {
    fn source(&self) -> SourceKind;

    async fn predict(&self, context: &PredictContext) -> Result<Vec<Prediction>>;
}

/// Cache in front of a single prediction source chosen at startup.
pub struct Predictor {
    engine: Arc<dyn PredictorEngine>,
    cache: FingerprintCache,
}

impl Predictor {
    /// Builds the configured source. A source that cannot be constructed is
    /// logged once and replaced by the heuristic table for the life of the
    /// process.
    pub async fn from_config(model: &ModelConfig, cache: CacheConfig) -> Self {
        let engine = build_engine(model).await;
        Self::with_engine(engine, FingerprintCache::new(cache))
    }

    pub fn with_engine(engine: Arc<dyn PredictorEngine>, cache: FingerprintCache) -> Self {
        Self { engine, cache }
    }

    pub fn source(&self) -> SourceKind {
        self.engine.source()
    }

    pub fn cache(&self) -> &FingerprintCache {
        &self.cache
    }

    /// Raw, unpadded predictions for `text`. Blank text yields an empty list.
    /// Source failures are logged and also yield an empty list.
    pub async fn get_predictions(&self, text: &str) -> Vec<Prediction> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        // An empty cached result counts as a miss, so failures are retried.
        if let Some(cached) = self.cache.get(text).filter(|cached| !cached.is_empty()) {
            debug!(entries = cached.len(), "prediction cache hit");
            return cached;
        }

        let Some(last_word) = last_word(text) else {
            return Vec::new();
        };
        let context = PredictContext {
            text: text.to_string(),
            last_word,
        };

        let predictions = match self.engine.predict(&context).await {
            Ok(predictions) => predictions,
            Err(error) => {
                warn!(source = ?self.engine.source(), "prediction failed: {error:#}");
                Vec::new()
            }
        };
        self.cache.put(text, predictions.clone());
        predictions
    }
}

async fn build_engine(model: &ModelConfig) -> Arc<dyn PredictorEngine> {
    let fallback: Arc<dyn PredictorEngine> = Arc::new(HeuristicPredictor::new());
    match model.backend {
        ModelBackend::Heuristic => fallback,
        ModelBackend::Bigram => match BigramPredictor::load(&model.corpus_path) {
            Ok(predictor) => Arc::new(predictor),
            Err(error) => {
                warn!("failed to load bigram corpus, using heuristic table: {error:#}");
                fallback
            }
        },
        ModelBackend::Model => match OllamaPredictor::connect(model.clone()).await {
            Ok(predictor) => Arc::new(predictor),
            Err(error) => {
                warn!("failed to init model backend, using heuristic table: {error:#}");
                fallback
            }
        },
    }
}
