use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures_util::future::try_join_all;
use nextword_core::baseline::{dedup_first_seen, MAX_CANDIDATES};
use nextword_core::Prediction;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ModelConfig;
use crate::predictor::{PredictContext, PredictorEngine};
use crate::protocol::SourceKind;

/// Sampled continuations from a local Ollama model; the first word of each
/// continuation is a candidate.
pub struct OllamaPredictor {
    base_url: String,
    model: String,
    temperature: f32,
    max_new_tokens: u32,
    num_candidates: usize,
    client: Client,
}

impl OllamaPredictor {
    /// Validates the configuration and checks that the model is served.
    pub async fn connect(config: ModelConfig) -> Result<Self> {
        if config.ollama_model.trim().is_empty() {
            return Err(anyhow!(
                "model.backend is model but model.ollama_model is empty"
            ));
        }
        if config.ollama_host.trim().is_empty() {
            return Err(anyhow!(
                "model.backend is model but model.ollama_host is empty"
            ));
        }

        let predictor = Self {
            base_url: config.ollama_host.trim_end_matches('/').to_string(),
            model: config.ollama_model,
            temperature: config.temperature,
            max_new_tokens: config.max_new_tokens.max(1),
            num_candidates: config.num_candidates.max(1),
            client: Client::builder()
                .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
                .build()
                .context("failed to build HTTP client")?,
        };
        predictor.probe_model().await?;
        info!(model = %predictor.model, host = %predictor.base_url, "model backend ready");
        Ok(predictor)
    }

    async fn probe_model(&self) -> Result<()> {
        let endpoint = format!("{}/api/show", self.base_url);
        let response = self
            .client
            .post(endpoint)
            .json(&OllamaShowRequest {
                model: self.model.clone(),
            })
            .send()
            .await
            .with_context(|| format!("failed to reach ollama at {}", self.base_url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("ollama cannot serve model {} ({status})", self.model));
        }
        Ok(())
    }

    async fn run_generate(&self, text: &str) -> Result<String> {
        let endpoint = format!("{}/api/generate", self.base_url);
        let payload = OllamaGenerateRequest {
            model: self.model.clone(),
            prompt: text.to_string(),
            raw: true,
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
                num_predict: self.max_new_tokens,
            },
        };

        let response = self
            .client
            .post(endpoint)
            .json(&payload)
            .send()
            .await
            .context("failed to call ollama API")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("failed to read ollama response body")?;

        if !status.is_success() {
            return Err(anyhow!("ollama API failed ({status}): {body}"));
        }

        let parsed: OllamaGenerateResponse =
            serde_json::from_str(&body).context("invalid ollama response format")?;
        Ok(parsed.response)
    }

    async fn generate_candidates(&self, text: &str) -> Result<Vec<Prediction>> {
        let continuations =
            try_join_all((0..self.num_candidates).map(|_| self.run_generate(text))).await?;
        let words = continuations
            .iter()
            .filter_map(|continuation| first_word(continuation));

        Ok(dedup_first_seen(words)
            .into_iter()
            .take(MAX_CANDIDATES)
            .map(|word| Prediction::new(word, 1))
            .collect())
    }
}

fn first_word(continuation: &str) -> Option<String> {
    let word = continuation
        .split_whitespace()
        .next()?
        .trim_matches(|ch: char| matches!(ch, '`' | '"'));
    (!word.is_empty()).then(|| word.to_string())
}

#[async_trait]
impl PredictorEngine for OllamaPredictor {
    fn source(&self) -> SourceKind {
        SourceKind::Model
    }

    async fn predict(&self, context: &PredictContext) -> Result<Vec<Prediction>> {
        match self.generate_candidates(&context.text).await {
            Ok(predictions) => Ok(predictions),
            Err(error) => {
                warn!("model prediction failed: {error:#}");
                Ok(Vec::new())
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct OllamaShowRequest {
    model: String,
}

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    raw: bool,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}
