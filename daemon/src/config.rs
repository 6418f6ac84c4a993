use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use nextword_core::guard::DEFAULT_MAX_CHARS;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DaemonConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub guard: GuardConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

impl DaemonConfig {
    pub fn load() -> Result<Self> {
        Self::from_path(&resolve_config_path())
    }

    /// Reads `path` if it exists; a missing file means defaults everywhere.
    pub fn from_path(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let raw = fs::read_to_string(config_path)
                .with_context(|| format!("failed to read config file {}", config_path.display()))?;
            let parsed: DaemonConfig = toml::from_str(&raw)
                .with_context(|| format!("failed to parse TOML from {}", config_path.display()))?;
            return Ok(parsed);
        }

        Ok(DaemonConfig::default())
    }
}

fn resolve_config_path() -> PathBuf {
    if let Ok(path) = env::var("NEXTWORD_CONFIG") {
        return Path::new(&path).to_path_buf();
    }

    if let Some(base) = dirs::config_dir() {
        return base.join("nextword").join("config.toml");
    }

    Path::new("/tmp/nextword.toml").to_path_buf()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.max(1))
    }
}

fn default_bind() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_request_timeout_ms() -> u64 {
    2000
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl From<&CacheConfig> for nextword_core::CacheConfig {
    fn from(config: &CacheConfig) -> Self {
        Self {
            capacity: config.capacity,
            ttl: Duration::from_secs(config.ttl_secs),
        }
    }
}

fn default_cache_capacity() -> usize {
    nextword_core::cache::DEFAULT_CAPACITY
}

fn default_cache_ttl_secs() -> u64 {
    nextword_core::cache::DEFAULT_TTL.as_secs()
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuardConfig {
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
        }
    }
}

fn default_max_chars() -> usize {
    DEFAULT_MAX_CHARS
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_backend")]
    pub backend: ModelBackend,
    #[serde(default = "default_ollama_host")]
    pub ollama_host: String,
    #[serde(default = "default_ollama_model")]
    pub ollama_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,
    #[serde(default = "default_num_candidates")]
    pub num_candidates: usize,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default)]
    pub corpus_path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            ollama_host: default_ollama_host(),
            ollama_model: default_ollama_model(),
            temperature: default_temperature(),
            max_new_tokens: default_max_new_tokens(),
            num_candidates: default_num_candidates(),
            connect_timeout_ms: default_connect_timeout_ms(),
            corpus_path: PathBuf::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModelBackend {
    Heuristic,
    Bigram,
    Model,
}

fn default_backend() -> ModelBackend {
    ModelBackend::Model
}

fn default_ollama_host() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_ollama_model() -> String {
    "gpt2".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_new_tokens() -> u32 {
    5
}

fn default_num_candidates() -> usize {
    3
}

fn default_connect_timeout_ms() -> u64 {
    1500
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DaemonConfig::from_path(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.cache.capacity, 100);
        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.guard.max_chars, 500);
        assert_eq!(config.model.backend, ModelBackend::Model);
        assert_eq!(config.server.bind, "0.0.0.0:5000");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[cache]\ncapacity = 8\n\n[model]\nbackend = \"bigram\"\ncorpus_path = \"/srv/words.txt\"\n",
        )
        .unwrap();

        let config = DaemonConfig::from_path(&path).unwrap();
        assert_eq!(config.cache.capacity, 8);
        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.model.backend, ModelBackend::Bigram);
        assert_eq!(config.model.corpus_path, PathBuf::from("/srv/words.txt"));
        assert_eq!(config.model.num_candidates, 3);

        let core: nextword_core::CacheConfig = (&config.cache).into();
        assert_eq!(core.capacity, 8);
        assert_eq!(core.ttl, Duration::from_secs(300));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[model]\nbackend = \"gpt9\"\n").unwrap();
        let error = DaemonConfig::from_path(&path).unwrap_err();
        assert!(format!("{error:#}").contains("failed to parse TOML"));
    }
}
