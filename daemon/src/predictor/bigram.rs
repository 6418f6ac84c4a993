use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use nextword_core::{BigramTable, Prediction};
use tracing::info;

use crate::predictor::{PredictContext, PredictorEngine};
use crate::protocol::SourceKind;

pub struct BigramPredictor {
    table: BigramTable,
}

impl BigramPredictor {
    pub fn load(corpus_path: &Path) -> Result<Self> {
        if corpus_path.as_os_str().is_empty() {
            anyhow::bail!("model.backend is bigram but model.corpus_path is empty");
        }
        let table = BigramTable::load(corpus_path)
            .with_context(|| format!("failed to build bigram table from {}", corpus_path.display()))?;
        info!(
            corpus = %corpus_path.display(),
            predecessors = table.len(),
            "loaded bigram corpus"
        );
        Ok(Self::from_table(table))
    }

    pub fn from_table(table: BigramTable) -> Self {
        Self { table }
    }
}

#[async_trait]
impl PredictorEngine for BigramPredictor {
    fn source(&self) -> SourceKind {
        SourceKind::Bigram
    }

    async fn predict(&self, context: &PredictContext) -> Result<Vec<Prediction>> {
        Ok(self.table.predict(&context.last_word))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn empty_corpus_path_is_rejected() {
        let error = BigramPredictor::load(&PathBuf::new()).err().unwrap();
        assert!(error.to_string().contains("corpus_path is empty"));
    }

    #[tokio::test]
    async fn unseen_word_gets_generic_triple() {
        let predictor = BigramPredictor::from_table(BigramTable::from_text("good morning"));
        let context = PredictContext {
            text: "hello".to_string(),
            last_word: "hello".to_string(),
        };
        let words: Vec<_> = predictor
            .predict(&context)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.word)
            .collect();
        assert_eq!(words, vec!["the", "and", "for"]);
    }
}
