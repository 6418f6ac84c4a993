use anyhow::Result;
use async_trait::async_trait;
use nextword_core::{HeuristicTable, Prediction};

use crate::predictor::{PredictContext, PredictorEngine};
use crate::protocol::SourceKind;

pub struct HeuristicPredictor {
    table: HeuristicTable,
}

impl HeuristicPredictor {
    pub fn new() -> Self {
        Self {
            table: HeuristicTable::new(),
        }
    }
}

#[async_trait]
impl PredictorEngine for HeuristicPredictor {
    fn source(&self) -> SourceKind {
        SourceKind::Heuristic
    }

    async fn predict(&self, context: &PredictContext) -> Result<Vec<Prediction>> {
        Ok(self.table.predict(&context.last_word))
    }
}
