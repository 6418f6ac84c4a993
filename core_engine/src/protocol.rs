use serde::ser::{Serialize, Serializer};

/// Number of pairs the boundary always answers with.
pub const PREDICTION_SLOTS: usize = 3;

/// A single `(word, score)` pair. Serialized as a two-element JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Prediction {
    pub word: String,
    pub score: u32,
}

impl Prediction {
    pub fn new(word: impl Into<String>, score: u32) -> Self {
        Self {
            word: word.into(),
            score,
        }
    }

    /// The `("", 0)` placeholder meaning "no further prediction".
    pub fn empty() -> Self {
        Self::new(String::new(), 0)
    }

    pub fn is_blank(&self) -> bool {
        self.word.trim().is_empty()
    }
}

impl Serialize for Prediction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.word, self.score).serialize(serializer)
    }
}

/// Drops blank words and pads with `("", 0)` up to exactly
/// [`PREDICTION_SLOTS`] entries.
pub fn pad_predictions(predictions: Vec<Prediction>) -> Vec<Prediction> {
    let mut padded: Vec<Prediction> = predictions
        .into_iter()
        .filter(|prediction| !prediction.is_blank())
        .take(PREDICTION_SLOTS)
        .collect();
    padded.resize_with(PREDICTION_SLOTS, Prediction::empty);
    padded
}
