mod bigram;
mod scoring;

pub use bigram::{BigramTable, CorpusError};
pub use scoring::{dedup_first_seen, top_by_count};

use crate::protocol::Prediction;

pub const MAX_CANDIDATES: usize = 3;

/// Answer used when nothing more specific matches.
pub const GENERIC_FALLBACK: [(&str, u32); 3] = [("the", 1), ("and", 1), ("for", 1)];

pub fn generic_fallback() -> Vec<Prediction> {
    GENERIC_FALLBACK
        .iter()
        .map(|(word, score)| Prediction::new(*word, *score))
        .collect()
}

/// Static two-letter prefix to completion table. Needs no model or corpus.
#[derive(Debug, Clone)]
pub struct HeuristicTable {
    completions: Vec<(&'static str, [&'static str; 3])>,
}

impl Default for HeuristicTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HeuristicTable {
    pub fn new() -> Self {
        let completions = vec![
            ("th", ["the", "that", "this"]),
            ("he", ["hello", "help", "here"]),
            ("an", ["and", "any", "answer"]),
            ("in", ["into", "information", "include"]),
            ("on", ["only", "once", "online"]),
            ("at", ["about", "after", "around"]),
            ("be", ["because", "before", "between"]),
            ("ha", ["have", "has", "had"]),
            ("wi", ["with", "will", "would"]),
            ("yo", ["you", "your", "young"]),
        ];
        Self { completions }
    }

    /// Completions of `last_word` from every table row whose prefix it starts
    /// with, in table order, each scored 1. Lookup is case-insensitive; this is
    /// the only place the heuristic path lowercases.
    pub fn predict(&self, last_word: &str) -> Vec<Prediction> {
        let last_word = last_word.to_lowercase();
        let candidates: Vec<Prediction> = self
            .completions
            .iter()
            .filter(|(prefix, _)| last_word.starts_with(prefix))
            .flat_map(|(_, words)| words.iter())
            .filter(|word| word.starts_with(&last_word))
            .take(MAX_CANDIDATES)
            .map(|word| Prediction::new(*word, 1))
            .collect();

        if candidates.is_empty() {
            return generic_fallback();
        }
        candidates
    }
}
