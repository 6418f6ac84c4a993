use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::scoring::top_by_count;
use super::{generic_fallback, MAX_CANDIDATES};
use crate::protocol::Prediction;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to read corpus {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("corpus {} contains no word pairs", .0.display())]
    Empty(PathBuf),
}

/// Following-word counts keyed by predecessor word.
#[derive(Debug, Default, Clone)]
pub struct BigramTable {
    followers: HashMap<String, HashMap<String, u32>>,
}

impl BigramTable {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| CorpusError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_text(&raw);
        if table.is_empty() {
            return Err(CorpusError::Empty(path.to_path_buf()));
        }
        Ok(table)
    }

    /// Counts adjacent word pairs across the whole text, line breaks included.
    pub fn from_text(text: &str) -> Self {
        let mut table = Self::default();
        let mut previous: Option<String> = None;
        for token in text.split_whitespace().filter_map(normalize_token) {
            if let Some(prev) = previous.take() {
                table.record(prev, token.clone());
            }
            previous = Some(token);
        }
        table
    }

    pub fn record(&mut self, previous: String, next: String) {
        let count = self
            .followers
            .entry(previous)
            .or_default()
            .entry(next)
            .or_default();
        *count = count.saturating_add(1);
    }

    /// Number of distinct predecessor words.
    pub fn len(&self) -> usize {
        self.followers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.followers.is_empty()
    }

    /// The three most frequent followers of `last_word`, scored by count, or
    /// the generic triple when `last_word` never precedes anything.
    pub fn predict(&self, last_word: &str) -> Vec<Prediction> {
        normalize_token(last_word)
            .and_then(|word| self.followers.get(&word))
            .map(|counts| top_by_count(counts, MAX_CANDIDATES))
            .filter(|ranked| !ranked.is_empty())
            .unwrap_or_else(generic_fallback)
    }
}

fn normalize_token(raw: &str) -> Option<String> {
    let trimmed = raw.trim_matches(|ch: char| !ch.is_alphanumeric());
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}
