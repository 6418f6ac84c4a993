use std::collections::{HashMap, HashSet};

use crate::protocol::Prediction;

/// Drops blank candidates and later repeats, keeping first-seen order.
pub fn dedup_first_seen<I>(candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|word| !word.is_empty() && seen.insert(word.clone()))
        .collect()
}

/// Highest counts first; equal counts order alphabetically so the result does
/// not depend on map iteration order.
pub fn top_by_count(counts: &HashMap<String, u32>, limit: usize) -> Vec<Prediction> {
    let mut ranked: Vec<(&String, &u32)> = counts.iter().collect();
    ranked.sort_by(|(a_word, a_count), (b_word, b_count)| {
        b_count.cmp(a_count).then_with(|| a_word.cmp(b_word))
    });
    ranked
        .into_iter()
        .take(limit)
        .map(|(word, count)| Prediction::new(word.clone(), *count))
        .collect()
}
