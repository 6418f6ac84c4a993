//! Core of the next-word service: the fingerprint cache, the input guard and
//! the table-driven prediction sources. Nothing in here performs I/O except
//! the corpus loader.

pub mod baseline;
pub mod cache;
pub mod guard;
pub mod protocol;
mod util;

pub use baseline::{generic_fallback, BigramTable, CorpusError, HeuristicTable, GENERIC_FALLBACK};
pub use cache::{CacheConfig, Fingerprint, FingerprintCache};
pub use guard::InputGuard;
pub use protocol::{pad_predictions, Prediction, PREDICTION_SLOTS};
pub use util::last_word;
