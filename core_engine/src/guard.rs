//! Boundary checks for untrusted request text.
//!
//! This is a coarse filter that keeps obviously hostile or oversized input away
//! from the predictor. It is defense-in-depth only and not a security boundary:
//! responses are JSON, never HTML.

use once_cell::sync::Lazy;
use regex::Regex;

pub const DEFAULT_MAX_CHARS: usize = 500;

const DENYLIST: [&str; 4] = ["<script", "javascript:", "data:", "vbscript:"];

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputGuard {
    max_chars: usize,
}

impl Default for InputGuard {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHARS)
    }
}

impl InputGuard {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Rejects blank text, text over the length limit, and text containing a
    /// denylisted marker (case-insensitive).
    pub fn validate(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        if text.chars().count() > self.max_chars {
            return false;
        }
        let lower = text.to_lowercase();
        !DENYLIST.iter().any(|marker| lower.contains(marker))
    }

    /// Strips `<...>` tags, collapses whitespace runs, trims, and truncates to
    /// the length limit in characters.
    pub fn sanitize(&self, text: &str) -> String {
        let stripped = TAG.replace_all(text, "");
        let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
        match collapsed.char_indices().nth(self.max_chars) {
            Some((cut, _)) => collapsed[..cut].to_string(),
            None => collapsed,
        }
    }
}
