/// Last whitespace-delimited token, if any, as typed. Case folding belongs to
/// the tables that look it up.
pub fn last_word(text: &str) -> Option<String> {
    text.split_whitespace().next_back().map(str::to_string)
}
