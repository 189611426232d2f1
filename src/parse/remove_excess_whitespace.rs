use std::borrow::Cow;

use crate::static_regex;

static_regex!(WHITESPACE <- r"\s+");

/// Collapses every run of whitespace, line breaks included, into one space.
pub fn remove_excess_whitespace(s: &str) -> Cow<'_, str> {
    WHITESPACE.replace_all(s, " ")
}

/// Drops whitespace entirely; floor 3 breaks its corner labels across lines.
pub fn remove_all_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}
