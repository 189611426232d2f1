use std::borrow::Cow;

use crate::static_regex;

static_regex!(LINE_BREAK <- r"(?i)<br\s*/?>");
static_regex!(SPAN <- r"(?i)<span\b[^>]*>.*?</span>");
static_regex!(TAG <- r"<[^>]+>");
static_regex!(PARENTHETICAL <- r"\(.*\)");

/// Splits a cell on its line breaks, keeping empty lines so positions stay aligned.
pub fn split_lines(cell_html: &str) -> Vec<&str> {
    LINE_BREAK.split(cell_html).collect()
}

/// Removes inline spans along with everything inside them.
pub fn strip_spans(s: &str) -> Cow<'_, str> {
    SPAN.replace_all(s, "")
}

pub fn strip_tags(s: &str) -> Cow<'_, str> {
    TAG.replace_all(s, "")
}

/// Greedy: `a (b) c (d)` loses everything from the first `(` to the last `)`.
pub fn strip_parentheticals(s: &str) -> Cow<'_, str> {
    PARENTHETICAL.replace_all(s, "")
}

pub fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

pub fn remove_all(s: &str, noise: &[&str]) -> String {
    noise
        .iter()
        .fold(s.to_string(), |acc, token| acc.replace(token, ""))
}

/// Markup-free text of a fragment, trimmed.
pub fn plain_text(fragment: &str) -> String {
    decode_entities(&strip_tags(fragment)).trim().to_string()
}

/// One cell line reduced to the text a reader would see, minus spans and parentheticals.
pub fn clean_line(line: &str) -> String {
    let line = strip_spans(line);
    let line = decode_entities(&strip_tags(&line));
    strip_parentheticals(&line).trim().to_string()
}
