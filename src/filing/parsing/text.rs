use html_escape::decode_html_entities;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize a raw text run: decode HTML entities, fold Unicode to NFKC,
/// replace non-breaking spaces, collapse internal whitespace and trim.
pub fn clean_text(raw: &str) -> String {
    let decoded = decode_html_entities(raw).into_owned();
    let normalized: String = decoded.nfkc().collect();
    let normalized = normalized.replace('\u{a0}', " ");
    WHITESPACE_RE.replace_all(&normalized, " ").trim().to_string()
}

/// Replace internal newlines with single spaces without touching other
/// whitespace. Used when accumulated section text is flushed.
pub fn newlines_to_spaces(raw: &str) -> String {
    raw.replace(['\r', '\n'], " ")
}

/// Trim leading/trailing punctuation left behind after prefix stripping
/// (colons, periods, dashes) together with whitespace.
pub fn trim_punctuation(raw: &str) -> String {
    raw.trim_matches(|c: char| {
        c.is_whitespace() || matches!(c, '.' | ':' | ';' | ',' | '-' | '\u{2013}' | '\u{2014}')
    })
    .to_string()
}
