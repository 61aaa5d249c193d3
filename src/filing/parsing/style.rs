use once_cell::sync::Lazy;
use regex::Regex;

use super::tree::StyleDescriptor;
use crate::filing::ticker::Ticker;

/// Role assigned to a styled text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunClass {
    Heading,
    SubHeading,
    Body,
    Ignore,
}

/// Footnote marker at the start of a footnote-table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FootnoteMarker {
    Numbered(u32),
    Star,
}

/// A multi-row table header prefix such as "Year Ended December 31,".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodPrefix {
    /// Short code composed into column names: YE, QE, ME or FY.
    pub code: &'static str,
    /// Month/day of the date token in the prefix phrase, when present.
    pub month_day: Option<(u32, u32)>,
}

static ITEM_BOUNDARY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(Item \d+\.)$").unwrap());
static SUB_ITEM_BOUNDARY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(Item \d+[A-Z]+\.)$").unwrap());
static ITEM_ANY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Item\s+\d+[A-Z]?\.?($|\s)").unwrap());
static ITEM_NUM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());
static PAGE_MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+|F-\d+)$").unwrap());
static UNIT_ANNOTATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\(.*(thousands|millions|billions|per\s+share).*\)$").unwrap()
});
static TOC_MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)table\s+of\s+contents").unwrap());
static DIVIDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^_{3,}$").unwrap());
static FOOTNOTE_NUM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\((\d+)\)\s*").unwrap());
static FOOTNOTE_STAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\*\s*").unwrap());
static PERIOD_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:(year|quarter|month)s?\s+ended|(fiscal))\b").unwrap());
static MONTH_DAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(january|february|march|april|may|june|july|august|september|october|november|december)\s+(\d{1,2})",
    )
    .unwrap()
});
static BARE_YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(19|20)\d{2}$").unwrap());
static PERIOD_CONTEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]{4}Q[0-9](?:YTD|QTD)?").unwrap());
static INTEGER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());
static NOTE_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Note\s+\d+\s*[.:]?\s*").unwrap());
static ITEM_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Item\s+\d+[A-Z]?\s*[.:]?\s*").unwrap());

/// Immutable classification configuration, injected into every component
/// that interprets run text or style. One value per filing; construct a
/// variant per filing era if conventions differ.
#[derive(Debug, Clone, Default)]
pub struct ClassificationRules {
    ticker: Option<Ticker>,
    company_name: Option<String>,
}

impl ClassificationRules {
    pub fn for_company(ticker: Ticker, company_name: Option<String>) -> Self {
        ClassificationRules {
            ticker: Some(ticker),
            company_name,
        }
    }

    pub fn ticker(&self) -> Option<&Ticker> {
        self.ticker.as_ref()
    }

    /// Classify one styled run. Pure; never fails. Anything that does not
    /// match a recognized style combination is Body.
    pub fn classify(&self, style: StyleDescriptor, text: &str) -> RunClass {
        let text = text.trim();
        if text.is_empty()
            || self.is_toc_marker(text)
            || self.is_page_marker(text)
            || self.is_unit_annotation(text)
            || self.is_company_name(text)
        {
            return RunClass::Ignore;
        }
        if style.is_bold() {
            RunClass::Heading
        } else if style.is_italic() {
            RunClass::SubHeading
        } else {
            RunClass::Body
        }
    }

    /// Runs that participate in narrative segmentation: bold headers plus
    /// body runs in the standard inherit-family/point-size font.
    pub fn is_narrative_run(&self, style: StyleDescriptor) -> bool {
        style.is_bold() || (style.inherits_family && style.size_pt.is_some())
    }

    pub fn is_item_boundary(&self, text: &str) -> bool {
        ITEM_BOUNDARY_RE.is_match(text)
    }

    pub fn is_sub_item_boundary(&self, text: &str) -> bool {
        SUB_ITEM_BOUNDARY_RE.is_match(text)
    }

    /// Loose item-heading test used for table-of-contents detection.
    pub fn mentions_item_boundary(&self, text: &str) -> bool {
        ITEM_ANY_RE.is_match(text)
    }

    /// First run of digits in an item boundary, the transient segmentation
    /// key linking "Item 1A." back to "Item 1.".
    pub fn item_number(&self, text: &str) -> Option<String> {
        ITEM_NUM_RE.find(text).map(|m| m.as_str().to_string())
    }

    pub fn is_toc_marker(&self, text: &str) -> bool {
        TOC_MARKER_RE.is_match(text)
    }

    pub fn is_page_marker(&self, text: &str) -> bool {
        PAGE_MARKER_RE.is_match(text)
    }

    pub fn is_unit_annotation(&self, text: &str) -> bool {
        UNIT_ANNOTATION_RE.is_match(text)
    }

    /// The company's own name or ticker standing alone is never a valid
    /// title or heading.
    pub fn is_company_name(&self, text: &str) -> bool {
        let text = text.trim();
        if let Some(ticker) = &self.ticker {
            if text.eq_ignore_ascii_case(ticker.as_str()) {
                return true;
            }
        }
        if let Some(name) = &self.company_name {
            if text.eq_ignore_ascii_case(name) {
                return true;
            }
        }
        false
    }

    pub fn is_divider(&self, text: &str) -> bool {
        DIVIDER_RE.is_match(text)
    }

    /// Detect a footnote marker at the start of a row; returns the marker
    /// and the remaining footnote text.
    pub fn footnote_marker<'a>(&self, text: &'a str) -> Option<(FootnoteMarker, &'a str)> {
        if let Some(caps) = FOOTNOTE_NUM_RE.captures(text) {
            let index: u32 = caps[1].parse().ok()?;
            let rest = &text[caps.get(0)?.end()..];
            return Some((FootnoteMarker::Numbered(index), rest));
        }
        if let Some(m) = FOOTNOTE_STAR_RE.find(text) {
            return Some((FootnoteMarker::Star, &text[m.end()..]));
        }
        None
    }

    /// Detect a shared date/period header prefix ("Year Ended December 31,").
    pub fn period_prefix(&self, text: &str) -> Option<PeriodPrefix> {
        let caps = PERIOD_PREFIX_RE.captures(text)?;
        let code = if caps.get(2).is_some() {
            "FY"
        } else {
            match caps[1].to_lowercase().as_str() {
                "year" => "YE",
                "quarter" => "QE",
                "month" => "ME",
                _ => return None,
            }
        };
        let month_day = MONTH_DAY_RE.captures(text).and_then(|m| {
            let month = month_number(&m[1])?;
            let day: u32 = m[2].parse().ok()?;
            Some((month, day))
        });
        Some(PeriodPrefix { code, month_day })
    }

    pub fn bare_year<'a>(&self, text: &'a str) -> Option<&'a str> {
        BARE_YEAR_RE.is_match(text).then_some(text)
    }

    /// Canonical period key (e.g. "2019Q4YTD") from a fact's context
    /// reference; None when the context does not encode a quarter.
    pub fn period_key(&self, context: &str) -> Option<String> {
        PERIOD_CONTEXT_RE
            .find(context)
            .map(|m| m.as_str().to_string())
    }

    /// Facts must be plain unsigned integers; anything else is skipped.
    pub fn is_integer_fact(&self, text: &str) -> bool {
        INTEGER_RE.is_match(text)
    }

    /// Strip a leading "Note N" / "Item N." prefix from a candidate table
    /// title.
    pub fn strip_title_prefix<'a>(&self, text: &'a str) -> &'a str {
        if let Some(m) = NOTE_PREFIX_RE.find(text) {
            return &text[m.end()..];
        }
        if let Some(m) = ITEM_PREFIX_RE.find(text) {
            return &text[m.end()..];
        }
        text
    }
}

fn month_number(name: &str) -> Option<u32> {
    match name.to_lowercase().as_str() {
        "january" => Some(1),
        "february" => Some(2),
        "march" => Some(3),
        "april" => Some(4),
        "may" => Some(5),
        "june" => Some(6),
        "july" => Some(7),
        "august" => Some(8),
        "september" => Some(9),
        "october" => Some(10),
        "november" => Some(11),
        "december" => Some(12),
        _ => None,
    }
}
