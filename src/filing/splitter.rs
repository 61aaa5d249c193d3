use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static DOCUMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<DOCUMENT>(.*?)</DOCUMENT>").unwrap());
static TEXT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<TEXT>(.*?)</TEXT>").unwrap());
static FILED_AS_OF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"FILED AS OF DATE:\s+(\d{8})").unwrap());

/// Declared header fields of a `<DOCUMENT>` block. Each appears on its own
/// line, value terminated by the next tag.
const TYPE_MARKER: &str = "<TYPE>";
const SEQUENCE_MARKER: &str = "<SEQUENCE>";
const FILENAME_MARKER: &str = "<FILENAME>";
const DESCRIPTION_MARKER: &str = "<DESCRIPTION>";

/// One boundary-delimited sub-document before structuring: declared fields
/// plus the raw markup body.
#[derive(Debug, Clone)]
pub struct RawSubDocument {
    pub doc_type: String,
    pub sequence: Option<String>,
    pub filename: Option<String>,
    /// Declared description; `None` means the sub-document is dropped by
    /// the orchestrator.
    pub description: Option<String>,
    pub body: String,
}

/// Split a raw full-text submission into its `<DOCUMENT>` blocks.
pub fn split_documents(raw: &str) -> Vec<RawSubDocument> {
    DOCUMENT_RE
        .captures_iter(raw)
        .map(|caps| {
            let block = &caps[1];
            let body = TEXT_RE
                .captures(block)
                .and_then(|text| text.get(1))
                .map(|m| m.as_str())
                .unwrap_or("")
                .replace("<XBRL>", "")
                .replace("</XBRL>", "")
                .replace("<XML>", "")
                .replace("</XML>", "")
                .trim()
                .to_string();
            RawSubDocument {
                doc_type: declared_field(block, TYPE_MARKER).unwrap_or_default(),
                sequence: declared_field(block, SEQUENCE_MARKER),
                filename: declared_field(block, FILENAME_MARKER),
                description: declared_field(block, DESCRIPTION_MARKER),
                body,
            }
        })
        .collect()
}

fn declared_field(block: &str, marker: &str) -> Option<String> {
    block
        .split(marker)
        .nth(1)
        .and_then(|rest| rest.split('<').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// The filing date stated in the submission header
/// (`FILED AS OF DATE: YYYYMMDD`), when present. Callers fall back to the
/// nominal date supplied by the retrieval layer.
pub fn filing_date(raw: &str) -> Option<NaiveDate> {
    FILED_AS_OF_RE
        .captures(raw)
        .and_then(|caps| NaiveDate::parse_from_str(&caps[1], "%Y%m%d").ok())
}
