use log::debug;
use quick_xml::events::Event;
use quick_xml::Reader;

use super::style::ClassificationRules;
use super::text::clean_text;
use crate::filing::types::{Financials, SkippedFact};

/// Grouped facts plus the ones that failed numeric or period matching.
#[derive(Debug, Default)]
pub struct FactExtraction {
    pub financials: Financials,
    pub skipped: Vec<SkippedFact>,
}

const STANDARD_TAXONOMY_PREFIX: &str = "us-gaap:";

/// Scan a sub-document for inline-tagged numeric facts: elements in the
/// company's own namespace (`<ticker>:...`) or the standard accounting
/// taxonomy (`us-gaap:...`). A fact qualifies only when its text is a plain
/// unsigned integer and its context reference encodes a quarter
/// (`<year>Q<quarter>[YTD|QTD]`); everything else lands in the skipped
/// list. A later fact for the same (period, line item) overwrites an
/// earlier one.
///
/// The scan is tolerant: a markup error ends the scan with whatever was
/// collected so far rather than failing the sub-document.
pub fn extract_facts(content: &str, rules: &ClassificationRules) -> FactExtraction {
    let mut extraction = FactExtraction::default();
    let company_prefix = rules.ticker().map(|t| t.fact_prefix());

    let mut reader = Reader::from_str(content);
    let mut buf = Vec::new();
    let mut open_fact: Option<(String, String)> = None;
    let mut value = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if is_fact_tag(&name, company_prefix.as_deref()) {
                    let mut context = String::new();
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref().eq_ignore_ascii_case(b"contextref") {
                            context = String::from_utf8_lossy(&attr.value).to_string();
                        }
                    }
                    open_fact = Some((name, context));
                    value.clear();
                }
            }
            Ok(Event::Text(e)) if open_fact.is_some() => {
                if let Ok(text) = e.unescape() {
                    value.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if let Some((tag, context)) = open_fact.take() {
                    if tag == name {
                        record_fact(&tag, &context, &value, rules, &mut extraction);
                    } else {
                        open_fact = Some((tag, context));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                debug!("fact scan stopped on malformed markup: {}", err);
                break;
            }
            _ => {}
        }
        buf.clear();
    }
    extraction
}

fn is_fact_tag(name: &str, company_prefix: Option<&str>) -> bool {
    let lower = name.to_lowercase();
    lower.starts_with(STANDARD_TAXONOMY_PREFIX)
        || company_prefix.map_or(false, |prefix| lower.starts_with(prefix))
}

fn record_fact(
    tag: &str,
    context: &str,
    raw_value: &str,
    rules: &ClassificationRules,
    extraction: &mut FactExtraction,
) {
    let value = clean_text(raw_value);
    let period = rules.period_key(context);
    let amount = if rules.is_integer_fact(&value) {
        value.parse::<i64>().ok()
    } else {
        None
    };
    match (period, amount) {
        (Some(period), Some(amount)) => {
            let line_item = tag
                .split_once(':')
                .map(|(_, local)| local.to_string())
                .unwrap_or_else(|| tag.to_string());
            extraction
                .financials
                .entry(period)
                .or_default()
                .insert(line_item, amount);
        }
        _ => {
            extraction.skipped.push(SkippedFact {
                tag: tag.to_string(),
                raw: value,
            });
        }
    }
}
