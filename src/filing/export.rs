use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use itertools::Itertools;
use log::info;

use super::types::Filing;

/// Characters per line when chunking section bodies into the custom-tag
/// document format.
pub const DEFAULT_CHUNK_SIZE: usize = 108;

/// Write the filing's text sections to a local file using custom markup
/// (`<filingdoc>` / `<textsection>` / `<subsection>`), with long bodies
/// chunked into fixed-width lines so the file stays diffable.
pub fn write_custom_doc(filing: &Filing, path: &Path, chunk_size: Option<usize>) -> Result<()> {
    let chunk_size = chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE).max(1);
    let mut out = String::new();
    out.push_str(&format!(
        "<filingdoc type: \"{}\" corp: \"{}\" date: \"{}\">\n",
        filing.filing_type,
        filing.ticker,
        filing.date_str()
    ));
    for sub_document in &filing.sub_documents {
        for (section, subsections) in sub_document
            .text_sections
            .iter()
            .sorted_by(|a, b| a.0.cmp(b.0))
        {
            out.push_str(&format!("<textsection name: \"{}\">\n", section));
            for (subsection, body) in subsections.iter().sorted_by(|a, b| a.0.cmp(b.0)) {
                out.push_str(&format!("<subsection name: \"{}\">\n", subsection));
                let chars: Vec<char> = body.chars().collect();
                for line in chars.chunks(chunk_size) {
                    out.push_str(&line.iter().collect::<String>());
                    out.push('\n');
                }
                out.push_str("</subsection>\n");
            }
            out.push_str("</textsection>\n");
        }
    }
    out.push_str("</filingdoc>\n");
    fs::write(path, out).with_context(|| format!("failed to write custom doc to {:?}", path))?;
    info!("wrote custom-tag document to {:?}", path);
    Ok(())
}

/// Write all extracted financial facts to CSV: one row per line item, one
/// column per reporting period (sorted), `NULL` where a line item has no
/// value for a period.
pub fn write_financials_csv(filing: &Filing, path: &Path) -> Result<()> {
    // Merge sub-document financials; a later sub-document wins on conflict,
    // matching the extractor's last-write-wins rule.
    let mut merged: BTreeMap<&str, BTreeMap<&str, i64>> = BTreeMap::new();
    for sub_document in &filing.sub_documents {
        for (period, items) in &sub_document.financials {
            let entry = merged.entry(period.as_str()).or_default();
            for (item, amount) in items {
                entry.insert(item.as_str(), *amount);
            }
        }
    }

    let periods: Vec<&str> = merged.keys().copied().collect();
    let line_items: BTreeSet<&str> = merged
        .values()
        .flat_map(|items| items.keys().copied())
        .collect();

    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("failed to open {:?}", path))?;
    let mut header = vec!["Line Item"];
    header.extend(periods.iter().copied());
    writer.write_record(&header)?;
    for item in line_items {
        let mut record = vec![item.to_string()];
        for period in &periods {
            match merged[period].get(item) {
                Some(amount) => record.push(amount.to_string()),
                None => record.push("NULL".to_string()),
            }
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    info!("wrote financials CSV to {:?}", path);
    Ok(())
}

/// Dump the whole structured filing as pretty JSON for downstream storage.
pub fn write_json(filing: &Filing, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(filing)?;
    fs::write(path, json).with_context(|| format!("failed to write JSON to {:?}", path))?;
    Ok(())
}
