use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use log::{debug, info};
use rayon::prelude::*;

use super::parsing::facts::extract_facts;
use super::parsing::footnote::associate_footnotes;
use super::parsing::section::{segment_sections, TextSections};
use super::parsing::style::ClassificationRules;
use super::parsing::table::extract_table;
use super::parsing::title::{is_toc_table, resolve_title};
use super::parsing::tree::{DomTree, NodeId};
use super::report::FilingType;
use super::splitter::{self, RawSubDocument};
use super::ticker::Ticker;
use super::types::{Diagnostics, Filing, IrregularReason, IrregularTable, SubDocument, TableItem};

/// Structure a raw full-text submission into a [`Filing`], using default
/// classification rules for the company.
pub fn structure_filing(
    raw: &str,
    ticker: &Ticker,
    filing_type: FilingType,
    fallback_date: NaiveDate,
) -> Result<Filing> {
    let rules = ClassificationRules::for_company(ticker.clone(), None);
    structure_filing_with_rules(raw, ticker, filing_type, fallback_date, &rules)
}

/// Structure a raw full-text submission with caller-supplied classification
/// rules (e.g. a filing-era variant).
///
/// Content-level problems never fail the call: unrecognizable tables and
/// facts land in the filing's diagnostics, sub-documents without a declared
/// description are dropped, and a filing where nothing structures at all is
/// still a legitimate (empty) result. The only hard error is a violated
/// caller contract — an empty input text.
pub fn structure_filing_with_rules(
    raw: &str,
    ticker: &Ticker,
    filing_type: FilingType,
    fallback_date: NaiveDate,
    rules: &ClassificationRules,
) -> Result<Filing> {
    if raw.trim().is_empty() {
        return Err(anyhow!(
            "empty filing text: caller must supply a retrieved full-text submission"
        ));
    }

    let date = splitter::filing_date(raw).unwrap_or(fallback_date);
    let raw_documents = splitter::split_documents(raw);

    // Sub-documents share no mutable state; structure them in parallel and
    // merge each worker's diagnostics afterwards.
    let results: Vec<(Option<SubDocument>, Diagnostics)> = raw_documents
        .par_iter()
        .map(|raw_doc| structure_sub_document(raw_doc, filing_type, rules))
        .collect();

    let mut sub_documents = Vec::new();
    let mut diagnostics = Diagnostics::default();
    for (sub_document, sub_diagnostics) in results {
        if let Some(sub_document) = sub_document {
            sub_documents.push(sub_document);
        }
        diagnostics.merge(sub_diagnostics);
    }

    let filing = Filing {
        ticker: ticker.clone(),
        filing_type,
        date,
        sub_documents,
        diagnostics,
    };
    info!(
        "structured {}: {} sub-documents, {} tables, {} irregular tables, {} skipped facts",
        filing.name(),
        filing.sub_documents.len(),
        filing.sub_documents.iter().map(|d| d.tables.len()).sum::<usize>(),
        filing.diagnostics.irregular_tables.len(),
        filing.diagnostics.skipped_facts.len(),
    );
    Ok(filing)
}

/// Read a locally saved full-text submission and structure it.
pub fn structure_filing_file(
    path: &Path,
    ticker: &Ticker,
    filing_type: FilingType,
    fallback_date: NaiveDate,
) -> Result<Filing> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read filing file {:?}", path))?;
    structure_filing(&raw, ticker, filing_type, fallback_date)
}

fn structure_sub_document(
    raw: &RawSubDocument,
    filing_type: FilingType,
    rules: &ClassificationRules,
) -> (Option<SubDocument>, Diagnostics) {
    let Some(name) = raw.description.clone() else {
        // Expected and frequent; not worth a diagnostic entry.
        debug!("dropping sub-document of type '{}' with no description", raw.doc_type);
        return (None, Diagnostics::default());
    };

    let mut diagnostics = Diagnostics::default();
    let tree = DomTree::parse(&raw.body);

    // Narrative segmentation only applies to the filing's report body.
    let text_sections = if filing_type.matches_declared(&raw.doc_type) {
        let runs: Vec<_> = tree
            .styled_runs(tree.root())
            .into_iter()
            .filter(|run| rules.is_narrative_run(run.style))
            .collect();
        segment_sections(&runs, rules)
    } else {
        TextSections::new()
    };

    let tables = structure_tables(&tree, &name, rules, &mut diagnostics);

    // Tagged facts may appear in any sub-document, regardless of type.
    let extraction = extract_facts(&raw.body, rules);
    diagnostics.skipped_facts.extend(extraction.skipped);

    let sub_document = SubDocument {
        name,
        doc_type: raw.doc_type.clone(),
        sequence: raw.sequence.clone(),
        filename: raw.filename.clone(),
        text_sections,
        tables,
        financials: extraction.financials,
    };
    (Some(sub_document), diagnostics)
}

/// Structure every table of the sub-document independently: a failure is
/// recorded and skipped, never propagated. Footnote association runs right
/// after a table's own extraction; sibling tables it consumes are excluded
/// from further structuring.
fn structure_tables(
    tree: &DomTree,
    sub_document: &str,
    rules: &ClassificationRules,
    diagnostics: &mut Diagnostics,
) -> Vec<TableItem> {
    let mut tables = Vec::new();
    let mut consumed: HashSet<NodeId> = HashSet::new();

    for table_node in tree.tables_under(tree.root()) {
        if consumed.contains(&table_node) {
            continue;
        }
        if is_toc_table(tree, table_node, rules) {
            debug!("skipping table-of-contents table in '{}'", sub_document);
            continue;
        }
        let Some(title) = resolve_title(tree, table_node, rules) else {
            diagnostics.irregular_tables.push(IrregularTable {
                sub_document: sub_document.to_string(),
                reason: IrregularReason::MissingTitle,
                raw: tree.text_content(table_node),
            });
            continue;
        };
        match extract_table(tree, table_node, &title, rules) {
            Ok(mut table) => {
                let footnotes = associate_footnotes(tree, table_node, rules);
                table.foot_notes = footnotes.notes;
                consumed.extend(footnotes.consumed);
                tables.push(table);
            }
            Err(reason) => {
                debug!(
                    "irregular table '{}' in '{}': {}",
                    title, sub_document, reason
                );
                diagnostics.irregular_tables.push(IrregularTable {
                    sub_document: sub_document.to_string(),
                    reason,
                    raw: tree.text_content(table_node),
                });
            }
        }
    }

    disambiguate_names(&mut tables);
    tables
}

/// Same-named tables within one sub-document keep all occurrences, with a
/// numeric suffix from the second one on.
fn disambiguate_names(tables: &mut [TableItem]) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for table in tables.iter_mut() {
        let count = seen.entry(table.name.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            table.name = format!("{}_{}", table.name, count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filing::parsing::tests::sample_submission;
    use std::collections::BTreeMap;

    fn ticker() -> Ticker {
        Ticker::new("KO").unwrap()
    }

    fn nominal_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
    }

    fn structure(raw: &str) -> Filing {
        structure_filing(raw, &ticker(), FilingType::Form10K, nominal_date()).unwrap()
    }

    #[test]
    fn test_empty_input_is_contract_violation() {
        let result = structure_filing("  ", &ticker(), FilingType::Form10K, nominal_date());
        assert!(result.is_err());
    }

    #[test]
    fn test_degenerate_filing_is_not_an_error() {
        let filing = structure("<DOCUMENT><TYPE>GRAPHIC\n<TEXT>binary</TEXT></DOCUMENT>");
        assert!(filing.sub_documents.is_empty());
        assert_eq!(filing.date, nominal_date());
    }

    #[test]
    fn test_sample_submission_structures() {
        let raw = sample_submission();
        let filing = structure(&raw);

        // The exhibit without a description was dropped.
        assert_eq!(filing.sub_documents.len(), 2);
        assert!(filing.sub_documents.iter().all(|d| !d.name.is_empty()));
        assert_eq!(
            filing.date,
            NaiveDate::from_ymd_opt(2020, 2, 24).unwrap(),
            "date comes from the FILED AS OF DATE header, not the fallback"
        );

        let report = &filing.sub_documents[0];
        assert_eq!(report.name, "ANNUAL REPORT");
        assert_eq!(
            report.text_sections["Business"]["Business"],
            "We manufacture and distribute beverages worldwide."
        );
        assert_eq!(
            report.text_sections["Risk Factors"]["Risk Factors"],
            "Demand may decline."
        );

        // One structured table with its footnote attached; the footnote
        // table itself is not in Tables.
        assert_eq!(report.tables.len(), 1);
        let table = &report.tables[0];
        assert_eq!(table.name, "Net Operating Revenues");
        assert_eq!(table.columns, vec!["Line Item", "2019", "2018"]);
        assert_eq!(table.rows[0], vec!["Revenue", "-1200", "950"]);
        assert_eq!(
            table.foot_notes,
            BTreeMap::from([(1, "Includes one-time charges.".to_string())])
        );

        // Facts from the instance sub-document.
        let instance = &filing.sub_documents[1];
        assert_eq!(instance.financials["2019Q4YTD"]["Revenues"], 125000);
    }

    #[test]
    fn test_idempotence() {
        let raw = sample_submission();
        let first = structure(&raw);
        let second = structure(&raw);
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_orphan_tables_and_rectangular_rows() {
        let raw = sample_submission();
        let filing = structure(&raw);
        for sub_document in &filing.sub_documents {
            for table in &sub_document.tables {
                assert!(!table.name.is_empty());
                assert!(!table.columns.is_empty());
                assert!(!table.rows.is_empty());
                for row in &table.rows {
                    assert_eq!(row.len(), table.columns.len());
                }
            }
        }
    }

    #[test]
    fn test_duplicate_table_names_suffixed() {
        let mut tables = vec![
            TableItem {
                name: "Revenues".to_string(),
                columns: vec!["A".to_string()],
                rows: vec![vec!["1".to_string()]],
                foot_notes: BTreeMap::new(),
            };
            3
        ];
        disambiguate_names(&mut tables);
        assert_eq!(tables[0].name, "Revenues");
        assert_eq!(tables[1].name, "Revenues_2");
        assert_eq!(tables[2].name, "Revenues_3");
    }
}
