use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::parsing::section::TextSections;
use super::report::FilingType;
use super::ticker::Ticker;

/// Reporting period key -> (line item name -> integer amount).
pub type Financials = HashMap<String, HashMap<String, i64>>;

/// One titled data table extracted from a sub-document. Rows are
/// rectangular: every row has exactly `columns.len()` values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableItem {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Footnote index -> footnote text, attached by the footnote associator.
    pub foot_notes: BTreeMap<u32, String>,
}

impl TableItem {
    /// Values of one column, by column name.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row[index].as_str()).collect())
    }
}

/// Why a table failed structuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IrregularReason {
    MissingTitle,
    NoHeaderRow,
    ZeroColumns,
    NoDataRows,
}

impl fmt::Display for IrregularReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrregularReason::MissingTitle => write!(f, "no resolvable title"),
            IrregularReason::NoHeaderRow => write!(f, "no header row"),
            IrregularReason::ZeroColumns => write!(f, "zero resolved columns"),
            IrregularReason::NoDataRows => write!(f, "zero data rows"),
        }
    }
}

/// A table that failed structuring, retained as raw text for inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrregularTable {
    pub sub_document: String,
    pub reason: IrregularReason,
    pub raw: String,
}

/// A tagged fact that failed numeric or period matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedFact {
    pub tag: String,
    pub raw: String,
}

/// Append-only diagnostic collections, gathered per worker and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub irregular_tables: Vec<IrregularTable>,
    pub skipped_facts: Vec<SkippedFact>,
}

impl Diagnostics {
    pub fn merge(&mut self, other: Diagnostics) {
        self.irregular_tables.extend(other.irregular_tables);
        self.skipped_facts.extend(other.skipped_facts);
    }

    pub fn is_empty(&self) -> bool {
        self.irregular_tables.is_empty() && self.skipped_facts.is_empty()
    }
}

/// One logical document inside a filing container. Only sub-documents with
/// a non-empty declared description are retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubDocument {
    /// From the declared DESCRIPTION field.
    pub name: String,
    /// Declared TYPE field (e.g. "10-K", "EX-101.INS").
    pub doc_type: String,
    pub sequence: Option<String>,
    pub filename: Option<String>,
    pub text_sections: TextSections,
    pub tables: Vec<TableItem>,
    pub financials: Financials,
}

impl SubDocument {
    /// Footnotes of all structured tables, keyed by table name.
    pub fn foot_notes(&self) -> BTreeMap<&str, &BTreeMap<u32, String>> {
        self.tables
            .iter()
            .filter(|table| !table.foot_notes.is_empty())
            .map(|table| (table.name.as_str(), &table.foot_notes))
            .collect()
    }
}

/// One structured regulatory filing. Created by a single parse pass and
/// read-only afterwards; re-parsing produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filing {
    pub ticker: Ticker,
    pub filing_type: FilingType,
    pub date: NaiveDate,
    pub sub_documents: Vec<SubDocument>,
    pub diagnostics: Diagnostics,
}

impl Filing {
    pub fn date_str(&self) -> String {
        self.date.format("%Y%m%d").to_string()
    }

    /// Identifier used for local file naming: `<ticker>_<form>_<date>`.
    pub fn name(&self) -> String {
        format!("{}_{}_{}", self.ticker, self.filing_type, self.date_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_column_accessor() {
        let table = TableItem {
            name: "Revenues".to_string(),
            columns: vec!["Line Item".to_string(), "2019".to_string()],
            rows: vec![
                vec!["Revenue".to_string(), "100".to_string()],
                vec!["Costs".to_string(), "40".to_string()],
            ],
            foot_notes: BTreeMap::new(),
        };
        assert_eq!(table.column("2019").unwrap(), vec!["100", "40"]);
        assert!(table.column("2018").is_none());
    }

    #[test]
    fn test_filing_name() {
        let filing = Filing {
            ticker: Ticker::new("KO").unwrap(),
            filing_type: FilingType::Form10K,
            date: NaiveDate::from_ymd_opt(2020, 2, 21).unwrap(),
            sub_documents: Vec::new(),
            diagnostics: Diagnostics::default(),
        };
        assert_eq!(filing.name(), "KO_10-K_20200221");
    }

    #[test]
    fn test_diagnostics_merge() {
        let mut a = Diagnostics::default();
        a.skipped_facts.push(SkippedFact {
            tag: "Revenues".to_string(),
            raw: "n/a".to_string(),
        });
        let mut b = Diagnostics::default();
        b.irregular_tables.push(IrregularTable {
            sub_document: "ANNUAL REPORT".to_string(),
            reason: IrregularReason::NoHeaderRow,
            raw: String::new(),
        });
        a.merge(b);
        assert_eq!(a.skipped_facts.len(), 1);
        assert_eq!(a.irregular_tables.len(), 1);
    }
}
