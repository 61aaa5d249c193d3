use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use super::style::{ClassificationRules, PeriodPrefix};
use super::tree::{DomTree, NodeId};
use crate::filing::types::{IrregularReason, TableItem};

static PAREN_NEGATIVE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$?\s*\(([\d,\.]+)\)%?$").unwrap());
static DASHES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-\u{2013}\u{2014}]+$").unwrap());
static NUMERIC_ISH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\$\s\d,\.\+%-]+$").unwrap());
static NOISE_ONLY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\$%,\s]*$").unwrap());

#[derive(Debug, Clone)]
struct RowInfo {
    cells: Vec<CellInfo>,
}

#[derive(Debug, Clone)]
struct CellInfo {
    text: String,
    bordered: bool,
}

impl RowInfo {
    fn non_empty_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.text.is_empty()).count()
    }

    fn has_bordered_cell(&self) -> bool {
        self.cells.iter().any(|c| c.bordered)
    }

    fn combined_text(&self) -> String {
        self.cells
            .iter()
            .filter(|c| !c.text.is_empty())
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Extract a column-oriented table from a `<table>` node with a resolved
/// title. Never panics on malformed content; structural failures come back
/// as an [`IrregularReason`] for the caller's diagnostic list.
pub fn extract_table(
    tree: &DomTree,
    table: NodeId,
    title: &str,
    rules: &ClassificationRules,
) -> Result<TableItem, IrregularReason> {
    let rows = collect_rows(tree, table);
    if rows.is_empty() {
        return Err(IrregularReason::NoDataRows);
    }

    // Leading rows qualify as header candidates while they carry a ruled
    // bottom border or spell out a shared date/period prefix.
    let mut candidate_count = 0;
    for row in &rows {
        let is_prefix = is_prefix_row(row, rules);
        if row.has_bordered_cell() || is_prefix {
            candidate_count += 1;
        } else {
            break;
        }
    }
    if candidate_count == 0 {
        return Err(IrregularReason::NoHeaderRow);
    }

    let candidates = &rows[..candidate_count];
    let column_rows: Vec<&RowInfo> = candidates
        .iter()
        .filter(|row| !is_prefix_row(row, rules))
        .collect();
    let max_cells = column_rows
        .iter()
        .map(|row| row.non_empty_count())
        .max()
        .unwrap_or(0);
    if max_cells == 0 {
        return Err(IrregularReason::ZeroColumns);
    }

    // The widest candidate supplies the column names. Narrower styled rows
    // ("Total" rows reusing header borders) are demoted to body rows.
    let mut pending_prefix: Option<PeriodPrefix> = None;
    let mut columns: Vec<String> = Vec::new();
    let mut demoted: Vec<&RowInfo> = Vec::new();
    let mut columns_done = false;
    for row in candidates {
        if is_prefix_row(row, rules) {
            pending_prefix = rules.period_prefix(&row.combined_text());
            continue;
        }
        if !columns_done && row.non_empty_count() == max_cells {
            columns = column_names(row, pending_prefix, rules);
            columns_done = true;
        } else if row.non_empty_count() < max_cells {
            demoted.push(row);
        }
        // Additional max-width header rows are consumed without effect.
    }
    if columns.is_empty() {
        return Err(IrregularReason::ZeroColumns);
    }

    let mut data: Vec<Vec<String>> = Vec::new();
    for row in demoted.into_iter().chain(rows[candidate_count..].iter()) {
        if let Some(values) = body_row(row, columns.len()) {
            data.push(values);
        }
    }
    if data.is_empty() {
        return Err(IrregularReason::NoDataRows);
    }

    Ok(TableItem {
        name: title.to_string(),
        columns,
        rows: data,
        foot_notes: BTreeMap::new(),
    })
}

/// Rows of this table, ignoring rows of any nested layout table.
fn collect_rows(tree: &DomTree, table: NodeId) -> Vec<RowInfo> {
    let mut rows = Vec::new();
    let mut cursor = table + 1;
    let end = tree.subtree_end(table);
    while cursor < end {
        if tree.is_named(cursor, "table") {
            cursor = tree.subtree_end(cursor);
            continue;
        }
        if tree.is_named(cursor, "tr") {
            rows.push(RowInfo {
                cells: collect_cells(tree, cursor),
            });
            cursor = tree.subtree_end(cursor);
            continue;
        }
        cursor += 1;
    }
    rows
}

fn collect_cells(tree: &DomTree, row: NodeId) -> Vec<CellInfo> {
    let mut cells = Vec::new();
    let mut cursor = row + 1;
    let end = tree.subtree_end(row);
    while cursor < end {
        if tree.is_named(cursor, "td") || tree.is_named(cursor, "th") {
            cells.push(CellInfo {
                text: tree.text_content(cursor),
                bordered: tree.has_bottom_border(cursor),
            });
            cursor = tree.subtree_end(cursor);
            continue;
        }
        cursor += 1;
    }
    cells
}

/// A header row that only spells out a shared period phrase ("Year Ended
/// December 31,") applies to the column names of the next header row
/// instead of forming its own column set.
fn is_prefix_row(row: &RowInfo, rules: &ClassificationRules) -> bool {
    let combined = row.combined_text();
    rules.period_prefix(&combined).is_some()
        && !row
            .cells
            .iter()
            .any(|c| rules.bare_year(c.text.trim()).is_some())
}

fn column_names(
    row: &RowInfo,
    pending_prefix: Option<PeriodPrefix>,
    rules: &ClassificationRules,
) -> Vec<String> {
    let mut columns = Vec::new();
    for (index, cell) in row.cells.iter().enumerate() {
        let text = cell.text.trim();
        if index == 0 && text.is_empty() {
            columns.push("Line Item".to_string());
            continue;
        }
        if text.is_empty() {
            // Spacer column.
            continue;
        }
        if let (Some(year), Some(prefix)) = (rules.bare_year(text), pending_prefix) {
            columns.push(compose_period_column(prefix, year));
            continue;
        }
        columns.push(text.to_string());
    }
    columns
}

/// "YE 12/31/2019" from prefix "Year Ended December 31," and header cell
/// "2019"; the bare year replaces the date token of the prefix phrase.
fn compose_period_column(prefix: PeriodPrefix, year: &str) -> String {
    match prefix.month_day {
        Some((month, day)) => format!("{} {:02}/{:02}/{}", prefix.code, month, day, year),
        None => format!("{} {}", prefix.code, year),
    }
}

fn body_row(row: &RowInfo, column_count: usize) -> Option<Vec<String>> {
    let raw: Vec<String> = row.cells.iter().map(|c| c.text.clone()).collect();
    let merged = merge_orphan_parens(raw);

    let mut values = Vec::new();
    for (index, cell) in merged.iter().enumerate() {
        let normalized = normalize_cell(cell);
        if index == 0 {
            // The line-item label column is kept even when empty.
            values.push(normalized);
        } else if !normalized.is_empty() {
            values.push(normalized);
        }
    }
    if values.iter().all(|v| v.is_empty()) {
        return None;
    }
    // Rows that omit trailing columns are padded at the end, never the
    // start; overlong rows are cut to the column list.
    while values.len() < column_count {
        values.push(String::new());
    }
    values.truncate(column_count);
    Some(values)
}

/// Inline markup sometimes splits "(1,200)" into "(1,200" and ")"; glue
/// such orphaned pairs back together before per-cell normalization.
fn merge_orphan_parens(cells: Vec<String>) -> Vec<String> {
    let mut merged = Vec::with_capacity(cells.len());
    let mut index = 0;
    while index < cells.len() {
        let cell = &cells[index];
        if index + 1 < cells.len() && cell.contains('(') && !cell.contains(')') {
            let next = &cells[index + 1];
            if next.contains(')') && !next.contains('(') {
                merged.push(format!("{}{}", cell, next));
                index += 2;
                continue;
            }
        }
        merged.push(cell.clone());
        index += 1;
    }
    merged
}

/// Accounting-notation cell normalization: parenthesized numbers are
/// negative, a run of dashes is zero, currency noise is stripped from
/// numeric cells, and label text passes through untouched.
pub fn normalize_cell(text: &str) -> String {
    let text = text.trim();
    if let Some(caps) = PAREN_NEGATIVE_RE.captures(text) {
        return format!("-{}", caps[1].replace(',', ""));
    }
    if DASHES_RE.is_match(text) {
        return "0".to_string();
    }
    if NOISE_ONLY_RE.is_match(text) {
        return String::new();
    }
    if text.chars().any(|c| c.is_ascii_digit()) && NUMERIC_ISH_RE.is_match(text) {
        return text
            .chars()
            .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'))
            .collect();
    }
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> Result<TableItem, IrregularReason> {
        let tree = DomTree::parse(html);
        let table = tree.tables_under(tree.root())[0];
        extract_table(&tree, table, "Test Table", &ClassificationRules::default())
    }

    const BORDER: &str = r#"style="border-bottom:1px solid #000000;""#;

    #[test]
    fn test_basic_header_and_negatives() {
        let html = format!(
            r#"<html><body><table>
                <tr><td {b}></td><td {b}>2019</td><td {b}>2018</td></tr>
                <tr><td>Revenue</td><td>(1,200)</td><td>950</td></tr>
            </table></body></html>"#,
            b = BORDER
        );
        let table = extract(&html).unwrap();
        assert_eq!(table.columns, vec!["Line Item", "2019", "2018"]);
        assert_eq!(table.rows, vec![vec!["Revenue", "-1200", "950"]]);
    }

    #[test]
    fn test_dash_as_zero_and_noise_stripping() {
        let html = format!(
            r#"<html><body><table>
                <tr><td {b}></td><td {b}>2019</td><td {b}>2018</td></tr>
                <tr><td>Goodwill</td><td>—</td><td>$ 4,310</td></tr>
            </table></body></html>"#,
            b = BORDER
        );
        let table = extract(&html).unwrap();
        assert_eq!(table.rows, vec![vec!["Goodwill", "0", "4310"]]);
    }

    #[test]
    fn test_orphaned_paren_merged() {
        let html = format!(
            r#"<html><body><table>
                <tr><td {b}></td><td {b}>2019</td></tr>
                <tr><td>Net loss</td><td>(23,410</td><td>)</td></tr>
            </table></body></html>"#,
            b = BORDER
        );
        let table = extract(&html).unwrap();
        assert_eq!(table.rows, vec![vec!["Net loss", "-23410"]]);
    }

    #[test]
    fn test_ragged_rows_padded_at_end() {
        let html = format!(
            r#"<html><body><table>
                <tr><td {b}></td><td {b}>2019</td><td {b}>2018</td><td {b}>Total</td></tr>
                <tr><td>Segment A</td><td>10</td><td>20</td><td>30</td></tr>
                <tr><td>Segment B</td><td>5</td></tr>
            </table></body></html>"#,
            b = BORDER
        );
        let table = extract(&html).unwrap();
        assert_eq!(table.columns.len(), 4);
        for row in &table.rows {
            assert_eq!(row.len(), table.columns.len());
        }
        assert_eq!(table.rows[1], vec!["Segment B", "5", "", ""]);
    }

    #[test]
    fn test_shared_date_prefix_applied() {
        let html = format!(
            r#"<html><body><table>
                <tr><td></td><td {b} colspan="2">Year Ended December 31,</td></tr>
                <tr><td {b}></td><td {b}>2019</td><td {b}>2018</td></tr>
                <tr><td>Revenue</td><td>100</td><td>90</td></tr>
            </table></body></html>"#,
            b = BORDER
        );
        let table = extract(&html).unwrap();
        assert_eq!(
            table.columns,
            vec!["Line Item", "YE 12/31/2019", "YE 12/31/2018"]
        );
    }

    #[test]
    fn test_styled_total_row_demoted_to_body() {
        let html = format!(
            r#"<html><body><table>
                <tr><td {b}></td><td {b}>2019</td><td {b}>2018</td><td {b}>Total</td></tr>
                <tr><td {b}>Total equity</td><td {b}>300</td></tr>
                <tr><td>Revenue</td><td>100</td><td>90</td><td>190</td></tr>
            </table></body></html>"#,
            b = BORDER
        );
        let table = extract(&html).unwrap();
        assert_eq!(table.columns, vec!["Line Item", "2019", "2018", "Total"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["Total equity", "300", "", ""]);
    }

    #[test]
    fn test_no_header_row_is_irregular() {
        let html = r#"<html><body><table>
            <tr><td>just</td><td>text</td></tr>
        </table></body></html>"#;
        assert_eq!(extract(html).unwrap_err(), IrregularReason::NoHeaderRow);
    }

    #[test]
    fn test_header_without_data_is_irregular() {
        let html = format!(
            r#"<html><body><table>
                <tr><td {b}>2019</td><td {b}>2018</td></tr>
            </table></body></html>"#,
            b = BORDER
        );
        assert_eq!(extract(&html).unwrap_err(), IrregularReason::NoDataRows);
    }

    #[test]
    fn test_empty_table_is_irregular() {
        let html = "<html><body><table></table></body></html>";
        assert_eq!(extract(html).unwrap_err(), IrregularReason::NoDataRows);
    }

    #[test]
    fn test_normalize_cell_law() {
        assert_eq!(normalize_cell("(1,200)"), "-1200");
        assert_eq!(normalize_cell("(45)"), "-45");
        assert_eq!(normalize_cell("—"), "0");
        assert_eq!(normalize_cell("--"), "0");
        assert_eq!(normalize_cell("$ 1,234.56"), "1234.56");
        assert_eq!(normalize_cell("$"), "");
        assert_eq!(normalize_cell("Revenue, net"), "Revenue, net");
    }
}
