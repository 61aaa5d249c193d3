use std::collections::BTreeMap;

use super::style::{ClassificationRules, FootnoteMarker};
use super::tree::{DomTree, NodeData, NodeId};

/// Footnotes found trailing a table, plus the sibling tables consumed to
/// produce them (the orchestrator must not structure those as data tables).
#[derive(Debug, Default)]
pub struct FootnoteResult {
    pub notes: BTreeMap<u32, String>,
    pub consumed: Vec<NodeId>,
}

/// Inspect the content immediately following a table in document order.
/// Long-underscore divider runs are skipped; consecutive sibling tables
/// whose rows open with a footnote marker ("(1)" or "*") are consumed, one
/// footnote per row. The walk stops at the first meaningful content that is
/// not such a table.
///
/// Star markers are numbered by a counter local to this association, so
/// identical input always yields identical keys.
pub fn associate_footnotes(
    tree: &DomTree,
    table: NodeId,
    rules: &ClassificationRules,
) -> FootnoteResult {
    let mut result = FootnoteResult::default();
    let mut star_counter = 0u32;
    let mut cursor = tree.subtree_end(table);

    while cursor < tree.len() {
        match &tree.node(cursor).data {
            NodeData::Text(raw) => {
                let text = crate::filing::parsing::text::clean_text(raw);
                if text.is_empty() || rules.is_divider(&text) {
                    cursor += 1;
                    continue;
                }
                break;
            }
            NodeData::Element { name, .. } => {
                if name == "table" {
                    if !consume_footnote_table(tree, cursor, rules, &mut star_counter, &mut result)
                    {
                        break;
                    }
                    let end = tree.subtree_end(cursor);
                    result.consumed.push(cursor);
                    cursor = end;
                    continue;
                }
                // Containers are descended through; their text nodes decide.
                cursor += 1;
            }
        }
    }
    result
}

/// Returns false when the table's first row carries no footnote marker (the
/// table is ordinary data and association stops).
fn consume_footnote_table(
    tree: &DomTree,
    table: NodeId,
    rules: &ClassificationRules,
    star_counter: &mut u32,
    result: &mut FootnoteResult,
) -> bool {
    let rows: Vec<NodeId> = (table + 1..tree.subtree_end(table))
        .filter(|&id| tree.is_named(id, "tr"))
        .collect();
    let first_text = match rows.first() {
        Some(&row) => tree.text_content(row),
        None => return false,
    };
    if rules.footnote_marker(&first_text).is_none() {
        return false;
    }

    let mut last_key: Option<u32> = None;
    for &row in &rows {
        let text = tree.text_content(row);
        match rules.footnote_marker(&text) {
            Some((FootnoteMarker::Numbered(index), rest)) => {
                result.notes.insert(index, rest.trim().to_string());
                last_key = Some(index);
            }
            Some((FootnoteMarker::Star, rest)) => {
                *star_counter += 1;
                result.notes.insert(*star_counter, rest.trim().to_string());
                last_key = Some(*star_counter);
            }
            None => {
                // Wrapped continuation line of the previous footnote.
                if let Some(key) = last_key {
                    if !text.is_empty() {
                        let entry = result.notes.entry(key).or_default();
                        if !entry.is_empty() {
                            entry.push(' ');
                        }
                        entry.push_str(text.trim());
                    }
                }
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(html: &str) -> (DomTree, Vec<NodeId>) {
        let tree = DomTree::parse(html);
        let tables = tree.tables_under(tree.root());
        (tree, tables)
    }

    #[test]
    fn test_single_numbered_footnote() {
        let (tree, tables) = setup(
            r#"<html><body>
                <table><tr><td>Revenue</td><td>100</td></tr></table>
                <table><tr><td>(1) Includes one-time charges.</td></tr></table>
            </body></html>"#,
        );
        let result = associate_footnotes(&tree, tables[0], &ClassificationRules::default());
        assert_eq!(result.notes.len(), 1);
        assert_eq!(result.notes[&1], "Includes one-time charges.");
        assert_eq!(result.consumed, vec![tables[1]]);
    }

    #[test]
    fn test_divider_skipped_before_footnotes() {
        let (tree, tables) = setup(
            r#"<html><body>
                <table><tr><td>Revenue</td><td>100</td></tr></table>
                <div><font>____________</font></div>
                <table><tr><td>(1) Net of amortization.</td></tr></table>
            </body></html>"#,
        );
        let result = associate_footnotes(&tree, tables[0], &ClassificationRules::default());
        assert_eq!(result.notes[&1], "Net of amortization.");
    }

    #[test]
    fn test_consecutive_footnote_tables_consumed() {
        let (tree, tables) = setup(
            r#"<html><body>
                <table><tr><td>Revenue</td><td>100</td></tr></table>
                <table><tr><td>(1) First note.</td></tr></table>
                <table><tr><td>(2) Second note.</td></tr></table>
                <table><tr><td>Unrelated</td><td>data</td></tr></table>
            </body></html>"#,
        );
        let result = associate_footnotes(&tree, tables[0], &ClassificationRules::default());
        assert_eq!(result.notes.len(), 2);
        assert_eq!(result.notes[&2], "Second note.");
        assert_eq!(result.consumed, vec![tables[1], tables[2]]);
    }

    #[test]
    fn test_star_markers_auto_numbered() {
        let (tree, tables) = setup(
            r#"<html><body>
                <table><tr><td>Revenue</td><td>100</td></tr></table>
                <table>
                    <tr><td>* As restated.</td></tr>
                    <tr><td>* Unaudited.</td></tr>
                </table>
            </body></html>"#,
        );
        let result = associate_footnotes(&tree, tables[0], &ClassificationRules::default());
        assert_eq!(result.notes[&1], "As restated.");
        assert_eq!(result.notes[&2], "Unaudited.");
    }

    #[test]
    fn test_intervening_text_stops_association() {
        let (tree, tables) = setup(
            r#"<html><body>
                <table><tr><td>Revenue</td><td>100</td></tr></table>
                <div><font>The following discussion covers segment results.</font></div>
                <table><tr><td>(1) Would-be footnote.</td></tr></table>
            </body></html>"#,
        );
        let result = associate_footnotes(&tree, tables[0], &ClassificationRules::default());
        assert!(result.notes.is_empty());
        assert!(result.consumed.is_empty());
    }

    #[test]
    fn test_plain_sibling_table_not_consumed() {
        let (tree, tables) = setup(
            r#"<html><body>
                <table><tr><td>Revenue</td><td>100</td></tr></table>
                <table><tr><td>2019</td><td>2018</td></tr></table>
            </body></html>"#,
        );
        let result = associate_footnotes(&tree, tables[0], &ClassificationRules::default());
        assert!(result.notes.is_empty());
        assert!(result.consumed.is_empty());
    }

    #[test]
    fn test_wrapped_continuation_row_appended() {
        let (tree, tables) = setup(
            r#"<html><body>
                <table><tr><td>Revenue</td><td>100</td></tr></table>
                <table>
                    <tr><td>(1) Includes restructuring</td></tr>
                    <tr><td>charges of $12 million.</td></tr>
                </table>
            </body></html>"#,
        );
        let result = associate_footnotes(&tree, tables[0], &ClassificationRules::default());
        assert_eq!(
            result.notes[&1],
            "Includes restructuring charges of $12 million."
        );
    }
}
