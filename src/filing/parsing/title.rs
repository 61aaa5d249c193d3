use super::style::{ClassificationRules, RunClass};
use super::text::trim_punctuation;
use super::tree::{DomTree, NodeId, Run};

/// A table whose rows read like "Item 7. Management's Discussion..." is a
/// table-of-contents layout table, rejected before title resolution runs.
pub fn is_toc_table(tree: &DomTree, table: NodeId, rules: &ClassificationRules) -> bool {
    (table..tree.subtree_end(table))
        .filter(|&id| tree.is_named(id, "tr"))
        .any(|row| rules.mentions_item_boundary(&tree.text_content(row)))
}

/// Find the table's title: the nearest preceding emphasized run that is not
/// a page marker, index entry, unit annotation, or the company's own name,
/// never taken from inside another table. Adjacent preceding runs that share
/// the same emphasis and parent are folded in (titles are sometimes split
/// across runs), then a leading "Note N" / "Item N." prefix is stripped.
///
/// Pure function over the arena: candidates are walked in reverse document
/// order, which the tree guarantees matches id order.
pub fn resolve_title(tree: &DomTree, table: NodeId, rules: &ClassificationRules) -> Option<String> {
    let runs = tree.styled_runs(tree.root());
    let start = runs.partition_point(|run| run.node < table);

    let mut index = start;
    while index > 0 {
        index -= 1;
        let run = &runs[index];
        // Titles never come from inside a table; climb out and keep going.
        if tree.is_inside_table(run.node) {
            continue;
        }
        if !is_title_candidate(rules, run) {
            continue;
        }

        let mut parts = vec![run.text.trim().to_string()];
        let mut cursor = index;
        while cursor > 0 {
            let previous = &runs[cursor - 1];
            if tree.parent(previous.node) != tree.parent(run.node)
                || previous.style.emphasis() != run.style.emphasis()
                || tree.is_inside_table(previous.node)
                || !is_title_candidate(rules, previous)
            {
                break;
            }
            parts.push(previous.text.trim().to_string());
            cursor -= 1;
        }
        parts.reverse();

        let joined = parts.join(" ");
        let stripped = rules.strip_title_prefix(&joined);
        let title = trim_punctuation(stripped);
        if title.is_empty() {
            continue;
        }
        return Some(title);
    }
    None
}

/// The classifier does the filtering: only runs it marks as headings or
/// sub-headings (emphasis plus the textual rejections) qualify.
fn is_title_candidate(rules: &ClassificationRules, run: &Run) -> bool {
    matches!(
        rules.classify(run.style, &run.text),
        RunClass::Heading | RunClass::SubHeading
    )
}
