use std::collections::HashMap;

use log::debug;

use super::style::ClassificationRules;
use super::text::newlines_to_spaces;
use super::tree::Run;

/// Section name -> (subsection name -> concatenated body text).
pub type TextSections = HashMap<String, HashMap<String, String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmenterState {
    Seeking,
    InSection,
    InSubSection,
}

/// Walks the ordered run sequence of a narrative sub-document and groups it
/// into sections keyed by the human-readable titles that follow each
/// "Item N." / "Item NX." boundary run.
///
/// A boundary run never contributes body text: the run immediately after it
/// supplies the display name, and accumulation resumes on the run after
/// that. A lettered sub-item is only honored once its owning numbered item
/// has been seen; otherwise it is plain body text.
pub fn segment_sections(runs: &[Run], rules: &ClassificationRules) -> TextSections {
    let mut sections = TextSections::new();
    // Transient segmentation index: item number -> section name. Not part
    // of the output model.
    let mut item_to_section: HashMap<String, String> = HashMap::new();
    let mut state = SegmenterState::Seeking;
    let mut open: Option<(String, String)> = None;
    let mut buffer: Vec<String> = Vec::new();
    let mut skip_name_run = false;

    for (index, run) in runs.iter().enumerate() {
        let text = run.text.trim();
        if rules.is_toc_marker(text) {
            continue;
        }
        if skip_name_run {
            skip_name_run = false;
            continue;
        }

        if rules.is_item_boundary(text) {
            flush(&mut sections, &open, &mut buffer);
            let name = display_name(runs, index);
            if let Some(num) = rules.item_number(text) {
                item_to_section.insert(num, name.clone());
            }
            sections
                .entry(name.clone())
                .or_default()
                .entry(name.clone())
                .or_default();
            open = Some((name.clone(), name));
            state = SegmenterState::InSection;
            skip_name_run = true;
        } else if rules.is_sub_item_boundary(text) {
            let owner = rules
                .item_number(text)
                .and_then(|num| item_to_section.get(&num).cloned());
            match owner {
                Some(owner) => {
                    debug!("sub-item '{}' owned by section '{}'", text, owner);
                    flush(&mut sections, &open, &mut buffer);
                    let name = display_name(runs, index);
                    sections
                        .entry(name.clone())
                        .or_default()
                        .entry(name.clone())
                        .or_default();
                    open = Some((name.clone(), name));
                    state = SegmenterState::InSubSection;
                    skip_name_run = true;
                }
                None => {
                    // Sub-item before any owning item boundary: fall back to
                    // body text rather than failing.
                    if state != SegmenterState::Seeking {
                        push_body(&mut buffer, text);
                    }
                }
            }
        } else if state != SegmenterState::Seeking {
            push_body(&mut buffer, text);
        }
    }

    // Final section has no trailing boundary to trigger the flush.
    flush(&mut sections, &open, &mut buffer);
    sections
}

/// The run immediately following a boundary carries the section's display
/// name.
fn display_name(runs: &[Run], boundary_index: usize) -> String {
    runs.get(boundary_index + 1)
        .map(|run| run.text.trim().to_string())
        .unwrap_or_default()
}

fn push_body(buffer: &mut Vec<String>, text: &str) {
    let text = newlines_to_spaces(text);
    let text = text.trim();
    if !text.is_empty() {
        buffer.push(text.to_string());
    }
}

fn flush(sections: &mut TextSections, open: &Option<(String, String)>, buffer: &mut Vec<String>) {
    let Some((section, subsection)) = open else {
        buffer.clear();
        return;
    };
    let body = buffer.join(" ");
    buffer.clear();
    sections
        .entry(section.clone())
        .or_default()
        .insert(subsection.clone(), body);
}
