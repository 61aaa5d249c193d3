pub mod facts;
pub mod footnote;
pub mod section;
pub mod style;
pub mod table;
pub mod text;
pub mod title;
pub mod tree;

#[cfg(test)]
pub mod tests;

pub use facts::extract_facts;
pub use section::segment_sections;
pub use style::{ClassificationRules, RunClass};
pub use table::extract_table;
pub use title::resolve_title;
pub use tree::{DomTree, StyleDescriptor};
