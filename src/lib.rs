pub mod filing;

// Re-exports
pub use filing::parsing::{ClassificationRules, DomTree, StyleDescriptor};
pub use filing::{structure_filing, structure_filing_file, structure_filing_with_rules};
pub use filing::{Diagnostics, Filing, FilingType, SubDocument, TableItem, Ticker};
