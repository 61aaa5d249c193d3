pub mod export;
pub mod parsing;
pub mod report;
pub mod splitter;
pub mod structurer;
pub mod ticker;
pub mod types;

pub use report::FilingType;
pub use structurer::{structure_filing, structure_filing_file, structure_filing_with_rules};
pub use ticker::Ticker;
pub use types::{Diagnostics, Filing, SubDocument, TableItem};
