use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use strum::{EnumIter, IntoEnumIterator};

/// Filing forms the structurer understands: annual report, quarterly report,
/// current report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(try_from = "String", into = "String")]
pub enum FilingType {
    Form10K,
    Form10Q,
    Form8K,
}

impl fmt::Display for FilingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilingType::Form10K => write!(f, "10-K"),
            FilingType::Form10Q => write!(f, "10-Q"),
            FilingType::Form8K => write!(f, "8-K"),
        }
    }
}

impl From<FilingType> for String {
    fn from(t: FilingType) -> String {
        t.to_string()
    }
}

impl TryFrom<String> for FilingType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        FilingType::from_str(&s)
    }
}

impl FromStr for FilingType {
    type Err = String;

    fn from_str(s: &str) -> Result<FilingType, String> {
        match s.to_uppercase().as_str() {
            "10-K" => Ok(FilingType::Form10K),
            "10-Q" => Ok(FilingType::Form10Q),
            "8-K" => Ok(FilingType::Form8K),
            other => Err(format!(
                "Unsupported filing type '{}'. Supported types: {}",
                other,
                FilingType::list_types()
            )),
        }
    }
}

static FILING_TYPES: Lazy<String> = Lazy::new(|| {
    FilingType::iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
});

impl FilingType {
    pub fn list_types() -> &'static str {
        &FILING_TYPES
    }

    /// True when a sub-document's declared type marks it as this filing's
    /// narrative report body (e.g. declared type "10-K" or "10-K/A").
    pub fn matches_declared(&self, declared: &str) -> bool {
        declared.to_uppercase().contains(&self.to_string())
    }
}
