use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated company ticker. Uppercased on construction; the classifier also
/// uses it to reject the company's own symbol when it shows up as a styled
/// run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticker(String);

impl Ticker {
    pub fn new(ticker: impl Into<String>) -> Result<Self> {
        let uppercase = ticker.into().to_uppercase();
        if uppercase.is_empty() {
            return Err(anyhow!("Ticker cannot be empty"));
        }
        if !uppercase
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(anyhow!(
                "Ticker must contain only alphanumeric characters or hyphens: {}",
                uppercase
            ));
        }
        Ok(Ticker(uppercase))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase form, the namespace prefix used by company-specific fact
    /// tags (e.g. `ko:CaseVolume`).
    pub fn fact_prefix(&self) -> String {
        format!("{}:", self.0.to_lowercase())
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_validation() {
        assert_eq!(Ticker::new("aapl").unwrap().as_str(), "AAPL");
        assert_eq!(Ticker::new("BRK-B").unwrap().as_str(), "BRK-B");
        assert!(Ticker::new("").is_err());
        assert!(Ticker::new("A PL").is_err());
    }

    #[test]
    fn test_fact_prefix() {
        assert_eq!(Ticker::new("KO").unwrap().fact_prefix(), "ko:");
    }
}
