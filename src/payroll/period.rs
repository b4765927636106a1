use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{error::PayrollError, utils};

/// Payroll cycle label such as `January 2025`.
///
/// Stored in canonical form, trimmed with inner whitespace collapsed to a
/// single space, so `January  2025` and `January 2025` are the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period(String);

impl Period {
    pub fn new(value: &str) -> Result<Self, PayrollError> {
        let canonical = utils::collapse_whitespace(value, " ");

        if canonical.is_empty() {
            return Err(PayrollError::InvalidPeriod);
        }

        Ok(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Filename-safe form, `January 2025` becomes `January_2025`
    pub fn file_slug(&self) -> String {
        utils::collapse_whitespace(&self.0, "_")
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Period {
    type Err = PayrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Period {
    type Error = PayrollError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_form() {
        let period = Period::new("  January   2025\t").unwrap();

        assert_eq!(period.as_str(), "January 2025");
        assert_eq!(period, Period::new("January 2025").unwrap());
        assert_eq!(period.file_slug(), "January_2025");
    }

    #[test]
    fn test_empty_period() {
        assert!(matches!(Period::new(""), Err(PayrollError::InvalidPeriod)));
        assert!(matches!(" \n ".parse::<Period>(), Err(PayrollError::InvalidPeriod)));
    }

    #[test]
    fn test_serde() {
        let period: Period = serde_json::from_str("\"December  2024\"").unwrap();
        assert_eq!(serde_json::to_string(&period).unwrap(), "\"December 2024\"");

        assert!(serde_json::from_str::<Period>("\"  \"").is_err());
    }
}
