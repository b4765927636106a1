use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Digit grouping convention
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumberLocale {
    /// `12,34,567.00`, thousands then groups of two
    #[default]
    #[serde(rename = "en-IN")]
    EnIn,
    /// `1,234,567.00`
    #[serde(rename = "en-US")]
    EnUs,
}

impl FromStr for NumberLocale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en-in" | "en_in" => Ok(NumberLocale::EnIn),
            "en-us" | "en_us" => Ok(NumberLocale::EnUs),
            _ => Err(format!("unsupported number locale `{s}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub locale: NumberLocale,
}

impl CurrencyFormat {
    pub fn new(symbol: impl Into<String>, locale: NumberLocale) -> Self {
        Self { symbol: symbol.into(), locale }
    }

    /// Whole currency units with two decimals, e.g. `₹4,545.00` or `-₹955.00`
    pub fn format(&self, amount: i64) -> String {
        let sign = if amount < 0 { "-" } else { "" };
        let digits = amount.unsigned_abs().to_string();

        format!("{sign}{}{}.00", self.symbol, group_digits(&digits, self.locale))
    }
}

fn group_digits(digits: &str, locale: NumberLocale) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let width = match locale {
        NumberLocale::EnIn => 2,
        NumberLocale::EnUs => 3,
    };

    // Leading group may be short, the rest are full width
    let mut start = head.len() % width;
    let mut groups = Vec::new();
    if start > 0 {
        groups.push(&head[..start]);
    }
    while start < head.len() {
        groups.push(&head[start..start + width]);
        start += width;
    }
    groups.push(tail);

    groups.join(",")
}
