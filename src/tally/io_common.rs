use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

pub const MAX_NAME_LENGTH: usize = 150;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

lazy_static! {
    static ref AMOUNT_RX: Regex = Regex::new(r"^(\d+)([.,](\d{1,2}))?$").unwrap();
}

/// Parses an amount of money into cents.
///
/// Accepted: digits, optionally followed by `.` or `,` and one or two digits.
/// `12.5` is 1250 cents.
pub fn parse_amount(s: &str) -> Option<i64> {
    let caps = AMOUNT_RX.captures(s)?;
    let units = caps.get(1)?.as_str().parse::<i64>().ok()?;
    let cents = match caps.get(3).map(|m| m.as_str()) {
        None => 0,
        Some(f) if f.len() == 1 => f.parse::<i64>().ok()? * 10,
        Some(f) => f.parse::<i64>().ok()?,
    };
    units.checked_mul(100)?.checked_add(cents)
}

pub fn format_amount(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Names of voters, groups, votings and options.
pub fn validate_name(s: &str) -> Result<String, String> {
    let name = s.trim();
    let len = name.chars().count();
    if len == 0 {
        Err("the name is empty".to_string())
    } else if len > MAX_NAME_LENGTH {
        Err(format!(
            "the name is longer than {} characters",
            MAX_NAME_LENGTH
        ))
    } else {
        Ok(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts() {
        assert_eq!(parse_amount("12"), Some(1200));
        assert_eq!(parse_amount("12.5"), Some(1250));
        assert_eq!(parse_amount("12,05"), Some(1205));
        assert_eq!(parse_amount("0.01"), Some(1));
        assert_eq!(parse_amount("12."), None);
        assert_eq!(parse_amount(".5"), None);
        assert_eq!(parse_amount("1.234"), None);
        assert_eq!(parse_amount("-3"), None);
        assert_eq!(parse_amount("1.2.3"), None);
        assert_eq!(parse_amount("99999999999999999999"), None);
        assert_eq!(parse_amount("92233720368547758.07"), Some(i64::MAX));
        assert_eq!(parse_amount("92233720368547758.08"), None);
        assert_eq!(parse_amount(" 12"), None);
    }

    #[test]
    fn formatted_amounts() {
        assert_eq!(format_amount(120050), "1200.50");
        assert_eq!(format_amount(5), "0.05");
        assert_eq!(format_amount(-250), "-2.50");
    }

    #[test]
    fn names() {
        assert_eq!(validate_name("  Anna "), Ok("Anna".to_string()));
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(151)).is_err());
        assert!(validate_name(&"é".repeat(150)).is_ok());
    }

    #[test]
    fn file_names() {
        assert_eq!(simplify_file_name("/tmp/x/ballots.csv"), "ballots.csv");
        assert_eq!(simplify_file_name("ballots.csv"), "ballots.csv");
    }
}
