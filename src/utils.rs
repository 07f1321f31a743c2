use chrono::Month;
use std::str::FromStr;

pub const ALL_MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// Parses a month name from a header or period descriptor.
/// Input is trimmed once here; chrono accepts full and abbreviated
/// English names, case-insensitive.
pub fn parse_month(raw: &str) -> Option<Month> {
    Month::from_str(raw.trim()).ok()
}

/// The three calendar months of a quarter (1..=4).
pub fn quarter_months(quarter: u32) -> Option<[Month; 3]> {
    match quarter {
        1 => Some([Month::January, Month::February, Month::March]),
        2 => Some([Month::April, Month::May, Month::June]),
        3 => Some([Month::July, Month::August, Month::September]),
        4 => Some([Month::October, Month::November, Month::December]),
        _ => None,
    }
}

/// Parses a quarter code like "Q1".."Q4" (case-insensitive, trimmed).
pub fn parse_quarter(raw: &str) -> Option<u32> {
    let mut chars = raw.trim().chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(q), Some(digit), None) if q.eq_ignore_ascii_case(&'q') => {
            digit.to_digit(10).filter(|n| (1..=4).contains(n))
        }
        _ => None,
    }
}

/// Parses a spreadsheet-shaped numeric cell. Handles thousands separators
/// ("1,234.5") and accountant-style parenthesized negatives ("(500)").
/// Blank or non-numeric text yields `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    let (text, negated) = if text.starts_with('(') && text.ends_with(')') {
        (&text[1..text.len() - 1], true)
    } else {
        (text, false)
    };

    let cleaned: String = text.chars().filter(|c| *c != ',').collect();
    let value = cleaned.trim().parse::<f64>().ok()?;
    Some(if negated { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("January"), Some(Month::January));
        assert_eq!(parse_month("  January  "), Some(Month::January));
        assert_eq!(parse_month("feb"), Some(Month::February));
        assert_eq!(parse_month("Q1"), None);
        assert_eq!(parse_month(""), None);
    }

    #[test]
    fn test_quarter_months() {
        assert_eq!(
            quarter_months(1),
            Some([Month::January, Month::February, Month::March])
        );
        assert_eq!(
            quarter_months(4),
            Some([Month::October, Month::November, Month::December])
        );
        assert_eq!(quarter_months(0), None);
        assert_eq!(quarter_months(5), None);
    }

    #[test]
    fn test_parse_quarter() {
        assert_eq!(parse_quarter("Q1"), Some(1));
        assert_eq!(parse_quarter(" q4 "), Some(4));
        assert_eq!(parse_quarter("Q5"), None);
        assert_eq!(parse_quarter("Quarter 1"), None);
        assert_eq!(parse_quarter("January"), None);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("1234"), Some(1234.0));
        assert_eq!(parse_number("1,234.5"), Some(1234.5));
        assert_eq!(parse_number(" 100000 "), Some(100000.0));
        assert_eq!(parse_number("(500)"), Some(-500.0));
        assert_eq!(parse_number("(1,250.75)"), Some(-1250.75));
        assert_eq!(parse_number("-42"), Some(-42.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("n/a"), None);
    }
}
