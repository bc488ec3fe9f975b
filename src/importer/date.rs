//! Date resolution for free-form spreadsheet cells.
//!
//! Patterns use the `yyyy-MM-dd` notation common to spreadsheet tools and are
//! translated to chrono strftime before parsing.

use chrono::NaiveDate;

/// Fallback patterns, tried in order after the preferred format.
///
/// Ambiguous day/month strings resolve to the first pattern that accepts them,
/// so "03/04/2025" is read as March 4th.
pub const FALLBACK_FORMATS: [&str; 16] = [
    "yyyy-MM-dd",
    "MM/dd/yyyy",
    "dd/MM/yyyy",
    "M/d/yyyy",
    "d/M/yyyy",
    "yyyy/MM/dd",
    "dd-MM-yyyy",
    "MM-dd-yyyy",
    "yyyy.MM.dd",
    "dd.MM.yyyy",
    "MMM d, yyyy",
    "MMM dd, yyyy",
    "dd MMM yyyy",
    "yyyy-M-d",
    "M-d-yyyy",
    "d-M-yyyy",
];

/// Parse `text` with `preferred_format` first, then each fallback pattern.
///
/// Returns `None` for empty input or when no pattern matches.
pub fn parse_date(text: &str, preferred_format: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let preferred = preferred_format.trim();
    if !preferred.is_empty() {
        if let Some(date) = parse_with(text, preferred) {
            return Some(date);
        }
    }

    FALLBACK_FORMATS
        .iter()
        .find_map(|pattern| parse_with(text, pattern))
}

/// Parse with a single pattern. A pattern containing `%` is used as strftime.
pub fn parse_with(text: &str, pattern: &str) -> Option<NaiveDate> {
    let strftime = if pattern.contains('%') {
        pattern.to_string()
    } else {
        to_strftime(pattern)
    };
    NaiveDate::parse_from_str(text, &strftime).ok()
}

/// Translate a `yyyy-MM-dd` style pattern to chrono strftime.
///
/// Text inside single quotes is literal; `''` is a literal quote.
pub fn to_strftime(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            while i < chars.len() && chars[i] != '\'' {
                push_literal(&mut out, chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }

        let run = chars[i..].iter().take_while(|&&x| x == c).count();
        match (c, run) {
            ('y', 2) => out.push_str("%y"),
            ('y', _) => out.push_str("%Y"),
            ('M', 1 | 2) => out.push_str("%m"),
            ('M', 3) => out.push_str("%b"),
            ('M', _) => out.push_str("%B"),
            ('d', _) => out.push_str("%d"),
            ('E', 1..=3) => out.push_str("%a"),
            ('E', _) => out.push_str("%A"),
            _ => {
                for _ in 0..run {
                    push_literal(&mut out, c);
                }
            }
        }
        i += run;
    }

    out
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case("yyyy-MM-dd", "%Y-%m-%d")]
    #[case("MMM d, yyyy", "%b %d, %Y")]
    #[case("dd.MM.yy", "%d.%m.%y")]
    #[case("EEEE, MMMM d yyyy", "%A, %B %d %Y")]
    #[case("'day' d", "day %d")]
    #[case("100%", "100%%")]
    fn test_to_strftime(#[case] pattern: &str, #[case] expected: &str) {
        assert_eq!(to_strftime(pattern), expected);
    }

    #[rstest]
    #[case("2025-01-15", ymd(2025, 1, 15))]
    #[case("01/15/2025", ymd(2025, 1, 15))]
    #[case("15/01/2025", ymd(2025, 1, 15))]
    #[case("1/5/2025", ymd(2025, 1, 5))]
    #[case("2025/01/15", ymd(2025, 1, 15))]
    #[case("15-01-2025", ymd(2025, 1, 15))]
    #[case("2025.01.15", ymd(2025, 1, 15))]
    #[case("15.01.2025", ymd(2025, 1, 15))]
    #[case("Jan 5, 2025", ymd(2025, 1, 5))]
    #[case("15 Jan 2025", ymd(2025, 1, 15))]
    #[case("2025-1-5", ymd(2025, 1, 5))]
    #[case("  2025-01-15  ", ymd(2025, 1, 15))]
    fn test_parse_date_fallbacks(#[case] text: &str, #[case] expected: NaiveDate) {
        assert_eq!(parse_date(text, ""), Some(expected));
    }

    #[test]
    fn test_ambiguous_date_prefers_month_first() {
        assert_eq!(parse_date("03/04/2025", ""), Some(ymd(2025, 3, 4)));
    }

    #[test]
    fn test_preferred_format_wins() {
        assert_eq!(parse_date("03/04/2025", "dd/MM/yyyy"), Some(ymd(2025, 4, 3)));
        assert_eq!(parse_date("03/04/2025", "%d/%m/%Y"), Some(ymd(2025, 4, 3)));
    }

    #[test]
    fn test_preferred_format_failure_falls_through() {
        assert_eq!(parse_date("2025-02-10", "dd/MM/yyyy"), Some(ymd(2025, 2, 10)));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("13/40/2025")]
    #[case("not a date")]
    #[case("2025-02-30")]
    fn test_parse_date_rejects(#[case] text: &str) {
        assert_eq!(parse_date(text, "yyyy-MM-dd"), None);
    }
}
