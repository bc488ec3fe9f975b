/// Lowest accepted mood rating.
pub const MIN_MOOD: f64 = 1.0;
/// Highest accepted mood rating.
pub const MAX_MOOD: f64 = 10.0;

/// Parse a mood cell, accepting only values in `[1, 10]`.
///
/// A comma decimal separator is accepted ("7,5" is 7.5). Empty, non-numeric
/// and out-of-range cells all mean "no mood here" and yield `None`.
pub fn parse_mood(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let value: f64 = text.replace(',', ".").parse().ok()?;
    (MIN_MOOD..=MAX_MOOD).contains(&value).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", 1.0)]
    #[case("10", 10.0)]
    #[case("7", 7.0)]
    #[case("7.5", 7.5)]
    #[case("7,5", 7.5)]
    #[case(" 8 ", 8.0)]
    #[case("10.0", 10.0)]
    fn test_parse_mood_accepts(#[case] text: &str, #[case] expected: f64) {
        assert_eq!(parse_mood(text), Some(expected));
    }

    #[rstest]
    #[case("")]
    #[case("0")]
    #[case("0.99")]
    #[case("10.1")]
    #[case("-3")]
    #[case("11")]
    #[case("happy")]
    #[case("NaN")]
    #[case("inf")]
    #[case("7,5,1")]
    fn test_parse_mood_rejects(#[case] text: &str) {
        assert_eq!(parse_mood(text), None);
    }
}
