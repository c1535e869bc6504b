//! Decimal digit → kanji numeral normalization.
//!
//! Gazetteer addresses spell block and lot numbers with kanji numerals
//! (`一番一号`), while user input usually arrives with ASCII digits
//! (`1番1号`). Query text is normalized into the kanji spelling before
//! similarity matching.
//!
//! The conversion table covers 0–99 only. Digit runs whose value is 100
//! or more (and runs too long to parse at all) are left unchanged; the
//! tens/ones spelling below has no defined reading for them.

use std::sync::LazyLock;

use regex::Regex;

/// Matches any run of ASCII decimal digits.
static DIGIT_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

/// Kanji readings for the digits 0–9.
const KANJI_DIGITS: [&str; 10] = ["零", "一", "二", "三", "四", "五", "六", "七", "八", "九"];

/// Spells a value in the 0–99 range with kanji numerals.
///
/// `10` → `十`, `11`–`19` → `十` + ones, `20`+ → tens digit + `十` +
/// ones digit (omitting a zero ones digit). Returns `None` for values
/// outside the table.
#[must_use]
#[allow(clippy::missing_panics_doc)] // indexes are bounded by the match arms
pub fn kanji_numeral(value: u32) -> Option<String> {
    let spelled = match value {
        0..=9 => KANJI_DIGITS[value as usize].to_string(),
        10 => "十".to_string(),
        11..=19 => format!("十{}", KANJI_DIGITS[(value % 10) as usize]),
        20..=99 => {
            let tens = KANJI_DIGITS[(value / 10) as usize];
            let ones = match value % 10 {
                0 => "",
                rem => KANJI_DIGITS[rem as usize],
            };
            format!("{tens}十{ones}")
        }
        _ => return None,
    };
    Some(spelled)
}

/// Replaces every digit run in `input` with its kanji spelling.
///
/// Runs that do not convert (value ≥ 100, or unparseable) pass through
/// unchanged.
#[must_use]
pub fn normalize_numerals(input: &str) -> String {
    DIGIT_RUN_RE
        .replace_all(input, |caps: &regex::Captures<'_>| {
            let run = &caps[0];
            run.parse::<u32>()
                .ok()
                .and_then(kanji_numeral)
                .unwrap_or_else(|| run.to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spells_single_digits() {
        assert_eq!(kanji_numeral(0).as_deref(), Some("零"));
        assert_eq!(kanji_numeral(7).as_deref(), Some("七"));
    }

    #[test]
    fn spells_teens_with_leading_ten() {
        assert_eq!(kanji_numeral(10).as_deref(), Some("十"));
        assert_eq!(kanji_numeral(11).as_deref(), Some("十一"));
        assert_eq!(kanji_numeral(15).as_deref(), Some("十五"));
    }

    #[test]
    fn spells_tens_with_multiplier() {
        assert_eq!(kanji_numeral(20).as_deref(), Some("二十"));
        assert_eq!(kanji_numeral(21).as_deref(), Some("二十一"));
        assert_eq!(kanji_numeral(99).as_deref(), Some("九十九"));
    }

    #[test]
    fn values_at_or_above_one_hundred_are_outside_the_table() {
        assert_eq!(kanji_numeral(100), None);
        assert_eq!(kanji_numeral(1000), None);
    }

    #[test]
    fn normalizes_runs_in_address_text() {
        assert_eq!(normalize_numerals("15"), "十五");
        assert_eq!(normalize_numerals("10"), "十");
        assert_eq!(normalize_numerals("21"), "二十一");
        assert_eq!(
            normalize_numerals("東京都千代田区1番1号"),
            "東京都千代田区一番一号"
        );
    }

    // Boundary behavior: three-digit runs are not in the 0–99 table and
    // must pass through exactly as typed.
    #[test]
    fn hundred_passes_through_unchanged() {
        assert_eq!(normalize_numerals("100"), "100");
        assert_eq!(normalize_numerals("255番地"), "255番地");
    }

    #[test]
    fn oversized_runs_pass_through_unchanged() {
        let run = "99999999999999999999";
        assert_eq!(normalize_numerals(run), run);
    }

    #[test]
    fn text_without_digits_is_untouched() {
        assert_eq!(normalize_numerals("大阪府大阪市"), "大阪府大阪市");
    }
}
