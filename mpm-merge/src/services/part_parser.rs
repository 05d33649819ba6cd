//! Part-token parser
//!
//! Extracts a part indicator from a filename stem and returns the stem with
//! the indicator removed. Recognized forms, highest priority first:
//!
//! 1. Explicit token: keyword `pt`, `part`, `cd` or `disc` (any case),
//!    optional `space . - _` separators, then a 1-2 digit number or a
//!    roman numeral of 1-6 `I`/`V`/`X` characters.
//! 2. A standalone letter `A` (part 1) or `B` (part 2).
//!
//! Either form must be bounded on both sides by start/end of string or one
//! of `space . - _ ( ) [ ]`. A match consumes its bounding characters, so
//! scanning resumes after the trailing bound.

use crate::models::ParseResult;

/// Keywords introducing an explicit part token
pub(crate) const PART_KEYWORDS: [&str; 4] = ["pt", "part", "cd", "disc"];

const MAX_DIGITS: usize = 2;
const MAX_ROMAN: usize = 6;

/// Characters allowed around a token
fn is_bound(c: char) -> bool {
    matches!(c, ' ' | '_' | '.' | '-' | '(' | ')' | '[' | ']')
}

/// Characters allowed between keyword and numeral
pub(crate) fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '_' | '.' | '-')
}

fn is_roman(c: char) -> bool {
    matches!(c.to_ascii_uppercase(), 'I' | 'V' | 'X')
}

/// Length of the keyword matched at `at`, if any
pub(crate) fn match_keyword(chars: &[char], at: usize) -> Option<usize> {
    PART_KEYWORDS.iter().find_map(|kw| {
        let end = at + kw.len();
        let fits = end <= chars.len()
            && chars[at..end]
                .iter()
                .zip(kw.chars())
                .all(|(c, k)| c.eq_ignore_ascii_case(&k));
        fits.then_some(kw.len())
    })
}

/// Number of consecutive chars from `at` satisfying `pred`, capped at `max`
pub(crate) fn run_length(chars: &[char], at: usize, max: usize, pred: fn(char) -> bool) -> usize {
    chars
        .iter()
        .skip(at)
        .take(max)
        .take_while(|c| pred(**c))
        .count()
}

/// Position after the trailing bound at `at`, if `at` is bounded
fn trailing_bound(chars: &[char], at: usize) -> Option<usize> {
    if at == chars.len() {
        Some(at)
    } else if is_bound(chars[at]) {
        Some(at + 1)
    } else {
        None
    }
}

/// Numeral captured by an explicit part token
#[derive(Debug, Clone, PartialEq, Eq)]
enum Numeral {
    Digits(String),
    Roman(String),
}

impl Numeral {
    fn value(&self) -> Option<u32> {
        match self {
            Numeral::Digits(d) => d.parse().ok(),
            Numeral::Roman(r) => roman_to_int(r),
        }
    }
}

/// Match `keyword [sep]* numeral <bound>` starting at `at`
///
/// Returns the end position (after the trailing bound) and the numeral.
fn match_part_body(chars: &[char], at: usize) -> Option<(usize, Numeral)> {
    let keyword_len = match_keyword(chars, at)?;
    let start = at + keyword_len + run_length(chars, at + keyword_len, usize::MAX, is_separator);

    // Longest numeral first, shrinking until the trailing bound fits
    let digits = run_length(chars, start, MAX_DIGITS, |c| c.is_ascii_digit());
    for len in (1..=digits).rev() {
        if let Some(end) = trailing_bound(chars, start + len) {
            let numeral: String = chars[start..start + len].iter().collect();
            return Some((end, Numeral::Digits(numeral)));
        }
    }

    let romans = run_length(chars, start, MAX_ROMAN, is_roman);
    for len in (1..=romans).rev() {
        if let Some(end) = trailing_bound(chars, start + len) {
            let numeral: String = chars[start..start + len].iter().collect();
            return Some((end, Numeral::Roman(numeral)));
        }
    }

    None
}

/// Match a standalone `A`/`B` letter starting at `at`
fn match_letter_body(chars: &[char], at: usize) -> Option<(usize, char)> {
    let letter = chars.get(at)?.to_ascii_uppercase();
    if letter != 'A' && letter != 'B' {
        return None;
    }
    trailing_bound(chars, at + 1).map(|end| (end, letter))
}

/// A located token: `[start, end)` including consumed bounds
#[derive(Debug)]
struct TokenMatch<T> {
    start: usize,
    end: usize,
    value: T,
}

/// Leftmost token at or after `from`
///
/// A token is either anchored at the very start of the string or preceded
/// by a bound character, which then belongs to the match.
fn find_token<T>(
    chars: &[char],
    from: usize,
    body: fn(&[char], usize) -> Option<(usize, T)>,
) -> Option<TokenMatch<T>> {
    for i in from..chars.len() {
        if i == 0 {
            if let Some((end, value)) = body(chars, 0) {
                return Some(TokenMatch { start: 0, end, value });
            }
        }
        if is_bound(chars[i]) {
            if let Some((end, value)) = body(chars, i + 1) {
                return Some(TokenMatch { start: i, end, value });
            }
        }
    }
    None
}

/// Replace every non-overlapping token with a single space
fn strip_tokens<T>(chars: &[char], body: fn(&[char], usize) -> Option<(usize, T)>) -> String {
    let mut out = String::with_capacity(chars.len());
    let mut pos = 0;
    while let Some(m) = find_token(chars, pos, body) {
        out.extend(&chars[pos..m.start]);
        out.push(' ');
        pos = m.end;
    }
    out.extend(&chars[pos..]);
    out
}

/// Collapse whitespace runs to one space and trim
pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Stripped base, or the collapsed stem when stripping leaves nothing
fn finish_base(stripped: &str, stem: &str) -> String {
    let base = collapse_whitespace(stripped);
    if base.is_empty() {
        collapse_whitespace(stem)
    } else {
        base
    }
}

/// Decode a roman numeral made of `I`, `V`, `X`
///
/// Scans right to left: a value smaller than the largest seen so far is
/// subtracted, otherwise added. Returns `None` for a zero total or any
/// other character.
pub fn roman_to_int(numeral: &str) -> Option<u32> {
    let mut max_seen = 0i64;
    let mut total = 0i64;
    for c in numeral.chars().rev() {
        let value = match c.to_ascii_uppercase() {
            'I' => 1,
            'V' => 5,
            'X' => 10,
            _ => return None,
        };
        if value < max_seen {
            total -= value;
        } else {
            total += value;
            max_seen = value;
        }
    }
    u32::try_from(total).ok().filter(|v| *v > 0)
}

/// Parse a filename stem (basename without extension)
///
/// Explicit tokens always win over the A/B fallback. Only the leftmost
/// token supplies the part number, but every occurrence is stripped from
/// the base.
pub fn parse(stem: &str) -> ParseResult {
    let chars: Vec<char> = stem.chars().collect();

    if let Some(m) = find_token(&chars, 0, match_part_body) {
        let part = m.value.value();
        let base = finish_base(&strip_tokens(&chars, match_part_body), stem);
        tracing::trace!(stem, ?part, base = %base, "Explicit part token");
        return ParseResult::new(base, part);
    }

    if let Some(m) = find_token(&chars, 0, match_letter_body) {
        let part = if m.value == 'A' { 1 } else { 2 };
        let base = finish_base(&strip_tokens(&chars, match_letter_body), stem);
        tracing::trace!(stem, part, base = %base, "Letter part token");
        return ParseResult::new(base, Some(part));
    }

    ParseResult::new(stem.trim(), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(stem: &str) -> (String, Option<u32>) {
        let r = parse(stem);
        (r.normalized_base, r.part_number)
    }

    #[test]
    fn test_keyword_forms() {
        assert_eq!(parsed("Title pt1"), ("Title".into(), Some(1)));
        assert_eq!(parsed("Title part-02"), ("Title".into(), Some(2)));
        assert_eq!(parsed("Title CD 3"), ("Title".into(), Some(3)));
        assert_eq!(parsed("Title disc_4"), ("Title".into(), Some(4)));
        assert_eq!(parsed("Title Part . - 5"), ("Title".into(), Some(5)));
        assert_eq!(parsed("Title.pt.12.hq"), ("Title hq".into(), Some(12)));
    }

    #[test]
    fn test_all_two_digit_numbers() {
        for n in 1..=99u32 {
            let stem = format!("My  Show   part {}", n);
            assert_eq!(parsed(&stem), ("My Show".into(), Some(n)), "stem {stem}");
        }
    }

    #[test]
    fn test_zero_digits_are_a_part_number() {
        assert_eq!(parsed("Show pt00"), ("Show".into(), Some(0)));
    }

    #[test]
    fn test_three_digits_are_not_a_token() {
        assert_eq!(parsed("Show pt123"), ("Show pt123".into(), None));
    }

    #[test]
    fn test_roman_numerals() {
        assert_eq!(parsed("Title disc iii"), ("Title".into(), Some(3)));
        assert_eq!(parsed("Title Part IV"), ("Title".into(), Some(4)));
        assert_eq!(parsed("Title pt-IX"), ("Title".into(), Some(9)));
        assert_eq!(parsed("Title cd XII"), ("Title".into(), Some(12)));
    }

    #[test]
    fn test_roman_decoding() {
        assert_eq!(roman_to_int("III"), Some(3));
        assert_eq!(roman_to_int("IV"), Some(4));
        assert_eq!(roman_to_int("iv"), Some(4));
        assert_eq!(roman_to_int("IX"), Some(9));
        assert_eq!(roman_to_int("XII"), Some(12));
        assert_eq!(roman_to_int("XXXVII"), Some(37));
        assert_eq!(roman_to_int("IIIIIV"), None);
        assert_eq!(roman_to_int("IC"), None);
        assert_eq!(roman_to_int(""), None);
    }

    #[test]
    fn test_zero_roman_yields_no_part_but_strips_token() {
        assert_eq!(parsed("Clip pt IIIIIV"), ("Clip".into(), None));
    }

    #[test]
    fn test_token_needs_bounds() {
        // keyword glued to a word
        assert_eq!(parsed("Departure1"), ("Departure1".into(), None));
        // numeral glued to a word
        assert_eq!(parsed("Show pt1x"), ("Show pt1x".into(), None));
        // roman glued to a word
        assert_eq!(parsed("Show part ivy"), ("Show part ivy".into(), None));
    }

    #[test]
    fn test_brackets_are_bounds() {
        assert_eq!(parsed("Movie (pt1)"), ("Movie".into(), Some(1)));
        assert_eq!(parsed("Movie [Disc 2] 1080p"), ("Movie 1080p".into(), Some(2)));
        assert_eq!(parsed("pt3 Movie"), ("Movie".into(), Some(3)));
    }

    #[test]
    fn test_leftmost_number_wins_and_adjacent_token_survives() {
        // the first match consumes the shared space, so "pt2" has no leading bound
        assert_eq!(parsed("x pt1 pt2"), ("x pt2".into(), Some(1)));
    }

    #[test]
    fn test_every_separated_token_is_stripped() {
        assert_eq!(parsed("x pt2 - cd1"), ("x -".into(), Some(2)));
        assert_eq!(parsed("a pt1 b pt2 c"), ("a b c".into(), Some(1)));
    }

    #[test]
    fn test_explicit_token_beats_letter() {
        assert_eq!(parsed("Scene B pt1"), ("Scene B".into(), Some(1)));
        assert_eq!(parsed("Scene A pt2"), ("Scene A".into(), Some(2)));
    }

    #[test]
    fn test_letter_split() {
        assert_eq!(parsed("Title A"), ("Title".into(), Some(1)));
        assert_eq!(parsed("Title_b"), ("Title".into(), Some(2)));
        assert_eq!(parsed("Title (B) final"), ("Title final".into(), Some(2)));
        assert_eq!(parsed("A Title"), ("Title".into(), Some(1)));
        assert_eq!(parsed("Scene B"), ("Scene".into(), Some(2)));
    }

    #[test]
    fn test_letter_inside_word_is_ignored() {
        assert_eq!(parsed("Cabaret"), ("Cabaret".into(), None));
        assert_eq!(parsed("Title C"), ("Title C".into(), None));
    }

    #[test]
    fn test_no_token_returns_trimmed_stem() {
        assert_eq!(parsed("  Plain   Title "), ("Plain   Title".into(), None));
    }

    #[test]
    fn test_token_only_stem_keeps_non_empty_base() {
        assert_eq!(parsed("pt1"), ("pt1".into(), Some(1)));
        assert_eq!(parsed(" CD 2 "), ("CD 2".into(), Some(2)));
    }

    #[test]
    fn test_non_ascii_text_survives() {
        assert_eq!(parsed("Café Été pt2"), ("Café Été".into(), Some(2)));
    }
}
