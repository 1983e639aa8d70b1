//! Numeric literal parsing shared by the scanner (for the literal's text)
//! and the const evaluator (for folding integer literals).

/// Parse a numeric literal's text into an `f64`, honoring `0x`/`0b`/`0o`
/// radix prefixes and `_` digit separators. Returns `None` on malformed
/// input; the caller decides whether that is a lex error or a const-eval
/// error depending on context.
#[must_use]
pub fn parse_numeric_literal_value(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }

    if text.len() > 2 {
        let prefix = &text[0..2];
        if prefix.eq_ignore_ascii_case("0x") {
            return parse_radix_digits(&text[2..], 16);
        } else if prefix.eq_ignore_ascii_case("0b") {
            return parse_radix_digits(&text[2..], 2);
        } else if prefix.eq_ignore_ascii_case("0o") {
            return parse_radix_digits(&text[2..], 8);
        }
    }

    if text.contains('_') {
        let cleaned: String = text.chars().filter(|&c| c != '_').collect();
        return cleaned.parse::<f64>().ok();
    }

    text.parse::<f64>().ok()
}

/// A literal's type hint is `double` if its text contains a `.`, else `int`
/// source text.
#[must_use]
pub fn literal_has_fractional_part(text: &str) -> bool {
    text.contains('.')
}

fn parse_radix_digits(text: &str, base: u32) -> Option<f64> {
    if text.is_empty() {
        return None;
    }

    let mut value = 0.0;
    let base_float = f64::from(base);

    for byte in text.bytes() {
        if byte == b'_' {
            continue;
        }
        let digit = match byte {
            b'0'..=b'9' => u32::from(byte - b'0'),
            b'a'..=b'f' => u32::from(byte - b'a' + 10),
            b'A'..=b'F' => u32::from(byte - b'A' + 10),
            _ => return None,
        };
        if digit >= base {
            return None;
        }
        value = value * base_float + f64::from(digit);
    }

    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_hex_octal_binary() {
        assert_eq!(parse_numeric_literal_value("123"), Some(123.0));
        assert_eq!(parse_numeric_literal_value("123.456"), Some(123.456));
        assert_eq!(parse_numeric_literal_value("1_000"), Some(1000.0));
        assert_eq!(parse_numeric_literal_value("0b11"), Some(3.0));
        assert_eq!(parse_numeric_literal_value("0o10"), Some(8.0));
        assert_eq!(parse_numeric_literal_value("0xFF"), Some(255.0));
    }

    #[test]
    fn rejects_out_of_range_digits() {
        assert_eq!(parse_numeric_literal_value("0b2"), None);
        assert_eq!(parse_numeric_literal_value("0o8"), None);
        assert_eq!(parse_numeric_literal_value("0xg"), None);
    }

    #[test]
    fn fractional_part_sets_double_hint() {
        assert!(literal_has_fractional_part("1.0"));
        assert!(!literal_has_fractional_part("1"));
    }
}
