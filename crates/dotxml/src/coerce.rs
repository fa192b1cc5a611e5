//! Leaf text to scalar conversion

use crate::value::Value;

/// Convert element text into a scalar value.
///
/// Checks run in a fixed order, first match wins:
///
/// 1. 64-bit integer (`125`, `-3`, `+8`)
/// 2. finite decimal float (`12.5`, `-1.62`, `6.02e23`)
/// 3. `true` / `false`, any case
/// 4. empty text or `null`, any case
/// 5. anything else stays a string, unmodified
///
/// Surrounding whitespace is ignored by the checks but kept in the string
/// fallback.
pub fn coerce(text: &str) -> Value {
    let trimmed = text.trim();

    if let Ok(n) = trimmed.parse::<i64>() {
        return Value::Integer(n);
    }
    if let Some(n) = parse_float(trimmed) {
        return Value::Float(n);
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    Value::String(text.to_owned())
}

// `f64::from_str` also takes `inf`, `NaN` and friends; those stay strings.
fn parse_float(text: &str) -> Option<f64> {
    let numeric = text
        .bytes()
        .all(|b| matches!(b, b'0'..=b'9' | b'.' | b'e' | b'E' | b'+' | b'-'));
    if !numeric || !text.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_before_float() {
        assert_eq!(coerce("125"), Value::Integer(125));
        assert_eq!(coerce("-88"), Value::Integer(-88));
        assert_eq!(coerce("+7"), Value::Integer(7));
        assert_eq!(coerce("0"), Value::Integer(0));
    }

    #[test]
    fn test_floats() {
        assert_eq!(coerce("12.5"), Value::Float(12.5));
        assert_eq!(coerce("-1.62"), Value::Float(-1.62));
        assert_eq!(coerce("1e3"), Value::Float(1000.0));
        assert_eq!(coerce(".5"), Value::Float(0.5));
    }

    #[test]
    fn test_integer_overflow_falls_back_to_float() {
        assert_eq!(coerce("99999999999999999999"), Value::Float(1e20));
    }

    #[test]
    fn test_non_finite_spellings_stay_strings() {
        assert_eq!(coerce("NaN"), Value::from("NaN"));
        assert_eq!(coerce("inf"), Value::from("inf"));
        assert_eq!(coerce("-infinity"), Value::from("-infinity"));
        assert_eq!(coerce("1e999"), Value::from("1e999"));
    }

    #[test]
    fn test_booleans_any_case() {
        assert_eq!(coerce("True"), Value::Bool(true));
        assert_eq!(coerce("FALSE"), Value::Bool(false));
        assert_eq!(coerce("yes"), Value::from("yes"));
    }

    #[test]
    fn test_null_forms() {
        assert_eq!(coerce(""), Value::Null);
        assert_eq!(coerce("null"), Value::Null);
        assert_eq!(coerce("NULL"), Value::Null);
        assert_eq!(coerce("   "), Value::Null);
    }

    #[test]
    fn test_strings_kept_raw() {
        assert_eq!(coerce("abc"), Value::from("abc"));
        assert_eq!(coerce("-10m"), Value::from("-10m"));
        assert_eq!(coerce(" pump 1 "), Value::from(" pump 1 "));
        assert_eq!(coerce("1.2.3"), Value::from("1.2.3"));
        assert_eq!(coerce("-"), Value::from("-"));
    }

    #[test]
    fn test_padded_numbers() {
        assert_eq!(coerce(" 42\n"), Value::Integer(42));
        assert_eq!(coerce("\t0.25 "), Value::Float(0.25));
    }
}
