//! Lenient numeric coercion for drawing-call arguments.
//!
//! Drawing calls never reject their numeric arguments. Anything that is not a
//! usable number (NaN, a missing value, an unparsable string) collapses to 0,
//! and so does negative zero.

/// A value that can be coerced into a drawing-call number.
pub trait IntoNumber {
    /// Raw numeric interpretation, possibly NaN.
    fn into_number(self) -> f64;
}

/// Coerce `value` to a number, mapping NaN and -0 to 0.
pub fn number_or_zero<T: IntoNumber>(value: T) -> f64 {
    let n = value.into_number();
    if n.is_nan() || n == 0.0 {
        0.0
    } else {
        n
    }
}

impl IntoNumber for f64 {
    fn into_number(self) -> f64 {
        self
    }
}

impl IntoNumber for f32 {
    fn into_number(self) -> f64 {
        self as f64
    }
}

impl IntoNumber for i32 {
    fn into_number(self) -> f64 {
        self as f64
    }
}

impl IntoNumber for i64 {
    fn into_number(self) -> f64 {
        self as f64
    }
}

impl IntoNumber for u32 {
    fn into_number(self) -> f64 {
        self as f64
    }
}

impl IntoNumber for u8 {
    fn into_number(self) -> f64 {
        self as f64
    }
}

impl IntoNumber for bool {
    fn into_number(self) -> f64 {
        if self {
            1.0
        } else {
            0.0
        }
    }
}

/// A missing argument.
impl IntoNumber for Option<f64> {
    fn into_number(self) -> f64 {
        self.unwrap_or(f64::NAN)
    }
}

impl IntoNumber for &str {
    fn into_number(self) -> f64 {
        parse_numeric_str(self)
    }
}

impl IntoNumber for &String {
    fn into_number(self) -> f64 {
        parse_numeric_str(self)
    }
}

impl IntoNumber for String {
    fn into_number(self) -> f64 {
        parse_numeric_str(&self)
    }
}

/// Parse a string the way a numeric cast would: surrounding whitespace is
/// ignored, an empty string is 0, hex literals are accepted.
fn parse_numeric_str(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16)
            .map(|v| v as f64)
            .unwrap_or(f64::NAN);
    }
    match s {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        // Rust also parses "inf" and "nan" spellings, a numeric cast does not.
        _ if s
            .chars()
            .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') =>
        {
            f64::NAN
        }
        _ => s.parse::<f64>().unwrap_or(f64::NAN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_numbers_pass_through() {
        assert_eq!(number_or_zero(12.5), 12.5);
        assert_eq!(number_or_zero(-3), -3.0);
        assert_eq!(number_or_zero(7u32), 7.0);
        assert_eq!(number_or_zero(f64::INFINITY), f64::INFINITY);
    }

    #[test]
    fn test_invalid_values_collapse_to_zero() {
        assert_eq!(number_or_zero(f64::NAN), 0.0);
        assert_eq!(number_or_zero(None), 0.0);
        assert_eq!(number_or_zero("abc"), 0.0);
        assert_eq!(number_or_zero("12px"), 0.0);
        assert_eq!(number_or_zero("nan"), 0.0);
    }

    #[test]
    fn test_negative_zero_becomes_zero() {
        let n = number_or_zero(-0.0);
        assert_eq!(n, 0.0);
        assert!(n.is_sign_positive());
    }

    #[test]
    fn test_numeric_strings() {
        assert_eq!(number_or_zero(" 42 "), 42.0);
        assert_eq!(number_or_zero(""), 0.0);
        assert_eq!(number_or_zero("0xFF"), 255.0);
        assert_eq!(number_or_zero(String::from("-1.5")), -1.5);
        assert_eq!(number_or_zero("Infinity"), f64::INFINITY);
    }

    #[test]
    fn test_bools() {
        assert_eq!(number_or_zero(true), 1.0);
        assert_eq!(number_or_zero(false), 0.0);
    }
}
