use serde::{Deserialize, Serialize};

/// A single cell value in a row: the shapes a JSON grid cell can take.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(untagged)]
pub enum Scalar {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// String conversion with the same output a browser gives for `String(value)`.
    pub fn to_js_string(&self) -> String {
        match self {
            Scalar::Null => "null".to_string(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Number(n) => number_to_string(*n),
            Scalar::Text(s) => s.clone(),
        }
    }

    /// Text shown in a table cell; nulls render blank.
    pub fn display(&self) -> String {
        match self {
            Scalar::Null => String::new(),
            other => other.to_js_string(),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if n == 0.0 {
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        // Shortest mantissa, exponent always signed: 1e+21, 1.5e-7.
        let text = format!("{:e}", n);
        match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => text,
        }
    } else if n.fract() == 0.0 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

/// Length of the longest decimal literal at the start of `s`
/// (`[+-]? digits [. digits] [e [+-] digits]`). Zero when there is none.
fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut mantissa_digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        mantissa_digits += j - frac_start;
        if mantissa_digits > 0 {
            i = j;
        }
    }

    if mantissa_digits == 0 {
        return 0;
    }

    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }

    i
}

fn signed_infinity(s: &str) -> Option<f64> {
    if s.starts_with("Infinity") || s.starts_with("+Infinity") {
        Some(f64::INFINITY)
    } else if s.starts_with("-Infinity") {
        Some(f64::NEG_INFINITY)
    } else {
        None
    }
}

/// Whole-string numeric conversion, as `Number(raw)` does it.
///
/// Blank input is zero, anything that is not entirely a numeric literal is
/// NaN. Hex literals (`0x1f`) are accepted.
pub fn js_number(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }

    if let Some(inf) = signed_infinity(s) {
        return if s.trim_start_matches(['+', '-']) == "Infinity" {
            inf
        } else {
            f64::NAN
        };
    }

    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return parse_hex(hex);
    }

    if numeric_prefix_len(s) != s.len() {
        return f64::NAN;
    }
    s.parse().unwrap_or(f64::NAN)
}

/// Hex digits only, no sign. Values past `u64::MAX` keep growing as f64.
fn parse_hex(digits: &str) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0_f64, |acc, c| c.to_digit(16).map(|d| acc * 16.0 + f64::from(d)))
        .unwrap_or(f64::NAN)
}

/// Prefix numeric conversion, as `parseFloat(raw)` does it: trailing junk
/// is ignored, no leading number gives NaN.
pub fn parse_float(raw: &str) -> f64 {
    let s = raw.trim_start();
    if let Some(inf) = signed_infinity(s) {
        return inf;
    }
    let len = numeric_prefix_len(s);
    if len == 0 {
        return f64::NAN;
    }
    s[..len].parse().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_strings() {
        assert_eq!(Scalar::Number(5.0).to_js_string(), "5");
        assert_eq!(Scalar::Number(-0.0).to_js_string(), "0");
        assert_eq!(Scalar::Number(12.5).to_js_string(), "12.5");
        assert_eq!(Scalar::Number(f64::NAN).to_js_string(), "NaN");
        assert_eq!(Scalar::Number(f64::NEG_INFINITY).to_js_string(), "-Infinity");
        assert_eq!(Scalar::Null.to_js_string(), "null");
        assert_eq!(Scalar::Bool(true).to_js_string(), "true");
    }

    #[test]
    fn test_number_strings_in_exponent_range() {
        assert_eq!(Scalar::Number(1e21).to_js_string(), "1e+21");
        assert_eq!(Scalar::Number(-2.5e30).to_js_string(), "-2.5e+30");
        assert_eq!(Scalar::Number(1e-7).to_js_string(), "1e-7");
        assert_eq!(Scalar::Number(1.5e-7).to_js_string(), "1.5e-7");
        assert_eq!(Scalar::Number(1e20).to_js_string(), "100000000000000000000");
        assert_eq!(Scalar::Number(0.000001).to_js_string(), "0.000001");
    }

    #[test]
    fn test_js_number() {
        assert_eq!(js_number(" 20 "), 20.0);
        assert_eq!(js_number(""), 0.0);
        assert_eq!(js_number("1e3"), 1000.0);
        assert_eq!(js_number(".5"), 0.5);
        assert_eq!(js_number("0x10"), 16.0);
        assert_eq!(js_number("0XfF"), 255.0);
        assert!(js_number("0x+1").is_nan());
        assert!(js_number("0x-1").is_nan());
        assert!(js_number("0x").is_nan());
        assert!(js_number("0x1g").is_nan());
        assert_eq!(js_number("0x10000000000000000"), 18446744073709551616.0);
        assert_eq!(js_number("-Infinity"), f64::NEG_INFINITY);
        assert!(js_number("12abc").is_nan());
        assert!(js_number("inf").is_nan());
        assert!(js_number("NaN").is_nan());
        assert!(js_number(".").is_nan());
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(parse_float("12abc"), 12.0);
        assert_eq!(parse_float("  -3.5e2kg"), -350.0);
        assert_eq!(parse_float("7e"), 7.0);
        assert_eq!(parse_float("Infinityx"), f64::INFINITY);
        assert!(parse_float("abc").is_nan());
        assert!(parse_float("").is_nan());
        assert!(parse_float("null").is_nan());
    }

    #[test]
    fn test_deserialize_untagged() {
        let row: Vec<Scalar> = serde_json::from_str(r#"[null, true, 3, "x"]"#).unwrap();
        assert_eq!(
            row,
            vec![
                Scalar::Null,
                Scalar::Bool(true),
                Scalar::Number(3.0),
                Scalar::Text("x".to_string())
            ]
        );
    }
}
