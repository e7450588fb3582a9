//! Lenient numeric coercion for exported counters
//!
//! Spreadsheet exports carry counters as numbers, numeric strings (`"12.0"`),
//! blanks, or junk. A bad cell never aborts a batch: callers substitute a
//! default and count the cell as malformed.

use serde_json::Value;

/// Result of coercing one cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coerced<T> {
    /// Parsed successfully
    Present(T),
    /// Column absent, null, or blank
    Missing,
    /// Non-numeric, NaN, infinite, or out of range
    Malformed,
}

/// Coerce a cell to a finite float
pub fn coerce_f64(value: Option<&Value>) -> Coerced<f64> {
    let parsed = match value {
        None | Some(Value::Null) => return Coerced::Missing,
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Coerced::Missing;
            }
            s.parse::<f64>().ok()
        }
        Some(Value::Bool(_)) | Some(Value::Array(_)) | Some(Value::Object(_)) => None,
    };

    match parsed {
        Some(v) if v.is_finite() => Coerced::Present(v),
        _ => Coerced::Malformed,
    }
}

/// Coerce a cell to a non-negative integer counter.
///
/// Fractional values are truncated toward zero (`"12.9"` → 12). Negative
/// counters are malformed.
pub fn coerce_u64(value: Option<&Value>) -> Coerced<u64> {
    if let Some(Value::Number(n)) = value {
        if let Some(v) = n.as_u64() {
            return Coerced::Present(v);
        }
    }

    match coerce_f64(value) {
        Coerced::Present(v) if v >= 0.0 && v < u64::MAX as f64 => Coerced::Present(v.trunc() as u64),
        Coerced::Present(_) => Coerced::Malformed,
        Coerced::Missing => Coerced::Missing,
        Coerced::Malformed => Coerced::Malformed,
    }
}

/// Round to 2 decimal places for output; non-finite input becomes 0.0
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_u64_accepts_numbers_and_strings() {
        assert_eq!(coerce_u64(Some(&json!(42))), Coerced::Present(42));
        assert_eq!(coerce_u64(Some(&json!("42"))), Coerced::Present(42));
        assert_eq!(coerce_u64(Some(&json!("12.0"))), Coerced::Present(12));
        assert_eq!(coerce_u64(Some(&json!(12.9))), Coerced::Present(12));
    }

    #[test]
    fn test_coerce_u64_missing() {
        assert_eq!(coerce_u64(None), Coerced::Missing);
        assert_eq!(coerce_u64(Some(&Value::Null)), Coerced::Missing);
        assert_eq!(coerce_u64(Some(&json!("  "))), Coerced::Missing);
    }

    #[test]
    fn test_coerce_u64_malformed() {
        assert_eq!(coerce_u64(Some(&json!("n/a"))), Coerced::Malformed);
        assert_eq!(coerce_u64(Some(&json!("NaN"))), Coerced::Malformed);
        assert_eq!(coerce_u64(Some(&json!("inf"))), Coerced::Malformed);
        assert_eq!(coerce_u64(Some(&json!(-3))), Coerced::Malformed);
        assert_eq!(coerce_u64(Some(&json!(true))), Coerced::Malformed);
    }

    #[test]
    fn test_coerce_f64() {
        assert_eq!(coerce_f64(Some(&json!("2.25"))), Coerced::Present(2.25));
        assert_eq!(coerce_f64(Some(&json!(-1.5))), Coerced::Present(-1.5));
        assert_eq!(coerce_f64(Some(&json!("nan"))), Coerced::Malformed);
        assert_eq!(coerce_f64(None), Coerced::Missing);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(3.14159), 3.14);
        assert_eq!(round2(2.675_000_1), 2.68);
        assert_eq!(round2(f64::NAN), 0.0);
        assert_eq!(round2(150.0), 150.0);
    }
}
