//! Coercion of loosely-typed client JSON fields.
//!
//! Unity clients send amounts as either numbers or strings depending on the
//! build, so inbound payloads are kept as raw [`serde_json::Value`]s until
//! validation.

use serde_json::Value;

/// Canonical string form of a scalar field, or `None` when absent, null,
/// blank, or not a scalar.
pub(crate) fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Parse a field as a finite float.
pub(crate) fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Parse a field as a non-negative integer. Floats with a fractional part are
/// rejected rather than truncated.
pub(crate) fn integer(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_coerces_scalars() {
        assert_eq!(text(Some(&json!("  btc "))), Some("btc".to_string()));
        assert_eq!(text(Some(&json!(42))), Some("42".to_string()));
        assert_eq!(text(Some(&json!(""))), None);
        assert_eq!(text(Some(&json!(null))), None);
        assert_eq!(text(Some(&json!({"a": 1}))), None);
        assert_eq!(text(None), None);
    }

    #[test]
    fn test_number_rejects_garbage() {
        assert_eq!(number(&json!(10)), Some(10.0));
        assert_eq!(number(&json!("9.99")), Some(9.99));
        assert_eq!(number(&json!("ten")), None);
        assert_eq!(number(&json!("NaN")), None);
        assert_eq!(number(&json!("inf")), None);
        assert_eq!(number(&json!([1])), None);
    }

    #[test]
    fn test_integer_parsing() {
        assert_eq!(integer(&json!(300)), Some(300));
        assert_eq!(integer(&json!("1500")), Some(1500));
        assert_eq!(integer(&json!(500.0)), Some(500));
        assert_eq!(integer(&json!(500.5)), None);
        assert_eq!(integer(&json!(-5)), None);
        assert_eq!(integer(&json!("12abc")), None);
    }
}
