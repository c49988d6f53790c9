//! Type/shape checks that turn a raw JSON value into a Rust value.
//!
//! Lenient mode widens a few unambiguous representations (numeric text to numbers, `"yes"` to
//! `true`, `3.0` to `3`). Strict mode accepts only the native JSON type. Text, sequences and
//! mappings are never coerced.

use std::collections::BTreeMap;
use std::num::IntErrorKind;

use serde_json::Value;

use crate::error::FieldError;

/// Coercion policy applied to a single field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Coercion {
    #[default]
    Lenient,
    Strict,
}

pub(crate) type Coerced<T> = Result<T, FieldError>;

/// An integer. Values beyond the `i64` range saturate to its bounds, so an oversized but
/// well-typed integer still reaches the caller's range check with the right sign.
pub(crate) fn integer(field: &str, value: &Value, mode: Coercion) -> Coerced<i64> {
    let mismatch = || FieldError::type_mismatch(field, "integer", value);

    match (value, mode) {
        (Value::Number(n), _) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            if n.is_u64() {
                return Ok(i64::MAX);
            }
            match n.as_f64() {
                // `as` saturates at the i64 bounds.
                Some(f) if mode == Coercion::Lenient && f.is_finite() && f.fract() == 0.0 => {
                    Ok(f as i64)
                }
                _ => Err(mismatch()),
            }
        }
        (Value::String(s), Coercion::Lenient) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(i) => Ok(i),
                Err(_) if !is_decimal_integer(s) => Err(mismatch()),
                Err(e) => match e.kind() {
                    IntErrorKind::PosOverflow => Ok(i64::MAX),
                    IntErrorKind::NegOverflow => Ok(i64::MIN),
                    _ => Err(mismatch()),
                },
            }
        }
        _ => Err(mismatch()),
    }
}

fn is_decimal_integer(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

pub(crate) fn real(field: &str, value: &Value, mode: Coercion) -> Coerced<f64> {
    let mismatch = || FieldError::type_mismatch(field, "number", value);

    match (value, mode) {
        (Value::Number(n), _) => n.as_f64().ok_or_else(mismatch),
        (Value::String(s), Coercion::Lenient) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .ok_or_else(mismatch),
        _ => Err(mismatch()),
    }
}

pub(crate) fn boolean(field: &str, value: &Value, mode: Coercion) -> Coerced<bool> {
    let mismatch = || FieldError::type_mismatch(field, "boolean", value);

    match (value, mode) {
        (Value::Bool(b), _) => Ok(*b),
        (Value::String(s), Coercion::Lenient) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" | "t" | "y" => Ok(true),
            "false" | "no" | "off" | "0" | "f" | "n" => Ok(false),
            _ => Err(mismatch()),
        },
        (Value::Number(n), Coercion::Lenient) => match n.as_i64() {
            Some(1) => Ok(true),
            Some(0) => Ok(false),
            _ => Err(mismatch()),
        },
        _ => Err(mismatch()),
    }
}

pub(crate) fn text(field: &str, value: &Value) -> Coerced<String> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| FieldError::type_mismatch(field, "string", value))
}

/// A sequence of strings. Element failures are reported as `field.index`.
pub(crate) fn text_list(field: &str, value: &Value) -> Result<Vec<String>, Vec<FieldError>> {
    let Value::Array(items) = value else {
        return Err(vec![FieldError::type_mismatch(field, "array", value)]);
    };

    let mut out = Vec::with_capacity(items.len());
    let mut errors = Vec::new();
    for (index, item) in items.iter().enumerate() {
        match text(&format!("{field}.{index}"), item) {
            Ok(s) => out.push(s),
            Err(e) => errors.push(e),
        }
    }

    if errors.is_empty() {
        Ok(out)
    } else {
        Err(errors)
    }
}

/// A mapping of string to string. Value failures are reported as `field.key`.
pub(crate) fn text_map(
    field: &str,
    value: &Value,
) -> Result<BTreeMap<String, String>, Vec<FieldError>> {
    let Value::Object(entries) = value else {
        return Err(vec![FieldError::type_mismatch(field, "object", value)]);
    };

    let mut out = BTreeMap::new();
    let mut errors = Vec::new();
    for (key, item) in entries {
        match text(&format!("{field}.{key}"), item) {
            Ok(s) => {
                out.insert(key.clone(), s);
            }
            Err(e) => errors.push(e),
        }
    }

    if errors.is_empty() {
        Ok(out)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldErrorKind;
    use serde_json::json;

    fn found(err: &FieldError) -> &'static str {
        match err.kind {
            FieldErrorKind::TypeMismatch { found, .. } => found,
            _ => panic!("expected type mismatch, got {err:?}"),
        }
    }

    #[test]
    fn integer_lenient_accepts_text_and_whole_floats() {
        assert_eq!(integer("age", &json!(67), Coercion::Lenient).ok(), Some(67));
        assert_eq!(integer("age", &json!("67"), Coercion::Lenient).ok(), Some(67));
        assert_eq!(integer("age", &json!(" 39 "), Coercion::Lenient).ok(), Some(39));
        assert_eq!(integer("age", &json!(39.0), Coercion::Lenient).ok(), Some(39));
    }

    #[test]
    fn integer_rejects_fractions_booleans_and_words() {
        let err = integer("age", &json!(39.5), Coercion::Lenient).expect_err("fraction");
        assert_eq!(found(&err), "number");
        let err = integer("age", &json!(true), Coercion::Lenient).expect_err("bool");
        assert_eq!(found(&err), "boolean");
        let err = integer("age", &json!("sixty"), Coercion::Lenient).expect_err("word");
        assert_eq!(found(&err), "string");
    }

    #[test]
    fn integer_saturates_out_of_range_values() {
        let huge = json!(10_000_000_000_000_000_000_u64);
        assert_eq!(integer("age", &huge, Coercion::Strict).ok(), Some(i64::MAX));
        assert_eq!(
            integer("age", &json!("99999999999999999999"), Coercion::Lenient).ok(),
            Some(i64::MAX)
        );
        assert_eq!(
            integer("age", &json!("-99999999999999999999"), Coercion::Lenient).ok(),
            Some(i64::MIN)
        );
        assert_eq!(integer("age", &json!(1e17), Coercion::Lenient).ok(), Some(100_000_000_000_000_000));
        assert_eq!(integer("age", &json!(-1e19), Coercion::Lenient).ok(), Some(i64::MIN));
        assert!(integer("age", &json!(format!("{}x", "9".repeat(30))), Coercion::Lenient).is_err());
    }

    #[test]
    fn integer_strict_rejects_text_and_floats() {
        assert!(integer("age", &json!("67"), Coercion::Strict).is_err());
        assert!(integer("age", &json!(67.0), Coercion::Strict).is_err());
        assert_eq!(integer("age", &json!(67), Coercion::Strict).ok(), Some(67));
    }

    #[test]
    fn real_strict_rejects_text() {
        let err = real("weight", &json!("84.5"), Coercion::Strict).expect_err("strict");
        assert_eq!(err.field, "weight");
        assert_eq!(found(&err), "string");
        assert_eq!(real("weight", &json!(84), Coercion::Strict).ok(), Some(84.0));
    }

    #[test]
    fn real_lenient_accepts_finite_text_only() {
        assert_eq!(real("height", &json!("1.67"), Coercion::Lenient).ok(), Some(1.67));
        assert!(real("height", &json!("inf"), Coercion::Lenient).is_err());
        assert!(real("height", &json!("NaN"), Coercion::Lenient).is_err());
    }

    #[test]
    fn boolean_lenient_words_and_bits() {
        assert_eq!(boolean("m", &json!("Yes"), Coercion::Lenient).ok(), Some(true));
        assert_eq!(boolean("m", &json!("off"), Coercion::Lenient).ok(), Some(false));
        assert_eq!(boolean("m", &json!(0), Coercion::Lenient).ok(), Some(false));
        assert!(boolean("m", &json!(2), Coercion::Lenient).is_err());
        assert!(boolean("m", &json!("true"), Coercion::Strict).is_err());
    }

    #[test]
    fn text_does_not_stringify_numbers() {
        let err = text("name", &json!(42)).expect_err("number is not text");
        assert_eq!(found(&err), "integer");
    }

    #[test]
    fn text_list_reports_element_paths() {
        let errs = text_list("allergies", &json!(["pollen", 3, "dust", null])).expect_err("bad items");
        let paths: Vec<_> = errs.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(paths, vec!["allergies.1", "allergies.3"]);
    }

    #[test]
    fn text_map_reports_value_paths() {
        let errs =
            text_map("contactDetails", &json!({"phone": 9723747742_u64})).expect_err("bad value");
        assert_eq!(errs[0].field, "contactDetails.phone");

        let errs = text_map("contactDetails", &json!(["phone"])).expect_err("not an object");
        assert_eq!(found(&errs[0]), "array");
    }
}
