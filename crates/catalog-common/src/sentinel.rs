//! Per-field "value absent" policies.
//!
//! The same literal can be missing-data in one field and a real value in
//! another (`99` is a null magnitude code in GSC but a valid proper motion
//! elsewhere), so sentinels are always supplied per field by the catalog
//! schema.

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};
use crate::record::{Scalar, ScalarType};

/// A raw field value as produced by a decoder, before null handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    /// Text from a delimited or fixed-width record.
    Text(String),
    /// Integer from a packed binary record.
    Int(i64),
}

impl RawValue {
    pub fn text(s: impl Into<String>) -> Self {
        RawValue::Text(s.into())
    }
}

/// One way a field can say "no data".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentinel {
    /// Blank after trimming.
    Empty,
    /// Numerically equal to the value (`99`, `99.9`, `999.9`).
    Equals(f64),
    /// Numerically greater than or equal to the value (`20000+`).
    AtLeast(f64),
    /// Exact text after trimming (`___NULL___`).
    Literal(String),
}

impl Sentinel {
    fn matches(&self, raw: &RawValue) -> bool {
        match (self, raw) {
            (Sentinel::Empty, RawValue::Text(s)) => s.trim().is_empty(),
            (Sentinel::Empty, RawValue::Int(_)) => false,
            (Sentinel::Equals(x), raw) => numeric(raw).is_some_and(|v| v == *x),
            (Sentinel::AtLeast(x), raw) => numeric(raw).is_some_and(|v| v >= *x),
            (Sentinel::Literal(lit), RawValue::Text(s)) => s.trim() == lit.trim(),
            (Sentinel::Literal(lit), RawValue::Int(v)) => lit.trim() == v.to_string(),
        }
    }
}

fn numeric(raw: &RawValue) -> Option<f64> {
    match raw {
        RawValue::Int(v) => Some(*v as f64),
        RawValue::Text(s) => s.trim().parse::<f64>().ok(),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "y" | "yes" => Some(true),
        "false" | "f" | "0" | "n" | "no" => Some(false),
        _ => None,
    }
}

/// Resolve sentinels, then parse to the declared type.
///
/// Returns `Ok(None)` when the value matches any sentinel in `sentinels`, or
/// when it is blank. A non-blank value that does not parse as `ty` is a
/// `FieldParse` error naming `field`.
pub fn normalize(
    field: &str,
    raw: &RawValue,
    sentinels: &[Sentinel],
    ty: ScalarType,
) -> CatalogResult<Option<Scalar>> {
    if sentinels.iter().any(|s| s.matches(raw)) {
        return Ok(None);
    }

    match raw {
        RawValue::Int(v) => match ty {
            ScalarType::Int => Ok(Some(Scalar::Int(*v))),
            ScalarType::Float => Ok(Some(Scalar::Float(*v as f64))),
            ScalarType::Text => Ok(Some(Scalar::Text(v.to_string()))),
            ScalarType::Bool => match v {
                0 => Ok(Some(Scalar::Bool(false))),
                1 => Ok(Some(Scalar::Bool(true))),
                other => Err(CatalogError::field_parse(
                    field,
                    format!("{} is not a boolean", other),
                )),
            },
        },
        RawValue::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            let parsed = match ty {
                ScalarType::Text => Scalar::Text(s.to_string()),
                ScalarType::Float => match s.parse::<f64>() {
                    Ok(v) if v.is_finite() => Scalar::Float(v),
                    _ => {
                        return Err(CatalogError::field_parse(
                            field,
                            format!("'{}' is not a finite float", s),
                        ))
                    }
                },
                ScalarType::Int => s.parse::<i64>().map(Scalar::Int).map_err(|e| {
                    CatalogError::field_parse(field, format!("'{}': {}", s, e))
                })?,
                ScalarType::Bool => parse_bool(s).map(Scalar::Bool).ok_or_else(|| {
                    CatalogError::field_parse(field, format!("'{}' is not a boolean", s))
                })?,
            };
            Ok(Some(parsed))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policies() -> Vec<(Vec<Sentinel>, ScalarType, Vec<RawValue>, RawValue, Scalar)> {
        vec![
            (
                vec![Sentinel::Empty],
                ScalarType::Float,
                vec![RawValue::text(""), RawValue::text("   ")],
                RawValue::text("15.432"),
                Scalar::Float(15.432),
            ),
            (
                vec![Sentinel::Equals(99.9)],
                ScalarType::Float,
                vec![RawValue::text("99.9"), RawValue::text(" 99.90")],
                RawValue::text("12.5"),
                Scalar::Float(12.5),
            ),
            (
                vec![Sentinel::Equals(99.0)],
                ScalarType::Int,
                vec![RawValue::text("99"), RawValue::Int(99)],
                RawValue::text("7"),
                Scalar::Int(7),
            ),
            (
                vec![Sentinel::Equals(999.9), Sentinel::Empty],
                ScalarType::Float,
                vec![RawValue::text("999.9"), RawValue::text("")],
                RawValue::text("-3.25"),
                Scalar::Float(-3.25),
            ),
            (
                vec![Sentinel::AtLeast(20000.0)],
                ScalarType::Int,
                vec![RawValue::Int(20000), RawValue::Int(65535)],
                RawValue::Int(19999),
                Scalar::Int(19999),
            ),
            (
                vec![Sentinel::Literal("___NULL___".into())],
                ScalarType::Text,
                vec![RawValue::text("___NULL___")],
                RawValue::text("N9I7000001"),
                Scalar::Text("N9I7000001".into()),
            ),
        ]
    }

    #[test]
    fn test_every_sentinel_is_null() {
        for (sentinels, ty, missing, _, _) in policies() {
            for raw in missing {
                assert_eq!(
                    normalize("f", &raw, &sentinels, ty).unwrap(),
                    None,
                    "{:?} with {:?}",
                    raw,
                    sentinels
                );
            }
        }
    }

    #[test]
    fn test_representative_value_passes_through() {
        for (sentinels, ty, _, valid, expected) in policies() {
            assert_eq!(normalize("f", &valid, &sentinels, ty).unwrap(), Some(expected));
        }
    }

    #[test]
    fn test_sentinel_is_field_specific() {
        // 99 is missing for a magnitude code but a legitimate proper motion.
        let raw = RawValue::text("99");
        assert_eq!(
            normalize("pm_ra", &raw, &[Sentinel::Empty], ScalarType::Float).unwrap(),
            Some(Scalar::Float(99.0))
        );
        assert_eq!(
            normalize("code", &raw, &[Sentinel::Equals(99.0)], ScalarType::Int).unwrap(),
            None
        );
    }

    #[test]
    fn test_unparsable_is_field_parse_error() {
        let err = normalize("j_m", &RawValue::text("abc"), &[], ScalarType::Float).unwrap_err();
        match err {
            CatalogError::FieldParse { field, .. } => assert_eq!(field, "j_m"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(normalize("n", &RawValue::text("1.5"), &[], ScalarType::Int).is_err());
        assert!(normalize("b", &RawValue::text("maybe"), &[], ScalarType::Bool).is_err());
        assert!(normalize("b", &RawValue::Int(2), &[], ScalarType::Bool).is_err());
        assert!(normalize("x", &RawValue::text("NaN"), &[], ScalarType::Float).is_err());
    }

    #[test]
    fn test_blank_is_null_without_explicit_sentinel() {
        assert_eq!(
            normalize("h_m", &RawValue::text(""), &[], ScalarType::Float).unwrap(),
            None
        );
    }

    #[test]
    fn test_bool_forms() {
        for (s, v) in [("T", true), ("false", false), ("1", true), ("0", false)] {
            assert_eq!(
                normalize("flag", &RawValue::text(s), &[], ScalarType::Bool).unwrap(),
                Some(Scalar::Bool(v))
            );
        }
    }

    #[test]
    fn test_sentinel_deserializes_from_yaml_shape() {
        let json = r#"[ "empty", {"equals": 99.9}, {"at_least": 20000.0}, {"literal": "___NULL___"} ]"#;
        let parsed: Vec<Sentinel> = serde_json::from_str(json).unwrap();
        assert_eq!(
            parsed,
            vec![
                Sentinel::Empty,
                Sentinel::Equals(99.9),
                Sentinel::AtLeast(20000.0),
                Sentinel::Literal("___NULL___".into()),
            ]
        );
    }
}
