//! Declarative catalog schemas.
//!
//! A schema names every field a catalog record carries, where the field
//! lives in the raw record, its type, its missing-value sentinels and the
//! role it plays in the normalized [`StarRecord`](catalog_common::StarRecord).
//! One generic decoder per format family consumes the schema.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Range;

use catalog_common::{CatalogError, CatalogResult, ScalarType, Sentinel};
use zone_parser::PackedLayout;

use crate::units::UnitLayout;

/// Physical record format of a catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordFormat {
    /// One record per line, fields addressed by position. `skip_header`
    /// drops the first row of every file.
    Delimited {
        delimiter: char,
        #[serde(default)]
        skip_header: bool,
    },
    /// One record per line, fields addressed by byte column ranges.
    FixedWidth,
    /// Fixed-size little-endian binary records.
    PackedBinary { layout: PackedLayout },
}

impl RecordFormat {
    fn family(&self) -> &'static str {
        match self {
            RecordFormat::Delimited { .. } => "delimited",
            RecordFormat::FixedWidth => "fixed_width",
            RecordFormat::PackedBinary { .. } => "packed_binary",
        }
    }
}

/// Where a field's raw value comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    /// Zero-based column of a delimited record.
    Position(usize),
    /// Byte ranges of a fixed-width line, joined with `:` when more than one
    /// (sexagesimal components stored in separate columns).
    Columns(Vec<Range<usize>>),
    /// Named field of the packed layout.
    Packed(String),
}

/// What a field means in the normalized record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRole {
    CatalogId,
    RaRad,
    DecRad,
    RaDeg,
    DecDeg,
    RaSexagesimal,
    DecSexagesimal,
    /// Magnitude in the named band.
    Magnitude(String),
    PmRa,
    PmDec,
    /// Catalog-specific error or flag, kept under the field name.
    Extra,
}

/// One field of a catalog schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub source: FieldSource,
    pub kind: ScalarType,
    pub role: FieldRole,
    #[serde(default)]
    pub sentinels: Vec<Sentinel>,
    /// Multiplier applied to float values after sentinel resolution.
    #[serde(default)]
    pub scale: Option<f64>,
    /// Addend applied after `scale`.
    #[serde(default)]
    pub offset: Option<f64>,
}

impl FieldSpec {
    pub fn new(name: &str, source: FieldSource, kind: ScalarType, role: FieldRole) -> Self {
        Self {
            name: name.to_string(),
            source,
            kind,
            role,
            sentinels: Vec::new(),
            scale: None,
            offset: None,
        }
    }

    pub fn with_sentinels(mut self, sentinels: Vec<Sentinel>) -> Self {
        self.sentinels = sentinels;
        self
    }

    pub fn scaled(mut self, scale: f64, offset: f64) -> Self {
        self.scale = Some(scale);
        self.offset = Some(offset);
        self
    }

    /// Apply `scale` and `offset` to a float.
    pub fn rescale(&self, value: f64) -> f64 {
        value * self.scale.unwrap_or(1.0) + self.offset.unwrap_or(0.0)
    }
}

/// Complete description of one catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSchema {
    /// Catalog name; also the base name of its storage tables.
    pub name: String,
    pub format: RecordFormat,
    /// How work units map onto files.
    pub units: UnitLayout,
    pub fields: Vec<FieldSpec>,
}

/// RA/Dec role pairs, most precise first.
pub const COORDINATE_TIERS: [(FieldRole, FieldRole); 3] = [
    (FieldRole::RaRad, FieldRole::DecRad),
    (FieldRole::RaDeg, FieldRole::DecDeg),
    (FieldRole::RaSexagesimal, FieldRole::DecSexagesimal),
];

fn invalid(schema: &str, reason: String) -> CatalogError {
    CatalogError::InvalidSchema(format!("{}: {}", schema, reason))
}

impl CatalogSchema {
    pub fn field_with_role(&self, role: &FieldRole) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| &f.role == role)
    }

    /// Check the schema is internally consistent before any record is read.
    pub fn validate(&self) -> CatalogResult<()> {
        let name = self.name.as_str();
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(invalid(name, "catalog name must be [A-Za-z0-9_]+".into()));
        }
        if self.fields.is_empty() {
            return Err(invalid(name, "no fields".into()));
        }

        if let RecordFormat::PackedBinary { layout } = &self.format {
            layout.validate()?;
        }

        let mut names = HashSet::new();
        let mut roles = HashSet::new();
        for field in &self.fields {
            if !names.insert(field.name.as_str()) {
                return Err(invalid(name, format!("duplicate field '{}'", field.name)));
            }
            if field.role != FieldRole::Extra && !roles.insert(&field.role) {
                return Err(invalid(name, format!("role {:?} assigned twice", field.role)));
            }
            self.validate_source(field)?;
            self.validate_kind(field)?;
        }

        if self.field_with_role(&FieldRole::CatalogId).is_none() {
            return Err(invalid(name, "no catalog_id field".into()));
        }

        let complete_tier = COORDINATE_TIERS
            .iter()
            .any(|(ra, dec)| roles.contains(ra) && roles.contains(dec));
        if !complete_tier {
            return Err(invalid(name, "no complete RA/Dec field pair".into()));
        }
        for (ra, dec) in COORDINATE_TIERS.iter() {
            if roles.contains(ra) != roles.contains(dec) {
                return Err(invalid(name, format!("{:?} without {:?}", ra, dec)));
            }
        }

        Ok(())
    }

    fn validate_source(&self, field: &FieldSpec) -> CatalogResult<()> {
        let ok = match (&self.format, &field.source) {
            (RecordFormat::Delimited { .. }, FieldSource::Position(_)) => true,
            (RecordFormat::FixedWidth, FieldSource::Columns(ranges)) => {
                !ranges.is_empty() && ranges.iter().all(|r| r.start < r.end)
            }
            (RecordFormat::PackedBinary { layout }, FieldSource::Packed(packed)) => {
                if layout.field(packed).is_none() {
                    return Err(invalid(
                        &self.name,
                        format!("field '{}' refers to unknown packed field '{}'", field.name, packed),
                    ));
                }
                true
            }
            _ => false,
        };
        if ok {
            Ok(())
        } else {
            Err(invalid(
                &self.name,
                format!(
                    "field '{}' source {:?} does not fit the {} format",
                    field.name,
                    field.source,
                    self.format.family()
                ),
            ))
        }
    }

    fn validate_kind(&self, field: &FieldSpec) -> CatalogResult<()> {
        let expected = match field.role {
            FieldRole::RaRad
            | FieldRole::DecRad
            | FieldRole::RaDeg
            | FieldRole::DecDeg
            | FieldRole::Magnitude(_)
            | FieldRole::PmRa
            | FieldRole::PmDec => Some(ScalarType::Float),
            FieldRole::RaSexagesimal | FieldRole::DecSexagesimal => Some(ScalarType::Text),
            FieldRole::CatalogId | FieldRole::Extra => None,
        };
        if let Some(expected) = expected {
            if field.kind != expected {
                return Err(invalid(
                    &self.name,
                    format!("field '{}' must be {:?} for role {:?}", field.name, expected, field.role),
                ));
            }
        }
        if field.role == FieldRole::CatalogId && !matches!(field.kind, ScalarType::Int | ScalarType::Text) {
            return Err(invalid(&self.name, "catalog_id must be int or text".into()));
        }
        if (field.scale.is_some() || field.offset.is_some()) && field.kind != ScalarType::Float {
            return Err(invalid(
                &self.name,
                format!("field '{}' is scaled but not a float", field.name),
            ));
        }
        Ok(())
    }

    /// Smallest number of delimited fields a record needs.
    pub fn min_positions(&self) -> usize {
        self.fields
            .iter()
            .filter_map(|f| match f.source {
                FieldSource::Position(p) => Some(p + 1),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Shortest fixed-width line that holds every field.
    pub fn min_line_width(&self) -> usize {
        self.fields
            .iter()
            .filter_map(|f| match &f.source {
                FieldSource::Columns(ranges) => ranges.iter().map(|r| r.end).max(),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv_schema(fields: Vec<FieldSpec>) -> CatalogSchema {
        CatalogSchema {
            name: "test".into(),
            format: RecordFormat::Delimited {
                delimiter: ',',
                skip_header: false,
            },
            units: UnitLayout::SingleFile {
                file_name: "test.csv".into(),
            },
            fields,
        }
    }

    fn minimal() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("ra", FieldSource::Position(0), ScalarType::Float, FieldRole::RaDeg),
            FieldSpec::new("dec", FieldSource::Position(1), ScalarType::Float, FieldRole::DecDeg),
            FieldSpec::new("id", FieldSource::Position(2), ScalarType::Text, FieldRole::CatalogId),
        ]
    }

    #[test]
    fn test_minimal_schema_valid() {
        let schema = csv_schema(minimal());
        schema.validate().unwrap();
        assert_eq!(schema.min_positions(), 3);
    }

    #[test]
    fn test_missing_catalog_id() {
        let mut fields = minimal();
        fields.pop();
        assert!(matches!(
            csv_schema(fields).validate(),
            Err(CatalogError::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_half_coordinate_tier() {
        let mut fields = minimal();
        fields.push(FieldSpec::new(
            "ra_rad",
            FieldSource::Position(3),
            ScalarType::Float,
            FieldRole::RaRad,
        ));
        assert!(csv_schema(fields).validate().is_err());
    }

    #[test]
    fn test_source_must_match_format() {
        let mut fields = minimal();
        fields[0].source = FieldSource::Columns(vec![0..4]);
        assert!(csv_schema(fields).validate().is_err());
    }

    #[test]
    fn test_role_kind_mismatch() {
        let mut fields = minimal();
        fields[0].kind = ScalarType::Text;
        assert!(csv_schema(fields).validate().is_err());
    }

    #[test]
    fn test_scale_needs_float() {
        let mut fields = minimal();
        fields.push(
            FieldSpec::new("flag", FieldSource::Position(3), ScalarType::Int, FieldRole::Extra)
                .scaled(2.0, 0.0),
        );
        assert!(csv_schema(fields).validate().is_err());
    }

    #[test]
    fn test_duplicate_names_and_roles() {
        let mut fields = minimal();
        fields.push(FieldSpec::new("ra", FieldSource::Position(4), ScalarType::Int, FieldRole::Extra));
        assert!(csv_schema(fields).validate().is_err());

        let mut fields = minimal();
        fields.push(FieldSpec::new(
            "ra2",
            FieldSource::Position(4),
            ScalarType::Float,
            FieldRole::RaDeg,
        ));
        assert!(csv_schema(fields).validate().is_err());
    }

    #[test]
    fn test_rescale() {
        let field = FieldSpec::new("spd", FieldSource::Packed("spd".into()), ScalarType::Float, FieldRole::DecDeg)
            .scaled(1.0 / 3_600_000.0, -90.0);
        assert_eq!(field.rescale(0.0), -90.0);
        assert_eq!(field.rescale(324_000_000.0), 0.0);
    }

    #[test]
    fn test_schema_yaml_shape() {
        let yaml = r#"
name: mini
format:
  kind: delimited
  delimiter: ","
units:
  kind: single_file
  file_name: mini.csv
fields:
  - name: ra
    source: { position: 0 }
    kind: float
    role: ra_deg
  - name: dec
    source: { position: 1 }
    kind: float
    role: dec_deg
  - name: id
    source: { position: 2 }
    kind: int
    role: catalog_id
  - name: v
    source: { position: 3 }
    kind: float
    role: { magnitude: v }
    sentinels: [ empty, { equals: 99.9 } ]
"#;
        let schema: CatalogSchema = serde_yaml::from_str(yaml).unwrap();
        schema.validate().unwrap();
        assert!(matches!(schema.format, RecordFormat::Delimited { skip_header: false, .. }));
        assert_eq!(schema.fields[3].role, FieldRole::Magnitude("v".into()));
        assert_eq!(schema.fields[3].sentinels.len(), 2);
    }
}
