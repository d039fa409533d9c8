//! Packed binary records.

use catalog_common::{CatalogError, CatalogResult, RawValue};
use zone_parser::{PackedField, PackedLayout};

use super::{RawFieldSet, RecordDecoder};
use crate::schema::{CatalogSchema, FieldSource};

#[derive(Debug, Clone)]
pub struct PackedDecoder {
    record_width: usize,
    /// (schema field name, packed field)
    fields: Vec<(String, PackedField)>,
}

impl PackedDecoder {
    pub fn new(schema: &CatalogSchema, layout: &PackedLayout) -> CatalogResult<Self> {
        layout.validate()?;
        let fields = schema
            .fields
            .iter()
            .map(|f| match &f.source {
                FieldSource::Packed(name) => layout
                    .field(name)
                    .cloned()
                    .map(|packed| (f.name.clone(), packed))
                    .ok_or_else(|| {
                        CatalogError::InvalidSchema(format!(
                            "{}: no packed field '{}' in layout {}",
                            schema.name, name, layout.version
                        ))
                    }),
                _ => Err(CatalogError::InvalidSchema(format!(
                    "{}: field '{}' is not a packed field",
                    schema.name, f.name
                ))),
            })
            .collect::<CatalogResult<Vec<_>>>()?;
        Ok(Self {
            record_width: layout.record_width,
            fields,
        })
    }

    pub fn record_width(&self) -> usize {
        self.record_width
    }
}

impl RecordDecoder for PackedDecoder {
    type Raw = [u8];

    fn decode(&self, record: &[u8]) -> CatalogResult<RawFieldSet> {
        if record.len() < self.record_width {
            return Err(CatalogError::TruncatedRecord {
                expected: self.record_width,
                actual: record.len(),
            });
        }
        let mut out = RawFieldSet::with_capacity(self.fields.len());
        for (name, packed) in &self.fields {
            out.push(name.as_str(), RawValue::Int(packed.read(record)?));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogs;
    use test_utils::Ucac4Star;

    fn decoder() -> PackedDecoder {
        let schema = catalogs::ucac4();
        match &schema.format {
            crate::schema::RecordFormat::PackedBinary { layout } => {
                PackedDecoder::new(&schema, layout).unwrap()
            }
            _ => panic!("ucac4 is packed"),
        }
    }

    #[test]
    fn test_decode_raw_integers() {
        let star = Ucac4Star {
            pmrac: -1234,
            pmdc: 567,
            ..Ucac4Star::at(123_456_789, 45.25, -30.5)
        };
        let fields = decoder().decode(&star.to_bytes()).unwrap();

        assert_eq!(fields.get("rnm"), Some(&RawValue::Int(123_456_789)));
        assert_eq!(fields.get("ra"), Some(&RawValue::Int(star.ra_mas as i64)));
        assert_eq!(fields.get("dec"), Some(&RawValue::Int(star.spd_mas as i64)));
        assert_eq!(fields.get("pm_ra"), Some(&RawValue::Int(-1234)));
        assert_eq!(fields.get("pm_dec"), Some(&RawValue::Int(567)));
        assert_eq!(fields.get("apase_v"), Some(&RawValue::Int(99)));
    }

    #[test]
    fn test_short_block_truncated() {
        let bytes = Ucac4Star::at(1, 0.0, 0.0).to_bytes();
        assert!(matches!(
            decoder().decode(&bytes[..70]),
            Err(CatalogError::TruncatedRecord {
                expected: 78,
                actual: 70
            })
        ));
    }
}
