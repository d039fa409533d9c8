//! Packed record layouts.
//!
//! A layout lists every integer field of a fixed-size binary record by byte
//! offset, width and signedness. Misaligned offsets decode to plausible
//! garbage rather than failing, so a layout is a versioned constant that is
//! validated when it is built and tested field by field.

use serde::{Deserialize, Serialize};

use catalog_common::{CatalogError, CatalogResult};

/// One little-endian integer inside a packed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedField {
    pub name: String,
    /// Byte offset from the start of the record.
    pub offset: usize,
    /// 1, 2 or 4 bytes.
    pub width: usize,
    pub signed: bool,
}

impl PackedField {
    pub fn new(name: impl Into<String>, offset: usize, width: usize, signed: bool) -> Self {
        Self {
            name: name.into(),
            offset,
            width,
            signed,
        }
    }

    /// Byte range occupied by this field.
    pub fn span(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.width
    }

    /// Read this field from a record, sign-extending where declared.
    pub fn read(&self, record: &[u8]) -> CatalogResult<i64> {
        let bytes = record
            .get(self.span())
            .ok_or(CatalogError::TruncatedRecord {
                expected: self.offset + self.width,
                actual: record.len(),
            })?;

        let value = match (bytes, self.signed) {
            ([b], false) => *b as i64,
            ([b], true) => *b as i8 as i64,
            ([b0, b1], false) => u16::from_le_bytes([*b0, *b1]) as i64,
            ([b0, b1], true) => i16::from_le_bytes([*b0, *b1]) as i64,
            ([b0, b1, b2, b3], false) => u32::from_le_bytes([*b0, *b1, *b2, *b3]) as i64,
            ([b0, b1, b2, b3], true) => i32::from_le_bytes([*b0, *b1, *b2, *b3]) as i64,
            _ => {
                return Err(CatalogError::InvalidSchema(format!(
                    "field '{}' has unsupported width {}",
                    self.name, self.width
                )))
            }
        };
        Ok(value)
    }
}

/// Byte layout of one packed record format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedLayout {
    /// Format identifier, e.g. `ucac4`.
    pub version: String,
    pub record_width: usize,
    pub fields: Vec<PackedField>,
}

impl PackedLayout {
    /// Build a layout, rejecting it if it is not self-consistent.
    pub fn new(
        version: impl Into<String>,
        record_width: usize,
        fields: Vec<PackedField>,
    ) -> CatalogResult<Self> {
        let layout = Self {
            version: version.into(),
            record_width,
            fields,
        };
        layout.validate()?;
        Ok(layout)
    }

    /// Check widths, bounds, overlaps and name uniqueness.
    pub fn validate(&self) -> CatalogResult<()> {
        if self.record_width == 0 {
            return Err(CatalogError::InvalidSchema(format!(
                "layout '{}' has zero record width",
                self.version
            )));
        }

        let mut sorted: Vec<&PackedField> = self.fields.iter().collect();
        sorted.sort_by_key(|f| f.offset);

        let mut end_of_previous = 0usize;
        let mut previous_name = "";
        for field in sorted {
            if !matches!(field.width, 1 | 2 | 4) {
                return Err(CatalogError::InvalidSchema(format!(
                    "field '{}' has width {} (expected 1, 2 or 4)",
                    field.name, field.width
                )));
            }
            if field.offset + field.width > self.record_width {
                return Err(CatalogError::InvalidSchema(format!(
                    "field '{}' at {}..{} exceeds record width {}",
                    field.name,
                    field.offset,
                    field.offset + field.width,
                    self.record_width
                )));
            }
            if field.offset < end_of_previous {
                return Err(CatalogError::InvalidSchema(format!(
                    "field '{}' overlaps '{}'",
                    field.name, previous_name
                )));
            }
            end_of_previous = field.offset + field.width;
            previous_name = &field.name;
        }

        for (i, field) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(CatalogError::InvalidSchema(format!(
                    "duplicate field name '{}'",
                    field.name
                )));
            }
        }

        Ok(())
    }

    pub fn field(&self, name: &str) -> Option<&PackedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether the fields cover every byte of the record with no gaps.
    pub fn is_contiguous(&self) -> bool {
        let mut spans: Vec<_> = self.fields.iter().map(PackedField::span).collect();
        spans.sort_by_key(|s| s.start);
        let mut cursor = 0;
        for span in spans {
            if span.start != cursor {
                return false;
            }
            cursor = span.end;
        }
        cursor == self.record_width
    }

    /// Decode one record into `(name, value)` pairs in layout order.
    pub fn decode(&self, record: &[u8]) -> CatalogResult<Vec<(String, i64)>> {
        if record.len() < self.record_width {
            return Err(CatalogError::TruncatedRecord {
                expected: self.record_width,
                actual: record.len(),
            });
        }
        self.fields
            .iter()
            .map(|f| Ok((f.name.clone(), f.read(record)?)))
            .collect()
    }
}
