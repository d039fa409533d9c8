//! Fixed-width text records, fields addressed by byte ranges.

use catalog_common::{CatalogError, CatalogResult, RawValue};
use std::ops::Range;

use super::{RawFieldSet, RecordDecoder};
use crate::schema::{CatalogSchema, FieldSource};

#[derive(Debug, Clone)]
pub struct FixedWidthDecoder {
    columns: Vec<(String, Vec<Range<usize>>)>,
    min_width: usize,
}

impl FixedWidthDecoder {
    pub fn new(schema: &CatalogSchema) -> CatalogResult<Self> {
        let columns = schema
            .fields
            .iter()
            .map(|f| match &f.source {
                FieldSource::Columns(ranges) => Ok((f.name.clone(), ranges.clone())),
                _ => Err(CatalogError::InvalidSchema(format!(
                    "{}: field '{}' has no column range",
                    schema.name, f.name
                ))),
            })
            .collect::<CatalogResult<Vec<_>>>()?;
        Ok(Self {
            columns,
            min_width: schema.min_line_width(),
        })
    }
}

fn slice<'a>(line: &'a str, range: &Range<usize>) -> CatalogResult<&'a str> {
    line.get(range.clone()).ok_or_else(|| {
        CatalogError::field_parse(
            format!("columns {}..{}", range.start, range.end),
            "range splits a multi-byte character",
        )
    })
}

impl RecordDecoder for FixedWidthDecoder {
    type Raw = str;

    fn decode(&self, line: &str) -> CatalogResult<RawFieldSet> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.len() < self.min_width {
            return Err(CatalogError::TruncatedRecord {
                expected: self.min_width,
                actual: line.len(),
            });
        }
        let mut out = RawFieldSet::with_capacity(self.columns.len());
        for (name, ranges) in &self.columns {
            let value = if ranges.len() == 1 {
                slice(line, &ranges[0])?.to_string()
            } else {
                // sexagesimal components live in separate columns
                let parts = ranges
                    .iter()
                    .map(|r| slice(line, r).map(str::trim))
                    .collect::<CatalogResult<Vec<_>>>()?;
                if parts.iter().all(|p| p.is_empty()) {
                    String::new()
                } else {
                    parts.join(":")
                }
            };
            out.push(name.as_str(), RawValue::Text(value));
        }
        Ok(out)
    }
}
