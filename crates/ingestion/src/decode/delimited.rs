//! Delimited text records, fields addressed by position.

use csv::StringRecord;

use catalog_common::{CatalogError, CatalogResult, RawValue};

use super::{RawFieldSet, RecordDecoder};
use crate::schema::{CatalogSchema, FieldSource};

#[derive(Debug, Clone)]
pub struct DelimitedDecoder {
    delimiter: u8,
    /// (field name, column)
    columns: Vec<(String, usize)>,
    min_fields: usize,
    skip_header: bool,
}

impl DelimitedDecoder {
    pub fn new(schema: &CatalogSchema, delimiter: char) -> CatalogResult<Self> {
        if !delimiter.is_ascii() {
            return Err(CatalogError::InvalidSchema(format!(
                "{}: delimiter {:?} is not a single byte",
                schema.name, delimiter
            )));
        }
        let columns = schema
            .fields
            .iter()
            .map(|f| match f.source {
                FieldSource::Position(p) => Ok((f.name.clone(), p)),
                _ => Err(CatalogError::InvalidSchema(format!(
                    "{}: field '{}' has no position",
                    schema.name, f.name
                ))),
            })
            .collect::<CatalogResult<Vec<_>>>()?;
        Ok(Self {
            delimiter: delimiter as u8,
            columns,
            min_fields: schema.min_positions(),
            skip_header: false,
        })
    }

    /// Treat the first row of each file as a header.
    pub fn skip_header(mut self, skip: bool) -> Self {
        self.skip_header = skip;
        self
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Rows before the first record of a file.
    pub fn header_rows(&self) -> u64 {
        u64::from(self.skip_header)
    }

    /// A reader configured for this catalog: the header row consumed when
    /// the catalog has one, records of any length (short ones are rejected
    /// per record by [`decode`](Self::decode)).
    pub fn reader_builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .delimiter(self.delimiter)
            .has_headers(self.skip_header)
            .flexible(true);
        builder
    }
}

impl RecordDecoder for DelimitedDecoder {
    type Raw = StringRecord;

    fn decode(&self, raw: &StringRecord) -> CatalogResult<RawFieldSet> {
        if raw.len() < self.min_fields {
            return Err(CatalogError::TruncatedRecord {
                expected: self.min_fields,
                actual: raw.len(),
            });
        }
        let mut out = RawFieldSet::with_capacity(self.columns.len());
        for (name, column) in &self.columns {
            // bounds checked against min_fields above
            let value = raw.get(*column).unwrap_or_default();
            out.push(name.as_str(), RawValue::text(value));
        }
        Ok(out)
    }
}
