//! Record decoders.
//!
//! One decoder per format family turns a raw record into an ordered set of
//! named raw values. Decoders do no null handling and no unit conversion;
//! see [`crate::normalize`] for that.

mod delimited;
mod fixed_width;
mod packed;

pub use delimited::DelimitedDecoder;
pub use fixed_width::FixedWidthDecoder;
pub use packed::PackedDecoder;

use catalog_common::{CatalogResult, RawValue};

use crate::schema::{CatalogSchema, RecordFormat};

/// Named raw values of one record, in schema order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFieldSet {
    fields: Vec<(String, RawValue)>,
}

impl RawFieldSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: RawValue) {
        self.fields.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Turns one raw record into a [`RawFieldSet`].
pub trait RecordDecoder {
    /// The raw record type this decoder reads.
    type Raw: ?Sized;

    fn decode(&self, raw: &Self::Raw) -> CatalogResult<RawFieldSet>;
}

/// The decoder matching a schema's record format.
#[derive(Debug, Clone)]
pub enum Decoder {
    Delimited(DelimitedDecoder),
    FixedWidth(FixedWidthDecoder),
    Packed(PackedDecoder),
}

impl Decoder {
    /// Build the decoder for a validated schema.
    pub fn for_schema(schema: &CatalogSchema) -> CatalogResult<Self> {
        Ok(match &schema.format {
            RecordFormat::Delimited {
                delimiter,
                skip_header,
            } => Decoder::Delimited(DelimitedDecoder::new(schema, *delimiter)?.skip_header(*skip_header)),
            RecordFormat::FixedWidth => Decoder::FixedWidth(FixedWidthDecoder::new(schema)?),
            RecordFormat::PackedBinary { layout } => Decoder::Packed(PackedDecoder::new(schema, layout)?),
        })
    }
}
