//! Packed binary zone catalogs.
//!
//! Zone files hold fixed-width little-endian records for one declination
//! band, sorted by right ascension. An optional text index maps each
//! one-degree RA bin to its first record so partial reads can seek
//! directly to a sub-range.

pub mod index;
pub mod layout;
pub mod reader;
pub mod ucac4;

pub use index::{ZoneIndex, ZoneIndexEntry, RA_BINS};
pub use layout::{PackedField, PackedLayout};
pub use reader::ZoneReader;
