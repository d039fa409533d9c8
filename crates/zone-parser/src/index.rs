//! Zone index: RA bin to byte offset within a zone file.
//!
//! The on-disk index is text, one `raBin recordOffset` pair per line, with
//! offsets counted in records. Offsets are converted to bytes once here so
//! seeks never multiply.

use std::ops::Range;
use std::path::Path;

use catalog_common::{CatalogError, CatalogResult};
use tracing::debug;

/// RA bins per zone, one per degree.
pub const RA_BINS: usize = 360;

/// One RA bin's starting position in its zone file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneIndexEntry {
    pub ra_bin: u16,
    pub byte_offset: u64,
}

/// Loaded index for a single zone. Read-only after load.
#[derive(Debug, Clone)]
pub struct ZoneIndex {
    entries: Vec<ZoneIndexEntry>,
}

impl ZoneIndex {
    /// Parse index text for records of `record_width` bytes.
    ///
    /// Lines with a bin of 360 or more are ignored. Every bin in `0..360`
    /// must appear, and offsets must not decrease with the bin number;
    /// otherwise the index is reported as unavailable.
    pub fn parse(text: &str, record_width: usize) -> CatalogResult<Self> {
        let mut offsets: Vec<Option<u64>> = vec![None; RA_BINS];

        for (line_no, line) in text.lines().enumerate() {
            let mut parts = line.split_whitespace();
            let (bin, offset) = match (parts.next(), parts.next()) {
                (None, _) => continue,
                (Some(bin), Some(offset)) => (bin, offset),
                (Some(_), None) => {
                    return Err(CatalogError::IndexUnavailable(format!(
                        "line {} has no offset",
                        line_no + 1
                    )))
                }
            };

            let bin: u64 = bin.parse().map_err(|_| {
                CatalogError::IndexUnavailable(format!("line {}: bad bin '{}'", line_no + 1, bin))
            })?;
            let offset: u64 = offset.parse().map_err(|_| {
                CatalogError::IndexUnavailable(format!(
                    "line {}: bad offset '{}'",
                    line_no + 1,
                    offset
                ))
            })?;

            if bin >= RA_BINS as u64 {
                continue;
            }
            offsets[bin as usize] = Some(offset * record_width as u64);
        }

        let mut entries = Vec::with_capacity(RA_BINS);
        let mut previous = 0u64;
        for (bin, offset) in offsets.into_iter().enumerate() {
            let byte_offset = offset.ok_or_else(|| {
                CatalogError::IndexUnavailable(format!("index is short, bin {} missing", bin))
            })?;
            if byte_offset < previous {
                return Err(CatalogError::IndexUnavailable(format!(
                    "offset for bin {} decreases",
                    bin
                )));
            }
            previous = byte_offset;
            entries.push(ZoneIndexEntry {
                ra_bin: bin as u16,
                byte_offset,
            });
        }

        Ok(Self { entries })
    }

    /// Read and parse an index file. A missing or unreadable file is
    /// `IndexUnavailable`, never an I/O error.
    pub fn load(path: &Path, record_width: usize) -> CatalogResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CatalogError::IndexUnavailable(format!("{}: {}", path.display(), e))
        })?;
        let index = Self::parse(&text, record_width)?;
        debug!(path = %path.display(), "Loaded zone index");
        Ok(index)
    }

    pub fn entries(&self) -> &[ZoneIndexEntry] {
        &self.entries
    }

    /// Byte offset at which `ra_bin` starts.
    pub fn seek_offset(&self, ra_bin: i64) -> CatalogResult<u64> {
        if !(0..RA_BINS as i64).contains(&ra_bin) {
            return Err(CatalogError::InvalidBin(ra_bin));
        }
        Ok(self.entries[ra_bin as usize].byte_offset)
    }

    /// Byte span covering bins `first..=last`.
    ///
    /// The span ends where the next bin starts, or at `file_len` for the
    /// final bin.
    pub fn bin_range(&self, first: i64, last: i64, file_len: u64) -> CatalogResult<Range<u64>> {
        let start = self.seek_offset(first)?;
        self.seek_offset(last)?;
        if last < first {
            return Err(CatalogError::InvalidBin(last));
        }
        let end = if last + 1 < RA_BINS as i64 {
            self.seek_offset(last + 1)?
        } else {
            file_len
        };
        Ok(start..end.min(file_len).max(start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_index(per_bin: u64) -> String {
        (0..360u64)
            .map(|bin| format!("{} {}\n", bin, bin * per_bin))
            .collect()
    }

    #[test]
    fn test_offsets_converted_to_bytes() {
        let index = ZoneIndex::parse(&uniform_index(3), 78).unwrap();
        assert_eq!(index.entries().len(), 360);
        assert_eq!(index.seek_offset(0).unwrap(), 0);
        assert_eq!(index.seek_offset(1).unwrap(), 3 * 78);
        assert_eq!(index.seek_offset(359).unwrap(), 359 * 3 * 78);
    }

    #[test]
    fn test_invalid_bins() {
        let index = ZoneIndex::parse(&uniform_index(1), 78).unwrap();
        assert!(matches!(index.seek_offset(-1), Err(CatalogError::InvalidBin(-1))));
        assert!(matches!(index.seek_offset(360), Err(CatalogError::InvalidBin(360))));
    }

    #[test]
    fn test_bins_past_359_ignored() {
        let mut text = uniform_index(2);
        text.push_str("360 9999\n361 10000\n");
        let index = ZoneIndex::parse(&text, 10).unwrap();
        assert_eq!(index.seek_offset(359).unwrap(), 359 * 2 * 10);
    }

    #[test]
    fn test_short_index_unavailable() {
        let text: String = (0..200).map(|b| format!("{} {}\n", b, b)).collect();
        assert!(matches!(
            ZoneIndex::parse(&text, 78),
            Err(CatalogError::IndexUnavailable(_))
        ));
        assert!(matches!(
            ZoneIndex::parse("", 78),
            Err(CatalogError::IndexUnavailable(_))
        ));
    }

    #[test]
    fn test_garbage_unavailable() {
        let mut text = uniform_index(1);
        text.push_str("12 abc\n");
        assert!(matches!(
            ZoneIndex::parse(&text, 78),
            Err(CatalogError::IndexUnavailable(_))
        ));
    }

    #[test]
    fn test_decreasing_offsets_unavailable() {
        let mut text = uniform_index(5);
        text.push_str("100 0\n");
        assert!(matches!(
            ZoneIndex::parse(&text, 78),
            Err(CatalogError::IndexUnavailable(_))
        ));
    }

    #[test]
    fn test_missing_file_unavailable() {
        let result = ZoneIndex::load(Path::new("/nonexistent/u4i/z001.idx"), 78);
        assert!(matches!(result, Err(CatalogError::IndexUnavailable(_))));
    }

    #[test]
    fn test_bin_range() {
        let index = ZoneIndex::parse(&uniform_index(2), 78).unwrap();
        let file_len = 360 * 2 * 78;
        assert_eq!(index.bin_range(10, 10, file_len).unwrap(), 1560..1716);
        assert_eq!(index.bin_range(10, 12, file_len).unwrap(), 1560..2028);
        assert_eq!(
            index.bin_range(359, 359, file_len).unwrap(),
            359 * 156..file_len
        );
        assert!(matches!(
            index.bin_range(12, 10, file_len),
            Err(CatalogError::InvalidBin(10))
        ));
    }
}
