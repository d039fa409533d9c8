//! Sequential fixed-width record reader over a seekable source.

use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::ops::Range;

use catalog_common::{CatalogError, CatalogResult};

/// Iterates over fixed-width records, either through a whole file or a
/// byte span of it located with a [`ZoneIndex`](crate::ZoneIndex).
///
/// A trailing partial record yields one `TruncatedRecord` error, after
/// which iteration ends.
pub struct ZoneReader<R> {
    inner: R,
    record_width: usize,
    /// Bytes left to read, when limited to a span.
    remaining: Option<u64>,
    done: bool,
}

impl<R: Read + Seek> ZoneReader<R> {
    /// Read every record from the start of `inner`.
    pub fn new(mut inner: R, record_width: usize) -> CatalogResult<Self> {
        inner.seek(SeekFrom::Start(0))?;
        Ok(Self {
            inner,
            record_width,
            remaining: None,
            done: false,
        })
    }

    /// Read only the records within `span`.
    pub fn with_range(mut inner: R, record_width: usize, span: Range<u64>) -> CatalogResult<Self> {
        inner.seek(SeekFrom::Start(span.start))?;
        Ok(Self {
            inner,
            record_width,
            remaining: Some(span.end.saturating_sub(span.start)),
            done: false,
        })
    }

    /// Fill `buf` as far as the source allows, returning the bytes read.
    fn read_full(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

impl<R: Read + Seek> Iterator for ZoneReader<R> {
    type Item = CatalogResult<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let want = match self.remaining {
            Some(0) => {
                self.done = true;
                return None;
            }
            Some(left) => (left as usize).min(self.record_width),
            None => self.record_width,
        };

        let mut buf = vec![0u8; want];
        let got = match self.read_full(&mut buf) {
            Ok(n) => n,
            Err(e) => {
                self.done = true;
                return Some(Err(CatalogError::Io(e)));
            }
        };
        if let Some(left) = self.remaining.as_mut() {
            *left -= got as u64;
        }

        if got == 0 {
            self.done = true;
            return None;
        }
        if got < self.record_width {
            self.done = true;
            return Some(Err(CatalogError::TruncatedRecord {
                expected: self.record_width,
                actual: got,
            }));
        }
        Some(Ok(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn records(n: u8, width: usize) -> Vec<u8> {
        (0..n).flat_map(|i| vec![i; width]).collect()
    }

    #[test]
    fn test_full_scan() {
        let reader = ZoneReader::new(Cursor::new(records(5, 4)), 4).unwrap();
        let out: Vec<_> = reader.map(|r| r.unwrap()[0]).collect();
        assert_eq!(out, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_range_scan() {
        let reader = ZoneReader::with_range(Cursor::new(records(5, 4)), 4, 4..12).unwrap();
        let out: Vec<_> = reader.map(|r| r.unwrap()[0]).collect();
        assert_eq!(out, vec![1, 2]);
    }

    #[test]
    fn test_empty_range() {
        let mut reader = ZoneReader::with_range(Cursor::new(records(5, 4)), 4, 8..8).unwrap();
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_trailing_partial_record() {
        let mut data = records(2, 4);
        data.extend_from_slice(&[9, 9]);
        let results: Vec<_> = ZoneReader::new(Cursor::new(data), 4).unwrap().collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert!(matches!(
            results[2],
            Err(CatalogError::TruncatedRecord {
                expected: 4,
                actual: 2
            })
        ));
    }
}
