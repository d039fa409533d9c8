//! Blocking record production for one work unit.
//!
//! Runs on a blocking thread: opens the unit's files, decodes and
//! normalizes each record in file order and hands the outcome to the
//! async side over a bounded channel.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use catalog_common::{CatalogError, CatalogResult, StarRecord};
use zone_parser::{ZoneIndex, ZoneReader};

use crate::decode::{Decoder, DelimitedDecoder, FixedWidthDecoder, PackedDecoder, RecordDecoder};
use crate::normalize::build_record;
use crate::schema::CatalogSchema;
use crate::units::{directory_files, UnitPaths, WorkUnit};

/// Outcome for one raw record.
#[derive(Debug)]
pub enum Decoded {
    Record(StarRecord),
    /// Could not be decoded or normalized. `index` is the record's 1-based
    /// position in its file.
    Failed { index: u64, error: CatalogError },
    /// Outside the requested RA bins.
    Skipped,
    /// A file of a directory unit that could not be read to the end. The
    /// directory's other files are still read.
    FileFailed { path: PathBuf, error: CatalogError },
}

/// Everything a blocking reader needs, detached from the ingester.
pub struct UnitReader {
    pub schema: Arc<CatalogSchema>,
    pub decoder: Arc<Decoder>,
    pub tx: mpsc::Sender<Decoded>,
}

/// Whether the receiver is still listening.
type Flow = bool;

fn open(path: &Path) -> CatalogResult<File> {
    File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CatalogError::UnitNotFound(path.display().to_string()),
        _ => CatalogError::Io(e),
    })
}

impl UnitReader {
    fn emit(&self, item: Decoded) -> Flow {
        self.tx.blocking_send(item).is_ok()
    }

    fn emit_record(&self, index: u64, result: CatalogResult<StarRecord>, bins: Option<&RangeInclusive<u16>>) -> Flow {
        let item = match result {
            Ok(record) => match bins {
                Some(bins) if !bins.contains(&(record.ra_deg.floor() as u16)) => Decoded::Skipped,
                _ => Decoded::Record(record),
            },
            Err(error) => Decoded::Failed { index, error },
        };
        self.emit(item)
    }

    /// Read a whole unit. Returns once every record has been handed over,
    /// the receiver has gone away, or the unit cannot be read further.
    pub fn run(self, unit: &WorkUnit, paths: &UnitPaths) -> CatalogResult<()> {
        match unit {
            WorkUnit::Directory { .. } => {
                for file in directory_files(&paths.data)? {
                    debug!(file = ?file, "Reading directory entry");
                    let flow = match self.read_file(&file) {
                        Ok(flow) => flow,
                        Err(error) => self.emit(Decoded::FileFailed { path: file, error }),
                    };
                    if !flow {
                        break;
                    }
                }
                Ok(())
            }
            WorkUnit::Zone { ra_bins, .. } => {
                self.read_zone(paths, ra_bins.as_ref())?;
                Ok(())
            }
            _ => {
                self.read_file(&paths.data)?;
                Ok(())
            }
        }
    }

    fn read_file(&self, path: &Path) -> CatalogResult<Flow> {
        match self.decoder.as_ref() {
            Decoder::Delimited(d) => self.read_delimited(d, path),
            Decoder::FixedWidth(d) => self.read_fixed_width(d, path),
            Decoder::Packed(d) => {
                let reader = ZoneReader::new(open(path)?, d.record_width())?;
                self.read_packed(d, reader, None)
            }
        }
    }

    fn read_delimited(&self, decoder: &DelimitedDecoder, path: &Path) -> CatalogResult<Flow> {
        let mut reader = decoder.reader_builder().from_reader(open(path)?);
        for (i, row) in reader.records().enumerate() {
            let index = i as u64 + 1 + decoder.header_rows();
            let result = match row {
                Ok(row) => decoder.decode(&row).and_then(|raw| build_record(&self.schema, &raw)),
                Err(e) if e.is_io_error() => {
                    return Err(CatalogError::Io(std::io::Error::other(e.to_string())))
                }
                Err(e) => Err(CatalogError::field_parse("record", e.to_string())),
            };
            if !self.emit_record(index, result, None) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn read_fixed_width(&self, decoder: &FixedWidthDecoder, path: &Path) -> CatalogResult<Flow> {
        let reader = BufReader::new(open(path)?);
        for (i, line) in reader.split(b'\n').enumerate() {
            let line = line?;
            let index = i as u64 + 1;
            if line.iter().all(|b| b.is_ascii_whitespace()) {
                continue;
            }
            let result = String::from_utf8(line)
                .map_err(|e| CatalogError::field_parse("record", e.to_string()))
                .and_then(|line| decoder.decode(&line))
                .and_then(|raw| build_record(&self.schema, &raw));
            if !self.emit_record(index, result, None) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Read a zone, seeking to the requested bins when the index allows.
    fn read_zone(&self, paths: &UnitPaths, ra_bins: Option<&RangeInclusive<u16>>) -> CatalogResult<Flow> {
        let Decoder::Packed(decoder) = self.decoder.as_ref() else {
            return Err(CatalogError::InvalidSchema(format!(
                "{}: zone units need a packed binary format",
                self.schema.name
            )));
        };
        let width = decoder.record_width();
        let file = open(&paths.data)?;

        let Some(bins) = ra_bins else {
            return self.read_packed(decoder, ZoneReader::new(file, width)?, None);
        };

        let index = match &paths.index {
            Some(index_path) => ZoneIndex::load(index_path, width),
            None => Err(CatalogError::IndexUnavailable("no index path".into())),
        };
        match index {
            Ok(index) => {
                let file_len = file.metadata()?.len();
                let span = index.bin_range(*bins.start() as i64, *bins.end() as i64, file_len)?;
                debug!(start = span.start, end = span.end, "Seeking to RA bins");
                self.read_packed(decoder, ZoneReader::with_range(file, width, span)?, None)
            }
            Err(CatalogError::IndexUnavailable(reason)) => {
                warn!(reason = %reason, "Zone index unavailable, scanning whole zone");
                self.read_packed(decoder, ZoneReader::new(file, width)?, Some(bins))
            }
            Err(e) => Err(e),
        }
    }

    fn read_packed(
        &self,
        decoder: &PackedDecoder,
        reader: ZoneReader<File>,
        filter: Option<&RangeInclusive<u16>>,
    ) -> CatalogResult<Flow> {
        for (i, block) in reader.enumerate() {
            let index = i as u64 + 1;
            let result = match block {
                Ok(block) => decoder.decode(&block).and_then(|raw| build_record(&self.schema, &raw)),
                Err(e @ CatalogError::TruncatedRecord { .. }) => Err(e),
                Err(e) => return Err(e),
            };
            if !self.emit_record(index, result, filter) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
