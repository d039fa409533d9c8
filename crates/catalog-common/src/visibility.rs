//! Destination partition by declination.

use serde::{Deserialize, Serialize};

use crate::record::StarRecord;

/// Southern limit of the observing site, in degrees of declination.
///
/// Shared by every catalog. A star exactly on the limit stays primary.
pub const NOT_VISIBLE_DEC_LIMIT: f64 = -70.0;

/// Where a record is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    Primary,
    NotVisible,
}

impl Partition {
    /// Classify a declination.
    pub fn for_declination(dec_deg: f64) -> Self {
        if dec_deg < NOT_VISIBLE_DEC_LIMIT {
            Partition::NotVisible
        } else {
            Partition::Primary
        }
    }

    /// Table name suffix for this partition.
    pub fn table_suffix(&self) -> &'static str {
        match self {
            Partition::Primary => "",
            Partition::NotVisible => "_not_visible",
        }
    }
}

/// Choose the partition for a normalized record.
pub fn route(record: &StarRecord) -> Partition {
    Partition::for_declination(record.dec_deg)
}
