//! Command-line work selection.
//!
//! Unit specs:
//!   zone:12            zone 12
//!   zone:12:100-110    zone 12, RA bins 100..=110
//!   region:7/3/42      dec band 7, sub-band 3, RA band 42
//!   file:path          one file
//!   dir:path           every file in a directory
//!
//! Only the syntax is checked here. A zone or region outside its grid is
//! reported as a failed unit when the run reaches it.

use anyhow::{anyhow, bail, Context, Result};
use std::ops::RangeInclusive;
use std::path::PathBuf;

use ingestion::WorkUnit;

/// One-degree RA bins per zone.
const RA_BINS: u16 = 360;

/// Parse one `--unit` argument.
pub fn parse_unit(spec: &str) -> Result<WorkUnit> {
    let (kind, rest) = spec
        .split_once(':')
        .ok_or_else(|| anyhow!("unit '{}' must look like kind:value", spec))?;

    let unit = match kind {
        "zone" => {
            let (zone, bins) = match rest.split_once(':') {
                Some((zone, bins)) => (zone, Some(parse_bins(bins)?)),
                None => (rest, None),
            };
            WorkUnit::Zone {
                zone: zone.parse().with_context(|| format!("bad zone number '{}'", zone))?,
                ra_bins: bins,
            }
        }
        "region" => {
            let parts: Vec<&str> = rest.split('/').collect();
            let [dec, sub, ra] = parts.as_slice() else {
                bail!("region '{}' must look like dec/sub/ra", rest);
            };
            WorkUnit::region(
                dec.parse().with_context(|| format!("bad dec band '{}'", dec))?,
                sub.parse().with_context(|| format!("bad dec sub-band '{}'", sub))?,
                ra.parse().with_context(|| format!("bad RA band '{}'", ra))?,
            )
        }
        "file" => WorkUnit::File {
            path: PathBuf::from(rest),
        },
        "dir" => WorkUnit::Directory {
            path: PathBuf::from(rest),
        },
        other => bail!("unknown unit kind '{}' (zone, region, file, dir)", other),
    };

    Ok(unit)
}

/// Parse `first-last` RA bins.
pub fn parse_bins(spec: &str) -> Result<RangeInclusive<u16>> {
    let (first, last) = spec
        .split_once('-')
        .ok_or_else(|| anyhow!("RA bins '{}' must look like first-last", spec))?;
    let first: u16 = first.trim().parse().with_context(|| format!("bad RA bin '{}'", first))?;
    let last: u16 = last.trim().parse().with_context(|| format!("bad RA bin '{}'", last))?;
    if first > last {
        bail!("RA bins {}-{} are reversed", first, last);
    }
    if last >= RA_BINS {
        bail!("RA bin {} outside 0-{}", last, RA_BINS - 1);
    }
    Ok(first..=last)
}

/// Parse a `start,end` unit range.
pub fn parse_range(spec: &str) -> Result<(u16, u16)> {
    let (start, end) = spec
        .split_once(',')
        .ok_or_else(|| anyhow!("range '{}' must look like start,end", spec))?;
    let start = start.trim().parse().with_context(|| format!("bad range start '{}'", start))?;
    let end = end.trim().parse().with_context(|| format!("bad range end '{}'", end))?;
    Ok((start, end))
}

/// Apply RA bins to zone units that don't already carry their own.
pub fn with_ra_bins(units: Vec<WorkUnit>, bins: &RangeInclusive<u16>) -> Vec<WorkUnit> {
    units
        .into_iter()
        .map(|unit| match unit {
            WorkUnit::Zone { zone, ra_bins: None } => WorkUnit::Zone {
                zone,
                ra_bins: Some(bins.clone()),
            },
            other => other,
        })
        .collect()
}
