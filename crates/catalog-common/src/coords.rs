//! Coordinate conversions between radians, decimal degrees and sexagesimal.
//!
//! Sexagesimal output truncates (never rounds) at every unit boundary, the
//! convention the source catalogs use. Downstream consumers compare against
//! those strings, so the systematic truncation bias is part of the contract:
//! `13.9999999` degrees formats as ` 13:59:59.999`, not ` 14:00:00.000`.

use std::f64::consts::PI;

use crate::error::{CatalogError, CatalogResult};

/// Which sky coordinate an angle represents.
///
/// Right ascension is formatted in hours (`HH:MM:SS.mmm`, never signed);
/// declination in degrees (`±DD:MM:SS.mmm`, with a space for non-negative).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    RightAscension,
    Declination,
}

/// Convert decimal degrees to radians.
#[inline]
pub fn deg_to_rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

/// Convert radians to decimal degrees.
#[inline]
pub fn rad_to_deg(rad: f64) -> f64 {
    rad * 180.0 / PI
}

/// Split a non-negative value into whole units, minutes, seconds and
/// milliseconds, truncating at each step.
fn split_truncated(value: f64) -> (u64, u64, u64, u64) {
    let whole = value.trunc();
    let rest = (value - whole) * 60.0;
    let minutes = rest.trunc();
    let rest = (rest - minutes) * 60.0;
    let seconds = rest.trunc();
    let millis = ((rest - seconds) * 1000.0).trunc();
    (whole as u64, minutes as u64, seconds as u64, millis as u64)
}

/// Format decimal degrees as a sexagesimal string.
///
/// Right ascension is rescaled to hours (`deg / 360 * 24`) first. The
/// exact expression matters: truncation exposes the last-bit differences
/// between equivalent formulas.
/// Declination keeps its sign; non-negative values get a leading space.
pub fn deg_to_sexagesimal(deg: f64, axis: Axis) -> String {
    match axis {
        Axis::RightAscension => {
            let hours = deg / 360.0 * 24.0;
            let (h, m, s, ms) = split_truncated(hours);
            format!("{:02}:{:02}:{:02}.{:03}", h, m, s, ms)
        }
        Axis::Declination => {
            let (sign, magnitude) = if deg < 0.0 { ('-', -deg) } else { (' ', deg) };
            let (d, m, s, ms) = split_truncated(magnitude);
            format!("{}{:02}:{:02}:{:02}.{:03}", sign, d, m, s, ms)
        }
    }
}

/// Parse an unsigned sexagesimal component.
fn parse_component(part: &str, input: &str) -> CatalogResult<f64> {
    if part.starts_with(['+', '-']) {
        return Err(CatalogError::MalformedCoordinate(format!(
            "sign only allowed on leading field: '{}'",
            input
        )));
    }
    match part.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(CatalogError::MalformedCoordinate(format!(
            "non-numeric component '{}' in '{}'",
            part, input
        ))),
    }
}

/// Parse a sexagesimal string back to decimal degrees.
///
/// Components may be separated by `:` or whitespace (`"22 52 23.37"` and
/// `"22:52:23.370"` are both accepted). A sign is tolerated only on the
/// leading field, and right ascension may not be negative.
pub fn sexagesimal_to_deg(input: &str, axis: Axis) -> CatalogResult<f64> {
    let parts: Vec<&str> = input
        .trim()
        .split(|c: char| c == ':' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();

    if parts.len() != 3 {
        return Err(CatalogError::MalformedCoordinate(format!(
            "expected 3 sexagesimal components, got {} in '{}'",
            parts.len(),
            input
        )));
    }

    let (negative, lead) = match parts[0].as_bytes()[0] {
        b'-' => (true, &parts[0][1..]),
        b'+' => (false, &parts[0][1..]),
        _ => (false, parts[0]),
    };

    if negative && axis == Axis::RightAscension {
        return Err(CatalogError::MalformedCoordinate(format!(
            "right ascension cannot be negative: '{}'",
            input
        )));
    }

    let whole = parse_component(lead, input)?;
    let minutes = parse_component(parts[1], input)?;
    let seconds = parse_component(parts[2], input)?;

    let magnitude = whole + minutes / 60.0 + seconds / 3600.0;
    let value = match axis {
        Axis::RightAscension => magnitude * 15.0,
        Axis::Declination => magnitude,
    };

    Ok(if negative { -value } else { value })
}
