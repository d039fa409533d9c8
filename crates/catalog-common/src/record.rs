//! The normalized star record and its scalar building blocks.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::coords::{deg_to_rad, deg_to_sexagesimal, rad_to_deg, sexagesimal_to_deg, Axis};
use crate::error::{CatalogError, CatalogResult};

/// Catalog-scoped primary key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatalogId {
    Int(i64),
    Text(String),
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogId::Int(v) => write!(f, "{}", v),
            CatalogId::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for CatalogId {
    fn from(v: i64) -> Self {
        CatalogId::Int(v)
    }
}

impl From<&str> for CatalogId {
    fn from(v: &str) -> Self {
        CatalogId::Text(v.to_string())
    }
}

/// Declared type of a catalog field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    Float,
    Int,
    Bool,
    Text,
}

/// A parsed, non-null field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Float(v) => Some(*v),
            Scalar::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// Proper motion components, in the catalog's own (scaled) units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProperMotion {
    pub pm_ra: Option<f64>,
    pub pm_dec: Option<f64>,
}

/// Normalized star record.
///
/// Built once per raw input record and consumed once by a sink. The three
/// coordinate representations are always derived together so they stay
/// mutually consistent; use one of the constructors rather than filling the
/// coordinate fields by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarRecord {
    pub catalog_id: CatalogId,
    /// Right ascension in decimal degrees, `[0, 360)`.
    pub ra_deg: f64,
    /// Declination in decimal degrees, `[-90, 90]`.
    pub dec_deg: f64,
    pub ra_rad: f64,
    pub dec_rad: f64,
    /// `HH:MM:SS.mmm`
    pub ra_sexagesimal: String,
    /// `±DD:MM:SS.mmm`, space instead of `+`
    pub dec_sexagesimal: String,
    pub photometry: BTreeMap<String, Option<f64>>,
    pub proper_motion: Option<ProperMotion>,
    /// Catalog-specific errors and flags.
    pub extras: BTreeMap<String, Option<Scalar>>,
}

/// Fold RA into `[0, 360)`.
fn canonical_ra(ra_deg: f64) -> f64 {
    let ra = ra_deg.rem_euclid(360.0);
    // rem_euclid of a tiny negative rounds up to 360.0 exactly
    if ra >= 360.0 {
        0.0
    } else {
        ra
    }
}

fn check_coordinates(ra_deg: f64, dec_deg: f64) -> CatalogResult<()> {
    if !ra_deg.is_finite() || !dec_deg.is_finite() {
        return Err(CatalogError::MalformedCoordinate(format!(
            "non-finite coordinate ra={} dec={}",
            ra_deg, dec_deg
        )));
    }
    if !(-90.0..=90.0).contains(&dec_deg) {
        return Err(CatalogError::MalformedCoordinate(format!(
            "declination {} outside [-90, 90]",
            dec_deg
        )));
    }
    Ok(())
}

impl StarRecord {
    fn with_coordinates(catalog_id: CatalogId, ra_deg: f64, dec_deg: f64, ra_rad: f64, dec_rad: f64) -> Self {
        Self {
            catalog_id,
            ra_deg,
            dec_deg,
            ra_rad,
            dec_rad,
            ra_sexagesimal: deg_to_sexagesimal(ra_deg, Axis::RightAscension),
            dec_sexagesimal: deg_to_sexagesimal(dec_deg, Axis::Declination),
            photometry: BTreeMap::new(),
            proper_motion: None,
            extras: BTreeMap::new(),
        }
    }

    /// Build a record whose source of truth is decimal degrees.
    pub fn from_degrees(catalog_id: CatalogId, ra_deg: f64, dec_deg: f64) -> CatalogResult<Self> {
        check_coordinates(ra_deg, dec_deg)?;
        let ra_deg = canonical_ra(ra_deg);
        Ok(Self::with_coordinates(
            catalog_id,
            ra_deg,
            dec_deg,
            deg_to_rad(ra_deg),
            deg_to_rad(dec_deg),
        ))
    }

    /// Build a record whose source of truth is radians.
    pub fn from_radians(catalog_id: CatalogId, ra_rad: f64, dec_rad: f64) -> CatalogResult<Self> {
        let raw_ra_deg = rad_to_deg(ra_rad);
        let dec_deg = rad_to_deg(dec_rad);
        check_coordinates(raw_ra_deg, dec_deg)?;
        let ra_deg = canonical_ra(raw_ra_deg);
        // keep the source radians unless folding moved the angle
        let ra_rad = if ra_deg == raw_ra_deg {
            ra_rad
        } else {
            deg_to_rad(ra_deg)
        };
        Ok(Self::with_coordinates(catalog_id, ra_deg, dec_deg, ra_rad, dec_rad))
    }

    /// Build a record whose source of truth is sexagesimal text.
    pub fn from_sexagesimal(catalog_id: CatalogId, ra: &str, dec: &str) -> CatalogResult<Self> {
        let ra_deg = sexagesimal_to_deg(ra, Axis::RightAscension)?;
        let dec_deg = sexagesimal_to_deg(dec, Axis::Declination)?;
        Self::from_degrees(catalog_id, ra_deg, dec_deg)
    }

    /// Attach magnitudes.
    pub fn with_photometry(mut self, photometry: BTreeMap<String, Option<f64>>) -> Self {
        self.photometry = photometry;
        self
    }

    /// Attach proper motion.
    pub fn with_proper_motion(mut self, proper_motion: Option<ProperMotion>) -> Self {
        self.proper_motion = proper_motion;
        self
    }

    /// Attach catalog-specific auxiliary fields.
    pub fn with_extras(mut self, extras: BTreeMap<String, Option<Scalar>>) -> Self {
        self.extras = extras;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;
    use test_utils::{assert_approx_eq, assert_sky_approx_eq};

    #[test]
    fn test_representations_consistent() {
        let rec = StarRecord::from_degrees(CatalogId::from("00000000+0000000"), 183.75, -45.25).unwrap();
        assert_approx_eq!(rec.ra_rad, deg_to_rad(183.75), 1e-12);
        assert_approx_eq!(rec.dec_rad, deg_to_rad(-45.25), 1e-12);
        assert_eq!(rec.ra_sexagesimal, "12:15:00.000");
        assert_eq!(rec.dec_sexagesimal, "-45:15:00.000");

        let back_ra = sexagesimal_to_deg(&rec.ra_sexagesimal, Axis::RightAscension).unwrap();
        assert_approx_eq!(deg_to_rad(back_ra), rec.ra_rad, 1e-6);
    }

    #[test]
    fn test_from_radians_keeps_source_precision() {
        let rec = StarRecord::from_radians(CatalogId::Int(7), PI / 3.0, -PI / 6.0).unwrap();
        assert_eq!(rec.ra_rad, PI / 3.0);
        assert_eq!(rec.dec_rad, -PI / 6.0);
        assert_sky_approx_eq!((rec.ra_deg, rec.dec_deg), (60.0, -30.0), 1e-12);
    }

    #[test]
    fn test_ra_is_folded_into_range() {
        let rec = StarRecord::from_degrees(CatalogId::Int(1), 360.0, 0.0).unwrap();
        assert_eq!(rec.ra_deg, 0.0);
        let rec = StarRecord::from_degrees(CatalogId::Int(1), -1e-17, 0.0).unwrap();
        assert!(rec.ra_deg >= 0.0 && rec.ra_deg < 360.0);
        let rec = StarRecord::from_radians(CatalogId::Int(1), 2.0 * PI, 0.0).unwrap();
        assert_eq!(rec.ra_deg, 0.0);
        assert_eq!(rec.ra_rad, 0.0);
    }

    #[test]
    fn test_declination_out_of_range_rejected() {
        assert!(matches!(
            StarRecord::from_degrees(CatalogId::Int(1), 10.0, 90.5),
            Err(CatalogError::MalformedCoordinate(_))
        ));
        assert!(matches!(
            StarRecord::from_degrees(CatalogId::Int(1), f64::NAN, 0.0),
            Err(CatalogError::MalformedCoordinate(_))
        ));
        assert!(StarRecord::from_degrees(CatalogId::Int(1), 10.0, -90.0).is_ok());
    }

    #[test]
    fn test_from_sexagesimal() {
        let rec = StarRecord::from_sexagesimal(CatalogId::Int(2), "00 30 00.00", "-10 07 30.0").unwrap();
        assert_approx_eq!(rec.ra_deg, 7.5, 1e-12);
        assert_approx_eq!(rec.dec_deg, -10.125, 1e-12);
        assert_eq!(rec.dec_sexagesimal, "-10:07:30.000");
    }

    #[test]
    fn test_catalog_id_display() {
        assert_eq!(CatalogId::Int(42).to_string(), "42");
        assert_eq!(CatalogId::from("J1234+5678").to_string(), "J1234+5678");
    }

    #[test]
    fn test_extras_serialize_untagged() {
        let mut extras = BTreeMap::new();
        extras.insert("ph_qual".to_string(), Some(Scalar::Text("AAA".into())));
        extras.insert("rd_flg".to_string(), Some(Scalar::Int(222)));
        extras.insert("sig".to_string(), None);
        let json = serde_json::to_string(&extras).unwrap();
        assert_eq!(json, r#"{"ph_qual":"AAA","rd_flg":222,"sig":null}"#);
    }
}
