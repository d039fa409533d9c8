//! Raw field sets to normalized star records.

use std::collections::BTreeMap;

use catalog_common::{
    normalize, CatalogError, CatalogId, CatalogResult, ProperMotion, RawValue, Scalar, StarRecord,
};

use crate::decode::RawFieldSet;
use crate::schema::{CatalogSchema, FieldRole, FieldSpec, COORDINATE_TIERS};

/// Resolve one field: sentinels, type, then scaling.
fn resolve(field: &FieldSpec, raw: &RawValue) -> CatalogResult<Option<Scalar>> {
    let value = normalize(&field.name, raw, &field.sentinels, field.kind)?;
    Ok(match value {
        Some(Scalar::Float(v)) if field.scale.is_some() || field.offset.is_some() => {
            Some(Scalar::Float(field.rescale(v)))
        }
        other => other,
    })
}

fn float(field: &FieldSpec, value: &Option<Scalar>) -> CatalogResult<Option<f64>> {
    match value {
        None => Ok(None),
        Some(scalar) => scalar
            .as_f64()
            .map(Some)
            .ok_or_else(|| CatalogError::field_parse(&field.name, "expected a number")),
    }
}

/// Build a [`StarRecord`] from one decoded record.
///
/// Fails on the first field that does not parse, a missing catalog id, or
/// a record with no complete coordinate pair. Nothing is guessed: a record
/// either normalizes completely or is rejected.
pub fn build_record(schema: &CatalogSchema, raw: &RawFieldSet) -> CatalogResult<StarRecord> {
    let mut values: Vec<(&FieldSpec, Option<Scalar>)> = Vec::with_capacity(schema.fields.len());
    for field in &schema.fields {
        let raw_value = raw.get(&field.name).ok_or_else(|| {
            CatalogError::field_parse(&field.name, "missing from decoded record")
        })?;
        values.push((field, resolve(field, raw_value)?));
    }

    let by_role = |role: &FieldRole| values.iter().find(|(f, _)| &f.role == role);

    let catalog_id = match by_role(&FieldRole::CatalogId) {
        Some((_, Some(Scalar::Int(id)))) => CatalogId::Int(*id),
        Some((_, Some(Scalar::Text(id)))) => CatalogId::Text(id.clone()),
        Some((field, _)) => {
            return Err(CatalogError::field_parse(&field.name, "catalog id is missing"))
        }
        None => return Err(CatalogError::InvalidSchema(format!("{}: no catalog_id field", schema.name))),
    };

    let mut record = None;
    for (ra_role, dec_role) in COORDINATE_TIERS.iter() {
        let (Some((ra_field, Some(ra))), Some((dec_field, Some(dec)))) = (by_role(ra_role), by_role(dec_role)) else {
            continue;
        };
        let id = catalog_id.clone();
        record = Some(match ra_role {
            FieldRole::RaRad => StarRecord::from_radians(id, num(ra_field, ra)?, num(dec_field, dec)?)?,
            FieldRole::RaDeg => StarRecord::from_degrees(id, num(ra_field, ra)?, num(dec_field, dec)?)?,
            _ => StarRecord::from_sexagesimal(id, text(ra_field, ra)?, text(dec_field, dec)?)?,
        });
        break;
    }
    let record = record.ok_or_else(|| {
        CatalogError::MalformedCoordinate(format!("{}: no complete RA/Dec pair", catalog_id))
    })?;

    let mut photometry = BTreeMap::new();
    let mut extras = BTreeMap::new();
    let mut pm_ra = None;
    let mut pm_dec = None;
    for (field, value) in &values {
        match &field.role {
            FieldRole::Magnitude(band) => {
                photometry.insert(band.clone(), float(field, value)?);
            }
            FieldRole::PmRa => pm_ra = float(field, value)?,
            FieldRole::PmDec => pm_dec = float(field, value)?,
            FieldRole::Extra => {
                extras.insert(field.name.clone(), value.clone());
            }
            _ => {}
        }
    }

    let proper_motion = (pm_ra.is_some() || pm_dec.is_some()).then_some(ProperMotion { pm_ra, pm_dec });

    Ok(record
        .with_photometry(photometry)
        .with_proper_motion(proper_motion)
        .with_extras(extras))
}

fn num(field: &FieldSpec, value: &Scalar) -> CatalogResult<f64> {
    value
        .as_f64()
        .ok_or_else(|| CatalogError::field_parse(&field.name, "expected a number"))
}

fn text<'a>(field: &FieldSpec, value: &'a Scalar) -> CatalogResult<&'a str> {
    value
        .as_str()
        .ok_or_else(|| CatalogError::field_parse(&field.name, "expected text"))
}
