//! Built-in catalog schemas.
//!
//! Each can be replaced at runtime by a YAML file of the same name; see
//! [`crate::config::load_schema`].

use std::ops::Range;

use catalog_common::{ScalarType, Sentinel};
use zone_parser::{ucac4, PackedLayout};

use crate::schema::{CatalogSchema, FieldRole, FieldSource, FieldSpec, RecordFormat};
use crate::units::UnitLayout;

use FieldRole::*;
use ScalarType::{Bool, Float, Int, Text};

/// Names of the built-in schemas.
pub const BUILTIN: [&str; 6] = ["2mass", "gaia", "gsc240", "hipparcos", "sao2000", "ucac4"];

/// Look up a built-in schema by name.
pub fn builtin(name: &str) -> Option<CatalogSchema> {
    match name {
        "2mass" => Some(two_mass()),
        "gaia" => Some(gaia()),
        "gsc240" => Some(gsc240()),
        "hipparcos" => Some(hipparcos()),
        "sao2000" => Some(sao2000()),
        "ucac4" => Some(ucac4()),
        _ => None,
    }
}

fn col(name: &str, position: usize, kind: ScalarType, role: FieldRole) -> FieldSpec {
    FieldSpec::new(name, FieldSource::Position(position), kind, role).with_sentinels(vec![Sentinel::Empty])
}

fn cols(name: &str, ranges: &[Range<usize>], kind: ScalarType, role: FieldRole) -> FieldSpec {
    FieldSpec::new(name, FieldSource::Columns(ranges.to_vec()), kind, role)
        .with_sentinels(vec![Sentinel::Empty])
}

fn packed(name: &str, field: &str, kind: ScalarType, role: FieldRole) -> FieldSpec {
    FieldSpec::new(name, FieldSource::Packed(field.to_string()), kind, role)
}

fn mag(band: &str) -> FieldRole {
    Magnitude(band.to_string())
}

fn csv(skip_header: bool) -> RecordFormat {
    RecordFormat::Delimited {
        delimiter: ',',
        skip_header,
    }
}

/// 2MASS point source catalog, per-region CSV files.
pub fn two_mass() -> CatalogSchema {
    CatalogSchema {
        name: "2mass".into(),
        format: csv(false),
        units: UnitLayout::Regions {
            extension: "dat".into(),
        },
        fields: vec![
            col("ra", 0, Float, RaDeg),
            col("dec", 1, Float, DecDeg),
            col("designation", 2, Text, CatalogId),
            col("j_m", 3, Float, mag("j")),
            col("h_m", 4, Float, mag("h")),
            col("k_m", 5, Float, mag("k")),
            col("ph_qual", 6, Text, Extra),
            col("rd_flg", 7, Int, Extra),
        ],
    }
}

/// GSC 2.4, per-region CSV files with positions in radians.
pub fn gsc240() -> CatalogSchema {
    let missing = || vec![Sentinel::Empty, Sentinel::Equals(99.9)];
    let missing_code = || vec![Sentinel::Empty, Sentinel::Equals(99.0)];

    let mut fields = vec![
        col("gsc_id", 0, Text, CatalogId),
        col("gsc1_id", 1, Text, Extra)
            .with_sentinels(vec![Sentinel::Empty, Sentinel::Literal("___NULL___".into())]),
        col("hst_id", 2, Text, Extra),
        col("ra", 3, Float, RaRad),
        col("dec", 4, Float, DecRad),
        col("epoch", 5, Float, Extra),
        col("ra_err", 6, Float, Extra),
        col("dec_err", 7, Float, Extra),
        col("pm_ra", 8, Float, PmRa).with_sentinels(missing()),
        col("pm_dec", 9, Float, PmDec).with_sentinels(missing()),
        col("pm_ra_err", 10, Float, Extra).with_sentinels(missing()),
        col("pm_dec_err", 11, Float, Extra).with_sentinels(missing()),
        col("delta_epoch", 12, Float, Extra),
    ];

    // (mag, err, code) triplets from column 13
    let bands = ["fpg", "jpg", "v", "npg", "u", "b", "r", "i", "j", "h", "k"];
    for (i, band) in bands.iter().enumerate() {
        let at = 13 + i * 3;
        fields.push(col(&format!("{}_mag", band), at, Float, mag(band)).with_sentinels(missing()));
        fields.push(col(&format!("{}_mag_err", band), at + 1, Float, Extra).with_sentinels(missing()));
        fields.push(col(&format!("{}_mag_code", band), at + 2, Int, Extra).with_sentinels(missing_code()));
    }

    fields.extend([
        col("classification", 46, Int, Extra),
        col("semi_major_axis", 47, Float, Extra),
        col("eccentricity", 48, Float, Extra),
        col("position_angle", 49, Float, Extra),
        col("source_status", 50, Int, Extra),
        col("variable_flag", 51, Int, Extra),
        col("multiple_flag", 52, Int, Extra),
    ]);

    CatalogSchema {
        name: "gsc240".into(),
        format: csv(false),
        units: UnitLayout::Regions {
            extension: "csv".into(),
        },
        fields,
    }
}

/// Hipparcos main catalog, one CSV file.
///
/// Decimal degrees are blank for some entries; the sexagesimal columns are
/// then the position of record.
pub fn hipparcos() -> CatalogSchema {
    CatalogSchema {
        name: "hipparcos".into(),
        format: csv(false),
        units: UnitLayout::SingleFile {
            file_name: "hip_main.csv".into(),
        },
        fields: hipparcos_fields(),
    }
}

fn hipparcos_fields() -> Vec<FieldSpec> {
    let mut fields = vec![
        col("hip", 1, Int, CatalogId),
        col("proximity_flag", 2, Text, Extra),
        col("ra_hms", 3, Text, RaSexagesimal),
        col("dec_dms", 4, Text, DecSexagesimal),
        col("v_mag", 5, Float, mag("v")),
        col("var_flag", 6, Text, Extra),
        col("v_mag_source", 7, Text, Extra),
        col("ra_deg", 8, Float, RaDeg),
        col("dec_deg", 9, Float, DecDeg),
        col("astrom_ref_dbl", 10, Text, Extra),
        col("parallax", 11, Float, Extra),
        col("pm_ra", 12, Float, PmRa),
        col("pm_dec", 13, Float, PmDec),
        col("ra_err", 14, Float, Extra),
        col("dec_err", 15, Float, Extra),
        col("parallax_err", 16, Float, Extra),
        col("pm_ra_err", 17, Float, Extra),
        col("pm_dec_err", 18, Float, Extra),
    ];

    // correlation coefficients, columns 19..=28
    let correlations = [
        "dec_ra", "plx_ra", "plx_dec", "pmra_ra", "pmra_dec", "pmra_plx", "pmdec_ra", "pmdec_dec", "pmdec_plx",
        "pmdec_pmra",
    ];
    for (i, pair) in correlations.iter().enumerate() {
        fields.push(col(&format!("corr_{}", pair), 19 + i, Float, Extra));
    }

    // column 31 is not displayed in the published table
    fields.extend([
        col("reject_percent", 29, Float, Extra),
        col("quality_fit", 30, Float, Extra),
        col("bt_mag", 32, Float, mag("bt")),
        col("bt_mag_err", 33, Float, Extra),
        col("vt_mag", 34, Float, mag("vt")),
        col("vt_mag_err", 35, Float, Extra),
        col("bt_mag_ref_dbl", 36, Text, Extra),
        col("b_v", 37, Float, Extra),
        col("b_v_err", 38, Float, Extra),
        col("b_v_source", 39, Text, Extra),
        col("v_i", 40, Float, Extra),
        col("v_i_err", 41, Float, Extra),
        col("v_i_source", 42, Text, Extra),
        col("mag_ref_dbl", 43, Text, Extra),
        col("hp_mag", 44, Float, mag("hp")),
        col("hp_mag_err", 45, Float, Extra),
        col("hp_scatter", 46, Float, Extra),
        col("n_obs_hp", 47, Int, Extra),
        col("hp_mag_ref_dbl", 48, Text, Extra),
        col("hp_max", 49, Float, Extra),
        col("hp_min", 50, Float, Extra),
        col("var_period", 51, Text, Extra),
        col("var_type", 52, Text, Extra),
        col("var_data_annex", 53, Text, Extra),
        col("var_curve_annex", 54, Text, Extra),
        col("ccdm_id", 55, Text, Extra),
        col("ccdm_history", 56, Text, Extra),
        col("ccdm_entries", 57, Text, Extra),
        col("ccdm_components", 58, Int, Extra),
        col("dbl_mult_annex", 59, Text, Extra),
        col("astrom_mult_source", 60, Text, Extra),
        col("dbl_solution_quality", 61, Text, Extra),
        col("dbl_ref_id", 62, Text, Extra),
        col("dbl_theta", 63, Text, Extra),
        col("dbl_rho", 64, Text, Extra),
        col("rho_err", 65, Text, Extra),
        col("diff_hp_mag", 66, Text, Extra),
        col("diff_hp_mag_err", 67, Text, Extra),
        col("survey_star", 68, Text, Extra),
        col("id_chart", 69, Text, Extra),
        col("notes", 70, Text, Extra),
        col("hd", 71, Int, Extra),
        col("bd", 72, Text, Extra),
        col("cod", 73, Text, Extra),
        col("cpd", 74, Text, Extra),
        col("v_i_reduction", 75, Text, Extra),
        col("spectral_type", 76, Text, Extra),
        col("spectral_type_source", 77, Text, Extra),
    ]);
    fields
}

/// SAO J2000, one fixed-width file.
pub fn sao2000() -> CatalogSchema {
    let missing = || vec![Sentinel::Empty, Sentinel::Equals(99.9)];
    CatalogSchema {
        name: "sao2000".into(),
        format: RecordFormat::FixedWidth,
        units: UnitLayout::SingleFile {
            file_name: "sao.dat".into(),
        },
        fields: vec![
            cols("sao", &[0..6], Int, CatalogId),
            cols("photo_mag", &[76..80], Float, mag("photo")).with_sentinels(missing()),
            cols("v_mag", &[80..84], Float, mag("v")).with_sentinels(missing()),
            cols("spectral_type", &[84..87], Text, Extra),
            cols("v_mag_delta", &[95..96], Int, Extra),
            cols("photo_mag_delta", &[96..97], Int, Extra),
            cols("ra", &[150..152, 152..154, 154..160], Text, RaSexagesimal),
            cols("pm_ra", &[160..167], Float, PmRa),
            cols("dec", &[167..170, 170..172, 172..177], Text, DecSexagesimal),
            cols("pm_dec", &[177..183], Float, PmDec),
            cols("ra_rad", &[183..193], Float, RaRad),
            cols("dec_rad", &[193..204], Float, DecRad),
        ],
    }
}

/// Gaia DR2 `gaia_source` CSV files, each starting with a header row.
///
/// Everything besides position, proper motion and the three photometric
/// bands is kept as an extra.
pub fn gaia() -> CatalogSchema {
    let mut fields = vec![
        col("solution_id", 0, Int, Extra),
        col("designation", 1, Text, CatalogId),
        col("source_id", 2, Int, Extra),
        col("random_index", 3, Int, Extra),
        col("ref_epoch", 4, Float, Extra),
        col("ra", 5, Float, RaDeg),
        col("ra_error", 6, Float, Extra),
        col("dec", 7, Float, DecDeg),
        col("dec_error", 8, Float, Extra),
        col("parallax", 9, Float, Extra),
        col("parallax_error", 10, Float, Extra),
        col("parallax_over_error", 11, Float, Extra),
        col("pmra", 12, Float, PmRa),
        col("pmra_error", 13, Float, Extra),
        col("pmdec", 14, Float, PmDec),
        col("pmdec_error", 15, Float, Extra),
    ];

    let correlations = [
        "ra_dec", "ra_parallax", "ra_pmra", "ra_pmdec", "dec_parallax", "dec_pmra", "dec_pmdec", "parallax_pmra",
        "parallax_pmdec", "pmra_pmdec",
    ];
    for (i, pair) in correlations.iter().enumerate() {
        fields.push(col(&format!("{}_corr", pair), 16 + i, Float, Extra));
    }

    fields.extend([
        col("astrometric_n_obs_al", 26, Int, Extra),
        col("astrometric_n_obs_ac", 27, Int, Extra),
        col("astrometric_n_good_obs_al", 28, Int, Extra),
        col("astrometric_n_bad_obs_al", 29, Int, Extra),
        col("astrometric_gof_al", 30, Float, Extra),
        col("astrometric_chi2_al", 31, Float, Extra),
        col("astrometric_excess_noise", 32, Float, Extra),
        col("astrometric_excess_noise_sig", 33, Float, Extra),
        col("astrometric_params_solved", 34, Int, Extra),
        col("astrometric_primary_flag", 35, Bool, Extra),
        col("astrometric_weight_al", 36, Float, Extra),
        col("astrometric_pseudo_colour", 37, Float, Extra),
        col("astrometric_pseudo_colour_error", 38, Float, Extra),
        col("mean_varpi_factor_al", 39, Float, Extra),
        col("astrometric_matched_observations", 40, Int, Extra),
        col("visibility_periods_used", 41, Int, Extra),
        col("astrometric_sigma5d_max", 42, Float, Extra),
        col("frame_rotator_object_type", 43, Int, Extra),
        col("matched_observations", 44, Int, Extra),
        col("duplicated_source", 45, Bool, Extra),
    ]);

    // (n_obs, flux, flux_error, flux_over_error, mag) per band from column 46
    for (i, band) in ["g", "bp", "rp"].iter().enumerate() {
        let at = 46 + i * 5;
        fields.extend([
            col(&format!("phot_{}_n_obs", band), at, Int, Extra),
            col(&format!("phot_{}_mean_flux", band), at + 1, Float, Extra),
            col(&format!("phot_{}_mean_flux_error", band), at + 2, Float, Extra),
            col(&format!("phot_{}_mean_flux_over_error", band), at + 3, Float, Extra),
            col(&format!("phot_{}_mean_mag", band), at + 4, Float, mag(band)),
        ]);
    }

    fields.extend([
        col("phot_bp_rp_excess_factor", 61, Float, Extra),
        col("phot_proc_mode", 62, Text, Extra),
        col("bp_rp", 63, Float, Extra),
        col("bp_g", 64, Float, Extra),
        col("g_rp", 65, Float, Extra),
        col("radial_velocity", 66, Float, Extra),
        col("radial_velocity_error", 67, Float, Extra),
        col("rv_nb_transits", 68, Int, Extra),
        col("rv_template_teff", 69, Float, Extra),
        col("rv_template_logg", 70, Float, Extra),
        col("rv_template_fe_h", 71, Float, Extra),
        col("phot_variable_flag", 72, Text, Extra)
            .with_sentinels(vec![Sentinel::Empty, Sentinel::Literal("NOT_AVAILABLE".into())]),
        col("l", 73, Float, Extra),
        col("b", 74, Float, Extra),
        col("ecl_lon", 75, Float, Extra),
        col("ecl_lat", 76, Float, Extra),
        col("priam_flags", 77, Int, Extra),
    ]);

    // (value, lower, upper) astrophysical parameters from column 78
    for (i, param) in ["teff", "a_g", "e_bp_min_rp"].iter().enumerate() {
        let at = 78 + i * 3;
        fields.extend([
            col(&format!("{}_val", param), at, Float, Extra),
            col(&format!("{}_percentile_lower", param), at + 1, Float, Extra),
            col(&format!("{}_percentile_upper", param), at + 2, Float, Extra),
        ]);
    }
    fields.push(col("flame_flags", 87, Int, Extra));
    for (i, param) in ["radius", "lum"].iter().enumerate() {
        let at = 88 + i * 3;
        fields.extend([
            col(&format!("{}_val", param), at, Float, Extra),
            col(&format!("{}_percentile_lower", param), at + 1, Float, Extra),
            col(&format!("{}_percentile_upper", param), at + 2, Float, Extra),
        ]);
    }

    CatalogSchema {
        name: "gaia".into(),
        format: csv(true),
        units: UnitLayout::Directory {
            dir_name: "gaia_source".into(),
        },
        fields,
    }
}

/// Proper motion in RA, raw units to stored units.
pub const UCAC4_PM_RA_SCALE: f64 = 1.0 / 150_000.0;
/// Proper motion in Dec, raw units to stored units.
pub const UCAC4_PM_DEC_SCALE: f64 = 1.0 / 10_000.0;

/// UCAC4, 900 packed binary zone files.
pub fn ucac4() -> CatalogSchema {
    let millimag = 0.001;
    let mag_missing = || vec![Sentinel::AtLeast(ucac4::MAGNITUDE_SENTINEL)];
    let err_missing = || vec![Sentinel::Equals(ucac4::APASS_ERROR_SENTINEL)];

    let mut fields = vec![
        packed("rnm", "rnm", Int, CatalogId),
        packed("ra", "ra", Float, RaDeg).scaled(1.0 / ucac4::MAS_PER_DEG, 0.0),
        packed("dec", "spd", Float, DecDeg).scaled(1.0 / ucac4::MAS_PER_DEG, -90.0),
        packed("mag_model", "magm", Float, mag("model"))
            .with_sentinels(mag_missing())
            .scaled(millimag, 0.0),
        packed("mag_aperture", "maga", Float, mag("aperture"))
            .with_sentinels(mag_missing())
            .scaled(millimag, 0.0),
        packed("pm_ra", "pmrac", Float, PmRa).scaled(UCAC4_PM_RA_SCALE, 0.0),
        packed("pm_dec", "pmdc", Float, PmDec).scaled(UCAC4_PM_DEC_SCALE, 0.0),
        packed("ra_raw", "ra", Int, Extra),
        packed("spd_raw", "spd", Int, Extra),
        packed("sigma_mag", "sigmag", Int, Extra),
        packed("object_type", "objt", Int, Extra),
        packed("double_star_flag", "cdf", Int, Extra),
        packed("sigma_ra", "sigra", Int, Extra),
        packed("sigma_dec", "sigdc", Int, Extra),
        packed("n_images", "na1", Int, Extra),
        packed("n_images_used", "nu1", Int, Extra),
        packed("n_catalogs_used", "cu1", Int, Extra),
        packed("central_epoch_ra", "cepra", Int, Extra),
        packed("central_epoch_dec", "cepdc", Int, Extra),
        packed("sigma_pm_ra", "sigpmr", Int, Extra),
        packed("sigma_pm_dec", "sigpmd", Int, Extra),
        packed("two_mass_key", "pts_key", Int, Extra).with_sentinels(vec![Sentinel::Equals(0.0)]),
    ];

    for band in ["j", "h", "k"] {
        fields.push(
            packed(&format!("{}_m", band), &format!("{}_m", band), Float, mag(band))
                .with_sentinels(mag_missing())
                .scaled(millimag, 0.0),
        );
        fields.push(packed(&format!("icqflg_{}", band), &format!("icqflg_{}", band), Int, Extra));
        fields.push(packed(&format!("e2mpho_{}", band), &format!("e2mpho_{}", band), Int, Extra));
    }
    for band in ["b", "v", "g", "r", "i"] {
        fields.push(
            packed(&format!("apasm_{}", band), &format!("apasm_{}", band), Float, mag(&format!("apass_{}", band)))
                .with_sentinels(mag_missing())
                .scaled(millimag, 0.0),
        );
        fields.push(
            packed(&format!("apase_{}", band), &format!("apase_{}", band), Int, Extra)
                .with_sentinels(err_missing()),
        );
    }

    fields.extend([
        packed("galaxy_flag", "gcflg", Int, Extra),
        packed("catalog_flags", "icf", Int, Extra),
        packed("leda_flag", "leda", Int, Extra),
        packed("extended_2mass_flag", "x2m", Int, Extra),
        packed("ucac2_zone", "zn2", Int, Extra),
        packed("ucac2_number", "rn2", Int, Extra),
    ]);

    CatalogSchema {
        name: "ucac4".into(),
        // an inconsistent layout table leaves the layout empty, which
        // schema validation then rejects
        format: RecordFormat::PackedBinary {
            layout: ucac4::layout().unwrap_or_else(|_| PackedLayout {
                version: "ucac4".into(),
                record_width: ucac4::RECORD_WIDTH,
                fields: Vec::new(),
            }),
        },
        units: UnitLayout::Zones,
        fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_validate() {
        for name in BUILTIN {
            let schema = builtin(name).unwrap();
            assert_eq!(schema.name, name);
            schema.validate().unwrap_or_else(|e| panic!("{}: {}", name, e));
        }
        assert!(builtin("gaia2").is_none());
    }

    #[test]
    fn test_gaia_columns_in_file_order() {
        let schema = gaia();
        assert_eq!(schema.min_positions(), test_utils::fixtures::GAIA_COLUMNS.len());
        for field in &schema.fields {
            let FieldSource::Position(at) = field.source else {
                panic!("{} has no position", field.name);
            };
            assert_eq!(field.name, test_utils::fixtures::GAIA_COLUMNS[at], "column {}", at);
        }
        assert!(matches!(schema.format, RecordFormat::Delimited { skip_header: true, .. }));
    }

    #[test]
    fn test_hipparcos_covers_every_column() {
        let schema = hipparcos();
        let mut positions: Vec<usize> = schema
            .fields
            .iter()
            .filter_map(|f| match f.source {
                FieldSource::Position(p) => Some(p),
                _ => None,
            })
            .collect();
        positions.sort_unstable();
        // column 0 is the catalog letter, 31 is not published
        let expected: Vec<usize> = (1..78).filter(|p| *p != 31).collect();
        assert_eq!(positions, expected);
    }

    #[test]
    fn test_ucac4_uses_every_packed_field() {
        let schema = ucac4();
        let RecordFormat::PackedBinary { layout } = &schema.format else {
            panic!("ucac4 is not packed");
        };
        for packed_field in &layout.fields {
            assert!(
                schema
                    .fields
                    .iter()
                    .any(|f| f.source == FieldSource::Packed(packed_field.name.clone())),
                "{} unused",
                packed_field.name
            );
        }
    }

    #[test]
    fn test_gsc_width() {
        assert_eq!(gsc240().min_positions(), 53);
    }

    #[test]
    fn test_sao_width() {
        assert_eq!(sao2000().min_line_width(), test_utils::fixtures::SAO_LINE_WIDTH);
    }

    #[test]
    fn test_ucac4_pm_scales_independent() {
        let schema = ucac4();
        let pm_ra = schema.field_with_role(&PmRa).unwrap();
        let pm_dec = schema.field_with_role(&PmDec).unwrap();
        assert_eq!(pm_ra.scale, Some(UCAC4_PM_RA_SCALE));
        assert_eq!(pm_dec.scale, Some(UCAC4_PM_DEC_SCALE));
        assert_ne!(pm_ra.scale, pm_dec.scale);
    }

    #[test]
    fn test_builtin_yaml_roundtrip() {
        let schema = two_mass();
        let yaml = serde_yaml::to_string(&schema).unwrap();
        let back: CatalogSchema = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, schema);
    }
}
