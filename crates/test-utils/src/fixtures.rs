//! Sample catalog records for the text formats.
//!
//! Values are plausible but made up. Each builder fills every column the
//! real catalog has, so positional decoders see full-width records.

use crate::generators::FixedWidthLine;

/// Declinations around the visibility cutoff.
pub mod declinations {
    pub const ON_LIMIT: f64 = -70.0;
    pub const JUST_SOUTH: f64 = -70.0001;
    pub const JUST_NORTH: f64 = -69.9999;
}

/// 2MASS point source lines: `ra,dec,designation,j,h,k,ph_qual,rd_flg`.
pub mod two_mass {
    /// A complete record at RA 10.5, Dec 20.25.
    pub const FULL: &str = "10.500000,20.250000,00420000+2015000,12.345,11.876,11.702,AAA,222";

    /// Same designation as [`FULL`] with different photometry.
    pub const DUPLICATE_OF_FULL: &str =
        "10.500000,20.250000,00420000+2015000,12.999,11.999,11.999,AAA,222";

    /// J magnitude left blank.
    pub const BLANK_J: &str = "11.250000,-75.500000,00450000-7530000,,13.101,12.950,UAA,022";

    /// Declination text that is not a number.
    pub const BAD_DEC: &str = "12.000000,abc,00480000+0000000,10.0,10.0,10.0,AAA,222";
}

/// A GSC 2.4 line with 53 columns.
///
/// Magnitudes other than V are `99.9` and their codes `99`, the catalog's
/// missing-value markers. `gsc1_id` of `None` writes `___NULL___`.
pub fn gsc_line(id: &str, gsc1_id: Option<&str>, ra_rad: f64, dec_rad: f64, v_mag: f64) -> String {
    let mut cols: Vec<String> = vec![String::new(); 53];
    cols[0] = id.to_string();
    cols[1] = gsc1_id.unwrap_or("___NULL___").to_string();
    cols[2] = "HST0001".to_string();
    cols[3] = format!("{:.10}", ra_rad);
    cols[4] = format!("{:.10}", dec_rad);
    cols[5] = "1995.5".to_string();
    cols[6] = "0.12".to_string();
    cols[7] = "0.15".to_string();
    cols[8] = "99.9".to_string();
    cols[9] = "99.9".to_string();
    cols[10] = "99.9".to_string();
    cols[11] = "99.9".to_string();
    cols[12] = "0.0".to_string();
    // 11 bands of (mag, err, code) starting at column 13
    for band in 0..11 {
        let at = 13 + band * 3;
        cols[at] = "99.9".to_string();
        cols[at + 1] = "99.9".to_string();
        cols[at + 2] = "99".to_string();
    }
    // V band
    cols[19] = format!("{:.2}", v_mag);
    cols[20] = "0.05".to_string();
    cols[21] = "1".to_string();
    cols[46] = "0".to_string();
    cols[47] = "1.5".to_string();
    cols[48] = "0.1".to_string();
    cols[49] = "45.0".to_string();
    cols[50] = "1".to_string();
    cols[51] = "0".to_string();
    cols[52] = "0".to_string();
    cols.join(",")
}

/// A Hipparcos main catalog line with 78 columns.
///
/// Passing `None` for the decimal degrees leaves them blank, so only the
/// sexagesimal columns carry the position.
pub fn hip_line(
    hip: u32,
    ra_sexagesimal: &str,
    dec_sexagesimal: &str,
    degrees: Option<(f64, f64)>,
    v_mag: Option<f64>,
) -> String {
    let mut cols: Vec<String> = vec![String::new(); 78];
    cols[0] = "H".to_string();
    cols[1] = hip.to_string();
    cols[3] = ra_sexagesimal.to_string();
    cols[4] = dec_sexagesimal.to_string();
    cols[5] = v_mag.map(|v| format!("{:.2}", v)).unwrap_or_default();
    cols[7] = "G".to_string();
    if let Some((ra, dec)) = degrees {
        cols[8] = format!("{:.8}", ra);
        cols[9] = format!("{:.8}", dec);
    }
    cols[11] = "3.54".to_string();
    cols[12] = "-5.20".to_string();
    cols[13] = "-1.88".to_string();
    cols[14] = "1.32".to_string();
    cols[15] = "0.74".to_string();
    cols[32] = "9.643".to_string();
    cols[34] = "9.130".to_string();
    cols[37] = "0.482".to_string();
    cols[40] = "0.55".to_string();
    cols[44] = "9.2043".to_string();
    cols[71] = "224700".to_string();
    cols[76] = "F5".to_string();
    cols.join(",")
}

/// Width of one SAO J2000 line.
pub const SAO_LINE_WIDTH: usize = 204;

/// An SAO J2000 fixed-width line.
///
/// `pm` of `None` leaves the proper motion columns blank.
#[allow(clippy::too_many_arguments)]
pub fn sao_line(
    sao: u32,
    ra_hms: (u32, u32, f64),
    dec_dms: (char, u32, u32, f64),
    ra_rad: f64,
    dec_rad: f64,
    v_mag: f64,
    pm: Option<(f64, f64)>,
) -> String {
    let (rh, rm, rs) = ra_hms;
    let (sign, dd, dm, ds) = dec_dms;
    let mut line = FixedWidthLine::new(SAO_LINE_WIDTH)
        .put(0, 6, &sao.to_string())
        .put(76, 80, "99.9")
        .put(80, 84, &format!("{:.1}", v_mag))
        .put(84, 87, "K0")
        .put(95, 96, "1")
        .put(96, 97, "0")
        .put(150, 152, &format!("{:02}", rh))
        .put(152, 154, &format!("{:02}", rm))
        .put(154, 160, &format!("{:06.3}", rs))
        .put(167, 170, &format!("{}{:02}", sign, dd))
        .put(170, 172, &format!("{:02}", dm))
        .put(172, 177, &format!("{:05.2}", ds))
        .put(183, 193, &format!("{:.8}", ra_rad))
        .put(193, 204, &format!("{:.8}", dec_rad));
    if let Some((pm_ra, pm_dec)) = pm {
        line = line
            .put(160, 167, &format!("{:.4}", pm_ra))
            .put(177, 183, &format!("{:.3}", pm_dec));
    }
    line.build()
}

/// Column names of a Gaia DR2 `gaia_source` CSV file, in file order.
pub const GAIA_COLUMNS: [&str; 94] = [
    "solution_id",
    "designation",
    "source_id",
    "random_index",
    "ref_epoch",
    "ra",
    "ra_error",
    "dec",
    "dec_error",
    "parallax",
    "parallax_error",
    "parallax_over_error",
    "pmra",
    "pmra_error",
    "pmdec",
    "pmdec_error",
    "ra_dec_corr",
    "ra_parallax_corr",
    "ra_pmra_corr",
    "ra_pmdec_corr",
    "dec_parallax_corr",
    "dec_pmra_corr",
    "dec_pmdec_corr",
    "parallax_pmra_corr",
    "parallax_pmdec_corr",
    "pmra_pmdec_corr",
    "astrometric_n_obs_al",
    "astrometric_n_obs_ac",
    "astrometric_n_good_obs_al",
    "astrometric_n_bad_obs_al",
    "astrometric_gof_al",
    "astrometric_chi2_al",
    "astrometric_excess_noise",
    "astrometric_excess_noise_sig",
    "astrometric_params_solved",
    "astrometric_primary_flag",
    "astrometric_weight_al",
    "astrometric_pseudo_colour",
    "astrometric_pseudo_colour_error",
    "mean_varpi_factor_al",
    "astrometric_matched_observations",
    "visibility_periods_used",
    "astrometric_sigma5d_max",
    "frame_rotator_object_type",
    "matched_observations",
    "duplicated_source",
    "phot_g_n_obs",
    "phot_g_mean_flux",
    "phot_g_mean_flux_error",
    "phot_g_mean_flux_over_error",
    "phot_g_mean_mag",
    "phot_bp_n_obs",
    "phot_bp_mean_flux",
    "phot_bp_mean_flux_error",
    "phot_bp_mean_flux_over_error",
    "phot_bp_mean_mag",
    "phot_rp_n_obs",
    "phot_rp_mean_flux",
    "phot_rp_mean_flux_error",
    "phot_rp_mean_flux_over_error",
    "phot_rp_mean_mag",
    "phot_bp_rp_excess_factor",
    "phot_proc_mode",
    "bp_rp",
    "bp_g",
    "g_rp",
    "radial_velocity",
    "radial_velocity_error",
    "rv_nb_transits",
    "rv_template_teff",
    "rv_template_logg",
    "rv_template_fe_h",
    "phot_variable_flag",
    "l",
    "b",
    "ecl_lon",
    "ecl_lat",
    "priam_flags",
    "teff_val",
    "teff_percentile_lower",
    "teff_percentile_upper",
    "a_g_val",
    "a_g_percentile_lower",
    "a_g_percentile_upper",
    "e_bp_min_rp_val",
    "e_bp_min_rp_percentile_lower",
    "e_bp_min_rp_percentile_upper",
    "flame_flags",
    "radius_val",
    "radius_percentile_lower",
    "radius_percentile_upper",
    "lum_val",
    "lum_percentile_lower",
    "lum_percentile_upper",
];

/// The header row every Gaia source file starts with.
pub fn gaia_header() -> String {
    GAIA_COLUMNS.join(",")
}

/// A Gaia DR2 source line.
///
/// `astrometric_primary_flag` is `False`, `duplicated_source` is `True` and
/// `phot_variable_flag` is `NOT_AVAILABLE`. Astrophysical parameters and
/// radial velocity are blank.
pub fn gaia_line(source_id: u64, ra_deg: f64, dec_deg: f64, g_mag: Option<f64>) -> String {
    let mut cols: Vec<String> = vec![String::new(); GAIA_COLUMNS.len()];
    cols[0] = "1635721458409799680".to_string();
    cols[1] = format!("Gaia DR2 {}", source_id);
    cols[2] = source_id.to_string();
    cols[3] = "1055".to_string();
    cols[4] = "2015.5".to_string();
    cols[5] = format!("{}", ra_deg);
    cols[6] = "0.0823".to_string();
    cols[7] = format!("{}", dec_deg);
    cols[8] = "0.0717".to_string();
    cols[9] = "1.8042".to_string();
    cols[10] = "0.1026".to_string();
    cols[11] = "17.58".to_string();
    cols[12] = "-3.1201".to_string();
    cols[13] = "0.1531".to_string();
    cols[14] = "-7.4420".to_string();
    cols[15] = "0.1302".to_string();
    for col in &mut cols[16..26] {
        *col = "0.1153".to_string();
    }
    cols[26] = "120".to_string();
    cols[27] = "0".to_string();
    cols[28] = "119".to_string();
    cols[29] = "1".to_string();
    cols[30] = "2.0412".to_string();
    cols[31] = "142.6".to_string();
    cols[32] = "0.0".to_string();
    cols[33] = "0.0".to_string();
    cols[34] = "31".to_string();
    cols[35] = "False".to_string();
    cols[36] = "12.07".to_string();
    cols[37] = "1.5611".to_string();
    cols[38] = "0.0271".to_string();
    cols[39] = "0.126".to_string();
    cols[40] = "14".to_string();
    cols[41] = "9".to_string();
    cols[42] = "0.2254".to_string();
    cols[43] = "0".to_string();
    cols[44] = "15".to_string();
    cols[45] = "True".to_string();
    cols[46] = "150".to_string();
    cols[47] = "1602.9".to_string();
    cols[48] = "1.75".to_string();
    cols[49] = "915.9".to_string();
    cols[50] = g_mag.map(|g| format!("{:.4}", g)).unwrap_or_default();
    cols[51] = "14".to_string();
    cols[52] = "573.4".to_string();
    cols[53] = "9.31".to_string();
    cols[54] = "61.6".to_string();
    cols[55] = "18.1402".to_string();
    cols[56] = "14".to_string();
    cols[57] = "1437.1".to_string();
    cols[58] = "8.22".to_string();
    cols[59] = "174.8".to_string();
    cols[60] = "16.9221".to_string();
    cols[61] = "1.2543".to_string();
    cols[62] = "0".to_string();
    cols[63] = "1.2181".to_string();
    cols[64] = "0.4935".to_string();
    cols[65] = "0.7246".to_string();
    cols[72] = "NOT_AVAILABLE".to_string();
    cols[73] = "176.7".to_string();
    cols[74] = "-48.6".to_string();
    cols[75] = "42.6".to_string();
    cols[76] = "-16.1".to_string();
    cols.join(",")
}
