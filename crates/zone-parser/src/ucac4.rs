//! UCAC4 zone file record layout.
//!
//! 78-byte little-endian records, one per star, sorted by RA within each of
//! the 900 declination zones. Zone `n` lives in `u4b/zNNN` and its RA bin
//! index in `u4i/zNNN.idx`.

use crate::layout::{PackedField, PackedLayout};
use catalog_common::CatalogResult;

/// Bytes per UCAC4 record.
pub const RECORD_WIDTH: usize = 78;

/// Number of declination zones (0.2 degrees each).
pub const ZONE_COUNT: u16 = 900;

/// Milliarcseconds per degree; RA and south-polar distance are stored in mas.
pub const MAS_PER_DEG: f64 = 3_600_000.0;

/// Magnitudes at or above this many millimag are missing.
pub const MAGNITUDE_SENTINEL: f64 = 20_000.0;

/// APASS magnitude error value meaning missing.
pub const APASS_ERROR_SENTINEL: f64 = 99.0;

/// (name, offset, width, signed)
const FIELDS: &[(&str, usize, usize, bool)] = &[
    ("ra", 0, 4, true),
    ("spd", 4, 4, true),
    ("magm", 8, 2, false),
    ("maga", 10, 2, false),
    ("sigmag", 12, 1, false),
    ("objt", 13, 1, false),
    ("cdf", 14, 1, false),
    ("sigra", 15, 1, true),
    ("sigdc", 16, 1, true),
    ("na1", 17, 1, false),
    ("nu1", 18, 1, false),
    ("cu1", 19, 1, false),
    ("cepra", 20, 2, false),
    ("cepdc", 22, 2, false),
    ("pmrac", 24, 2, true),
    ("pmdc", 26, 2, true),
    ("sigpmr", 28, 1, true),
    ("sigpmd", 29, 1, true),
    ("pts_key", 30, 4, false),
    ("j_m", 34, 2, false),
    ("h_m", 36, 2, false),
    ("k_m", 38, 2, false),
    ("icqflg_j", 40, 1, false),
    ("icqflg_h", 41, 1, false),
    ("icqflg_k", 42, 1, false),
    ("e2mpho_j", 43, 1, false),
    ("e2mpho_h", 44, 1, false),
    ("e2mpho_k", 45, 1, false),
    ("apasm_b", 46, 2, false),
    ("apasm_v", 48, 2, false),
    ("apasm_g", 50, 2, false),
    ("apasm_r", 52, 2, false),
    ("apasm_i", 54, 2, false),
    ("apase_b", 56, 1, true),
    ("apase_v", 57, 1, true),
    ("apase_g", 58, 1, true),
    ("apase_r", 59, 1, true),
    ("apase_i", 60, 1, true),
    ("gcflg", 61, 1, true),
    ("icf", 62, 4, false),
    ("leda", 66, 1, true),
    ("x2m", 67, 1, true),
    ("rnm", 68, 4, false),
    ("zn2", 72, 2, false),
    ("rn2", 74, 4, false),
];

/// The UCAC4 record layout.
pub fn layout() -> CatalogResult<PackedLayout> {
    PackedLayout::new(
        "ucac4",
        RECORD_WIDTH,
        FIELDS
            .iter()
            .map(|(name, offset, width, signed)| PackedField::new(*name, *offset, *width, *signed))
            .collect(),
    )
}

/// Zone file name for a zone number, e.g. `z001`.
pub fn zone_file_name(zone: u16) -> String {
    format!("z{:03}", zone)
}

/// Index file name for a zone number, e.g. `z001.idx`.
pub fn index_file_name(zone: u16) -> String {
    format!("z{:03}.idx", zone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{assert_approx_eq, Ucac4Star};

    #[test]
    fn test_layout_is_valid_and_contiguous() {
        let layout = layout().unwrap();
        assert_eq!(layout.record_width, 78);
        assert_eq!(layout.fields.len(), 45);
        assert!(layout.is_contiguous());
    }

    #[test]
    fn test_every_offset_pinned() {
        // Pinned individually so an accidental edit to the table fails loudly.
        let layout = layout().unwrap();
        let expect = |name: &str, offset: usize, width: usize, signed: bool| {
            let f = layout.field(name).unwrap();
            assert_eq!(
                (f.offset, f.width, f.signed),
                (offset, width, signed),
                "field {}",
                name
            );
        };
        expect("ra", 0, 4, true);
        expect("spd", 4, 4, true);
        expect("magm", 8, 2, false);
        expect("maga", 10, 2, false);
        expect("sigmag", 12, 1, false);
        expect("sigra", 15, 1, true);
        expect("cepra", 20, 2, false);
        expect("pmrac", 24, 2, true);
        expect("pmdc", 26, 2, true);
        expect("sigpmd", 29, 1, true);
        expect("pts_key", 30, 4, false);
        expect("j_m", 34, 2, false);
        expect("k_m", 38, 2, false);
        expect("icqflg_j", 40, 1, false);
        expect("e2mpho_k", 45, 1, false);
        expect("apasm_b", 46, 2, false);
        expect("apasm_i", 54, 2, false);
        expect("apase_b", 56, 1, true);
        expect("apase_i", 60, 1, true);
        expect("gcflg", 61, 1, true);
        expect("icf", 62, 4, false);
        expect("leda", 66, 1, true);
        expect("x2m", 67, 1, true);
        expect("rnm", 68, 4, false);
        expect("zn2", 72, 2, false);
        expect("rn2", 74, 4, false);
    }

    #[test]
    fn test_decode_independently_encoded_record() {
        let star = Ucac4Star {
            ra_mas: 123_456_789,
            spd_mas: 10_800_000,
            magm: 15_432,
            maga: 20_000,
            pmrac: -1234,
            pmdc: 567,
            pts_key: 0,
            j_m: 12_001,
            apasm: [14_000, 13_500, 20_000, 13_000, 12_900],
            apase: [5, 99, 7, 8, 9],
            rnm: 42_000_001,
            zn2: 450,
            rn2: 77,
            ..Ucac4Star::default()
        };
        let bytes = star.to_bytes();
        assert_eq!(bytes.len(), RECORD_WIDTH);

        let layout = layout().unwrap();
        let values: std::collections::HashMap<_, _> = layout.decode(&bytes).unwrap().into_iter().collect();
        assert_eq!(values["ra"], 123_456_789);
        assert_eq!(values["spd"], 10_800_000);
        assert_eq!(values["magm"], 15_432);
        assert_eq!(values["maga"], 20_000);
        assert_eq!(values["pmrac"], -1234);
        assert_eq!(values["pmdc"], 567);
        assert_eq!(values["pts_key"], 0);
        assert_eq!(values["j_m"], 12_001);
        assert_eq!(values["apasm_v"], 13_500);
        assert_eq!(values["apasm_i"], 12_900);
        assert_eq!(values["apase_v"], 99);
        assert_eq!(values["rnm"], 42_000_001);
        assert_eq!(values["zn2"], 450);
        assert_eq!(values["rn2"], 77);

        assert_approx_eq!(values["spd"] as f64 / MAS_PER_DEG - 90.0, -87.0, 1e-12);
    }

    #[test]
    fn test_file_names() {
        assert_eq!(zone_file_name(1), "z001");
        assert_eq!(zone_file_name(900), "z900");
        assert_eq!(index_file_name(42), "z042.idx");
    }
}
