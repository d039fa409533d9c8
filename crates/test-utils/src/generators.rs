//! Generators for synthetic catalog inputs.
//!
//! UCAC4 records are encoded here by hand, byte offset by byte offset,
//! independently of the layout table in `zone-parser`, so decoding one with
//! the other checks the layout rather than restating it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Fields of a UCAC4 record that tests care about. Everything else in the
/// 78-byte record is written as zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ucac4Star {
    pub ra_mas: i32,
    /// South-polar distance in mas.
    pub spd_mas: i32,
    pub magm: u16,
    pub maga: u16,
    pub pmrac: i16,
    pub pmdc: i16,
    pub pts_key: u32,
    pub j_m: u16,
    pub h_m: u16,
    pub k_m: u16,
    /// B, V, g, r, i
    pub apasm: [u16; 5],
    pub apase: [i8; 5],
    pub rnm: u32,
    pub zn2: u16,
    pub rn2: u32,
}

impl Ucac4Star {
    /// A star at the given position with every magnitude missing.
    pub fn at(rnm: u32, ra_deg: f64, dec_deg: f64) -> Self {
        Self {
            ra_mas: (ra_deg * 3_600_000.0).round() as i32,
            spd_mas: ((dec_deg + 90.0) * 3_600_000.0).round() as i32,
            magm: 20_000,
            maga: 20_000,
            j_m: 20_000,
            h_m: 20_000,
            k_m: 20_000,
            apasm: [20_000; 5],
            apase: [99; 5],
            rnm,
            ..Self::default()
        }
    }

    pub fn ra_deg(&self) -> f64 {
        self.ra_mas as f64 / 3_600_000.0
    }

    pub fn dec_deg(&self) -> f64 {
        self.spd_mas as f64 / 3_600_000.0 - 90.0
    }

    /// Encode as a 78-byte little-endian record.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut b = vec![0u8; 78];
        b[0..4].copy_from_slice(&self.ra_mas.to_le_bytes());
        b[4..8].copy_from_slice(&self.spd_mas.to_le_bytes());
        b[8..10].copy_from_slice(&self.magm.to_le_bytes());
        b[10..12].copy_from_slice(&self.maga.to_le_bytes());
        b[24..26].copy_from_slice(&self.pmrac.to_le_bytes());
        b[26..28].copy_from_slice(&self.pmdc.to_le_bytes());
        b[30..34].copy_from_slice(&self.pts_key.to_le_bytes());
        b[34..36].copy_from_slice(&self.j_m.to_le_bytes());
        b[36..38].copy_from_slice(&self.h_m.to_le_bytes());
        b[38..40].copy_from_slice(&self.k_m.to_le_bytes());
        for (i, mag) in self.apasm.iter().enumerate() {
            let at = 46 + i * 2;
            b[at..at + 2].copy_from_slice(&mag.to_le_bytes());
        }
        for (i, err) in self.apase.iter().enumerate() {
            b[56 + i] = *err as u8;
        }
        b[68..72].copy_from_slice(&self.rnm.to_le_bytes());
        b[72..74].copy_from_slice(&self.zn2.to_le_bytes());
        b[74..78].copy_from_slice(&self.rn2.to_le_bytes());
        b
    }
}

/// A synthetic UCAC4 zone with a known number of stars per RA bin.
///
/// Stars within a bin are spread evenly across the degree and sorted by RA,
/// as in the real catalog. Star ids encode their bin:
/// `zone * 1_000_000 + bin * 1000 + k + 1`.
#[derive(Debug, Clone)]
pub struct SyntheticZone {
    pub zone: u16,
    pub stars: Vec<Ucac4Star>,
}

impl SyntheticZone {
    /// # Arguments
    ///
    /// * `zone` - Zone number, 1..=900
    /// * `dec_deg` - Declination shared by every star
    /// * `per_bin` - `(ra_bin, count)` pairs; bins not listed are empty
    pub fn new(zone: u16, dec_deg: f64, per_bin: &[(u16, usize)]) -> Self {
        let mut bins: Vec<(u16, usize)> = per_bin.to_vec();
        bins.sort_by_key(|(bin, _)| *bin);

        let mut stars = Vec::new();
        for (bin, count) in bins {
            for k in 0..count {
                let ra = bin as f64 + (k as f64 + 1.0) / (count as f64 + 1.0);
                let rnm = zone as u32 * 1_000_000 + bin as u32 * 1000 + k as u32 + 1;
                let mut star = Ucac4Star::at(rnm, ra, dec_deg);
                star.magm = 12_000 + k as u16;
                stars.push(star);
            }
        }
        Self { zone, stars }
    }

    /// Zone file contents.
    pub fn bytes(&self) -> Vec<u8> {
        self.stars.iter().flat_map(Ucac4Star::to_bytes).collect()
    }

    /// Index text: one `bin recordOffset` line for each of the 360 bins.
    pub fn index_text(&self) -> String {
        let mut out = String::new();
        for bin in 0..360u32 {
            let before = self
                .stars
                .iter()
                .filter(|s| (s.ra_deg().floor() as u32) < bin)
                .count();
            out.push_str(&format!("{} {}\n", bin, before));
        }
        out
    }

    /// Ids of the stars in bins `first..=last`.
    pub fn ids_in_bins(&self, first: u16, last: u16) -> Vec<u32> {
        self.stars
            .iter()
            .filter(|s| {
                let bin = s.ra_deg().floor() as u16;
                bin >= first && bin <= last
            })
            .map(|s| s.rnm)
            .collect()
    }

    /// Write `u4b/zNNN` under `root`, returning its path.
    pub fn write_zone(&self, root: &Path) -> io::Result<PathBuf> {
        let path = root.join("u4b").join(format!("z{:03}", self.zone));
        write_bytes(&path, &self.bytes())?;
        Ok(path)
    }

    /// Write `u4i/zNNN.idx` under `root`, returning its path.
    pub fn write_index(&self, root: &Path) -> io::Result<PathBuf> {
        let path = root.join("u4i").join(format!("z{:03}.idx", self.zone));
        write_bytes(&path, self.index_text().as_bytes())?;
        Ok(path)
    }
}

fn write_bytes(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, data)
}

/// Write text lines to `path`, creating parent directories.
pub fn write_lines(path: &Path, lines: &[&str]) -> io::Result<()> {
    let mut text = lines.join("\n");
    text.push('\n');
    write_bytes(path, text.as_bytes())
}

/// Builds one fixed-width text line by placing right-aligned values into
/// byte ranges of a blank line.
#[derive(Debug, Clone)]
pub struct FixedWidthLine {
    buf: Vec<u8>,
}

impl FixedWidthLine {
    pub fn new(width: usize) -> Self {
        Self {
            buf: vec![b' '; width],
        }
    }

    /// Place `text` right-aligned in `start..end`.
    ///
    /// Panics if the text does not fit.
    pub fn put(mut self, start: usize, end: usize, text: &str) -> Self {
        assert!(
            text.len() <= end - start && end <= self.buf.len(),
            "'{}' does not fit in {}..{}",
            text,
            start,
            end
        );
        let at = end - text.len();
        self.buf[at..end].copy_from_slice(text.as_bytes());
        self
    }

    pub fn build(self) -> String {
        String::from_utf8_lossy(&self.buf).into_owned()
    }
}
