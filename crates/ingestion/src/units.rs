//! Work units: the independent pieces a catalog is ingested in.
//!
//! Text catalogs are split into per-region files addressed by declination
//! band, declination sub-band and RA band. The binary catalog is split into
//! 900 declination zones. Single-file and single-directory catalogs have
//! one unit.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use catalog_common::{CatalogError, CatalogResult};
use zone_parser::ucac4;

/// Declination bands of a region grid.
pub const DEC_BANDS: u16 = 180;
/// Sub-bands per declination band.
pub const DEC_SUB_BANDS: u16 = 10;
/// RA bands per declination sub-band.
pub const RA_BANDS: u16 = 360;
/// Zone numbers run `1..=ZONE_COUNT`.
pub const ZONE_COUNT: u16 = ucac4::ZONE_COUNT;

/// Directory of binary zone files under the data root.
pub const ZONE_DIR: &str = "u4b";
/// Directory of zone index files under the data root.
pub const ZONE_INDEX_DIR: &str = "u4i";

/// How a catalog's files are arranged under the data root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnitLayout {
    /// `ddd/dddd/rrr.<extension>` region files.
    Regions { extension: String },
    /// `u4b/zNNN` zone files with `u4i/zNNN.idx` indexes.
    Zones,
    /// One file holding the whole catalog.
    SingleFile { file_name: String },
    /// One directory of files holding the whole catalog.
    Directory { dir_name: String },
}

/// One independently ingestible piece of a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkUnit {
    Region {
        dec_band: u16,
        dec_sub_band: u16,
        ra_band: u16,
    },
    Zone {
        zone: u16,
        /// Inclusive RA bins to read; the whole zone when absent.
        #[serde(default)]
        ra_bins: Option<RangeInclusive<u16>>,
    },
    File {
        path: PathBuf,
    },
    Directory {
        path: PathBuf,
    },
}

impl fmt::Display for WorkUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkUnit::Region {
                dec_band,
                dec_sub_band,
                ra_band,
            } => write!(f, "region {:03}/{:04}/{:03}", dec_band, dec_sub_band, ra_band),
            WorkUnit::Zone { zone, ra_bins: None } => write!(f, "zone {:03}", zone),
            WorkUnit::Zone {
                zone,
                ra_bins: Some(bins),
            } => write!(f, "zone {:03} bins {}..={}", zone, bins.start(), bins.end()),
            WorkUnit::File { path } => write!(f, "file {}", path.display()),
            WorkUnit::Directory { path } => write!(f, "directory {}", path.display()),
        }
    }
}

/// Files backing a work unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitPaths {
    pub data: PathBuf,
    /// Zone index, for zone units.
    pub index: Option<PathBuf>,
}

fn resolve_against(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

impl WorkUnit {
    pub fn region(dec_band: u16, dec_sub_band: u16, ra_band: u16) -> Self {
        WorkUnit::Region {
            dec_band,
            dec_sub_band,
            ra_band,
        }
    }

    pub fn zone(zone: u16) -> Self {
        WorkUnit::Zone { zone, ra_bins: None }
    }

    /// Check the unit's address is inside its grid.
    pub fn validate(&self) -> CatalogResult<()> {
        match self {
            WorkUnit::Region {
                dec_band,
                dec_sub_band,
                ra_band,
            } => {
                if *dec_band >= DEC_BANDS || *dec_sub_band >= DEC_SUB_BANDS || *ra_band >= RA_BANDS {
                    return Err(CatalogError::UnitNotFound(format!(
                        "{} is outside the region grid",
                        self
                    )));
                }
            }
            WorkUnit::Zone { zone, ra_bins } => {
                if !(1..=ZONE_COUNT).contains(zone) {
                    return Err(CatalogError::UnitNotFound(format!(
                        "zone {} outside 1..={}",
                        zone, ZONE_COUNT
                    )));
                }
                if let Some(bins) = ra_bins {
                    if *bins.end() >= RA_BANDS {
                        return Err(CatalogError::InvalidBin(*bins.end() as i64));
                    }
                    if bins.start() > bins.end() {
                        return Err(CatalogError::InvalidBin(*bins.start() as i64));
                    }
                }
            }
            WorkUnit::File { .. } | WorkUnit::Directory { .. } => {}
        }
        Ok(())
    }

    /// Locate the unit's files under `root`.
    pub fn resolve(&self, root: &Path, layout: &UnitLayout) -> CatalogResult<UnitPaths> {
        self.validate()?;
        match (self, layout) {
            (
                WorkUnit::Region {
                    dec_band,
                    dec_sub_band,
                    ra_band,
                },
                UnitLayout::Regions { extension },
            ) => Ok(UnitPaths {
                data: region_path(root, *dec_band, *dec_sub_band, *ra_band, extension),
                index: None,
            }),
            (WorkUnit::Zone { zone, .. }, UnitLayout::Zones) => Ok(UnitPaths {
                data: root.join(ZONE_DIR).join(ucac4::zone_file_name(*zone)),
                index: Some(root.join(ZONE_INDEX_DIR).join(ucac4::index_file_name(*zone))),
            }),
            (WorkUnit::File { path }, _) | (WorkUnit::Directory { path }, _) => Ok(UnitPaths {
                data: resolve_against(root, path),
                index: None,
            }),
            (unit, layout) => Err(CatalogError::UnitNotFound(format!(
                "{} cannot be addressed in a {:?} layout",
                unit, layout
            ))),
        }
    }
}

fn region_path(root: &Path, dec_band: u16, dec_sub_band: u16, ra_band: u16, extension: &str) -> PathBuf {
    root.join(format!("{:03}", dec_band))
        .join(format!("{:04}", dec_sub_band))
        .join(format!("{:03}.{}", ra_band, extension))
}

/// Files of a directory unit, in sorted order, including links to files.
pub fn directory_files(dir: &Path) -> CatalogResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(CatalogError::UnitNotFound(dir.display().to_string()));
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            CatalogError::Io(std::io::Error::other(format!("walking {}: {}", dir.display(), e)))
        })?;
        // symlinks are listed unless they lead to a directory; a broken one
        // fails when it is read
        if entry.file_type().is_file() || (entry.path_is_symlink() && !entry.path().is_dir()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Which units to ingest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSelection {
    Explicit(Vec<WorkUnit>),
    /// Contiguous declination bands (regions) or zones, `start..end`.
    Range { start: u16, end: u16 },
    /// Reproducible sample without replacement.
    Random { count: usize, seed: u64 },
    All,
}

impl UnitSelection {
    /// Expand to concrete units.
    ///
    /// Region ranges and `All` only list region files that exist; explicit
    /// and random selections are returned as asked so missing units are
    /// reported as failures. Explicit units are not checked here either: an
    /// out-of-grid unit fails on its own when it is ingested.
    pub fn expand(&self, layout: &UnitLayout, root: &Path) -> CatalogResult<Vec<WorkUnit>> {
        let units = match (self, layout) {
            (UnitSelection::Explicit(units), _) => units.clone(),

            (_, UnitLayout::SingleFile { file_name }) => vec![WorkUnit::File {
                path: PathBuf::from(file_name),
            }],
            (_, UnitLayout::Directory { dir_name }) => vec![WorkUnit::Directory {
                path: PathBuf::from(dir_name),
            }],

            (UnitSelection::Range { start, end }, UnitLayout::Regions { extension }) => {
                let end = (*end).min(DEC_BANDS);
                existing_regions(root, extension, *start..end)
            }
            (UnitSelection::Range { start, end }, UnitLayout::Zones) => {
                let start = (*start).max(1);
                let end = (*end).min(ZONE_COUNT + 1);
                (start..end).map(WorkUnit::zone).collect()
            }

            (UnitSelection::Random { count, seed }, UnitLayout::Regions { .. }) => {
                let cells = DEC_BANDS as usize * DEC_SUB_BANDS as usize * RA_BANDS as usize;
                sample(cells, *count, *seed)
                    .into_iter()
                    .map(|cell| {
                        let ra_band = (cell % RA_BANDS as usize) as u16;
                        let rest = cell / RA_BANDS as usize;
                        let dec_sub_band = (rest % DEC_SUB_BANDS as usize) as u16;
                        let dec_band = (rest / DEC_SUB_BANDS as usize) as u16;
                        WorkUnit::region(dec_band, dec_sub_band, ra_band)
                    })
                    .collect()
            }
            (UnitSelection::Random { count, seed }, UnitLayout::Zones) => {
                sample(ZONE_COUNT as usize, *count, *seed)
                    .into_iter()
                    .map(|i| WorkUnit::zone(i as u16 + 1))
                    .collect()
            }

            (UnitSelection::All, UnitLayout::Regions { extension }) => {
                existing_regions(root, extension, 0..DEC_BANDS)
            }
            (UnitSelection::All, UnitLayout::Zones) => (1..=ZONE_COUNT).map(WorkUnit::zone).collect(),
        };

        debug!(selection = ?self, units = units.len(), "Expanded work selection");
        Ok(units)
    }
}

/// Sorted sample of `count` distinct indices below `population`.
fn sample(population: usize, count: usize, seed: u64) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut picked = rand::seq::index::sample(&mut rng, population, count.min(population)).into_vec();
    picked.sort_unstable();
    picked
}

fn existing_regions(root: &Path, extension: &str, dec_bands: std::ops::Range<u16>) -> Vec<WorkUnit> {
    let mut units = Vec::new();
    for dec_band in dec_bands {
        if !root.join(format!("{:03}", dec_band)).is_dir() {
            continue;
        }
        for dec_sub_band in 0..DEC_SUB_BANDS {
            for ra_band in 0..RA_BANDS {
                if region_path(root, dec_band, dec_sub_band, ra_band, extension).is_file() {
                    units.push(WorkUnit::region(dec_band, dec_sub_band, ra_band));
                }
            }
        }
    }
    units
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::write_lines;

    fn regions() -> UnitLayout {
        UnitLayout::Regions {
            extension: "dat".into(),
        }
    }

    #[test]
    fn test_region_path() {
        let paths = WorkUnit::region(7, 3, 42)
            .resolve(Path::new("/data/2mass"), &regions())
            .unwrap();
        assert_eq!(paths.data, PathBuf::from("/data/2mass/007/0003/042.dat"));
        assert!(paths.index.is_none());
    }

    #[test]
    fn test_zone_paths() {
        let paths = WorkUnit::zone(12)
            .resolve(Path::new("/data/ucac4"), &UnitLayout::Zones)
            .unwrap();
        assert_eq!(paths.data, PathBuf::from("/data/ucac4/u4b/z012"));
        assert_eq!(paths.index, Some(PathBuf::from("/data/ucac4/u4i/z012.idx")));
    }

    #[test]
    fn test_out_of_grid() {
        assert!(WorkUnit::region(180, 0, 0).validate().is_err());
        assert!(WorkUnit::region(0, 10, 0).validate().is_err());
        assert!(WorkUnit::region(0, 0, 360).validate().is_err());
        assert!(WorkUnit::zone(0).validate().is_err());
        assert!(WorkUnit::zone(901).validate().is_err());
        assert!(WorkUnit::zone(900).validate().is_ok());
        assert!(matches!(
            WorkUnit::Zone {
                zone: 5,
                ra_bins: Some(10..=360)
            }
            .validate(),
            Err(CatalogError::InvalidBin(360))
        ));
    }

    #[test]
    fn test_layout_mismatch() {
        assert!(WorkUnit::zone(1).resolve(Path::new("/"), &regions()).is_err());
    }

    #[test]
    fn test_relative_file_resolves_under_root() {
        let unit = WorkUnit::File {
            path: PathBuf::from("hip_main.csv"),
        };
        let layout = UnitLayout::SingleFile {
            file_name: "hip_main.csv".into(),
        };
        assert_eq!(
            unit.resolve(Path::new("/data/hip"), &layout).unwrap().data,
            PathBuf::from("/data/hip/hip_main.csv")
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(WorkUnit::region(1, 2, 3).to_string(), "region 001/0002/003");
        assert_eq!(
            WorkUnit::Zone {
                zone: 9,
                ra_bins: Some(10..=12)
            }
            .to_string(),
            "zone 009 bins 10..=12"
        );
    }

    #[test]
    fn test_random_is_reproducible_and_distinct() {
        let root = Path::new("/nowhere");
        let a = UnitSelection::Random { count: 50, seed: 7 }
            .expand(&UnitLayout::Zones, root)
            .unwrap();
        let b = UnitSelection::Random { count: 50, seed: 7 }
            .expand(&UnitLayout::Zones, root)
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 50);
        let mut zones: Vec<u16> = a
            .iter()
            .map(|u| match u {
                WorkUnit::Zone { zone, .. } => *zone,
                _ => panic!("not a zone"),
            })
            .collect();
        zones.dedup();
        assert_eq!(zones.len(), 50);

        let regions = UnitSelection::Random { count: 20, seed: 1 }
            .expand(&regions(), root)
            .unwrap();
        assert_eq!(regions.len(), 20);
    }

    #[test]
    fn test_explicit_keeps_out_of_grid_units() {
        let units = vec![WorkUnit::zone(3), WorkUnit::zone(901)];
        let expanded = UnitSelection::Explicit(units.clone())
            .expand(&UnitLayout::Zones, Path::new("/"))
            .unwrap();
        assert_eq!(expanded, units);
    }

    #[test]
    fn test_random_clamps_to_population() {
        let all = UnitSelection::Random { count: 5000, seed: 3 }
            .expand(&UnitLayout::Zones, Path::new("/"))
            .unwrap();
        assert_eq!(all.len(), ZONE_COUNT as usize);
    }

    #[test]
    fn test_zone_range_and_all() {
        let root = Path::new("/");
        let range = UnitSelection::Range { start: 0, end: 4 }
            .expand(&UnitLayout::Zones, root)
            .unwrap();
        assert_eq!(range, vec![WorkUnit::zone(1), WorkUnit::zone(2), WorkUnit::zone(3)]);
        assert_eq!(
            UnitSelection::All.expand(&UnitLayout::Zones, root).unwrap().len(),
            900
        );
    }

    #[test]
    fn test_region_range_lists_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        write_lines(&dir.path().join("001/0000/010.dat"), &["x"]).unwrap();
        write_lines(&dir.path().join("001/0009/359.dat"), &["x"]).unwrap();
        write_lines(&dir.path().join("002/0000/000.dat"), &["x"]).unwrap();
        write_lines(&dir.path().join("001/0000/011.csv"), &["x"]).unwrap();

        let units = UnitSelection::Range { start: 1, end: 2 }
            .expand(&regions(), dir.path())
            .unwrap();
        assert_eq!(
            units,
            vec![WorkUnit::region(1, 0, 10), WorkUnit::region(1, 9, 359)]
        );
        assert_eq!(UnitSelection::All.expand(&regions(), dir.path()).unwrap().len(), 3);
    }

    #[test]
    fn test_single_file_selection() {
        let layout = UnitLayout::SingleFile {
            file_name: "sao.dat".into(),
        };
        assert_eq!(
            UnitSelection::All.expand(&layout, Path::new("/")).unwrap(),
            vec![WorkUnit::File {
                path: PathBuf::from("sao.dat")
            }]
        );
    }

    #[test]
    fn test_directory_layout_selection() {
        let layout = UnitLayout::Directory {
            dir_name: "gaia_source".into(),
        };
        let expected = vec![WorkUnit::Directory {
            path: PathBuf::from("gaia_source"),
        }];
        assert_eq!(UnitSelection::All.expand(&layout, Path::new("/")).unwrap(), expected);
        assert_eq!(
            UnitSelection::Random { count: 3, seed: 1 }
                .expand(&layout, Path::new("/"))
                .unwrap(),
            expected
        );
        assert_eq!(
            expected[0].resolve(Path::new("/data/gaia"), &layout).unwrap().data,
            PathBuf::from("/data/gaia/gaia_source")
        );
    }

    #[test]
    fn test_directory_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write_lines(&dir.path().join("b/2.dat"), &["x"]).unwrap();
        write_lines(&dir.path().join("a/1.dat"), &["x"]).unwrap();
        write_lines(&dir.path().join("a/0.dat"), &["x"]).unwrap();
        let files = directory_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a/0.dat"),
                PathBuf::from("a/1.dat"),
                PathBuf::from("b/2.dat")
            ]
        );
        assert!(matches!(
            directory_files(&dir.path().join("missing")),
            Err(CatalogError::UnitNotFound(_))
        ));
    }
}
