//! Theater configuration models, validation, and loaders.
//!
//! A [`TheaterRecord`] is the loose, optional-heavy shape read from catalogs and
//! installation files. [`TheaterConfig`] is the validated, immutable value the
//! conversion and elevation crates borrow.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use theater_core::constants::{FEET_PER_METER, TM_SCALE_FACTOR};
use theater_core::units::meters_to_feet;
use theater_core::{GeodeticCoordinate, meridian};
use thiserror::Error;

pub mod builtin;
pub mod catalog;
pub mod install;

pub use catalog::TheaterCatalog;

/// Heightmap file name used when a theater does not name one.
pub const DEFAULT_HEIGHTMAP_FILE: &str = "HeightMaps/HeightMap.raw";

/// Raster dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "(u32, u32)")]
pub struct RasterSize {
    pub width: u32,
    pub height: u32,
}

impl From<(u32, u32)> for RasterSize {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

impl RasterSize {
    pub fn square(side: u32) -> Self {
        Self {
            width: side,
            height: side,
        }
    }
}

/// Raster extent in game feet. Both axes are inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct HeightmapBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl HeightmapBounds {
    pub fn square(max_feet: f64) -> Self {
        Self {
            min_x: 0.0,
            max_x: max_feet,
            min_y: 0.0,
            max_y: max_feet,
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn span_x(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn span_y(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Constants needed by the simulator-exact grid pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridParameters {
    pub theater_size_meters: f64,
    /// Metres per raster pixel.
    pub meter_res: f64,
    /// Game feet per grid unit.
    pub grid_to_ft: f64,
    pub ft_to_grid: f64,
    pub center_lat: f64,
    pub center_lon: f64,
}

/// Installation-relative locations of theater assets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TheaterPaths {
    pub terrain_subdir: Option<String>,
    pub campaign_subdir: Option<String>,
    pub heightmap_file: String,
}

impl TheaterPaths {
    /// `<root>/Data/<terrain_subdir>/<heightmap_file>`, if the terrain directory is known.
    pub fn heightmap(&self, install_root: &Path) -> Option<PathBuf> {
        let terrain = self.terrain_subdir.as_deref()?;
        Some(
            install_root
                .join("Data")
                .join(normalize_separators(terrain))
                .join(normalize_separators(&self.heightmap_file)),
        )
    }
}

/// Raw theater description as read from catalogs, built-in tables, or installation files.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TheaterRecord {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub projection_string: Option<String>,
    #[serde(default)]
    pub center_lat: Option<f64>,
    #[serde(default)]
    pub center_lon: Option<f64>,
    #[serde(default)]
    pub heightmap_size: Option<RasterSize>,
    #[serde(default)]
    pub heightmap_bounds: Option<HeightmapBounds>,
    #[serde(default)]
    pub theater_size_km: Option<f64>,
    #[serde(default)]
    pub theater_size_meters: Option<f64>,
    #[serde(default)]
    pub meter_res: Option<f64>,
    #[serde(default)]
    pub grid_to_ft: Option<f64>,
    #[serde(default)]
    pub ft_to_grid: Option<f64>,
    #[serde(default)]
    pub utm_zone: Option<u8>,
    #[serde(default)]
    pub campaign_subdir: Option<String>,
    #[serde(default)]
    pub terrain_subdir: Option<String>,
    #[serde(default)]
    pub heightmap_file: Option<String>,
}

impl TheaterRecord {
    /// Lookup key: the explicit key, or one derived from the display name.
    pub fn resolved_key(&self) -> Option<String> {
        self.key
            .as_deref()
            .map(str::to_ascii_lowercase)
            .or_else(|| self.name.as_deref().map(theater_key))
    }

    /// Field-wise merge: values present in `self` win over `base`.
    pub fn merged_over(self, base: TheaterRecord) -> TheaterRecord {
        TheaterRecord {
            key: self.key.or(base.key),
            name: self.name.or(base.name),
            projection_string: self.projection_string.or(base.projection_string),
            center_lat: self.center_lat.or(base.center_lat),
            center_lon: self.center_lon.or(base.center_lon),
            heightmap_size: self.heightmap_size.or(base.heightmap_size),
            heightmap_bounds: self.heightmap_bounds.or(base.heightmap_bounds),
            theater_size_km: self.theater_size_km.or(base.theater_size_km),
            theater_size_meters: self.theater_size_meters.or(base.theater_size_meters),
            meter_res: self.meter_res.or(base.meter_res),
            grid_to_ft: self.grid_to_ft.or(base.grid_to_ft),
            ft_to_grid: self.ft_to_grid.or(base.ft_to_grid),
            utm_zone: self.utm_zone.or(base.utm_zone),
            campaign_subdir: self.campaign_subdir.or(base.campaign_subdir),
            terrain_subdir: self.terrain_subdir.or(base.terrain_subdir),
            heightmap_file: self.heightmap_file.or(base.heightmap_file),
        }
    }
}

/// Validated, immutable theater configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TheaterConfig {
    key: String,
    name: String,
    projection_string: String,
    center: Option<GeodeticCoordinate>,
    heightmap_size: RasterSize,
    heightmap_bounds: HeightmapBounds,
    grid: Option<GridParameters>,
    utm_zone: Option<u8>,
    paths: TheaterPaths,
}

impl TheaterConfig {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn projection_string(&self) -> &str {
        &self.projection_string
    }

    /// Declared theater centre, if known.
    pub fn center(&self) -> Option<GeodeticCoordinate> {
        self.center
    }

    pub fn heightmap_size(&self) -> RasterSize {
        self.heightmap_size
    }

    pub fn heightmap_bounds(&self) -> &HeightmapBounds {
        &self.heightmap_bounds
    }

    /// Grid-exact constants; `None` when the theater lacks size or centre data.
    pub fn grid(&self) -> Option<&GridParameters> {
        self.grid.as_ref()
    }

    pub fn utm_zone(&self) -> Option<u8> {
        self.utm_zone
    }

    pub fn paths(&self) -> &TheaterPaths {
        &self.paths
    }
}

impl TryFrom<TheaterRecord> for TheaterConfig {
    type Error = ConfigError;

    fn try_from(record: TheaterRecord) -> Result<Self, Self::Error> {
        let key = record.resolved_key().ok_or(ConfigError::MissingField {
            theater: "<unnamed>".to_string(),
            field: "key",
        })?;
        let missing = |field: &'static str| ConfigError::MissingField {
            theater: key.clone(),
            field,
        };

        let projection_string = record
            .projection_string
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| missing("projection_string"))?
            .to_string();

        let heightmap_size = record
            .heightmap_size
            .ok_or_else(|| missing("heightmap_size"))?;
        if heightmap_size.width == 0 || heightmap_size.height == 0 {
            return Err(ConfigError::EmptyRaster {
                theater: key.clone(),
                width: heightmap_size.width,
                height: heightmap_size.height,
            });
        }

        let theater_size_meters = match (record.theater_size_meters, record.theater_size_km) {
            (Some(meters), _) => Some(meters),
            (None, Some(km)) => Some(km * 1_000.0),
            (None, None) => None,
        };
        if let Some(meters) = theater_size_meters {
            ensure_positive(&key, "theater_size_meters", meters)?;
        }

        let heightmap_bounds = record
            .heightmap_bounds
            .or_else(|| theater_size_meters.map(|m| HeightmapBounds::square(meters_to_feet(m))))
            .ok_or_else(|| missing("heightmap_bounds"))?;
        validate_axis(&key, "x", heightmap_bounds.min_x, heightmap_bounds.max_x)?;
        validate_axis(&key, "y", heightmap_bounds.min_y, heightmap_bounds.max_y)?;

        let center = match (record.center_lat, record.center_lon) {
            (Some(lat), Some(lon)) => Some(GeodeticCoordinate::new(lat, lon)),
            _ => None,
        };

        let grid = match (theater_size_meters, center) {
            (Some(size), Some(center)) => {
                let meter_res = record
                    .meter_res
                    .unwrap_or(size / heightmap_size.width as f64);
                let grid_to_ft = record.grid_to_ft.unwrap_or(meter_res * FEET_PER_METER);
                let ft_to_grid = record.ft_to_grid.unwrap_or(1.0 / grid_to_ft);
                ensure_positive(&key, "meter_res", meter_res)?;
                ensure_positive(&key, "grid_to_ft", grid_to_ft)?;
                ensure_positive(&key, "ft_to_grid", ft_to_grid)?;
                Some(GridParameters {
                    theater_size_meters: size,
                    meter_res,
                    grid_to_ft,
                    ft_to_grid,
                    center_lat: center.latitude,
                    center_lon: center.longitude,
                })
            }
            _ => None,
        };

        let utm_zone = record
            .utm_zone
            .or_else(|| zone_from_projection_string(&projection_string))
            .or_else(|| center.map(|c| utm_zone_for_longitude(c.longitude)));

        let name = record.name.unwrap_or_else(|| title_case(&key));
        let paths = TheaterPaths {
            terrain_subdir: record.terrain_subdir,
            campaign_subdir: record.campaign_subdir,
            heightmap_file: record
                .heightmap_file
                .unwrap_or_else(|| DEFAULT_HEIGHTMAP_FILE.to_string()),
        };

        Ok(TheaterConfig {
            key,
            name,
            projection_string,
            center,
            heightmap_size,
            heightmap_bounds,
            grid,
            utm_zone,
            paths,
        })
    }
}

/// Errors that can occur while loading or validating theater configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("theater `{theater}` is missing required field `{field}`")]
    MissingField {
        theater: String,
        field: &'static str,
    },
    #[error("theater `{theater}` has invalid {axis} bounds: min {min} must be below max {max}")]
    InvalidBounds {
        theater: String,
        axis: &'static str,
        min: f64,
        max: f64,
    },
    #[error("theater `{theater}` declares an empty raster ({width}x{height})")]
    EmptyRaster {
        theater: String,
        width: u32,
        height: u32,
    },
    #[error("theater `{theater}`: `{field}` must be positive and finite, got {value}")]
    InvalidValue {
        theater: String,
        field: &'static str,
        value: f64,
    },
    #[error("{path}:{line}: {message}")]
    Syntax {
        path: PathBuf,
        line: usize,
        message: String,
    },
    #[error("theater '{0}' not found in catalog, installation files, or built-in table")]
    UnknownTheater(String),
}

/// Load theater records from a YAML list, a single TOML file, or a directory of TOML files.
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<TheaterRecord>, ConfigError> {
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        let contents = std::fs::read_to_string(path)?;
        let record: TheaterRecord = toml::from_str(&contents)?;
        Ok(vec![record])
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn read_dir_records(dir: &Path) -> Result<Vec<TheaterRecord>, ConfigError> {
    let mut records = Vec::new();
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().map(|ext| ext == "toml").unwrap_or(false))
        .collect();
    entries.sort();
    for path in entries {
        let contents = std::fs::read_to_string(&path)?;
        let mut record: TheaterRecord = toml::from_str(&contents)?;
        if record.key.is_none() && record.name.is_none() {
            record.key = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(str::to_ascii_lowercase);
        }
        records.push(record);
    }
    Ok(records)
}

/// Normalize a display name into a lookup key: lowercase, runs of
/// non-alphanumerics collapsed to `_`, no leading or trailing `_`.
pub fn theater_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            key.push(ch.to_ascii_lowercase());
        } else if !key.ends_with('_') {
            key.push('_');
        }
    }
    key.trim_matches('_').to_string()
}

/// UTM zone number containing the given longitude.
pub fn utm_zone_for_longitude(lon: f64) -> u8 {
    let zone = ((lon + 180.0) / 6.0).floor() as i32 + 1;
    zone.clamp(1, 60) as u8
}

/// Northing, in metres, at which generated descriptors place the theater centre.
pub const CENTER_NORTHING: f64 = 512_000.0;

/// Transverse Mercator descriptor centred on a theater.
///
/// The central meridian is the centre longitude, the false easting is 512 km and
/// the false northing puts the centre at [`CENTER_NORTHING`]. A centre that cannot
/// be projected gets the enclosing UTM zone instead.
pub fn center_projection_string(lat: f64, lon: f64) -> String {
    if !(lat.is_finite() && lon.is_finite() && lat.abs() < 90.0) {
        return utm_projection_string(lat, lon);
    }
    let y_0 = CENTER_NORTHING - TM_SCALE_FACTOR * meridian::arc_length(lat);
    format!(
        "+proj=tmerc +lon_0={lon} +ellps=WGS84 +k={TM_SCALE_FACTOR} +units=m +x_0=512000 +y_0={y_0:.5e}"
    )
}

/// UTM descriptor for the zone containing `lon`, southern hemisphere when `lat < 0`.
pub fn utm_projection_string(lat: f64, lon: f64) -> String {
    let zone = utm_zone_for_longitude(lon);
    let south = if lat < 0.0 { " +south" } else { "" };
    format!("+proj=utm +zone={zone}{south} +datum=WGS84 +units=m +no_defs")
}

fn zone_from_projection_string(projection: &str) -> Option<u8> {
    projection
        .split_whitespace()
        .find_map(|token| token.strip_prefix("+zone="))
        .and_then(|zone| zone.parse().ok())
}

fn validate_axis(theater: &str, axis: &'static str, min: f64, max: f64) -> Result<(), ConfigError> {
    if min.is_finite() && max.is_finite() && min < max {
        Ok(())
    } else {
        Err(ConfigError::InvalidBounds {
            theater: theater.to_string(),
            axis,
            min,
            max,
        })
    }
}

fn ensure_positive(theater: &str, field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            theater: theater.to_string(),
            field,
            value,
        })
    }
}

fn title_case(key: &str) -> String {
    key.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn normalize_separators(path: &str) -> PathBuf {
    path.split(['/', '\\'])
        .filter(|part| !part.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn korea_like() -> TheaterRecord {
        TheaterRecord {
            key: Some("korea".into()),
            projection_string: Some("+proj=tmerc +lon_0=127.5 +k=0.9996".into()),
            center_lat: Some(38.5),
            center_lon: Some(127.5),
            heightmap_size: Some(RasterSize::square(32768)),
            theater_size_km: Some(1024.0),
            ..TheaterRecord::default()
        }
    }

    #[test]
    fn derives_grid_constants_and_bounds_from_theater_size() {
        let config = TheaterConfig::try_from(korea_like()).expect("valid record");
        let grid = config.grid().expect("grid parameters");
        assert_eq!(grid.theater_size_meters, 1_024_000.0);
        assert!((grid.meter_res - 31.25).abs() < 1e-12);
        assert!((grid.grid_to_ft * grid.ft_to_grid - 1.0).abs() < 1e-12);
        let bounds = config.heightmap_bounds();
        assert!(
            (bounds.max_x - 3_358_699.5).abs() < 0.1,
            "max_x = {}",
            bounds.max_x
        );
        assert_eq!(config.name(), "Korea");
        assert_eq!(config.utm_zone(), Some(52));
    }

    #[test]
    fn missing_center_disables_grid_parameters() {
        let record = TheaterRecord {
            center_lat: None,
            ..korea_like()
        };
        let config = TheaterConfig::try_from(record).expect("valid record");
        assert!(config.grid().is_none());
        assert!(config.center().is_none());
    }

    #[test]
    fn rejects_inverted_bounds() {
        let record = TheaterRecord {
            heightmap_bounds: Some(HeightmapBounds {
                min_x: 10.0,
                max_x: 5.0,
                min_y: 0.0,
                max_y: 1.0,
            }),
            ..korea_like()
        };
        let err = TheaterConfig::try_from(record).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBounds { axis: "x", .. }));
    }

    #[test]
    fn rejects_empty_raster() {
        let record = TheaterRecord {
            heightmap_size: Some(RasterSize {
                width: 0,
                height: 10,
            }),
            ..korea_like()
        };
        assert!(matches!(
            TheaterConfig::try_from(record),
            Err(ConfigError::EmptyRaster { width: 0, .. })
        ));
    }

    #[test]
    fn centre_descriptor_is_transverse_mercator_on_the_centre() {
        assert_eq!(
            center_projection_string(38.5, 127.5),
            "+proj=tmerc +lon_0=127.5 +ellps=WGS84 +k=0.9996 +units=m +x_0=512000 +y_0=-3.74929e6"
        );
        assert!(center_projection_string(38.0, 25.0).starts_with("+proj=tmerc +lon_0=25 "));
    }

    #[test]
    fn unprojectable_centre_falls_back_to_utm() {
        assert_eq!(
            center_projection_string(f64::NAN, 25.0),
            "+proj=utm +zone=35 +datum=WGS84 +units=m +no_defs"
        );
        assert!(center_projection_string(-95.0, 151.0).starts_with("+proj=utm +zone=56 +south"));
    }

    #[test]
    fn theater_keys_are_normalized() {
        assert_eq!(theater_key("Korea KTO"), "korea_kto");
        assert_eq!(theater_key("  Add-On Balkans! "), "add_on_balkans");
    }

    #[test]
    fn heightmap_path_joins_mixed_separators() {
        let paths = TheaterPaths {
            terrain_subdir: Some("TerrData\\Korea/NewTerrain".into()),
            campaign_subdir: None,
            heightmap_file: DEFAULT_HEIGHTMAP_FILE.into(),
        };
        let path = paths.heightmap(Path::new("/bms")).expect("terrain dir set");
        assert_eq!(
            path,
            Path::new("/bms/Data/TerrData/Korea/NewTerrain/HeightMaps/HeightMap.raw")
        );
    }
}
