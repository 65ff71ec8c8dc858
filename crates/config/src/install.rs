//! Parsers for the simulator's installation files.
//!
//! - `Theater.lst`: one theater definition (`.tdf`) path per line, relative to `Data/`.
//! - `*.tdf`: `keyword value` lines naming the theater and its data directories.
//! - `Theater.txt`: `Key = Value` (or `Key Value`) lines with centre, size, and projection.
//!
//! The files are Windows-authored, so readers tolerate invalid UTF-8 and `\` separators.

use std::path::{Path, PathBuf};

use crate::{ConfigError, RasterSize, TheaterRecord, theater_key};

/// Read a text file, replacing invalid UTF-8 sequences.
pub fn read_lossy(path: &Path) -> Result<String, ConfigError> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Theater definition paths listed in `Theater.lst`, with `/` separators.
pub fn parse_theater_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.replace('\\', "/"))
        .collect()
}

/// Fields of a `.tdf` theater definition used for configuration resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TheaterDefinition {
    pub name: Option<String>,
    pub description: Option<String>,
    pub campaign_dir: Option<String>,
    pub terrain_dir: Option<String>,
    pub magnetic_declination: Option<f64>,
}

impl TheaterDefinition {
    /// Lookup key derived from the theater name, or from the file stem.
    pub fn key(&self, tdf_path: &Path) -> Option<String> {
        self.name.as_deref().map(theater_key).or_else(|| {
            tdf_path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(|stem| stem.to_ascii_lowercase().replace(' ', "_"))
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == TheaterDefinition::default()
    }
}

/// Parse a `.tdf` file. Unknown keywords are ignored.
pub fn parse_tdf(contents: &str) -> TheaterDefinition {
    let mut def = TheaterDefinition::default();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((keyword, value)) = line.split_once(char::is_whitespace) else {
            continue;
        };
        let value = value.trim();
        match keyword.to_ascii_lowercase().as_str() {
            "name" => def.name = Some(value.to_string()),
            "desc" => def.description = Some(value.to_string()),
            "campaigndir" => def.campaign_dir = Some(value.replace('\\', "/")),
            "terraindir" => def.terrain_dir = Some(value.replace('\\', "/")),
            "magneticdeclination" => def.magnetic_declination = value.parse().ok(),
            _ => {}
        }
    }
    def
}

/// Parse `Theater.txt` into a partial record. `path` is only used in error messages.
pub fn parse_theater_txt(path: &Path, contents: &str) -> Result<TheaterRecord, ConfigError> {
    let mut record = TheaterRecord::default();
    for (index, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            continue;
        }
        let Some((key, value)) = split_setting(line) else {
            continue;
        };
        let number = |value: &str| {
            value.parse::<f64>().map_err(|_| ConfigError::Syntax {
                path: path.to_path_buf(),
                line: index + 1,
                message: format!("`{key}` expects a number, got `{value}`"),
            })
        };
        match normalized_key(key).as_str() {
            "centerlat" | "centerlatitude" => record.center_lat = Some(number(value)?),
            "centerlong" | "centerlon" | "centerlongitude" => {
                record.center_lon = Some(number(value)?)
            }
            "theatersizekm" | "theatersizeinkm" => record.theater_size_km = Some(number(value)?),
            "theatersizemeters" => record.theater_size_meters = Some(number(value)?),
            "mapsizeinpixels" | "mapsizepixels" | "heightmapsize" => {
                let side = number(value)?;
                if side.fract() != 0.0 || side < 0.0 || side > u32::MAX as f64 {
                    return Err(ConfigError::Syntax {
                        path: path.to_path_buf(),
                        line: index + 1,
                        message: format!("`{key}` must be a whole pixel count, got `{value}`"),
                    });
                }
                record.heightmap_size = Some(RasterSize::square(side as u32));
            }
            "meterres" => record.meter_res = Some(number(value)?),
            "gridtoft" => record.grid_to_ft = Some(number(value)?),
            "fttogrid" => record.ft_to_grid = Some(number(value)?),
            "projectionstring" => record.projection_string = Some(value.to_string()),
            "theatername" | "name" => record.name = Some(value.to_string()),
            _ => {}
        }
    }
    Ok(record)
}

/// Candidate `Theater.txt` locations for a terrain directory.
pub fn theater_txt_candidates(install_root: &Path, terrain_subdir: &str) -> [PathBuf; 2] {
    let terrain = install_root
        .join("Data")
        .join(crate::normalize_separators(terrain_subdir));
    [
        terrain.join("Theater.txt"),
        terrain.join("NewTerrain").join("Theater.txt"),
    ]
}

/// Location of `Theater.lst` under an installation root.
pub fn theater_list_path(install_root: &Path) -> PathBuf {
    install_root
        .join("Data")
        .join("TerrData")
        .join("TheaterDefinition")
        .join("Theater.lst")
}

fn split_setting(line: &str) -> Option<(&str, &str)> {
    let (key, value) = match line.split_once('=') {
        Some(pair) => pair,
        None => line.split_once(char::is_whitespace)?,
    };
    let (key, value) = (key.trim(), value.trim());
    if key.is_empty() || value.is_empty() {
        None
    } else {
        Some((key, value))
    }
}

fn normalized_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
