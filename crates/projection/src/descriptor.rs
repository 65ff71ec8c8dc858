//! Parser for PROJ-style projection descriptors.
//!
//! A descriptor is a whitespace-separated list of `+key=value` and `+flag` tokens,
//! e.g. `+proj=tmerc +lon_0=127.5 +ellps=WGS84 +k=0.9996 +units=m +x_0=512000 +y_0=-3.74929e+06`.
//! Only Transverse Mercator (`tmerc`) and UTM (`utm`) are understood.

use std::fmt;
use std::str::FromStr;

use crate::ProjectionError;
use crate::ellipsoid::Ellipsoid;

/// Scale factor used when a descriptor names none.
pub const DEFAULT_SCALE_FACTOR: f64 = theater_core::constants::TM_SCALE_FACTOR;
const UTM_FALSE_EASTING: f64 = 500_000.0;
const UTM_SOUTH_FALSE_NORTHING: f64 = 10_000_000.0;

/// Projection family named by `+proj`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionKind {
    TransverseMercator,
    Utm { zone: u8, south: bool },
}

/// Parsed descriptor: the ordered raw parameters plus the resolved projection constants.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionDescriptor {
    params: Vec<(String, Option<String>)>,
    kind: ProjectionKind,
    ellipsoid: Ellipsoid,
    lon_0: f64,
    lat_0: f64,
    k0: f64,
    x_0: f64,
    y_0: f64,
}

impl ProjectionDescriptor {
    pub fn parse(text: &str) -> Result<Self, ProjectionError> {
        let params = tokenize(text)?;
        let lookup = |key: &str| {
            params
                .iter()
                .rev()
                .find(|(k, _)| k == key)
                .and_then(|(_, v)| v.as_deref())
        };
        let flag = |key: &str| params.iter().any(|(k, _)| k == key);

        let ellipsoid = match lookup("ellps").or_else(|| lookup("datum")) {
            None => Ellipsoid::WGS84,
            Some(name) if name.eq_ignore_ascii_case("WGS84") => Ellipsoid::WGS84,
            Some(name) if name.eq_ignore_ascii_case("GRS80") => Ellipsoid::GRS80,
            Some(other) => return Err(ProjectionError::UnsupportedEllipsoid(other.to_string())),
        };
        if let Some(units) = lookup("units") {
            if units != "m" {
                return Err(ProjectionError::UnsupportedUnits(units.to_string()));
            }
        }

        let number = |key: &'static str| -> Result<Option<f64>, ProjectionError> {
            lookup(key).map(|value| parse_number(key, value)).transpose()
        };

        let proj = lookup("proj").ok_or(ProjectionError::MissingParameter("proj"))?;
        let descriptor = match proj {
            "tmerc" => ProjectionDescriptor {
                kind: ProjectionKind::TransverseMercator,
                ellipsoid,
                lon_0: number("lon_0")?.unwrap_or(0.0),
                lat_0: number("lat_0")?.unwrap_or(0.0),
                k0: number("k_0")?
                    .or(number("k")?)
                    .unwrap_or(DEFAULT_SCALE_FACTOR),
                x_0: number("x_0")?.unwrap_or(0.0),
                y_0: number("y_0")?.unwrap_or(0.0),
                params: Vec::new(),
            },
            "utm" => {
                let raw_zone = lookup("zone").ok_or(ProjectionError::MissingParameter("zone"))?;
                let zone = raw_zone
                    .parse::<u8>()
                    .ok()
                    .filter(|z| (1..=60).contains(z))
                    .ok_or_else(|| ProjectionError::InvalidValue {
                        key: "zone".to_string(),
                        value: raw_zone.to_string(),
                    })?;
                let south = flag("south");
                ProjectionDescriptor {
                    kind: ProjectionKind::Utm { zone, south },
                    ellipsoid,
                    lon_0: zone as f64 * 6.0 - 183.0,
                    lat_0: 0.0,
                    k0: DEFAULT_SCALE_FACTOR,
                    x_0: UTM_FALSE_EASTING,
                    y_0: if south { UTM_SOUTH_FALSE_NORTHING } else { 0.0 },
                    params: Vec::new(),
                }
            }
            other => return Err(ProjectionError::UnsupportedProjection(other.to_string())),
        };

        if !(descriptor.k0.is_finite() && descriptor.k0 > 0.0) {
            return Err(ProjectionError::InvalidValue {
                key: "k".to_string(),
                value: descriptor.k0.to_string(),
            });
        }

        Ok(ProjectionDescriptor {
            params,
            ..descriptor
        })
    }

    /// Raw value of a parameter as written (last occurrence wins).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Parameters in the order they were written.
    pub fn params(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn kind(&self) -> ProjectionKind {
        self.kind
    }

    pub fn ellipsoid(&self) -> Ellipsoid {
        self.ellipsoid
    }

    /// Central meridian in degrees (`lon_0`, or derived from the UTM zone).
    pub fn central_meridian(&self) -> f64 {
        self.lon_0
    }

    pub fn latitude_of_origin(&self) -> f64 {
        self.lat_0
    }

    pub fn scale_factor(&self) -> f64 {
        self.k0
    }

    pub fn false_easting(&self) -> f64 {
        self.x_0
    }

    pub fn false_northing(&self) -> f64 {
        self.y_0
    }
}

impl FromStr for ProjectionDescriptor {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ProjectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in &self.params {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            match value {
                Some(value) => write!(f, "+{key}={value}")?,
                None => write!(f, "+{key}")?,
            }
        }
        Ok(())
    }
}

fn tokenize(text: &str) -> Result<Vec<(String, Option<String>)>, ProjectionError> {
    let mut params = Vec::new();
    for token in text.split_whitespace() {
        let body = token
            .strip_prefix('+')
            .ok_or_else(|| ProjectionError::MalformedToken(token.to_string()))?;
        let (key, value) = match body.split_once('=') {
            Some((key, value)) => {
                if value.is_empty() {
                    return Err(ProjectionError::MalformedToken(token.to_string()));
                }
                (key, Some(value.to_string()))
            }
            None => (body, None),
        };
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ProjectionError::MalformedToken(token.to_string()));
        }
        params.push((key.to_string(), value));
    }
    if params.is_empty() {
        return Err(ProjectionError::MissingParameter("proj"));
    }
    Ok(params)
}

fn parse_number(key: &str, value: &str) -> Result<f64, ProjectionError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ProjectionError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
}
