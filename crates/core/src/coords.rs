//! Game-space and geodetic coordinate types.

use std::fmt;

use crate::units::{feet_to_meters, meters_to_feet};

/// Length unit attached to a game coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthUnit {
    /// Simulator feet (native unit of game space).
    #[default]
    Feet,
    Meters,
}

impl LengthUnit {
    pub fn label(self) -> &'static str {
        match self {
            LengthUnit::Feet => "feet",
            LengthUnit::Meters => "meters",
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A point in the simulator's planar space.
///
/// X grows east and Y grows north. The unit tag must be resolved with
/// [`GameCoordinate::to_feet`] before any feet-native computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameCoordinate {
    pub x: f64,
    pub y: f64,
    pub unit: LengthUnit,
}

impl GameCoordinate {
    pub fn new(x: f64, y: f64, unit: LengthUnit) -> Self {
        Self { x, y, unit }
    }

    pub fn feet(x: f64, y: f64) -> Self {
        Self::new(x, y, LengthUnit::Feet)
    }

    pub fn meters(x: f64, y: f64) -> Self {
        Self::new(x, y, LengthUnit::Meters)
    }

    /// Components in feet, converting if the coordinate is tagged in metres.
    pub fn to_feet(&self) -> (f64, f64) {
        match self.unit {
            LengthUnit::Feet => (self.x, self.y),
            LengthUnit::Meters => (meters_to_feet(self.x), meters_to_feet(self.y)),
        }
    }

    /// Components in metres, converting if the coordinate is tagged in feet.
    pub fn to_meters(&self) -> (f64, f64) {
        match self.unit {
            LengthUnit::Feet => (feet_to_meters(self.x), feet_to_meters(self.y)),
            LengthUnit::Meters => (self.x, self.y),
        }
    }

    /// Re-express the coordinate in the requested unit.
    pub fn in_unit(&self, unit: LengthUnit) -> Self {
        let (x, y) = match unit {
            LengthUnit::Feet => self.to_feet(),
            LengthUnit::Meters => self.to_meters(),
        };
        Self::new(x, y, unit)
    }
}

/// WGS84 latitude/longitude in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodeticCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeodeticCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Latitude and longitude as degrees/minutes/seconds.
    pub fn to_dms(&self) -> (Dms, Dms) {
        (
            Dms::from_decimal(self.latitude),
            Dms::from_decimal(self.longitude),
        )
    }

    /// Latitude and longitude as `(whole degrees, decimal minutes)` pairs.
    pub fn to_decimal_minutes(&self) -> ((i32, f64), (i32, f64)) {
        fn split(value: f64) -> (i32, f64) {
            let degrees = value.trunc();
            (degrees as i32, (value - degrees).abs() * 60.0)
        }
        (split(self.latitude), split(self.longitude))
    }
}

impl fmt::Display for GeodeticCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}°, {:.6}°", self.latitude, self.longitude)
    }
}

/// Sexagesimal angle. The sign lives in `negative`; the fields are magnitudes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dms {
    pub negative: bool,
    pub degrees: u32,
    pub minutes: u32,
    pub seconds: f64,
}

impl Dms {
    pub fn from_decimal(value: f64) -> Self {
        let magnitude = value.abs();
        let degrees = magnitude.trunc();
        let minutes_total = (magnitude - degrees) * 60.0;
        let minutes = minutes_total.trunc();
        Self {
            negative: value < 0.0,
            degrees: degrees as u32,
            minutes: minutes as u32,
            seconds: (minutes_total - minutes) * 60.0,
        }
    }

    pub fn to_decimal(&self) -> f64 {
        let magnitude = self.degrees as f64 + self.minutes as f64 / 60.0 + self.seconds / 3600.0;
        if self.negative { -magnitude } else { magnitude }
    }
}

impl fmt::Display for Dms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.negative { "-" } else { "" };
        write!(
            f,
            "{sign}{}° {}' {:.2}\"",
            self.degrees, self.minutes, self.seconds
        )
    }
}
