//! Theater corner queries.

use std::fmt;

use theater_config::HeightmapBounds;
use theater_core::{GameCoordinate, GeodeticCoordinate, LengthUnit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    Southwest,
    Southeast,
    Northwest,
    Northeast,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::Southwest,
        Corner::Southeast,
        Corner::Northwest,
        Corner::Northeast,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Corner::Southwest => "SW",
            Corner::Southeast => "SE",
            Corner::Northwest => "NW",
            Corner::Northeast => "NE",
        }
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A bounds corner in game space together with its geodetic position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerPoint {
    pub game: GameCoordinate,
    pub geodetic: GeodeticCoordinate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corners {
    pub sw: CornerPoint,
    pub se: CornerPoint,
    pub nw: CornerPoint,
    pub ne: CornerPoint,
}

impl Corners {
    /// Build the four corners of `bounds` (game feet), converting each with `to_geodetic`.
    /// Game coordinates are reported in `unit`.
    pub fn from_bounds<F>(bounds: &HeightmapBounds, unit: LengthUnit, mut to_geodetic: F) -> Self
    where
        F: FnMut(&GameCoordinate) -> GeodeticCoordinate,
    {
        let mut point = |x: f64, y: f64| {
            let game = GameCoordinate::feet(x, y);
            CornerPoint {
                geodetic: to_geodetic(&game),
                game: game.in_unit(unit),
            }
        };
        Corners {
            sw: point(bounds.min_x, bounds.min_y),
            se: point(bounds.max_x, bounds.min_y),
            nw: point(bounds.min_x, bounds.max_y),
            ne: point(bounds.max_x, bounds.max_y),
        }
    }

    pub fn get(&self, corner: Corner) -> &CornerPoint {
        match corner {
            Corner::Southwest => &self.sw,
            Corner::Southeast => &self.se,
            Corner::Northwest => &self.nw,
            Corner::Northeast => &self.ne,
        }
    }

    /// Corners in SW, SE, NW, NE order.
    pub fn iter(&self) -> impl Iterator<Item = (Corner, &CornerPoint)> {
        Corner::ALL
            .into_iter()
            .map(move |corner| (corner, self.get(corner)))
    }
}
