//! Core units, constants, and coordinate types for the theater_geo workspace.

pub mod coords;

pub use coords::{Dms, GameCoordinate, GeodeticCoordinate, LengthUnit};

/// Constants shared by every conversion path.
pub mod constants {
    /// Metres per simulator foot.
    ///
    /// The simulator's foot is slightly longer than the international foot:
    /// a 1024 km theater spans exactly 3 358 699.5 game feet.
    pub const METERS_PER_FOOT: f64 = 0.304_879_909_6;
    /// Simulator feet per metre (reciprocal of [`METERS_PER_FOOT`]).
    pub const FEET_PER_METER: f64 = 1.0 / METERS_PER_FOOT;
    /// International foot, used only for presenting elevations in metres.
    pub const METERS_PER_INTERNATIONAL_FOOT: f64 = 0.3048;
    /// WGS84 semi-major axis (m).
    pub const WGS84_A: f64 = 6_378_137.0;
    /// WGS84 inverse flattening.
    pub const WGS84_INV_F: f64 = 298.257_223_563;
    /// Central scale factor of UTM and the simulator's Transverse Mercator theaters.
    pub const TM_SCALE_FACTOR: f64 = 0.9996;
}

/// Feet/metre conversion helpers.
///
/// Both directions go through [`constants::METERS_PER_FOOT`] so that
/// `feet_to_meters(meters_to_feet(v)) == v` up to rounding.
pub mod units {
    use super::constants::METERS_PER_FOOT;

    /// Convert simulator feet to metres.
    #[inline]
    pub fn feet_to_meters(feet: f64) -> f64 {
        feet * METERS_PER_FOOT
    }

    /// Convert metres to simulator feet.
    #[inline]
    pub fn meters_to_feet(meters: f64) -> f64 {
        meters / METERS_PER_FOOT
    }
}

/// Distance along the WGS84 meridian.
pub mod meridian {
    use super::constants::{WGS84_A, WGS84_INV_F};

    /// Meridian arc length in metres from the equator to `lat` (degrees).
    ///
    /// Helmert's series in the third flattening, good to well under a millimetre.
    pub fn arc_length(lat: f64) -> f64 {
        let f = 1.0 / WGS84_INV_F;
        let n = f / (2.0 - f);
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;
        let phi = lat.to_radians();

        WGS84_A / (1.0 + n)
            * ((1.0 + n2 / 4.0 + n4 / 64.0) * phi - 1.5 * (n - n3 / 8.0) * (2.0 * phi).sin()
                + 15.0 / 16.0 * (n2 - n4 / 4.0) * (4.0 * phi).sin()
                - 35.0 / 48.0 * n3 * (6.0 * phi).sin()
                + 315.0 / 512.0 * n4 * (8.0 * phi).sin())
    }
}

#[cfg(test)]
mod tests {
    use super::constants::TM_SCALE_FACTOR;
    use super::meridian::arc_length;

    #[test]
    fn meridian_arc_reference_values() {
        assert_eq!(arc_length(0.0), 0.0);
        assert!((arc_length(-38.5) + arc_length(38.5)).abs() < 1e-9);
        let northing = TM_SCALE_FACTOR * arc_length(38.5);
        assert!(
            (northing - 4_261_293.43).abs() < 0.01,
            "northing = {northing}"
        );
        let quadrant = arc_length(90.0);
        assert!(
            (quadrant - 10_001_965.729).abs() < 0.01,
            "quadrant = {quadrant}"
        );
    }
}
