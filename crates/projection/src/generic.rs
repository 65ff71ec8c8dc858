//! Nominal Transverse Mercator/UTM projection (USGS series, Snyder 1987).
//!
//! Game metres are fed straight into the descriptor's projection, including its
//! false easting and northing. Not bit-compatible with the simulator's grid pipeline.

use theater_config::HeightmapBounds;
use theater_core::{GeodeticCoordinate, LengthUnit};

use crate::ProjectionError;
use crate::corners::Corners;
use crate::descriptor::ProjectionDescriptor;

const MAX_REFINEMENTS: usize = 4;

/// Generic forward/inverse projection parameterized by a [`ProjectionDescriptor`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionEngine {
    descriptor: ProjectionDescriptor,
    a: f64,
    e2: f64,
    ep2: f64,
    lon_0: f64,
    k0: f64,
    x_0: f64,
    y_0: f64,
    /// Meridian arc length at `lat_0`.
    m0: f64,
}

impl ProjectionEngine {
    pub fn new(descriptor: ProjectionDescriptor) -> Self {
        let ellipsoid = descriptor.ellipsoid();
        let e2 = ellipsoid.e2();
        let lat_0 = descriptor.latitude_of_origin().to_radians();
        let m0 = meridian_arc(ellipsoid.a, e2, lat_0);
        Self {
            a: ellipsoid.a,
            e2,
            ep2: ellipsoid.ep2(),
            lon_0: descriptor.central_meridian(),
            k0: descriptor.scale_factor(),
            x_0: descriptor.false_easting(),
            y_0: descriptor.false_northing(),
            m0,
            descriptor,
        }
    }

    pub fn from_projection_string(text: &str) -> Result<Self, ProjectionError> {
        Ok(Self::new(ProjectionDescriptor::parse(text)?))
    }

    pub fn descriptor(&self) -> &ProjectionDescriptor {
        &self.descriptor
    }

    /// Project latitude/longitude (degrees) to easting/northing (metres).
    pub fn forward(&self, lat: f64, lon: f64) -> (f64, f64) {
        let phi = lat.to_radians();
        let (sin_phi, cos_phi) = phi.sin_cos();
        let tan_phi = phi.tan();
        let ep2 = self.ep2;

        let n = self.a / (1.0 - self.e2 * sin_phi * sin_phi).sqrt();
        let t = tan_phi * tan_phi;
        let c = ep2 * cos_phi * cos_phi;
        let a = cos_phi * (lon - self.lon_0).to_radians();
        let m = meridian_arc(self.a, self.e2, phi);

        let a2 = a * a;
        let a3 = a2 * a;
        let a4 = a3 * a;
        let a5 = a4 * a;
        let a6 = a5 * a;

        let x = self.x_0
            + self.k0
                * n
                * (a + (1.0 - t + c) * a3 / 6.0
                    + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a5 / 120.0);
        let y = self.y_0
            + self.k0
                * (m - self.m0
                    + n * tan_phi
                        * (a2 / 2.0
                            + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                            + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a6 / 720.0));
        (x, y)
    }

    /// Unproject easting/northing (metres) to latitude/longitude.
    ///
    /// The footpoint series alone drifts by microdegrees several degrees off the
    /// central meridian, so the estimate is refined until it reprojects onto `(x, y)`.
    pub fn inverse(&self, x: f64, y: f64) -> GeodeticCoordinate {
        let (lat0, lon0) = self.series_inverse(x, y);
        let (mut lat, mut lon) = (lat0, lon0);
        for _ in 0..MAX_REFINEMENTS {
            let (fx, fy) = self.forward(lat, lon);
            let (rlat, rlon) = self.series_inverse(fx, fy);
            let (dlat, dlon) = (lat0 - rlat, lon0 - rlon);
            lat += dlat;
            lon += dlon;
            if dlat.abs().max(dlon.abs()) < 1e-13 {
                break;
            }
        }
        GeodeticCoordinate::new(lat, lon)
    }

    fn series_inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let e2 = self.e2;
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        let ep2 = self.ep2;

        let m = self.m0 + (y - self.y_0) / self.k0;
        let mu = m / (self.a * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));
        let root = (1.0 - e2).sqrt();
        let e1 = (1.0 - root) / (1.0 + root);
        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        let (sin1, cos1) = phi1.sin_cos();
        let tan1 = phi1.tan();
        let c1 = ep2 * cos1 * cos1;
        let t1 = tan1 * tan1;
        let w = 1.0 - e2 * sin1 * sin1;
        let n1 = self.a / w.sqrt();
        let r1 = self.a * (1.0 - e2) / w.powf(1.5);
        let d = (x - self.x_0) / (n1 * self.k0);

        let d2 = d * d;
        let d3 = d2 * d;
        let d4 = d3 * d;
        let d5 = d4 * d;
        let d6 = d5 * d;

        let q4 = 5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2;
        let q6 = 61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1;
        let lat = phi1 - (n1 * tan1 / r1) * (d2 / 2.0 - q4 * d4 / 24.0 + q6 * d6 / 720.0);

        let q5 = 5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1;
        let dlon = (d - (1.0 + 2.0 * t1 + c1) * d3 / 6.0 + q5 * d5 / 120.0) / cos1;

        (lat.to_degrees(), self.lon_0 + dlon.to_degrees())
    }

    /// Geodetic positions of the four corners of `bounds`, reported in `unit`.
    pub fn corners(&self, bounds: &HeightmapBounds, unit: LengthUnit) -> Corners {
        Corners::from_bounds(bounds, unit, |game| {
            let (x, y) = game.to_meters();
            self.inverse(x, y)
        })
    }
}

/// Meridian arc length from the equator to `phi` (radians).
fn meridian_arc(a: f64, e2: f64, phi: f64) -> f64 {
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    a * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
        - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
        + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
        - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utm_zone_33_reference_point() {
        let engine =
            ProjectionEngine::from_projection_string("+proj=utm +zone=33 +datum=WGS84 +units=m")
                .expect("valid descriptor");
        let (x, y) = engine.forward(0.0, 15.0);
        assert!((x - 500_000.0).abs() < 1e-6, "easting = {x}");
        assert!(y.abs() < 1e-6, "northing = {y}");
    }

    #[test]
    fn latitude_of_origin_shifts_northing() {
        let engine = ProjectionEngine::from_projection_string("+proj=tmerc +lat_0=40 +lon_0=10")
            .expect("valid descriptor");
        let (_, y) = engine.forward(40.0, 10.0);
        assert!(y.abs() < 1e-6, "northing at origin = {y}");
        let back = engine.inverse(0.0, 0.0);
        assert!(
            (back.latitude - 40.0).abs() < 1e-7,
            "lat = {}",
            back.latitude
        );
    }
}
