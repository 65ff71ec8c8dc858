//! High-precision Transverse Mercator using the 6th-order Krüger series.
//!
//! Accurate to a few nanometres within several thousand kilometres of the central
//! meridian, which makes it suitable for replicating the simulator's grid math.
//! The projector has no false origin; callers apply their own offsets.

use theater_core::GeodeticCoordinate;

use crate::descriptor::DEFAULT_SCALE_FACTOR;
use crate::ellipsoid::Ellipsoid;

const ORDER: usize = 6;
const MAX_NEWTON_ITERATIONS: usize = 10;

/// Exact Transverse Mercator projector centred on `lon_0` with zero false origin.
#[derive(Debug, Clone, PartialEq)]
pub struct ExactTransverseMercator {
    lon_0: f64,
    k0: f64,
    e: f64,
    e2m: f64,
    /// Rectifying radius.
    a1: f64,
    alpha: [f64; ORDER],
    beta: [f64; ORDER],
}

impl ExactTransverseMercator {
    pub fn new(ellipsoid: Ellipsoid, lon_0: f64, k0: f64) -> Self {
        let n = ellipsoid.n();
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;
        let n5 = n4 * n;
        let n6 = n5 * n;

        let a1 = ellipsoid.a / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0 + n6 / 256.0);
        let alpha = [
            n / 2.0
                - 2.0 * n2 / 3.0
                + 5.0 * n3 / 16.0
                + 41.0 * n4 / 180.0
                - 127.0 * n5 / 288.0
                + 7891.0 * n6 / 37800.0,
            13.0 * n2 / 48.0
                - 3.0 * n3 / 5.0
                + 557.0 * n4 / 1440.0
                + 281.0 * n5 / 630.0
                - 1_983_433.0 * n6 / 1_935_360.0,
            61.0 * n3 / 240.0
                - 103.0 * n4 / 140.0
                + 15061.0 * n5 / 26880.0
                + 167_603.0 * n6 / 181_440.0,
            49561.0 * n4 / 161_280.0 - 179.0 * n5 / 168.0 + 6_601_661.0 * n6 / 7_257_600.0,
            34729.0 * n5 / 80640.0 - 3_418_889.0 * n6 / 1_995_840.0,
            212_378_941.0 * n6 / 319_334_400.0,
        ];
        let beta = [
            n / 2.0
                - 2.0 * n2 / 3.0
                + 37.0 * n3 / 96.0
                - n4 / 360.0
                - 81.0 * n5 / 512.0
                + 96199.0 * n6 / 604_800.0,
            n2 / 48.0
                + n3 / 15.0
                - 437.0 * n4 / 1440.0
                + 46.0 * n5 / 105.0
                - 1_118_711.0 * n6 / 3_870_720.0,
            17.0 * n3 / 480.0 - 37.0 * n4 / 840.0 - 209.0 * n5 / 4480.0 + 5569.0 * n6 / 90720.0,
            4397.0 * n4 / 161_280.0 - 11.0 * n5 / 504.0 - 830_251.0 * n6 / 7_257_600.0,
            4583.0 * n5 / 161_280.0 - 108_847.0 * n6 / 3_991_680.0,
            20_648_693.0 * n6 / 638_668_800.0,
        ];

        Self {
            lon_0,
            k0,
            e: ellipsoid.e(),
            e2m: 1.0 - ellipsoid.e2(),
            a1,
            alpha,
            beta,
        }
    }

    /// WGS84 projector with the default 0.9996 scale factor.
    pub fn wgs84(lon_0: f64) -> Self {
        Self::new(Ellipsoid::WGS84, lon_0, DEFAULT_SCALE_FACTOR)
    }

    pub fn central_meridian(&self) -> f64 {
        self.lon_0
    }

    pub fn scale_factor(&self) -> f64 {
        self.k0
    }

    /// Project latitude/longitude (degrees) to easting/northing in metres.
    pub fn forward(&self, lat: f64, lon: f64) -> (f64, f64) {
        let phi = lat.to_radians();
        let dlambda = (lon - self.lon_0).to_radians();
        let (sin_l, cos_l) = dlambda.sin_cos();

        let tau_p = self.taupf(phi.tan());
        let xi_p = tau_p.atan2(cos_l);
        let eta_p = (sin_l / tau_p.hypot(cos_l)).asinh();

        let mut xi = xi_p;
        let mut eta = eta_p;
        for (j, alpha) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi += alpha * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += alpha * (k * xi_p).cos() * (k * eta_p).sinh();
        }

        (self.k0 * self.a1 * eta, self.k0 * self.a1 * xi)
    }

    /// Unproject easting/northing in metres to latitude/longitude.
    pub fn inverse(&self, x: f64, y: f64) -> GeodeticCoordinate {
        let xi = y / (self.k0 * self.a1);
        let eta = x / (self.k0 * self.a1);

        let mut xi_p = xi;
        let mut eta_p = eta;
        for (j, beta) in self.beta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi_p -= beta * (k * xi).sin() * (k * eta).cosh();
            eta_p -= beta * (k * xi).cos() * (k * eta).sinh();
        }

        let tau_p = xi_p.sin() / eta_p.sinh().hypot(xi_p.cos());
        let tau = self.tauf(tau_p);

        GeodeticCoordinate::new(
            tau.atan().to_degrees(),
            self.lon_0 + eta_p.sinh().atan2(xi_p.cos()).to_degrees(),
        )
    }

    /// Conformal latitude tangent for a geodetic latitude tangent.
    fn taupf(&self, tau: f64) -> f64 {
        let tau1 = 1.0_f64.hypot(tau);
        let sig = (self.e * (self.e * tau / tau1).atanh()).sinh();
        1.0_f64.hypot(sig) * tau - sig * tau1
    }

    /// Newton inversion of [`Self::taupf`].
    fn tauf(&self, tau_p: f64) -> f64 {
        let mut tau = tau_p / self.e2m;
        for _ in 0..MAX_NEWTON_ITERATIONS {
            let tau_a = self.taupf(tau);
            let step = (tau_p - tau_a) * (1.0 + self.e2m * tau * tau)
                / (self.e2m * 1.0_f64.hypot(tau) * 1.0_f64.hypot(tau_a));
            tau += step;
            if step.abs() < 1e-14 * tau.abs().max(1.0) {
                break;
            }
        }
        tau
    }
}

/// False northing that places the theater centre at `desired_y` metres north.
pub fn false_northing_for_center(center_lat: f64, center_lon: f64, desired_y: f64) -> f64 {
    let (_, northing) = ExactTransverseMercator::wgs84(center_lon).forward(center_lat, center_lon);
    desired_y - northing
}

/// Projection descriptor for a new theater centred on `(center_lat, center_lon)`.
///
/// The false easting is fixed at 512 km; the false northing is chosen so the centre
/// lands at `desired_y`.
pub fn projection_string_for_center(center_lat: f64, center_lon: f64, desired_y: f64) -> String {
    let y_0 = false_northing_for_center(center_lat, center_lon, desired_y);
    format!(
        "+proj=tmerc +lon_0={center_lon} +ellps=WGS84 +k={DEFAULT_SCALE_FACTOR} +units=m +x_0=512000 +y_0={y_0:.5e}"
    )
}
