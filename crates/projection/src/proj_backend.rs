//! PROJ-backed generic projection, enabled with the `proj-transforms` feature.
//!
//! Requires the PROJ C library. The descriptor is handed to PROJ verbatim, so the
//! results serve as an independent check on [`crate::ProjectionEngine`].

use proj::Proj;
use theater_core::GeodeticCoordinate;

use crate::ProjectionError;
use crate::descriptor::ProjectionDescriptor;

/// A descriptor's projection evaluated by PROJ.
pub struct ProjBackend {
    proj: Proj,
}

impl ProjBackend {
    pub fn new(descriptor: &ProjectionDescriptor) -> Result<Self, ProjectionError> {
        let definition = descriptor.to_string();
        let proj = Proj::new(&definition)
            .map_err(|err| ProjectionError::Backend(format!("{definition}: {err}")))?;
        Ok(Self { proj })
    }

    /// Project latitude/longitude (degrees) to easting/northing (metres).
    pub fn forward(&self, lat: f64, lon: f64) -> Result<(f64, f64), ProjectionError> {
        self.proj
            .project((lon.to_radians(), lat.to_radians()), false)
            .map_err(|err| ProjectionError::Backend(err.to_string()))
    }

    /// Unproject easting/northing (metres) to latitude/longitude.
    pub fn inverse(&self, x: f64, y: f64) -> Result<GeodeticCoordinate, ProjectionError> {
        let (lon, lat) = self
            .proj
            .project((x, y), true)
            .map_err(|err| ProjectionError::Backend(err.to_string()))?;
        Ok(GeodeticCoordinate::new(lat.to_degrees(), lon.to_degrees()))
    }
}
