//! Game-space ↔ WGS84 conversion and heightmap elevation for flight-simulator theaters.
//!
//! The member crates are re-exported here so front-ends can depend on a single
//! library: unit and coordinate types live in [`core`], theater resolution in
//! [`config`], the projection engines in [`projection`], and raster lookups in
//! [`elevation`].

pub use theater_config as config;
pub use theater_core as core;
pub use theater_elevation as elevation;
pub use theater_projection as projection;

pub use theater_config::{TheaterCatalog, TheaterConfig};
pub use theater_core::{GameCoordinate, GeodeticCoordinate, LengthUnit};
pub use theater_elevation::{ElevationError, ElevationService, HeightmapFile};
pub use theater_projection::{ConversionStrategy, CoordinateConverter, ProjectionError};

/// Returns the version of the library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
