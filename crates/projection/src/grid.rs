//! The simulator's own game-feet → grid → projected-metres pipeline.
//!
//! The simulator ignores the descriptor's false easting and northing. Instead it
//! projects its declared theater centre and subtracts half the theater size, so the
//! raster-relative metres line up with the projector's frame. That offset is
//! computed once per transform.

use theater_config::{GridParameters, TheaterConfig};
use theater_core::{GameCoordinate, GeodeticCoordinate, LengthUnit};

use crate::converter::FallbackReason;
use crate::descriptor::ProjectionDescriptor;
use crate::exact::ExactTransverseMercator;

/// Grid-exact conversion for one theater.
#[derive(Debug, Clone, PartialEq)]
pub struct GridTransform {
    params: GridParameters,
    /// Half the raster width minus one pixel, in grid units.
    grid_offset: f64,
    projector: ExactTransverseMercator,
    offset_x: f64,
    offset_y: f64,
}

impl GridTransform {
    /// Build the transform, or report why the theater cannot support it.
    pub fn new(
        config: &TheaterConfig,
        descriptor: &ProjectionDescriptor,
    ) -> Result<Self, FallbackReason> {
        let params = *config.grid().ok_or(FallbackReason::MissingGridParameters)?;
        let width = config.heightmap_size().width;
        let projector = ExactTransverseMercator::new(
            descriptor.ellipsoid(),
            descriptor.central_meridian(),
            descriptor.scale_factor(),
        );

        let (center_x, center_y) = projector.forward(params.center_lat, params.center_lon);
        let half = params.theater_size_meters / 2.0;

        Ok(Self {
            grid_offset: (width as f64 - 1.0) / 2.0,
            offset_x: center_x - half,
            offset_y: center_y - half,
            projector,
            params,
        })
    }

    /// Offset pair added to raster-relative metres before unprojecting.
    pub fn offsets(&self) -> (f64, f64) {
        (self.offset_x, self.offset_y)
    }

    pub fn game_to_geodetic(&self, coord: &GameCoordinate) -> GeodeticCoordinate {
        let (x, y) = self.game_to_projected(coord);
        self.projector.inverse(x, y)
    }

    /// Exact inverse of [`Self::game_to_geodetic`], reported in `unit`.
    pub fn geodetic_to_game(&self, geo: &GeodeticCoordinate, unit: LengthUnit) -> GameCoordinate {
        let (final_x, final_y) = self.projector.forward(geo.latitude, geo.longitude);
        let p = &self.params;

        let x_m = final_x - self.offset_x;
        let z_m = p.theater_size_meters - (final_y - self.offset_y);

        let raster_x = x_m / p.meter_res;
        let raster_z = z_m / p.meter_res;

        let grid_x = raster_x - self.grid_offset;
        let grid_y = self.grid_offset - raster_z;

        let x_ft = (grid_x + self.grid_offset) / p.ft_to_grid;
        let y_ft = (grid_y + self.grid_offset) / p.ft_to_grid;
        GameCoordinate::feet(x_ft, y_ft).in_unit(unit)
    }

    /// Projector-frame metres for a game coordinate.
    pub fn game_to_projected(&self, coord: &GameCoordinate) -> (f64, f64) {
        let (x_ft, y_ft) = coord.to_feet();
        let p = &self.params;

        let grid_x = -self.grid_offset + x_ft * p.ft_to_grid;
        let grid_y = -self.grid_offset + y_ft * p.ft_to_grid;

        // Raster Z runs opposite to game Y.
        let raster_x = grid_x + self.grid_offset;
        let raster_z = -(grid_y - self.grid_offset);

        let x_m = raster_x * p.meter_res;
        let z_m = p.theater_size_meters - raster_z * p.meter_res;

        (x_m + self.offset_x, z_m + self.offset_y)
    }
}
