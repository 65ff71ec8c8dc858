//! Strategy selection between the grid-exact and generic conversion paths.

use std::fmt;

use theater_config::TheaterConfig;
use theater_core::{GameCoordinate, GeodeticCoordinate, LengthUnit};
use tracing::debug;

use crate::ProjectionError;
use crate::corners::Corners;
use crate::generic::ProjectionEngine;
use crate::grid::GridTransform;

/// Which conversion path to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversionStrategy {
    /// Replicate the simulator's grid pipeline (sub-metre agreement with the simulator).
    #[default]
    GridExact,
    /// Apply the descriptor's nominal projection to game metres.
    Generic,
}

impl ConversionStrategy {
    pub fn label(self) -> &'static str {
        match self {
            ConversionStrategy::GridExact => "grid-exact",
            ConversionStrategy::Generic => "generic",
        }
    }
}

impl fmt::Display for ConversionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a grid-exact request was served by the generic path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// The theater lacks theater size or centre data.
    MissingGridParameters,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::MissingGridParameters => f.write_str(
                "theater has no grid parameters (theater size and centre); used the generic projection",
            ),
        }
    }
}

/// A converted value together with the strategy that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion<T> {
    pub value: T,
    pub strategy: ConversionStrategy,
    /// Set when the requested strategy could not be honoured.
    pub fallback: Option<FallbackReason>,
}

impl<T> Conversion<T> {
    fn exact(value: T) -> Self {
        Self {
            value,
            strategy: ConversionStrategy::GridExact,
            fallback: None,
        }
    }

    fn generic(value: T, fallback: Option<FallbackReason>) -> Self {
        Self {
            value,
            strategy: ConversionStrategy::Generic,
            fallback,
        }
    }
}

/// Converts between game space and WGS84 for one theater.
#[derive(Debug, Clone)]
pub struct CoordinateConverter<'a> {
    config: &'a TheaterConfig,
    engine: ProjectionEngine,
    grid: Result<GridTransform, FallbackReason>,
}

impl<'a> CoordinateConverter<'a> {
    pub fn new(config: &'a TheaterConfig) -> Result<Self, ProjectionError> {
        let engine = ProjectionEngine::from_projection_string(config.projection_string())?;
        let grid = GridTransform::new(config, engine.descriptor());
        if let Err(reason) = &grid {
            debug!(theater = config.key(), %reason, "grid-exact conversion unavailable");
        }
        Ok(Self {
            config,
            engine,
            grid,
        })
    }

    pub fn config(&self) -> &TheaterConfig {
        self.config
    }

    pub fn engine(&self) -> &ProjectionEngine {
        &self.engine
    }

    pub fn grid_transform(&self) -> Option<&GridTransform> {
        self.grid.as_ref().ok()
    }

    pub fn game_to_geodetic(
        &self,
        coord: &GameCoordinate,
        strategy: ConversionStrategy,
    ) -> Conversion<GeodeticCoordinate> {
        match self.select(strategy) {
            Ok(grid) => Conversion::exact(grid.game_to_geodetic(coord)),
            Err(fallback) => {
                let (x, y) = coord.to_meters();
                Conversion::generic(self.engine.inverse(x, y), fallback)
            }
        }
    }

    pub fn geodetic_to_game(
        &self,
        geo: &GeodeticCoordinate,
        unit: LengthUnit,
        strategy: ConversionStrategy,
    ) -> Conversion<GameCoordinate> {
        match self.select(strategy) {
            Ok(grid) => Conversion::exact(grid.geodetic_to_game(geo, unit)),
            Err(fallback) => {
                let (x, y) = self.engine.forward(geo.latitude, geo.longitude);
                Conversion::generic(GameCoordinate::meters(x, y).in_unit(unit), fallback)
            }
        }
    }

    /// Geodetic positions of the theater's heightmap corners, game coordinates in feet.
    pub fn corners(&self, strategy: ConversionStrategy) -> Conversion<Corners> {
        let bounds = self.config.heightmap_bounds();
        match self.select(strategy) {
            Ok(grid) => {
                let corners = Corners::from_bounds(bounds, LengthUnit::Feet, |game| {
                    grid.game_to_geodetic(game)
                });
                Conversion::exact(corners)
            }
            Err(fallback) => {
                let corners = self.engine.corners(bounds, LengthUnit::Feet);
                Conversion::generic(corners, fallback)
            }
        }
    }

    /// `Ok` with the grid transform when grid-exact applies, otherwise the fallback note
    /// (`None` when the generic path was asked for directly).
    fn select(
        &self,
        strategy: ConversionStrategy,
    ) -> Result<&GridTransform, Option<FallbackReason>> {
        match (strategy, &self.grid) {
            (ConversionStrategy::Generic, _) => Err(None),
            (ConversionStrategy::GridExact, Ok(grid)) => Ok(grid),
            (ConversionStrategy::GridExact, Err(reason)) => {
                debug!(
                    theater = self.config.key(),
                    %reason,
                    "falling back to generic projection"
                );
                Err(Some(*reason))
            }
        }
    }
}
