//! Projection engines converting between game space and WGS84.
//!
//! Two conversion strategies are exposed through [`CoordinateConverter`]:
//! - [`ConversionStrategy::Generic`]: the descriptor's nominal Transverse Mercator/UTM
//!   projection, applied directly to game metres;
//! - [`ConversionStrategy::GridExact`]: the simulator's own grid pipeline, projected with
//!   an exact Krüger-series Transverse Mercator and an offset derived from the theater centre.

pub mod converter;
pub mod corners;
pub mod descriptor;
pub mod ellipsoid;
pub mod exact;
pub mod generic;
pub mod grid;
#[cfg(feature = "proj-transforms")]
pub mod proj_backend;

pub use converter::{Conversion, ConversionStrategy, CoordinateConverter, FallbackReason};
pub use corners::{Corner, CornerPoint, Corners};
pub use descriptor::{ProjectionDescriptor, ProjectionKind};
pub use ellipsoid::Ellipsoid;
pub use exact::{ExactTransverseMercator, false_northing_for_center, projection_string_for_center};
pub use generic::ProjectionEngine;
pub use grid::GridTransform;
#[cfg(feature = "proj-transforms")]
pub use proj_backend::ProjBackend;

use thiserror::Error;

/// Errors raised while parsing or interpreting a projection descriptor.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("malformed projection token `{0}` (expected `+key=value` or `+flag`)")]
    MalformedToken(String),
    #[error("invalid value `{value}` for projection parameter `{key}`")]
    InvalidValue { key: String, value: String },
    #[error("unsupported projection `{0}` (only tmerc and utm are supported)")]
    UnsupportedProjection(String),
    #[error("unsupported ellipsoid or datum `{0}`")]
    UnsupportedEllipsoid(String),
    #[error("unsupported units `{0}` (only metres are supported)")]
    UnsupportedUnits(String),
    #[error("projection descriptor is missing `+{0}`")]
    MissingParameter(&'static str),
    #[cfg(feature = "proj-transforms")]
    #[error("PROJ error: {0}")]
    Backend(String),
}
