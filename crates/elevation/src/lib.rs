//! Elevation lookups on a theater's raw heightmap.
//!
//! The heightmap is a flat, headerless array of little-endian `u16` samples in feet,
//! row-major with the northern row first. Rasters reach 32768×32768 samples, so every
//! lookup is a single positioned 2-byte read; nothing is cached or preloaded.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use theater_config::{HeightmapBounds, RasterSize, TheaterConfig};
use theater_core::GameCoordinate;
use thiserror::Error;
use tracing::trace;

/// Bytes per raster sample.
pub const SAMPLE_BYTES: u64 = 2;

#[derive(Debug, Error)]
pub enum ElevationError {
    #[error("heightmap not found at {}", .path.display())]
    HeightmapNotFound { path: PathBuf },
    #[error(
        "game coordinate ({x}, {y}) ft is outside the heightmap bounds x {}..={}, y {}..={}",
        .bounds.min_x, .bounds.max_x, .bounds.min_y, .bounds.max_y
    )]
    CoordinatesOutOfBounds {
        x: f64,
        y: f64,
        bounds: HeightmapBounds,
    },
    #[error("failed to read heightmap sample at byte offset {offset}: {source}")]
    HeightmapReadError {
        offset: u64,
        #[source]
        source: io::Error,
    },
}

/// Handle to a heightmap file on disk.
///
/// Holds only the path; each read opens its own file so lookups never share a
/// seek cursor and may run from any number of threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeightmapFile {
    path: PathBuf,
}

impl HeightmapFile {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ElevationError> {
        let path = path.into();
        if !path.is_file() {
            return Err(ElevationError::HeightmapNotFound { path });
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the sample starting at `offset` bytes.
    pub fn read_sample(&self, offset: u64) -> Result<u16, ElevationError> {
        let read_error = |source: io::Error| ElevationError::HeightmapReadError { offset, source };
        let mut file = File::open(&self.path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => ElevationError::HeightmapNotFound {
                path: self.path.clone(),
            },
            _ => read_error(err),
        })?;
        file.seek(SeekFrom::Start(offset)).map_err(read_error)?;
        let mut buf = [0u8; SAMPLE_BYTES as usize];
        file.read_exact(&mut buf).map_err(read_error)?;
        Ok(u16::from_le_bytes(buf))
    }
}

/// Elevation lookups for one theater.
#[derive(Debug, Clone)]
pub struct ElevationService<'a> {
    config: &'a TheaterConfig,
    heightmap: HeightmapFile,
}

impl<'a> ElevationService<'a> {
    pub fn new(config: &'a TheaterConfig, heightmap: HeightmapFile) -> Self {
        Self { config, heightmap }
    }

    pub fn heightmap(&self) -> &HeightmapFile {
        &self.heightmap
    }

    /// Ground elevation in feet at `coord`.
    pub fn elevation(&self, coord: &GameCoordinate) -> Result<u16, ElevationError> {
        elevation(coord, self.config, &self.heightmap)
    }
}

/// Ground elevation in feet at `coord`.
///
/// Fails with [`ElevationError::HeightmapNotFound`] before any seek when the file is
/// gone, and with [`ElevationError::CoordinatesOutOfBounds`] outside the inclusive bounds.
pub fn elevation(
    coord: &GameCoordinate,
    config: &TheaterConfig,
    heightmap: &HeightmapFile,
) -> Result<u16, ElevationError> {
    if !heightmap.path().is_file() {
        return Err(ElevationError::HeightmapNotFound {
            path: heightmap.path().to_path_buf(),
        });
    }

    let (x, y) = coord.to_feet();
    let bounds = config.heightmap_bounds();
    if !bounds.contains(x, y) {
        return Err(ElevationError::CoordinatesOutOfBounds {
            x,
            y,
            bounds: *bounds,
        });
    }

    let size = config.heightmap_size();
    let (pixel_x, pixel_y) = pixel_index(x, y, bounds, size);
    let offset = byte_offset(pixel_x, pixel_y, size.width);
    let sample = heightmap.read_sample(offset)?;
    trace!(x, y, pixel_x, pixel_y, offset, sample, "heightmap sample");
    Ok(sample)
}

/// Raster pixel for a game position in feet. Row 0 is the northern edge.
pub fn pixel_index(x: f64, y: f64, bounds: &HeightmapBounds, size: RasterSize) -> (u32, u32) {
    let x_ratio = (x - bounds.min_x) / bounds.span_x();
    let y_ratio = (y - bounds.min_y) / bounds.span_y();
    let max_x = size.width.saturating_sub(1);
    let max_y = size.height.saturating_sub(1);
    (
        scale_to_pixel(x_ratio, max_x),
        scale_to_pixel(1.0 - y_ratio, max_y),
    )
}

/// Byte offset of a sample in the row-major raster.
pub fn byte_offset(pixel_x: u32, pixel_y: u32, width: u32) -> u64 {
    (pixel_y as u64 * width as u64 + pixel_x as u64) * SAMPLE_BYTES
}

fn scale_to_pixel(ratio: f64, max_index: u32) -> u32 {
    (ratio * max_index as f64).round().clamp(0.0, max_index as f64) as u32
}
