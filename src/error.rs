//! Crate-wide error type.
//!
//! Generation failures are configuration mistakes caught up front; lookup
//! failures are reported with the offending coordinate so callers can tell
//! a bad query apart from a bad world.

use thiserror::Error;

use crate::grid::HexCoord;

#[derive(Debug, Error)]
pub enum WorldGenError {
    /// Noise parameters that would produce NaN or degenerate elevations.
    #[error("invalid noise parameters: {0}")]
    InvalidNoiseParams(String),

    /// Terrain band thresholds that are not strictly ascending in (0, 1).
    #[error("invalid terrain thresholds: {0}")]
    InvalidThresholds(String),

    /// Tile mesh parameters that would produce degenerate geometry.
    #[error("invalid mesh parameters: {0}")]
    InvalidMeshParams(String),

    /// A coordinate lookup outside the generated grid. Never clamped.
    #[error("coordinate {coord} is outside the {width}x{height} grid")]
    OutOfBounds {
        coord: HexCoord,
        width: usize,
        height: usize,
    },

    /// Grid dimensions that cannot hold a single tile.
    #[error("grid dimensions {width}x{height} are degenerate")]
    EmptyGrid { width: usize, height: usize },
}
