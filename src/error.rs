//! Error types for tessellation runs.

use thiserror::Error;

/// Errors that abort a tessellation run before any cell is constructed.
///
/// Per-point geometric failures (coincident generators, a cell consumed by a
/// heavier neighbor) are not errors; they surface as an unset `built` flag on
/// the affected cell record.
#[derive(Debug, Error)]
pub enum VoronoiError {
    /// A domain axis has a lower bound at or above its upper bound.
    #[error("invalid domain: lower bound {lower} is not below upper bound {upper} on the {axis} axis")]
    InvalidDomain {
        /// Axis name (`x`, `y`, or `z`).
        axis: char,
        lower: f64,
        upper: f64,
    },

    /// A block count is zero; every axis needs at least one block.
    #[error("invalid block counts {counts:?}: every axis needs at least one block")]
    InvalidBlocks { counts: [u32; 3] },

    /// `points` and `radii` have different lengths.
    #[error("points/radii length mismatch: {points} points, {radii} radii")]
    RadiiMismatch { points: usize, radii: usize },

    /// A coordinate or radius is NaN or infinite.
    #[error("non-finite coordinate or radius at point {index}")]
    NonFinite { index: usize },

    /// A radius is negative. Weights must be non-negative.
    #[error("negative radius {radius} at point {index}")]
    NegativeRadius { index: usize, radius: f64 },

    /// A point lies outside the domain on a non-periodic axis.
    ///
    /// Admission is all-or-nothing: the run aborts before any cell
    /// construction begins and no records are returned.
    #[error("point {index} at ({x}, {y}, {z}) lies outside the domain")]
    PointOutsideDomain { index: usize, x: f64, y: f64, z: f64 },

    /// The worker thread pool could not be created.
    #[cfg(feature = "parallel")]
    #[error("failed to build worker thread pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
