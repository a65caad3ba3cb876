//! Weighted (radical-plane) Voronoi tessellations in a rectangular domain.
//!
//! This crate computes the 3D Laguerre tessellation of a point set inside an
//! axis-aligned box, optionally periodic per axis. Each point carries a
//! radius (weight); cell boundaries are the radical planes between weighted
//! points, so heavier points claim more space. The result is one record per
//! input point: cell vertices in absolute coordinates, neighbor point ids
//! (with wall sentinels for domain boundary faces), and per-face vertex
//! counts.
//!
//! # Example
//!
//! ```
//! use box_voronoi::{compute, DVec3, Domain};
//!
//! let points = vec![
//!     DVec3::new(-1.0, 0.0, 0.0),
//!     DVec3::new(1.0, 0.0, 0.0),
//! ];
//! let radii = vec![0.0, 0.0];
//! let domain = Domain::new(DVec3::splat(-5.0), DVec3::splat(5.0));
//!
//! let output = compute(&points, &radii, domain).expect("computation should succeed");
//! assert_eq!(output.tessellation.num_cells(), 2);
//!
//! // The two cells share a face on the bisector plane x = 0.
//! assert!(output.tessellation.cell(0).neighbors.contains(&1));
//! assert!(output.tessellation.cell(1).neighbors.contains(&0));
//! ```

mod cell;
mod domain;
mod error;
mod grid;
mod tessellation;
mod types;
pub mod validation;

pub use domain::Domain;
pub use error::VoronoiError;
pub use glam::DVec3;
pub use tessellation::{CellView, Tessellation};
pub use types::Point3Like;

use tracing::debug;

/// Output from a tessellation run, including the result and diagnostics.
#[derive(Debug, Clone)]
pub struct TessellationOutput {
    /// The computed tessellation, one record per input point.
    pub tessellation: Tessellation,
    /// Diagnostic information about the run.
    pub diagnostics: TessellationDiagnostics,
}

/// Diagnostic information from a tessellation run.
///
/// A failed cell is not an error: the record exists but is empty, with its
/// `built` flag unset. Failures come from coincident generators or from a
/// cell consumed entirely by a heavier neighbor.
#[derive(Debug, Clone, Default)]
pub struct TessellationDiagnostics {
    /// Input indices whose cell construction failed.
    pub failed_cells: Vec<usize>,
}

impl TessellationDiagnostics {
    /// Returns true if every cell was built.
    pub fn is_clean(&self) -> bool {
        self.failed_cells.is_empty()
    }
}

/// Configuration for tessellation computation.
#[derive(Debug, Clone)]
pub struct TessellationConfig {
    /// Block counts per axis for the spatial grid. `None` picks counts from
    /// the point density (roughly one point per block).
    pub blocks: Option<[u32; 3]>,
    /// Worker threads for cell construction. Clamped to at least 1; results
    /// are identical for every thread count.
    pub threads: usize,
}

impl Default for TessellationConfig {
    fn default() -> Self {
        Self {
            blocks: None,
            threads: 1,
        }
    }
}

/// Compute a weighted Voronoi tessellation with default settings.
///
/// `radii` holds one non-negative weight per point; pass zeros for an
/// unweighted Voronoi diagram. Errors are reserved for invalid inputs
/// (bad domain, point outside the domain, malformed arrays); they abort the
/// run before any cell is constructed.
pub fn compute<P: Point3Like>(
    points: &[P],
    radii: &[f64],
    domain: Domain,
) -> Result<TessellationOutput, VoronoiError> {
    compute_with(points, radii, domain, TessellationConfig::default())
}

/// Compute a weighted Voronoi tessellation with explicit configuration.
pub fn compute_with<P: Point3Like>(
    points: &[P],
    radii: &[f64],
    domain: Domain,
    config: TessellationConfig,
) -> Result<TessellationOutput, VoronoiError> {
    domain.validate()?;

    if points.len() != radii.len() {
        return Err(VoronoiError::RadiiMismatch {
            points: points.len(),
            radii: radii.len(),
        });
    }

    let blocks = config
        .blocks
        .unwrap_or_else(|| domain.heuristic_blocks(points.len()));
    if blocks.iter().any(|&b| b == 0) {
        return Err(VoronoiError::InvalidBlocks { counts: blocks });
    }

    // Admission is all-or-nothing: every point is validated before the grid
    // is populated, so a bad point aborts the run with no partial state.
    let mut positions = Vec::with_capacity(points.len());
    for (index, (point, &radius)) in points.iter().zip(radii).enumerate() {
        let p = point.to_dvec3();
        if !p.is_finite() || !radius.is_finite() {
            return Err(VoronoiError::NonFinite { index });
        }
        if radius < 0.0 {
            return Err(VoronoiError::NegativeRadius { index, radius });
        }
        if !domain.contains(p) {
            return Err(VoronoiError::PointOutsideDomain {
                index,
                x: p.x,
                y: p.y,
                z: p.z,
            });
        }
        positions.push(p);
    }

    let threads = config.threads.max(1);
    debug!(
        points = positions.len(),
        blocks = ?blocks,
        threads,
        "tessellation run"
    );

    let grid = grid::BlockGrid::build(domain, blocks, positions, radii.to_vec());

    // Workers produce cells in stored (bucket, slot) order; the grid's
    // stored-order table maps each result back to its input index.
    let results = cell::build_cells(&grid, threads)?;
    let mut cells: Vec<Option<cell::CellGeometry>> = vec![None; grid.num_points()];
    for (slot, geom) in results.into_iter().enumerate() {
        cells[grid.stored_order()[slot] as usize] = geom;
    }

    let diagnostics = TessellationDiagnostics {
        failed_cells: cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_none())
            .map(|(i, _)| i)
            .collect(),
    };
    debug!(
        built = cells.len() - diagnostics.failed_cells.len(),
        failed = diagnostics.failed_cells.len(),
        "cell construction finished"
    );

    let generators: Vec<DVec3> = (0..grid.num_points() as u32)
        .map(|i| grid.position(i))
        .collect();
    let tessellation =
        Tessellation::from_cells(domain, generators, radii.to_vec(), cells);

    Ok(TessellationOutput {
        tessellation,
        diagnostics,
    })
}
