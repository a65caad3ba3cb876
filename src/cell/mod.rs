//! Per-point cell construction: the tessellation driver.
//!
//! Stored points are processed in grid (bucket, slot) order, partitioned into
//! contiguous chunks. Each chunk runs on one worker with a single reusable
//! `ConvexCell` scratch; the grid is read-only here and the chunks' result
//! ranges are disjoint, so workers share nothing mutable.

mod convex_cell;
mod search;

use glam::DVec3;
use tracing::trace;

use crate::error::VoronoiError;
use crate::grid::BlockGrid;

/// Reasons a single cell build fails. Never fatal for the run: the affected
/// record stays empty with `built = false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CellFailure {
    /// Another generator sits at the same position with an equal or larger
    /// radius.
    Coincident { other: u32 },
    /// A heavier neighbor's radical plane swallowed the whole cell.
    ClippedAway { by: u32 },
}

/// Flat geometry of one finished cell, in absolute coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct CellGeometry {
    pub vertices: Vec<DVec3>,
    /// One entry per face: neighbor input index, or a wall sentinel in
    /// `-6..=-1`.
    pub neighbors: Vec<i32>,
    /// One entry per face, parallel to `neighbors`.
    pub face_vertex_counts: Vec<u32>,
    /// Flattened per-face rings of indices into `vertices`.
    pub face_vertices: Vec<u32>,
}

/// Build one cell per stored point. The result vector is in stored (bucket,
/// slot) order; `grid.stored_order()` maps entries back to input indices.
/// `None` marks a failed build.
pub(crate) fn build_cells(
    grid: &BlockGrid,
    threads: usize,
) -> Result<Vec<Option<CellGeometry>>, VoronoiError> {
    let stored = grid.stored_order();

    #[cfg(feature = "parallel")]
    if threads > 1 && stored.len() > 1 {
        use rayon::prelude::*;

        let chunk_len = stored.len().div_ceil(threads * 4).max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()?;
        // par_chunks is indexed, so the collected chunk results keep stored
        // order; flattening preserves the slot ↔ result correspondence.
        let chunks: Vec<Vec<Option<CellGeometry>>> = pool.install(|| {
            stored
                .par_chunks(chunk_len)
                .map(|owners| build_run(grid, owners))
                .collect()
        });
        return Ok(chunks.into_iter().flatten().collect());
    }

    #[cfg(not(feature = "parallel"))]
    let _ = threads;

    Ok(build_run(grid, stored))
}

/// Sequentially build the cells of one chunk, reusing a single scratch cell.
fn build_run(grid: &BlockGrid, owners: &[u32]) -> Vec<Option<CellGeometry>> {
    let mut cell = convex_cell::ConvexCell::new();
    owners
        .iter()
        .map(|&owner| match search::build_cell(grid, owner, &mut cell) {
            Ok(()) => {
                let mut geom = CellGeometry::default();
                cell.extract_into(grid.position(owner), &mut geom);
                Some(geom)
            }
            Err(failure) => {
                trace!(point = owner, ?failure, "cell construction failed");
                None
            }
        })
        .collect()
}
