//! Candidate enumeration and per-point cell construction.
//!
//! For one owner point, the cell starts as the domain box and is clipped by
//! the radical plane of every candidate neighbor that can still reach it.
//! Candidates are drawn from grid blocks in expanding Chebyshev shells around
//! the owner's block; on periodic axes the block offsets wrap and carry the
//! matching image shift.
//!
//! Termination: a point at distance `|r|` cuts the cell only if its radical
//! plane lies within the current maximum vertex distance `R`, and with the
//! global maximum radius `w` the plane offset is at least
//! `|r|/2 − w²/(2|r|)`. Solving for `|r|` gives the search bound
//! `R + sqrt(R² + w²)`; once a whole shell lies beyond it the cell is final.
//!
//! The enumeration order (shell, then lexicographic offset, then bucket slot)
//! is fixed, so a cell's vertex data is bit-identical however the points are
//! partitioned across workers.

use glam::DVec3;

use super::convex_cell::{ConvexCell, CutOutcome};
use super::CellFailure;
use crate::grid::BlockGrid;

/// Coincidence tolerance, relative to the domain diagonal.
const COINCIDENT_REL: f64 = 1e-12;

pub(super) fn build_cell(
    grid: &BlockGrid,
    owner: u32,
    cell: &mut ConvexCell,
) -> Result<(), CellFailure> {
    let domain = *grid.domain();
    let len = domain.lengths();
    let p = grid.position(owner);
    let r_own = grid.radius(owner);

    // Initial cell: domain walls on fixed axes, a full-width box centered on
    // the owner along periodic axes.
    let mut lo = DVec3::ZERO;
    let mut hi = DVec3::ZERO;
    for axis in 0..3 {
        if domain.periodic[axis] {
            lo[axis] = -0.5 * len[axis];
            hi[axis] = 0.5 * len[axis];
        } else {
            lo[axis] = domain.min[axis] - p[axis];
            hi[axis] = domain.max[axis] - p[axis];
        }
    }
    cell.init_box(lo, hi);

    let blocks = grid.blocks();
    let side = grid.block_side();
    let min_side = side.min_element();
    let base = grid.block_coords(p);
    let w_max = grid.max_radius();
    let coincident_tol = COINCIDENT_REL * len.length();
    let any_periodic = domain.periodic.iter().any(|&b| b);

    let mut r_cell = cell.max_vertex_norm();
    let mut reach = search_reach(r_cell, w_max);

    for shell in 0i64.. {
        if shell >= 1 && (shell - 1) as f64 * min_side > reach {
            break;
        }
        let mut any_block = false;

        for ox in -shell..=shell {
            for oy in -shell..=shell {
                for oz in -shell..=shell {
                    let off = [ox, oy, oz];
                    if off.iter().map(|o| o.abs()).max() != Some(shell) {
                        continue;
                    }

                    // Resolve the block and the periodic image shift.
                    let mut coords = [0i64; 3];
                    let mut shift = DVec3::ZERO;
                    let mut in_range = true;
                    for axis in 0..3 {
                        let raw = base[axis] + off[axis];
                        let n = blocks[axis] as i64;
                        if domain.periodic[axis] {
                            coords[axis] = raw.rem_euclid(n);
                            shift[axis] = raw.div_euclid(n) as f64 * len[axis];
                        } else if raw < 0 || raw >= n {
                            in_range = false;
                            break;
                        } else {
                            coords[axis] = raw;
                        }
                    }
                    if !in_range {
                        continue;
                    }
                    any_block = true;

                    // The owner sits somewhere in its own block, so a block
                    // `k` steps away is at least `k - 1` block sides away.
                    let mut lb_sq = 0.0;
                    for axis in 0..3 {
                        let steps = (off[axis].abs() - 1).max(0) as f64;
                        let d = steps * side[axis];
                        lb_sq += d * d;
                    }
                    if lb_sq > reach * reach {
                        continue;
                    }

                    for &j in grid.bucket_points(grid.bucket_at(coords)) {
                        if j == owner && shift == DVec3::ZERO {
                            continue;
                        }
                        let r = grid.position(j) + shift - p;
                        let dist = r.length();

                        if dist < coincident_tol {
                            // Coincident pair: the heavier point takes the
                            // whole region; an exact tie fails both sides.
                            if grid.radius(j) >= r_own {
                                return Err(CellFailure::Coincident { other: j });
                            }
                            continue;
                        }

                        let w_j = grid.radius(j);
                        let offset =
                            (dist * dist + r_own * r_own - w_j * w_j) / (2.0 * dist);
                        if offset > r_cell + cell.tol() {
                            continue;
                        }

                        match cell.cut(r / dist, offset, j as i32) {
                            CutOutcome::Cut => {
                                r_cell = cell.max_vertex_norm();
                                reach = search_reach(r_cell, w_max);
                            }
                            CutOutcome::Destroyed => {
                                return Err(CellFailure::ClippedAway { by: j });
                            }
                            CutOutcome::Unchanged => {}
                        }
                    }
                }
            }
        }

        // A shell entirely off-grid ends the scan unless periodic images can
        // still appear further out.
        if shell >= 1 && !any_block && !any_periodic {
            break;
        }
    }

    Ok(())
}

#[inline]
fn search_reach(r_cell: f64, w_max: f64) -> f64 {
    r_cell + (r_cell * r_cell + w_max * w_max).sqrt()
}
