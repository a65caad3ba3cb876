//! Structural validation for tessellations.
//!
//! Verifies the combinatorial and containment invariants a correct
//! tessellation must satisfy. Useful for debugging, testing, and catching
//! numerical issues in degenerate inputs.

use rustc_hash::FxHashSet;

use crate::Tessellation;

/// Tolerance for the domain-containment check, relative to the box diagonal.
const CONTAINMENT_REL: f64 = 1e-9;

/// Detailed validation report for a tessellation.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// Number of cells (== number of input points).
    pub num_cells: usize,
    /// Number of cells that were successfully built.
    pub num_built: usize,

    /// Built cells with no faces or fewer than 4 vertices (a 3D cell needs a
    /// tetrahedron at minimum).
    pub degenerate_cells: usize,
    /// Faces whose neighbor id is neither a valid input index nor a wall
    /// sentinel in `-6..=-1`.
    pub invalid_neighbor_ids: usize,
    /// Face-ring entries pointing past the owning cell's vertex range.
    pub out_of_range_face_indices: usize,
    /// Cells whose flattened face rings disagree in total length with
    /// `face_vertex_counts`.
    pub ring_length_mismatches: usize,

    /// Total finite (non-wall) neighbor references across built cells.
    pub finite_neighbor_refs: usize,
    /// Finite neighbor references (i → j) where cell j is built but does not
    /// list i back.
    pub asymmetric_neighbor_pairs: usize,
    /// Finite neighbor references pointing at a failed cell.
    pub neighbors_into_failed_cells: usize,

    /// Vertices outside the domain box on a non-periodic axis (beyond
    /// tolerance).
    pub vertices_outside_domain: usize,
}

impl ValidationReport {
    /// Check validity with tolerance for numerical edge cases: no structural
    /// defects, and at most 1% of neighbor references asymmetric (tiny
    /// sliver faces near degenerate inputs).
    pub fn is_valid(&self) -> bool {
        let asym_ratio =
            self.asymmetric_neighbor_pairs as f64 / self.finite_neighbor_refs.max(1) as f64;
        self.invalid_neighbor_ids == 0
            && self.out_of_range_face_indices == 0
            && self.ring_length_mismatches == 0
            && self.vertices_outside_domain == 0
            && asym_ratio <= 0.01
    }

    /// Strict check: everything consistent, every cell built.
    pub fn is_perfect(&self) -> bool {
        self.num_built == self.num_cells
            && self.degenerate_cells == 0
            && self.invalid_neighbor_ids == 0
            && self.out_of_range_face_indices == 0
            && self.ring_length_mismatches == 0
            && self.asymmetric_neighbor_pairs == 0
            && self.neighbors_into_failed_cells == 0
            && self.vertices_outside_domain == 0
    }

    /// Format a summary of any issues found.
    pub fn summary(&self) -> String {
        if self.is_perfect() {
            return "Perfect".to_string();
        }

        let mut issues = Vec::new();
        if self.num_built != self.num_cells {
            issues.push(format!("{} failed cells", self.num_cells - self.num_built));
        }
        if self.degenerate_cells > 0 {
            issues.push(format!("{} degenerate cells", self.degenerate_cells));
        }
        if self.invalid_neighbor_ids > 0 {
            issues.push(format!("{} invalid neighbor ids", self.invalid_neighbor_ids));
        }
        if self.out_of_range_face_indices > 0 {
            issues.push(format!(
                "{} out-of-range face indices",
                self.out_of_range_face_indices
            ));
        }
        if self.ring_length_mismatches > 0 {
            issues.push(format!(
                "{} ring length mismatches",
                self.ring_length_mismatches
            ));
        }
        if self.asymmetric_neighbor_pairs > 0 {
            issues.push(format!(
                "{} asymmetric neighbor pairs",
                self.asymmetric_neighbor_pairs
            ));
        }
        if self.neighbors_into_failed_cells > 0 {
            issues.push(format!(
                "{} references into failed cells",
                self.neighbors_into_failed_cells
            ));
        }
        if self.vertices_outside_domain > 0 {
            issues.push(format!(
                "{} vertices outside domain",
                self.vertices_outside_domain
            ));
        }
        issues.join(", ")
    }
}

/// Validate a tessellation's structural invariants.
pub fn validate(tessellation: &Tessellation) -> ValidationReport {
    let n = tessellation.num_cells();
    let domain = tessellation.domain();
    let tol = CONTAINMENT_REL * domain.lengths().length();

    let mut report = ValidationReport {
        num_cells: n,
        num_built: tessellation.num_built(),
        degenerate_cells: 0,
        invalid_neighbor_ids: 0,
        out_of_range_face_indices: 0,
        ring_length_mismatches: 0,
        finite_neighbor_refs: 0,
        asymmetric_neighbor_pairs: 0,
        neighbors_into_failed_cells: 0,
        vertices_outside_domain: 0,
    };

    // Directed finite-neighbor references, for the symmetry pass.
    let mut directed: FxHashSet<(u32, u32)> = FxHashSet::default();

    for cell in tessellation.iter_cells() {
        if !cell.built {
            continue;
        }
        if cell.num_faces() == 0 || cell.num_vertices() < 4 {
            report.degenerate_cells += 1;
        }

        let ring_total: usize = cell.face_vertex_counts.iter().map(|&c| c as usize).sum();
        if ring_total != cell.face_vertices.len() {
            report.ring_length_mismatches += 1;
        }

        for face in 0..cell.num_faces() {
            let neighbor = cell.neighbors[face];
            if neighbor >= 0 {
                if (neighbor as usize) < n {
                    report.finite_neighbor_refs += 1;
                    directed.insert((cell.index as u32, neighbor as u32));
                } else {
                    report.invalid_neighbor_ids += 1;
                }
            } else if !(-6..=-1).contains(&neighbor) {
                report.invalid_neighbor_ids += 1;
            }
        }

        for &v in cell.face_vertices {
            if v as usize >= cell.num_vertices() {
                report.out_of_range_face_indices += 1;
            }
        }

        for v in cell.vertices {
            for axis in 0..3 {
                if domain.periodic[axis] {
                    continue;
                }
                if v[axis] < domain.min[axis] - tol || v[axis] > domain.max[axis] + tol {
                    report.vertices_outside_domain += 1;
                    break;
                }
            }
        }
    }

    for &(i, j) in &directed {
        if !tessellation.is_built(j as usize) {
            report.neighbors_into_failed_cells += 1;
        } else if !directed.contains(&(j, i)) {
            report.asymmetric_neighbor_pairs += 1;
        }
    }

    report
}
