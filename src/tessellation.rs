//! Tessellation result storage and access.
//!
//! One record per input point, keyed by the original input index. Records are
//! packed into flat arrays with per-cell offsets so the whole result can be
//! handed across a language boundary without chasing pointers.

use glam::DVec3;

use crate::cell::CellGeometry;
use crate::domain::Domain;

/// A weighted Voronoi tessellation of a rectangular domain.
///
/// The tessellation consists of:
/// - Generator points (input points, one per cell) with their radii
/// - Per-cell vertex coordinates in absolute domain coordinates
/// - Per-cell face data: neighbor ids, vertex counts, and vertex rings
///
/// Cells whose construction failed (coincident generators, a region consumed
/// by a heavier neighbor) are present but empty, with `built == false`.
#[derive(Debug, Clone)]
pub struct Tessellation {
    domain: Domain,
    /// Generator positions, one per cell, input order. On periodic axes the
    /// coordinates are wrapped into the domain box.
    generators: Vec<DVec3>,
    /// Generator radii, one per cell, input order.
    radii: Vec<f64>,
    /// Whether each cell was successfully constructed.
    built: Vec<bool>,

    vertices: Vec<DVec3>,
    /// Start of each cell's vertex range, plus final length. Length: n + 1.
    vertex_offsets: Vec<u32>,
    neighbors: Vec<i32>,
    face_vertex_counts: Vec<u32>,
    /// Start of each cell's face range, plus final length. Length: n + 1.
    face_offsets: Vec<u32>,
    face_vertices: Vec<u32>,
    /// Start of each cell's face-vertex range, plus final length.
    face_vertex_offsets: Vec<u32>,
}

impl Tessellation {
    /// Pack per-cell geometry (input-index order, `None` = failed build)
    /// into flat storage.
    pub(crate) fn from_cells(
        domain: Domain,
        generators: Vec<DVec3>,
        radii: Vec<f64>,
        cells: Vec<Option<CellGeometry>>,
    ) -> Self {
        let n = cells.len();
        debug_assert_eq!(generators.len(), n);

        let mut built = Vec::with_capacity(n);
        let mut vertices = Vec::new();
        let mut vertex_offsets = Vec::with_capacity(n + 1);
        let mut neighbors = Vec::new();
        let mut face_vertex_counts = Vec::new();
        let mut face_offsets = Vec::with_capacity(n + 1);
        let mut face_vertices = Vec::new();
        let mut face_vertex_offsets = Vec::with_capacity(n + 1);

        vertex_offsets.push(0);
        face_offsets.push(0);
        face_vertex_offsets.push(0);

        for cell in &cells {
            if let Some(geom) = cell {
                built.push(true);
                vertices.extend_from_slice(&geom.vertices);
                neighbors.extend_from_slice(&geom.neighbors);
                face_vertex_counts.extend_from_slice(&geom.face_vertex_counts);
                face_vertices.extend_from_slice(&geom.face_vertices);
            } else {
                built.push(false);
            }
            vertex_offsets.push(as_offset(vertices.len()));
            face_offsets.push(as_offset(neighbors.len()));
            face_vertex_offsets.push(as_offset(face_vertices.len()));
        }

        Self {
            domain,
            generators,
            radii,
            built,
            vertices,
            vertex_offsets,
            neighbors,
            face_vertex_counts,
            face_offsets,
            face_vertices,
            face_vertex_offsets,
        }
    }

    /// Number of cells (same as the number of input points).
    #[inline]
    pub fn num_cells(&self) -> usize {
        self.generators.len()
    }

    /// Number of successfully constructed cells.
    pub fn num_built(&self) -> usize {
        self.built.iter().filter(|&&b| b).count()
    }

    #[inline]
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Get the generator (owner point) of a cell.
    #[inline]
    pub fn generator(&self, index: usize) -> DVec3 {
        self.generators[index]
    }

    /// Get the radius (weight) of a cell's generator.
    #[inline]
    pub fn radius(&self, index: usize) -> f64 {
        self.radii[index]
    }

    /// Whether cell `index` was successfully constructed.
    #[inline]
    pub fn is_built(&self, index: usize) -> bool {
        self.built[index]
    }

    /// Get a view of a specific cell by original input index.
    pub fn cell(&self, index: usize) -> CellView<'_> {
        let vs = self.vertex_offsets[index] as usize..self.vertex_offsets[index + 1] as usize;
        let fs = self.face_offsets[index] as usize..self.face_offsets[index + 1] as usize;
        let fvs =
            self.face_vertex_offsets[index] as usize..self.face_vertex_offsets[index + 1] as usize;
        CellView {
            index,
            built: self.built[index],
            generator: self.generators[index],
            vertices: &self.vertices[vs],
            neighbors: &self.neighbors[fs.clone()],
            face_vertex_counts: &self.face_vertex_counts[fs],
            face_vertices: &self.face_vertices[fvs],
        }
    }

    /// Iterate over all cells in input order.
    pub fn iter_cells(&self) -> impl Iterator<Item = CellView<'_>> {
        (0..self.num_cells()).map(move |i| self.cell(i))
    }
}

/// A view into a single cell's record.
#[derive(Debug, Clone, Copy)]
pub struct CellView<'a> {
    /// Original input index of the owning point.
    pub index: usize,
    /// False if construction failed; all slices are then empty.
    pub built: bool,
    /// The owning point's (canonical) position.
    pub generator: DVec3,
    /// Cell vertices in absolute domain coordinates.
    pub vertices: &'a [DVec3],
    /// One entry per face: the neighbor's input index, or a wall sentinel in
    /// `-6..=-1` (−1/−2 = x low/high, −3/−4 = y, −5/−6 = z).
    pub neighbors: &'a [i32],
    /// Vertices bounding each face, parallel to `neighbors`.
    pub face_vertex_counts: &'a [u32],
    /// Flattened face rings, indices into `vertices`.
    pub face_vertices: &'a [u32],
}

impl<'a> CellView<'a> {
    /// Number of vertices in this cell.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces (and neighbor entries) in this cell.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.neighbors.len()
    }

    /// Returns true if the cell has no geometry (failed or degenerate).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vertex coordinates as a flat `[x0, y0, z0, x1, ...]` slice.
    #[inline]
    pub fn vertex_coords(&self) -> &'a [f64] {
        bytemuck::cast_slice(self.vertices)
    }

    /// The ordered vertex ring of face `face`.
    pub fn face_ring(&self, face: usize) -> &'a [u32] {
        let start: usize = self.face_vertex_counts[..face]
            .iter()
            .map(|&c| c as usize)
            .sum();
        &self.face_vertices[start..start + self.face_vertex_counts[face] as usize]
    }
}

fn as_offset(len: usize) -> u32 {
    u32::try_from(len).expect("tessellation buffer exceeds u32 capacity")
}
