//! Block grid: spatial bucket storage for admitted points.
//!
//! The domain is divided into `nx × ny × nz` rectangular blocks. Points are
//! grouped by block in a flat CSR layout (offsets + indices), built with a
//! counting sort: count per bucket, prefix-sum, scatter. O(n) build, O(1)
//! bucket lookup.
//!
//! The grid is populated once during admission and is read-only for the rest
//! of the run; workers share it freely during cell construction. The CSR
//! `point_indices` array doubles as the (bucket, slot) → original-index
//! mapping: iteration over stored points runs in bucket order, and each slot
//! yields the input index its results belong to.

use glam::DVec3;
use tracing::debug;

use crate::domain::Domain;

pub(crate) struct BlockGrid {
    domain: Domain,
    blocks: [u32; 3],
    /// Side lengths of one block.
    block_side: DVec3,
    /// Start index into `point_indices` for each bucket, plus final length.
    /// Length: nx * ny * nz + 1.
    bucket_offsets: Vec<u32>,
    /// Original point indices grouped by bucket. Length: n.
    point_indices: Vec<u32>,
    /// Canonical positions by original index (periodic axes wrapped).
    positions: Vec<DVec3>,
    /// Radii by original index.
    radii: Vec<f64>,
    /// Largest radius over all points; bounds the kernel's candidate search.
    max_radius: f64,
}

impl BlockGrid {
    /// Scatter validated points into buckets. The caller has already checked
    /// containment, finiteness, and radius signs.
    pub fn build(domain: Domain, blocks: [u32; 3], points: Vec<DVec3>, radii: Vec<f64>) -> Self {
        let num_buckets = blocks[0] as usize * blocks[1] as usize * blocks[2] as usize;
        let block_side = domain.lengths() / DVec3::new(blocks[0] as f64, blocks[1] as f64, blocks[2] as f64);

        let positions: Vec<DVec3> = points.into_iter().map(|p| domain.wrap(p)).collect();
        let max_radius = radii.iter().copied().fold(0.0, f64::max);

        // Counting sort: count, prefix-sum, scatter.
        let mut bucket_offsets = vec![0u32; num_buckets + 1];
        let buckets: Vec<u32> = positions
            .iter()
            .map(|&p| bucket_index(&domain, blocks, block_side, p))
            .collect();
        for &b in &buckets {
            bucket_offsets[b as usize + 1] += 1;
        }
        for i in 0..num_buckets {
            bucket_offsets[i + 1] += bucket_offsets[i];
        }

        let mut cursor: Vec<u32> = bucket_offsets[..num_buckets].to_vec();
        let mut point_indices = vec![0u32; positions.len()];
        for (i, &b) in buckets.iter().enumerate() {
            point_indices[cursor[b as usize] as usize] = i as u32;
            cursor[b as usize] += 1;
        }

        debug!(
            points = positions.len(),
            blocks = ?blocks,
            max_radius,
            "block grid built"
        );

        Self {
            domain,
            blocks,
            block_side,
            bucket_offsets,
            point_indices,
            positions,
            radii,
            max_radius,
        }
    }

    #[inline]
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    #[inline]
    pub fn blocks(&self) -> [u32; 3] {
        self.blocks
    }

    #[inline]
    pub fn block_side(&self) -> DVec3 {
        self.block_side
    }

    #[inline]
    pub fn num_points(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn max_radius(&self) -> f64 {
        self.max_radius
    }

    /// Canonical position of a point by original index.
    #[inline]
    pub fn position(&self, index: u32) -> DVec3 {
        self.positions[index as usize]
    }

    #[inline]
    pub fn radius(&self, index: u32) -> f64 {
        self.radii[index as usize]
    }

    /// All original point indices in stored (bucket-major) order.
    ///
    /// This is both the driver's iteration order and the reverse mapping back
    /// to input indices: entry k of a stored-order result vector belongs to
    /// input index `stored_order()[k]`.
    #[inline]
    pub fn stored_order(&self) -> &[u32] {
        &self.point_indices
    }

    /// Original point indices stored in one bucket, in insertion order.
    #[inline]
    pub fn bucket_points(&self, bucket: usize) -> &[u32] {
        let start = self.bucket_offsets[bucket] as usize;
        let end = self.bucket_offsets[bucket + 1] as usize;
        &self.point_indices[start..end]
    }

    /// Per-axis block coordinates of the bucket containing `p`.
    pub fn block_coords(&self, p: DVec3) -> [i64; 3] {
        let mut coords = [0i64; 3];
        for axis in 0..3 {
            let rel = (p[axis] - self.domain.min[axis]) / self.block_side[axis];
            // Points exactly on the upper bound land in the top block.
            coords[axis] = (rel as i64).clamp(0, self.blocks[axis] as i64 - 1);
        }
        coords
    }

    #[inline]
    pub fn bucket_at(&self, coords: [i64; 3]) -> usize {
        debug_assert!((0..3).all(|a| coords[a] >= 0 && coords[a] < self.blocks[a] as i64));
        coords[0] as usize
            + self.blocks[0] as usize * (coords[1] as usize + self.blocks[1] as usize * coords[2] as usize)
    }
}

fn bucket_index(domain: &Domain, blocks: [u32; 3], block_side: DVec3, p: DVec3) -> u32 {
    let mut bucket = 0u32;
    // z-major flattening: ix + nx * (iy + ny * iz).
    for axis in (0..3).rev() {
        let rel = (p[axis] - domain.min[axis]) / block_side[axis];
        let i = (rel as i64).clamp(0, blocks[axis] as i64 - 1) as u32;
        bucket = bucket * blocks[axis] + i;
    }
    bucket
}
