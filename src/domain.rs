//! Rectangular tessellation domain with optional periodic axes.

use glam::DVec3;

use crate::error::VoronoiError;

/// An axis-aligned box containing the tessellation, with a periodicity flag
/// per axis.
///
/// On a periodic axis points may carry any coordinate; they are wrapped into
/// the box when stored, and cells near one boundary see neighbor images from
/// the opposite boundary. On a non-periodic axis every point must lie within
/// the bounds (inclusive) and cells are cut off by the domain walls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub min: DVec3,
    pub max: DVec3,
    pub periodic: [bool; 3],
}

impl Domain {
    /// A non-periodic box between `min` and `max`.
    #[inline]
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self {
            min,
            max,
            periodic: [false; 3],
        }
    }

    /// A box with per-axis periodicity flags.
    #[inline]
    pub fn periodic(min: DVec3, max: DVec3, periodic: [bool; 3]) -> Self {
        Self { min, max, periodic }
    }

    /// Check the bounds. Every axis needs `min < max`, periodic or not.
    pub fn validate(&self) -> Result<(), VoronoiError> {
        for axis in 0..3 {
            if !(self.min[axis] < self.max[axis]) {
                return Err(VoronoiError::InvalidDomain {
                    axis: AXIS_NAMES[axis],
                    lower: self.min[axis],
                    upper: self.max[axis],
                });
            }
        }
        Ok(())
    }

    /// Edge lengths of the box.
    #[inline]
    pub fn lengths(&self) -> DVec3 {
        self.max - self.min
    }

    /// Whether `p` is admissible: periodic axes accept any coordinate,
    /// non-periodic axes require bound-inclusive containment.
    pub fn contains(&self, p: DVec3) -> bool {
        (0..3).all(|axis| {
            self.periodic[axis] || (self.min[axis] <= p[axis] && p[axis] <= self.max[axis])
        })
    }

    /// Canonical position for storage: periodic coordinates wrapped into
    /// `[min, max)`, non-periodic coordinates unchanged.
    pub(crate) fn wrap(&self, p: DVec3) -> DVec3 {
        let len = self.lengths();
        let mut out = p;
        for axis in 0..3 {
            if self.periodic[axis] {
                out[axis] = self.min[axis] + (p[axis] - self.min[axis]).rem_euclid(len[axis]);
            }
        }
        out
    }

    /// Block counts from the point density: roughly one point per block,
    /// scaled to the box aspect ratio. Used when the caller gives no explicit
    /// counts.
    pub(crate) fn heuristic_blocks(&self, num_points: usize) -> [u32; 3] {
        let len = self.lengths();
        let volume = len.x * len.y * len.z;
        let n_third = (num_points as f64 / volume).cbrt();
        [
            ((n_third * len.x).round() as u32).max(1),
            ((n_third * len.y).round() as u32).max(1),
            ((n_third * len.z).round() as u32).max(1),
        ]
    }
}

const AXIS_NAMES: [char; 3] = ['x', 'y', 'z'];
