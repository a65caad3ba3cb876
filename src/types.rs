//! Input point trait for tessellation computation.

use glam::DVec3;

/// Trait for types that can be used as input points.
///
/// This allows zero-copy input from various math libraries and plain arrays.
/// Coordinates are absolute domain coordinates in `f64`.
pub trait Point3Like {
    fn x(&self) -> f64;
    fn y(&self) -> f64;
    fn z(&self) -> f64;

    #[inline]
    fn to_dvec3(&self) -> DVec3 {
        DVec3::new(self.x(), self.y(), self.z())
    }
}

impl Point3Like for DVec3 {
    #[inline]
    fn x(&self) -> f64 {
        self.x
    }
    #[inline]
    fn y(&self) -> f64 {
        self.y
    }
    #[inline]
    fn z(&self) -> f64 {
        self.z
    }
}

impl Point3Like for [f64; 3] {
    #[inline]
    fn x(&self) -> f64 {
        self[0]
    }
    #[inline]
    fn y(&self) -> f64 {
        self[1]
    }
    #[inline]
    fn z(&self) -> f64 {
        self[2]
    }
}

impl Point3Like for (f64, f64, f64) {
    #[inline]
    fn x(&self) -> f64 {
        self.0
    }
    #[inline]
    fn y(&self) -> f64 {
        self.1
    }
    #[inline]
    fn z(&self) -> f64 {
        self.2
    }
}
