#![allow(dead_code)]

use box_voronoi::DVec3;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Generate random points uniformly distributed in the cube `[min, max]^3`.
pub fn random_box_points(n: usize, min: f64, max: f64, seed: u64) -> Vec<DVec3> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            DVec3::new(
                rng.gen_range(min..max),
                rng.gen_range(min..max),
                rng.gen_range(min..max),
            )
        })
        .collect()
}

/// Generate random radii in `[0, max_radius)`.
pub fn random_radii(n: usize, max_radius: f64, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed ^ 0x5eed);
    (0..n).map(|_| rng.gen_range(0.0..max_radius)).collect()
}

/// Regular `m × m × m` lattice of cell centers in the unit cube.
///
/// Input index is `i + m * (j + m * k)`. The exact tessellation is a grid of
/// equal cubes, which makes face counts and volumes predictable; the many
/// exactly-tangent diagonal planes also stress the on-plane classification.
pub fn lattice_points(m: usize) -> Vec<DVec3> {
    let mut points = Vec::with_capacity(m * m * m);
    for k in 0..m {
        for j in 0..m {
            for i in 0..m {
                points.push(DVec3::new(
                    (i as f64 + 0.5) / m as f64,
                    (j as f64 + 0.5) / m as f64,
                    (k as f64 + 0.5) / m as f64,
                ));
            }
        }
    }
    points
}

/// A seeded permutation of `0..n`.
pub fn permutation(n: usize, seed: u64) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut perm: Vec<usize> = (0..n).collect();
    // Fisher-Yates.
    for i in (1..n).rev() {
        let j = rng.gen_range(0..=i);
        perm.swap(i, j);
    }
    perm
}
