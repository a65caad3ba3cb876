//! Geometric correctness tests for box-voronoi.
//!
//! These verify invariants that must hold for any valid weighted Voronoi
//! tessellation of a box: partition of the domain volume, bisector-plane
//! placement, neighbor symmetry, and periodic wrap-around.

mod support;

use box_voronoi::{
    compute, compute_with, CellView, DVec3, Domain, TessellationConfig,
};
use box_voronoi::validation::validate;
use support::points::{lattice_points, permutation, random_box_points, random_radii};

/// Volume of a convex cell via fan triangulation of its faces, taken
/// relative to the generator. Positive iff faces are wound outward.
fn cell_volume(cell: &CellView) -> f64 {
    let origin = cell.generator;
    let mut six_v = 0.0;
    for f in 0..cell.num_faces() {
        let ring = cell.face_ring(f);
        let v0 = cell.vertices[ring[0] as usize] - origin;
        for k in 1..ring.len() - 1 {
            let v1 = cell.vertices[ring[k] as usize] - origin;
            let v2 = cell.vertices[ring[k + 1] as usize] - origin;
            six_v += v0.dot(v1.cross(v2));
        }
    }
    six_v / 6.0
}

#[test]
fn test_two_points_share_the_bisector_plane() {
    let domain = Domain::new(DVec3::splat(-5.0), DVec3::splat(5.0));
    let points = vec![DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0)];
    let config = TessellationConfig {
        blocks: Some([1, 1, 1]),
        threads: 1,
    };
    let output = compute_with(&points, &[0.0, 0.0], domain, config).unwrap();

    let a = output.tessellation.cell(0);
    let b = output.tessellation.cell(1);
    assert!(a.neighbors.contains(&1));
    assert!(b.neighbors.contains(&0));

    // The shared face lies in the perpendicular bisector x = 1.
    for (cell, other) in [(&a, 1), (&b, 0)] {
        let face = cell.neighbors.iter().position(|&n| n == other).unwrap();
        for &v in cell.face_ring(face) {
            assert!(
                (cell.vertices[v as usize].x - 1.0).abs() < 1e-9,
                "bisector face vertex off the x = 1 plane"
            );
        }
    }

    // Each half-box has half the volume.
    assert!((cell_volume(&a) - 600.0).abs() < 1e-6);
    assert!((cell_volume(&b) - 600.0).abs() < 1e-6);
}

#[test]
fn test_radical_plane_respects_weights() {
    let domain = Domain::new(DVec3::splat(-5.0), DVec3::splat(5.0));
    let points = vec![DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0)];
    let output = compute(&points, &[0.0, 1.0], domain).unwrap();

    // |x - p0|^2 = |x - p1|^2 - r1^2 puts the plane at x = 3/4.
    let a = output.tessellation.cell(0);
    let face = a.neighbors.iter().position(|&n| n == 1).unwrap();
    for &v in a.face_ring(face) {
        assert!((a.vertices[v as usize].x - 0.75).abs() < 1e-9);
    }
}

#[test]
fn test_growing_a_radius_moves_the_shared_face() {
    let domain = Domain::new(DVec3::splat(-5.0), DVec3::splat(5.0));
    let points = vec![DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0)];

    let mut volumes = Vec::new();
    for r1 in [0.0, 0.5, 1.0] {
        let output = compute(&points, &[0.0, r1], domain).unwrap();
        let a = output.tessellation.cell(0);
        let b = output.tessellation.cell(1);
        volumes.push((cell_volume(&a), cell_volume(&b)));

        // The pair still tiles the whole box.
        let total = cell_volume(&a) + cell_volume(&b);
        assert!((total - 1000.0).abs() < 1e-6);
    }

    // Heavier point 1 claims strictly more space each step.
    for w in volumes.windows(2) {
        assert!(w[1].0 < w[0].0, "cell 0 must shrink as radius 1 grows");
        assert!(w[1].1 > w[0].1, "cell 1 must grow with its radius");
    }
}

#[test]
fn test_cell_volumes_partition_the_domain() {
    let domain = Domain::new(DVec3::ZERO, DVec3::splat(2.0));
    let points = random_box_points(120, 0.0, 2.0, 31415);
    let radii = vec![0.0; 120];
    let output = compute(&points, &radii, domain).unwrap();

    assert_eq!(output.tessellation.num_built(), 120);
    let total: f64 = output.tessellation.iter_cells().map(|c| cell_volume(&c)).sum();
    assert!(
        (total - 8.0).abs() < 1e-8,
        "cell volumes must sum to the domain volume, got {total}"
    );
}

#[test]
fn test_weighted_cell_volumes_partition_the_domain() {
    let domain = Domain::new(DVec3::ZERO, DVec3::ONE);
    let points = random_box_points(60, 0.0, 1.0, 2718);
    let radii = random_radii(60, 0.03, 2718);
    let output = compute(&points, &radii, domain).unwrap();

    let total: f64 = output
        .tessellation
        .iter_cells()
        .filter(|c| c.built)
        .map(|c| cell_volume(&c))
        .sum();
    assert!((total - 1.0).abs() < 1e-8);
}

#[test]
fn test_lattice_tessellates_into_cubes() {
    let m = 3;
    let points = lattice_points(m);
    let domain = Domain::new(DVec3::ZERO, DVec3::ONE);
    let config = TessellationConfig {
        blocks: Some([m as u32; 3]),
        threads: 1,
    };
    let output = compute_with(&points, &vec![0.0; points.len()], domain, config).unwrap();

    let expected = 1.0 / (m * m * m) as f64;
    for cell in output.tessellation.iter_cells() {
        assert!(cell.built);
        assert_eq!(cell.num_faces(), 6, "lattice cells are cubes");
        assert_eq!(cell.num_vertices(), 8);
        assert!((cell_volume(&cell) - expected).abs() < 1e-12);
    }

    // Interior cell: six finite neighbors, the axis-adjacent lattice sites.
    let center = output.tessellation.cell(13);
    let mut neighbors: Vec<i32> = center.neighbors.to_vec();
    neighbors.sort_unstable();
    assert_eq!(neighbors, vec![4, 10, 12, 14, 16, 22]);

    // Corner cell: three walls, three finite neighbors.
    let corner = output.tessellation.cell(0);
    let walls = corner.neighbors.iter().filter(|&&n| n < 0).count();
    assert_eq!(walls, 3);

    let report = validate(&output.tessellation);
    assert!(report.is_perfect(), "lattice run not perfect: {}", report.summary());
}

#[test]
fn test_neighbor_symmetry_random_points() {
    let domain = Domain::new(DVec3::ZERO, DVec3::ONE);
    let points = random_box_points(200, 0.0, 1.0, 161803);
    let output = compute(&points, &vec![0.0; 200], domain).unwrap();

    let report = validate(&output.tessellation);
    assert_eq!(report.num_built, 200);
    assert!(report.is_valid(), "validation failed: {}", report.summary());
}

#[test]
fn test_insertion_order_does_not_change_geometry() {
    let domain = Domain::new(DVec3::ZERO, DVec3::ONE);
    let points = random_box_points(90, 0.0, 1.0, 55);
    let radii = random_radii(90, 0.02, 55);

    let base = compute(&points, &radii, domain).unwrap();

    let perm = permutation(points.len(), 7);
    let shuffled_points: Vec<DVec3> = perm.iter().map(|&i| points[i]).collect();
    let shuffled_radii: Vec<f64> = perm.iter().map(|&i| radii[i]).collect();
    let shuffled = compute(&shuffled_points, &shuffled_radii, domain).unwrap();

    for (new_index, &old_index) in perm.iter().enumerate() {
        let a = base.tessellation.cell(old_index);
        let b = shuffled.tessellation.cell(new_index);
        assert_eq!(a.built, b.built);
        assert!(
            (cell_volume(&a) - cell_volume(&b)).abs() < 1e-9,
            "cell volume changed with insertion order"
        );
        assert_eq!(a.num_faces(), b.num_faces());
    }
}

#[test]
fn test_block_resolution_does_not_change_geometry() {
    let domain = Domain::new(DVec3::ZERO, DVec3::ONE);
    let points = random_box_points(70, 0.0, 1.0, 909);
    let radii = random_radii(70, 0.02, 909);

    let coarse = compute_with(
        &points,
        &radii,
        domain,
        TessellationConfig {
            blocks: Some([1, 1, 1]),
            threads: 1,
        },
    )
    .unwrap();
    let fine = compute_with(
        &points,
        &radii,
        domain,
        TessellationConfig {
            blocks: Some([3, 4, 5]),
            threads: 1,
        },
    )
    .unwrap();

    for i in 0..70 {
        let a = coarse.tessellation.cell(i);
        let b = fine.tessellation.cell(i);
        assert_eq!(a.built, b.built);
        assert!((cell_volume(&a) - cell_volume(&b)).abs() < 1e-9);

        let mut na: Vec<i32> = a.neighbors.to_vec();
        let mut nb: Vec<i32> = b.neighbors.to_vec();
        na.sort_unstable();
        nb.sort_unstable();
        assert_eq!(na, nb, "cell {i} neighbor set changed with block counts");
    }
}

#[test]
fn test_periodic_pair_wraps_around() {
    let domain = Domain::periodic(DVec3::ZERO, DVec3::ONE, [true, false, false]);
    let points = vec![DVec3::new(0.25, 0.5, 0.5), DVec3::new(0.75, 0.5, 0.5)];
    let config = TessellationConfig {
        blocks: Some([2, 1, 1]),
        threads: 1,
    };
    let output = compute_with(&points, &[0.0, 0.0], domain, config).unwrap();

    for index in 0..2 {
        let cell = output.tessellation.cell(index);
        assert!(cell.built);

        // Two faces against the other point (direct and wrapped image), no
        // x walls.
        let other = 1 - index as i32;
        let against_other = cell.neighbors.iter().filter(|&&n| n == other).count();
        assert_eq!(against_other, 2, "expected direct and image face");
        assert!(!cell.neighbors.contains(&-1));
        assert!(!cell.neighbors.contains(&-2));

        assert!((cell_volume(&cell) - 0.5).abs() < 1e-9);
    }

    // Cell 0 spans [0, 0.5] along x.
    let a = output.tessellation.cell(0);
    let min_x = a.vertices.iter().map(|v| v.x).fold(f64::INFINITY, f64::min);
    let max_x = a.vertices.iter().map(|v| v.x).fold(f64::NEG_INFINITY, f64::max);
    assert!(min_x.abs() < 1e-9);
    assert!((max_x - 0.5).abs() < 1e-9);
}

#[test]
fn test_fully_periodic_single_point() {
    let domain = Domain::periodic(DVec3::ZERO, DVec3::ONE, [true, true, true]);
    let points = vec![DVec3::new(0.3, 0.4, 0.5)];
    let output = compute(&points, &[0.0], domain).unwrap();

    let cell = output.tessellation.cell(0);
    assert!(cell.built);
    assert_eq!(cell.num_vertices(), 8);
    assert_eq!(cell.num_faces(), 6);
    assert!((cell_volume(&cell) - 1.0).abs() < 1e-12);
}

#[test]
fn test_periodic_points_outside_the_box_are_wrapped() {
    let domain = Domain::periodic(DVec3::ZERO, DVec3::ONE, [true, true, true]);
    let points = vec![
        DVec3::new(1.25, 0.5, 0.5),
        DVec3::new(-0.25, 0.5, 0.5),
    ];
    let output = compute(&points, &[0.0, 0.0], domain).unwrap();

    // Wrapped to x = 0.25 and x = 0.75: a periodic pair splitting the box.
    assert_eq!(output.tessellation.num_built(), 2);
    let total: f64 = output.tessellation.iter_cells().map(|c| cell_volume(&c)).sum();
    assert!((total - 1.0).abs() < 1e-9);
    assert!((output.tessellation.generator(0).x - 0.25).abs() < 1e-12);
    assert!((output.tessellation.generator(1).x - 0.75).abs() < 1e-12);
}

#[test]
fn test_vertices_stay_inside_a_non_periodic_domain() {
    let domain = Domain::new(DVec3::splat(-3.0), DVec3::splat(3.0));
    let points = random_box_points(150, -3.0, 3.0, 424242);
    let radii = random_radii(150, 0.05, 424242);
    let output = compute(&points, &radii, domain).unwrap();

    for cell in output.tessellation.iter_cells() {
        for v in cell.vertices {
            for axis in 0..3 {
                assert!(v[axis] >= -3.0 - 1e-9 && v[axis] <= 3.0 + 1e-9);
            }
        }
    }
}

#[test]
fn test_validation_is_perfect_on_well_spaced_input() {
    let domain = Domain::new(DVec3::ZERO, DVec3::ONE);
    let points = lattice_points(4);
    let output = compute(&points, &vec![0.0; points.len()], domain).unwrap();

    let report = validate(&output.tessellation);
    assert!(report.is_perfect(), "{}", report.summary());
    assert_eq!(report.num_cells, 64);
    assert_eq!(report.degenerate_cells, 0);
}
