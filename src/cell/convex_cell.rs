//! Convex polyhedral cell cut by halfspaces.
//!
//! A cell lives in cell-local coordinates with its owner point at the origin.
//! It starts as the domain box and is clipped by one radical plane per
//! effective neighbor. The representation is a face list: shared vertex
//! positions plus one ordered vertex ring per face, wound counter-clockwise
//! seen from outside the cell.
//!
//! Invariant: `vertices` holds exactly the positions referenced by faces;
//! every cut ends with a compaction pass. This keeps the all-inside /
//! all-outside classification and the max-vertex-norm bound exact.

use glam::DVec3;
use rustc_hash::FxHashMap;

/// Wall sentinels for faces produced by the domain boundary, one per wall:
/// −1/−2 = x low/high, −3/−4 = y low/high, −5/−6 = z low/high.
#[inline]
pub(crate) fn wall_sentinel(axis: usize, high: bool) -> i32 {
    -(axis as i32 * 2 + 1 + high as i32)
}

/// Outcome of one halfspace cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CutOutcome {
    /// The plane misses (or merely touches) the cell; no face was added.
    Unchanged,
    /// The plane sliced the cell; a face carrying the neighbor id was added.
    Cut,
    /// Nothing of the cell lies strictly inside the halfspace. The cell is
    /// gone; the owning point has no region of its own.
    Destroyed,
}

/// Relative tolerance for on-plane classification, scaled by the initial box
/// diagonal.
const TOL_REL: f64 = 1e-11;

#[derive(Debug, Clone)]
struct Face {
    neighbor: i32,
    ring: Vec<u32>,
}

pub(crate) struct ConvexCell {
    vertices: Vec<DVec3>,
    faces: Vec<Face>,
    tol: f64,
    // Scratch reused across cuts.
    dist: Vec<f64>,
    edge_cut: FxHashMap<(u32, u32), u32>,
    cap: Vec<u32>,
    remap: Vec<u32>,
}

impl ConvexCell {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            tol: 0.0,
            dist: Vec::new(),
            edge_cut: FxHashMap::default(),
            cap: Vec::new(),
            remap: Vec::new(),
        }
    }

    /// Reset to the axis-aligned box `[lo, hi]` in cell-local coordinates.
    /// Wall faces are wound counter-clockwise seen from outside.
    pub fn init_box(&mut self, lo: DVec3, hi: DVec3) {
        self.vertices.clear();
        self.faces.clear();
        self.tol = TOL_REL * (hi - lo).length();

        for iz in 0..2 {
            for iy in 0..2 {
                for ix in 0..2 {
                    self.vertices.push(DVec3::new(
                        if ix == 0 { lo.x } else { hi.x },
                        if iy == 0 { lo.y } else { hi.y },
                        if iz == 0 { lo.z } else { hi.z },
                    ));
                }
            }
        }

        const WALL_RINGS: [[u32; 4]; 6] = [
            [0, 4, 6, 2], // x low
            [1, 3, 7, 5], // x high
            [0, 1, 5, 4], // y low
            [2, 6, 7, 3], // y high
            [0, 2, 3, 1], // z low
            [4, 5, 7, 6], // z high
        ];
        for (w, ring) in WALL_RINGS.iter().enumerate() {
            self.faces.push(Face {
                neighbor: wall_sentinel(w / 2, w % 2 == 1),
                ring: ring.to_vec(),
            });
        }
    }

    #[inline]
    pub fn tol(&self) -> f64 {
        self.tol
    }

    /// Largest distance from the owner (the local origin) to any cell vertex.
    pub fn max_vertex_norm(&self) -> f64 {
        self.vertices
            .iter()
            .map(|v| v.length())
            .fold(0.0, f64::max)
    }

    /// Clip by the halfspace `normal · x <= offset` (`normal` unit length),
    /// keeping the owner's side. An effective cut appends one face carrying
    /// `neighbor`.
    pub fn cut(&mut self, normal: DVec3, offset: f64, neighbor: i32) -> CutOutcome {
        let tol = self.tol;
        self.dist.clear();
        self.dist
            .extend(self.vertices.iter().map(|&v| normal.dot(v) - offset));

        let any_out = self.dist.iter().any(|&d| d > tol);
        if !any_out {
            return CutOutcome::Unchanged;
        }
        let any_in = self.dist.iter().any(|&d| d < -tol);
        if !any_in {
            return CutOutcome::Destroyed;
        }

        self.edge_cut.clear();
        self.cap.clear();

        let mut f = 0;
        while f < self.faces.len() {
            let ring_len = self.faces[f].ring.len();
            let mut new_ring: Vec<u32> = Vec::with_capacity(ring_len + 2);

            for k in 0..ring_len {
                let a = self.faces[f].ring[k];
                let b = self.faces[f].ring[(k + 1) % ring_len];
                let da = self.dist[a as usize];
                let db = self.dist[b as usize];

                if da <= tol {
                    new_ring.push(a);
                    if da.abs() <= tol {
                        self.cap.push(a);
                    }
                }
                if (da < -tol && db > tol) || (da > tol && db < -tol) {
                    let key = (a.min(b), a.max(b));
                    // One intersection vertex per undirected edge, shared by
                    // both faces bordering it.
                    let idx = match self.edge_cut.get(&key) {
                        Some(&i) => i,
                        None => {
                            let va = self.vertices[a as usize];
                            let vb = self.vertices[b as usize];
                            let t = da / (da - db);
                            self.vertices.push(va + (vb - va) * t);
                            let i = (self.vertices.len() - 1) as u32;
                            self.edge_cut.insert(key, i);
                            i
                        }
                    };
                    new_ring.push(idx);
                    self.cap.push(idx);
                }
            }

            if new_ring.len() >= 3 {
                self.faces[f].ring = new_ring;
                f += 1;
            } else {
                self.faces.swap_remove(f);
            }
        }

        self.cap.sort_unstable();
        self.cap.dedup();
        if self.cap.len() >= 3 {
            let ring = self.ordered_cap(normal);
            self.faces.push(Face { neighbor, ring });
        }

        self.compact();
        CutOutcome::Cut
    }

    /// Order the cap vertices counter-clockwise around the outward plane
    /// normal. The cell is convex, so angular order around the cap centroid
    /// is the polygon order.
    fn ordered_cap(&self, normal: DVec3) -> Vec<u32> {
        let inv = 1.0 / self.cap.len() as f64;
        let centroid = self
            .cap
            .iter()
            .fold(DVec3::ZERO, |acc, &i| acc + self.vertices[i as usize])
            * inv;

        let axis = smallest_axis(normal);
        let u = normal.cross(axis).normalize();
        let w = normal.cross(u);

        let mut keyed: Vec<(f64, u32)> = self
            .cap
            .iter()
            .map(|&i| {
                let r = self.vertices[i as usize] - centroid;
                (r.dot(w).atan2(r.dot(u)), i)
            })
            .collect();
        keyed.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));
        keyed.into_iter().map(|(_, i)| i).collect()
    }

    /// Drop vertices no longer referenced by any face and remap the rings.
    fn compact(&mut self) {
        const DEAD: u32 = u32::MAX;
        self.remap.clear();
        self.remap.resize(self.vertices.len(), DEAD);
        for face in &self.faces {
            for &v in &face.ring {
                self.remap[v as usize] = 0;
            }
        }

        let mut next = 0u32;
        for slot in self.remap.iter_mut() {
            if *slot != DEAD {
                *slot = next;
                next += 1;
            }
        }

        let remap = &self.remap;
        let mut keep = 0;
        for i in 0..self.vertices.len() {
            if remap[i] != DEAD {
                self.vertices[keep] = self.vertices[i];
                keep += 1;
            }
        }
        self.vertices.truncate(keep);

        for face in &mut self.faces {
            for v in &mut face.ring {
                *v = remap[*v as usize];
            }
        }
    }

    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Write the cell out as flat geometry, translating vertices from the
    /// cell-local frame to absolute coordinates by the owner position.
    pub fn extract_into(&self, owner: DVec3, out: &mut super::CellGeometry) {
        out.vertices.clear();
        out.neighbors.clear();
        out.face_vertex_counts.clear();
        out.face_vertices.clear();

        out.vertices
            .extend(self.vertices.iter().map(|&v| v + owner));
        for face in &self.faces {
            out.neighbors.push(face.neighbor);
            out.face_vertex_counts.push(face.ring.len() as u32);
            out.face_vertices.extend_from_slice(&face.ring);
        }
    }
}

#[inline]
fn smallest_axis(n: DVec3) -> DVec3 {
    let a = n.abs();
    if a.x <= a.y && a.x <= a.z {
        DVec3::X
    } else if a.y <= a.z {
        DVec3::Y
    } else {
        DVec3::Z
    }
}
