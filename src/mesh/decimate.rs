//! Triangle budget reduction by quadric-error edge collapse.
//!
//! Each vertex accumulates the squared-distance quadric of its incident face
//! planes (Garland & Heckbert). Edges are collapsed cheapest-first into the
//! point minimizing the combined quadric until the triangle count fits the
//! budget. Open borders carry an extra weighted quadric so silhouettes of
//! scanned tiles don't erode.

use super::TriMesh;
use glam::{DMat3, DVec3};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// Weight of the perpendicular planes that pin open border edges.
const BORDER_WEIGHT: f64 = 1000.0;

/// Reduce `mesh` to at most `max_faces` triangles.
///
/// Returns the mesh unchanged when it already fits, so decimating twice with
/// the same budget is the same as decimating once.
pub fn decimate(mesh: &TriMesh, max_faces: usize) -> TriMesh {
    if mesh.triangle_count() <= max_faces {
        return mesh.clone();
    }

    let mut simplifier = Simplifier::new(mesh);
    simplifier.collapse_until(max_faces, true);
    if simplifier.alive_triangles > max_faces {
        // Every remaining collapse would fold a face over; accept that
        // rather than exceed the budget.
        simplifier.collapse_until(max_faces, false);
    }
    simplifier.into_mesh(max_faces)
}

/// Symmetric 4x4 quadric, upper triangle stored row by row.
#[derive(Debug, Clone, Copy, Default)]
struct Quadric([f64; 10]);

impl Quadric {
    /// Quadric of the plane `n·p + d = 0`.
    fn from_plane(n: DVec3, d: f64) -> Self {
        let (a, b, c) = (n.x, n.y, n.z);
        Self([
            a * a,
            a * b,
            a * c,
            a * d,
            b * b,
            b * c,
            b * d,
            c * c,
            c * d,
            d * d,
        ])
    }

    fn add(&mut self, other: &Quadric) {
        for (v, o) in self.0.iter_mut().zip(other.0.iter()) {
            *v += o;
        }
    }

    fn scaled(mut self, s: f64) -> Self {
        for v in &mut self.0 {
            *v *= s;
        }
        self
    }

    /// Sum of squared distances from `p` to the accumulated planes.
    fn error(&self, p: DVec3) -> f64 {
        let q = &self.0;
        let (x, y, z) = (p.x, p.y, p.z);
        q[0] * x * x
            + 2.0 * q[1] * x * y
            + 2.0 * q[2] * x * z
            + 2.0 * q[3] * x
            + q[4] * y * y
            + 2.0 * q[5] * y * z
            + 2.0 * q[6] * y
            + q[7] * z * z
            + 2.0 * q[8] * z
            + q[9]
    }

    /// Point of minimal error, if the quadric is not singular.
    fn minimizer(&self) -> Option<DVec3> {
        let q = &self.0;
        let m = DMat3::from_cols(
            DVec3::new(q[0], q[1], q[2]),
            DVec3::new(q[1], q[4], q[5]),
            DVec3::new(q[2], q[5], q[7]),
        );
        if m.determinant().abs() < 1e-10 {
            return None;
        }
        Some(m.inverse() * DVec3::new(-q[3], -q[6], -q[8]))
    }
}

/// An edge collapse waiting in the queue.
///
/// Stamps record the versions of both endpoints when the entry was queued;
/// an entry is stale once either endpoint has changed.
#[derive(Debug, Clone, Copy)]
struct Collapse {
    cost: f64,
    keep: u32,
    remove: u32,
    keep_stamp: u32,
    remove_stamp: u32,
    target: DVec3,
}

impl PartialEq for Collapse {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Collapse {}

impl PartialOrd for Collapse {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Collapse {
    // Reversed so the max-heap pops the cheapest edge; ties break on indices
    // to keep the result deterministic.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.keep.cmp(&self.keep))
            .then_with(|| other.remove.cmp(&self.remove))
    }
}

struct Simplifier {
    positions: Vec<DVec3>,
    quadrics: Vec<Quadric>,
    triangles: Vec<[u32; 3]>,
    triangle_alive: Vec<bool>,
    vertex_triangles: Vec<Vec<u32>>,
    vertex_alive: Vec<bool>,
    stamps: Vec<u32>,
    alive_triangles: usize,
}

impl Simplifier {
    fn new(mesh: &TriMesh) -> Self {
        let positions: Vec<DVec3> = mesh
            .positions
            .iter()
            .map(|p| DVec3::new(p[0] as f64, p[1] as f64, p[2] as f64))
            .collect();
        let triangles: Vec<[u32; 3]> = (0..mesh.triangle_count()).map(|i| mesh.triangle(i)).collect();
        let triangle_alive: Vec<bool> = triangles
            .iter()
            .map(|t| t[0] != t[1] && t[1] != t[2] && t[0] != t[2])
            .collect();

        let mut vertex_triangles = vec![Vec::new(); positions.len()];
        for (t, tri) in triangles.iter().enumerate() {
            if triangle_alive[t] {
                for &v in tri {
                    vertex_triangles[v as usize].push(t as u32);
                }
            }
        }

        let alive_triangles = triangle_alive.iter().filter(|&&a| a).count();
        let mut simplifier = Self {
            quadrics: vec![Quadric::default(); positions.len()],
            vertex_alive: vec![true; positions.len()],
            stamps: vec![0; positions.len()],
            positions,
            triangles,
            triangle_alive,
            vertex_triangles,
            alive_triangles,
        };
        simplifier.accumulate_quadrics();
        simplifier
    }

    fn accumulate_quadrics(&mut self) {
        let mut edge_faces: HashMap<(u32, u32), (u32, usize)> = HashMap::new();

        for (t, tri) in self.triangles.iter().enumerate() {
            if !self.triangle_alive[t] {
                continue;
            }
            let Some(normal) = self.face_normal(*tri) else {
                continue;
            };
            let d = -normal.dot(self.positions[tri[0] as usize]);
            let plane = Quadric::from_plane(normal, d);
            for &v in tri {
                self.quadrics[v as usize].add(&plane);
            }
            for k in 0..3 {
                let (a, b) = (tri[k], tri[(k + 1) % 3]);
                let entry = edge_faces.entry((a.min(b), a.max(b))).or_insert((t as u32, 0));
                entry.1 += 1;
            }
        }

        for (&(a, b), &(t, count)) in &edge_faces {
            if count != 1 {
                continue;
            }
            let Some(normal) = self.face_normal(self.triangles[t as usize]) else {
                continue;
            };
            let (pa, pb) = (self.positions[a as usize], self.positions[b as usize]);
            let side = (pb - pa).cross(normal);
            if side.length_squared() == 0.0 {
                continue;
            }
            let side = side.normalize();
            let border = Quadric::from_plane(side, -side.dot(pa)).scaled(BORDER_WEIGHT);
            self.quadrics[a as usize].add(&border);
            self.quadrics[b as usize].add(&border);
        }
    }

    fn face_normal(&self, tri: [u32; 3]) -> Option<DVec3> {
        let [a, b, c] = tri.map(|v| self.positions[v as usize]);
        let n = (b - a).cross(c - a);
        (n.length_squared() > 0.0).then(|| n.normalize())
    }

    fn candidate(&self, keep: u32, remove: u32) -> Collapse {
        let mut q = self.quadrics[keep as usize];
        q.add(&self.quadrics[remove as usize]);

        let pk = self.positions[keep as usize];
        let pr = self.positions[remove as usize];
        let mid = (pk + pr) * 0.5;
        let reach = (pk - pr).length() * 2.0;

        let mut best = (q.error(mid), mid);
        for p in [pk, pr] {
            let e = q.error(p);
            if e < best.0 {
                best = (e, p);
            }
        }
        // Near-singular systems can place the optimum far outside the edge.
        if let Some(p) = q.minimizer().filter(|p| p.distance(mid) <= reach) {
            let e = q.error(p);
            if e < best.0 {
                best = (e, p);
            }
        }

        Collapse {
            cost: best.0.max(0.0),
            keep,
            remove,
            keep_stamp: self.stamps[keep as usize],
            remove_stamp: self.stamps[remove as usize],
            target: best.1,
        }
    }

    fn is_current(&self, c: &Collapse) -> bool {
        self.vertex_alive[c.keep as usize]
            && self.vertex_alive[c.remove as usize]
            && self.stamps[c.keep as usize] == c.keep_stamp
            && self.stamps[c.remove as usize] == c.remove_stamp
    }

    fn neighbors(&self, v: u32) -> Vec<u32> {
        let mut out: Vec<u32> = self.vertex_triangles[v as usize]
            .iter()
            .filter(|&&t| self.triangle_alive[t as usize])
            .flat_map(|&t| self.triangles[t as usize])
            .filter(|&n| n != v)
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Would moving `keep` and `remove` to `target` turn any surviving face over?
    fn folds_over(&self, c: &Collapse) -> bool {
        let touched = self.vertex_triangles[c.keep as usize]
            .iter()
            .chain(self.vertex_triangles[c.remove as usize].iter());

        for &t in touched {
            if !self.triangle_alive[t as usize] {
                continue;
            }
            let tri = self.triangles[t as usize];
            if tri.contains(&c.keep) && tri.contains(&c.remove) {
                continue;
            }
            let before = tri.map(|v| self.positions[v as usize]);
            let after = tri.map(|v| {
                if v == c.keep || v == c.remove {
                    c.target
                } else {
                    self.positions[v as usize]
                }
            });
            let n0 = (before[1] - before[0]).cross(before[2] - before[0]);
            let n1 = (after[1] - after[0]).cross(after[2] - after[0]);
            if n0.length_squared() == 0.0 {
                continue;
            }
            if n1.dot(n0) <= 0.0 {
                return true;
            }
        }
        false
    }

    fn collapse_until(&mut self, target_faces: usize, guard_folds: bool) {
        let mut heap = BinaryHeap::new();
        let mut seen = HashSet::new();
        for (t, tri) in self.triangles.iter().enumerate() {
            if !self.triangle_alive[t] {
                continue;
            }
            for k in 0..3 {
                let (a, b) = (tri[k], tri[(k + 1) % 3]);
                if seen.insert((a.min(b), a.max(b))) {
                    heap.push(self.candidate(a.min(b), a.max(b)));
                }
            }
        }

        while self.alive_triangles > target_faces {
            let Some(c) = heap.pop() else {
                break;
            };
            if !self.is_current(&c) {
                continue;
            }
            if guard_folds && self.folds_over(&c) {
                continue;
            }
            self.apply(&c);
            for n in self.neighbors(c.keep) {
                heap.push(self.candidate(c.keep, n));
            }
        }
    }

    fn apply(&mut self, c: &Collapse) {
        let (keep, remove) = (c.keep as usize, c.remove as usize);
        self.positions[keep] = c.target;
        let q = self.quadrics[remove];
        self.quadrics[keep].add(&q);
        self.vertex_alive[remove] = false;

        for t in std::mem::take(&mut self.vertex_triangles[remove]) {
            let ti = t as usize;
            if !self.triangle_alive[ti] {
                continue;
            }
            let tri = &mut self.triangles[ti];
            if tri.contains(&c.keep) {
                self.triangle_alive[ti] = false;
                self.alive_triangles -= 1;
            } else {
                for v in tri.iter_mut() {
                    if *v == c.remove {
                        *v = c.keep;
                    }
                }
                self.vertex_triangles[keep].push(t);
            }
        }

        let alive = &self.triangle_alive;
        self.vertex_triangles[keep].retain(|&t| alive[t as usize]);
        self.stamps[keep] += 1;
        self.stamps[remove] += 1;
    }

    fn into_mesh(self, max_faces: usize) -> TriMesh {
        let mut remap: HashMap<u32, u32> = HashMap::new();
        let mut positions = Vec::new();
        let mut indices = Vec::new();

        let survivors = self
            .triangles
            .iter()
            .zip(&self.triangle_alive)
            .filter(|(_, alive)| **alive)
            .map(|(tri, _)| *tri)
            .filter(|t| t[0] != t[1] && t[1] != t[2] && t[0] != t[2])
            .take(max_faces);

        for tri in survivors {
            for v in tri {
                let index = *remap.entry(v).or_insert_with(|| {
                    let p = self.positions[v as usize];
                    positions.push([p.x as f32, p.y as f32, p.z as f32]);
                    (positions.len() - 1) as u32
                });
                indices.push(index);
            }
        }

        TriMesh::from_indexed(positions, indices)
    }
}
