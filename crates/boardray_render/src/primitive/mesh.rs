//! Triangulated mesh node for imported 3D models (STEP/VRML component
//! bodies, enclosures).
//!
//! A mesh can carry tens of thousands of triangles, so it owns a
//! private BVH over them; the scene-level BVH sees the mesh as one
//! primitive. Per-triangle intersection is Möller-Trumbore.

use boardray_math::{Aabb, Ray, Vec3};
use boardray_scene::{Bump, MaterialId};

use crate::bvh::Bvh;
use crate::hit::{HitInfo, RAY_EPSILON};
use crate::primitive::facing;

pub struct MeshNode {
    vertices: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
    pub material: MaterialId,
    bump: Bump,
    bvh: Bvh,
    bbox: Aabb,
}

impl MeshNode {
    /// Indices must already be validated against the vertex count
    /// (scene-build responsibility).
    pub fn new(
        vertices: Vec<Vec3>,
        triangles: Vec<[u32; 3]>,
        material: MaterialId,
        bump: Bump,
    ) -> Self {
        let tri_bounds: Vec<Aabb> = triangles
            .iter()
            .map(|tri| {
                let [a, b, c] = tri.map(|i| vertices[i as usize]);
                Aabb::from_points(a, b).union_point(c).padded(1e-4)
            })
            .collect();

        let bbox = tri_bounds
            .iter()
            .fold(Aabb::EMPTY, |acc, b| acc.union_box(b));
        let bvh = Bvh::build(&tri_bounds);

        Self {
            vertices,
            triangles,
            material,
            bump,
            bvh,
            bbox,
        }
    }

    pub fn bbox(&self) -> Aabb {
        self.bbox
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    fn triangle(&self, i: u32) -> [Vec3; 3] {
        self.triangles[i as usize].map(|v| self.vertices[v as usize])
    }

    pub fn intersect(&self, ray: &Ray, hit: &mut HitInfo, index: u32) -> bool {
        let mut any = false;
        self.bvh.intersect(ray, hit, &mut |tri, hit| {
            let [v0, v1, v2] = self.triangle(tri);
            if let Some((t, geom_normal)) = moller_trumbore(ray, v0, v1, v2) {
                if hit.accepts(t) {
                    let point = ray.at(t);
                    let normal = facing(geom_normal, ray);
                    hit.commit(t, point, self.bump.perturb(point, normal), index);
                    any = true;
                    return true;
                }
            }
            false
        });
        any
    }

    pub fn intersect_p(&self, ray: &Ray, max_dist: f32) -> bool {
        self.bvh.intersect_p(ray, max_dist, &mut |tri| {
            let [v0, v1, v2] = self.triangle(tri);
            match moller_trumbore(ray, v0, v1, v2) {
                Some((t, _)) => t > RAY_EPSILON && t < max_dist,
                None => false,
            }
        })
    }
}

/// Möller-Trumbore ray/triangle test. Returns the hit distance and the
/// (unnormalized-winding, unit-length) geometric normal. Degenerate
/// triangles fall out via the near-zero determinant check, so zero-area
/// geometry reports no-hit instead of producing NaN.
fn moller_trumbore(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<(f32, Vec3)> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = ray.dir.cross(edge2);
    let det = edge1.dot(h);
    if det.abs() < 1e-9 {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray.origin - v0;
    let u = inv_det * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = inv_det * ray.dir.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = inv_det * edge2.dot(q);
    if t <= RAY_EPSILON {
        return None;
    }
    Some((t, edge1.cross(edge2).normalize_or_zero()))
}
