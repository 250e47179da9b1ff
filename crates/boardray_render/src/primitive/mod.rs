//! Solid primitives and their ray queries.
//!
//! The shape set is fixed and closed (block, cylinder, layer slab,
//! mesh), so dispatch is a tagged enum with exhaustive matches instead
//! of trait objects: no virtual call in the innermost traversal loop,
//! and the compiler checks that every query handles every shape.
//!
//! Every variant answers three queries with deliberately different
//! costs: `intersect` (full nearest-hit with normal and bump
//! perturbation), `intersect_p` (bare any-hit boolean for shadow rays,
//! which outnumber primary rays by samples × lights and so compute
//! nothing they do not need), and `intersects_box` (conservative
//! overlap, used at BVH build; false positives allowed, false negatives
//! never).

mod block;
mod cylinder;
mod mesh;
mod slab;

pub use block::Block;
pub use cylinder::Cylinder;
pub use mesh::MeshNode;
pub use slab::LayerSlab;

use boardray_math::{Aabb, Ray, Vec3};
use boardray_scene::{Material, MaterialId};

use crate::hit::HitInfo;

/// A solid in the frozen scene arena.
pub enum Primitive {
    Block(Block),
    Cylinder(Cylinder),
    Slab(LayerSlab),
    Mesh(MeshNode),
}

impl Primitive {
    /// Nearest-hit query. On success commits into `hit` (strictly
    /// closer candidates only) with `index` as the back-reference.
    pub fn intersect(&self, ray: &Ray, hit: &mut HitInfo, index: u32) -> bool {
        match self {
            Primitive::Block(p) => p.intersect(ray, hit, index),
            Primitive::Cylinder(p) => p.intersect(ray, hit, index),
            Primitive::Slab(p) => p.intersect(ray, hit, index),
            Primitive::Mesh(p) => p.intersect(ray, hit, index),
        }
    }

    /// Any-hit query: is there any intersection closer than `max_dist`?
    pub fn intersect_p(&self, ray: &Ray, max_dist: f32) -> bool {
        match self {
            Primitive::Block(p) => p.intersect_p(ray, max_dist),
            Primitive::Cylinder(p) => p.intersect_p(ray, max_dist),
            Primitive::Slab(p) => p.intersect_p(ray, max_dist),
            Primitive::Mesh(p) => p.intersect_p(ray, max_dist),
        }
    }

    /// Conservative box-overlap test (bbox vs bbox for every shape).
    pub fn intersects_box(&self, bbox: &Aabb) -> bool {
        self.bbox().intersects(bbox)
    }

    pub fn bbox(&self) -> Aabb {
        match self {
            Primitive::Block(p) => p.bbox(),
            Primitive::Cylinder(p) => p.bbox(),
            Primitive::Slab(p) => p.bbox(),
            Primitive::Mesh(p) => p.bbox(),
        }
    }

    /// Centroid used by the BVH partition heuristic.
    pub fn centroid(&self) -> Vec3 {
        self.bbox().centroid()
    }

    pub fn material(&self) -> MaterialId {
        match self {
            Primitive::Block(p) => p.material,
            Primitive::Cylinder(p) => p.material,
            Primitive::Slab(p) => p.material,
            Primitive::Mesh(p) => p.material,
        }
    }

    /// Diffuse color at a hit. Flat for most shapes; layer slabs may
    /// tint the shared material per stackup layer.
    pub fn diffuse_color(&self, material: &Material) -> Vec3 {
        match self {
            Primitive::Slab(p) => p.diffuse_color(material),
            _ => material.diffuse,
        }
    }
}

/// Flip `normal` to oppose the ray direction, the orientation the
/// shading model expects regardless of which side was struck.
#[inline]
pub(crate) fn facing(normal: Vec3, ray: &Ray) -> Vec3 {
    if normal.dot(ray.dir) > 0.0 {
        -normal
    } else {
        normal
    }
}
