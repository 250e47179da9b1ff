//! Layer slab: a flat extruded polygon, one copper/soldermask/silk
//! layer of the board stackup.
//!
//! Stackup layers are orders of magnitude wider than they are thick, so
//! the ray query only considers the two horizontal faces: project the
//! ray onto each plane and run a 2D point-in-polygon test. Side walls
//! are ignored; at layer thicknesses they contribute nothing visible.

use boardray_math::{Aabb, Ray, Vec2, Vec3};
use boardray_scene::{Bump, Material, MaterialId};

use crate::hit::{HitInfo, RAY_EPSILON};
use crate::primitive::facing;

pub struct LayerSlab {
    outline: Vec<Vec2>,
    z_bottom: f32,
    z_top: f32,
    /// Per-layer diffuse multiplier (inner copper layers render dimmer
    /// through the substrate).
    tint: Option<Vec3>,
    pub material: MaterialId,
    bump: Bump,
    bbox: Aabb,
}

impl LayerSlab {
    pub fn new(
        outline: Vec<Vec2>,
        z_bottom: f32,
        z_top: f32,
        tint: Option<Vec3>,
        material: MaterialId,
        bump: Bump,
    ) -> Self {
        let (z_bottom, z_top) = if z_bottom <= z_top {
            (z_bottom, z_top)
        } else {
            (z_top, z_bottom)
        };
        let mut bbox = Aabb::EMPTY;
        for p in &outline {
            bbox = bbox.union_point(Vec3::new(p.x, p.y, z_bottom));
            bbox = bbox.union_point(Vec3::new(p.x, p.y, z_top));
        }
        let bbox = if bbox.is_empty() {
            bbox
        } else {
            bbox.padded(1e-4)
        };
        Self {
            outline,
            z_bottom,
            z_top,
            tint,
            material,
            bump,
            bbox,
        }
    }

    pub fn bbox(&self) -> Aabb {
        self.bbox
    }

    pub fn diffuse_color(&self, material: &Material) -> Vec3 {
        match self.tint {
            Some(tint) => material.diffuse * tint,
            None => material.diffuse,
        }
    }

    /// Even-odd crossing test. Degenerate outlines (< 3 points) contain
    /// nothing, which makes a zero-area slab a silent no-hit rather
    /// than a fault.
    fn contains(&self, p: Vec2) -> bool {
        if self.outline.len() < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = self.outline.len() - 1;
        for i in 0..self.outline.len() {
            let a = self.outline[i];
            let b = self.outline[j];
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    pub fn intersect(&self, ray: &Ray, hit: &mut HitInfo, index: u32) -> bool {
        if ray.dir.z.abs() < 1e-12 {
            return false;
        }

        let t_bottom = (self.z_bottom - ray.origin.z) * ray.inv_dir.z;
        let t_top = (self.z_top - ray.origin.z) * ray.inv_dir.z;

        // Nearest face first; the first accepted crossing wins.
        let faces = if t_bottom <= t_top {
            [(t_bottom, -1.0), (t_top, 1.0)]
        } else {
            [(t_top, 1.0), (t_bottom, -1.0)]
        };

        for (t, outward_z) in faces {
            if !hit.accepts(t) {
                continue;
            }
            let p = ray.at(t);
            if self.contains(Vec2::new(p.x, p.y)) {
                let normal = facing(Vec3::new(0.0, 0.0, outward_z), ray);
                hit.commit(t, p, self.bump.perturb(p, normal), index);
                return true;
            }
        }
        false
    }

    pub fn intersect_p(&self, ray: &Ray, max_dist: f32) -> bool {
        if ray.dir.z.abs() < 1e-12 {
            return false;
        }
        for z_plane in [self.z_bottom, self.z_top] {
            let t = (z_plane - ray.origin.z) * ray.inv_dir.z;
            if t > RAY_EPSILON && t < max_dist {
                let p = ray.at(t);
                if self.contains(Vec2::new(p.x, p.y)) {
                    return true;
                }
            }
        }
        false
    }
}
