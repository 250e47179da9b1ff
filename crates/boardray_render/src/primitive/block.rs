//! Axis-aligned solid block.
//!
//! The fallback primitive: simplified board outlines, component
//! courtyards, and placeholder bodies all render as blocks. The ray
//! query is the same slab test the AABB uses, extended to report which
//! face was entered so the normal comes out of the axis that decided
//! the entry distance.

use boardray_math::{Aabb, Ray, Vec3};
use boardray_scene::{Bump, MaterialId};

use crate::hit::{HitInfo, RAY_EPSILON};
use crate::primitive::facing;

pub struct Block {
    bounds: Aabb,
    pub material: MaterialId,
    bump: Bump,
}

impl Block {
    pub fn new(bounds: Aabb, material: MaterialId, bump: Bump) -> Self {
        Self {
            bounds,
            material,
            bump,
        }
    }

    pub fn bbox(&self) -> Aabb {
        self.bounds
    }

    /// Slab test tracking the axis that produced each span endpoint,
    /// so the face normal falls out of the intersection itself.
    fn span(&self, ray: &Ray) -> Option<(f32, usize, f32, usize)> {
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;
        let mut near_axis = 0;
        let mut far_axis = 0;

        for axis in 0..3 {
            let t0 = (self.bounds.bound(ray.sign[axis])[axis] - ray.origin[axis])
                * ray.inv_dir[axis];
            let t1 = (self.bounds.bound(1 - ray.sign[axis])[axis] - ray.origin[axis])
                * ray.inv_dir[axis];
            // NaN from 0 * inf fails both comparisons and leaves the
            // span untouched, treating the degenerate axis as unbounded.
            if t0 > t_near {
                t_near = t0;
                near_axis = axis;
            }
            if t1 < t_far {
                t_far = t1;
                far_axis = axis;
            }
            if t_near > t_far {
                return None;
            }
        }
        Some((t_near, near_axis, t_far, far_axis))
    }

    pub fn intersect(&self, ray: &Ray, hit: &mut HitInfo, index: u32) -> bool {
        let Some((t_near, near_axis, t_far, far_axis)) = self.span(ray) else {
            return false;
        };

        // Entry face if in front of the ray; exit face when the origin
        // is inside the block (camera inside the board volume).
        let (t, axis) = if hit.accepts(t_near) {
            (t_near, near_axis)
        } else if hit.accepts(t_far) {
            (t_far, far_axis)
        } else {
            return false;
        };

        let mut normal = Vec3::ZERO;
        normal[axis] = 1.0;
        let normal = facing(normal, ray);
        let point = ray.at(t);
        hit.commit(t, point, self.bump.perturb(point, normal), index);
        true
    }

    pub fn intersect_p(&self, ray: &Ray, max_dist: f32) -> bool {
        match self.span(ray) {
            // A face crossing, not mere span overlap: matches the
            // nearest-hit query exactly even with the origin inside.
            Some((t_near, _, t_far, _)) => {
                (t_near > RAY_EPSILON && t_near < max_dist)
                    || (t_far > RAY_EPSILON && t_far < max_dist)
            }
            None => false,
        }
    }
}
