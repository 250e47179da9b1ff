//! Vertical capped cylinder: plated through-holes and via barrels.
//!
//! The axis is +Z (board stackup convention). The barrel is the
//! quadratic solve in the XY plane clipped to the cap planes; the caps
//! are plane hits clipped to the radius.

use boardray_math::{Aabb, Ray, Vec2, Vec3};
use boardray_scene::{Bump, MaterialId};

use crate::hit::{HitInfo, RAY_EPSILON};
use crate::primitive::facing;

pub struct Cylinder {
    center: Vec2,
    radius: f32,
    z_bottom: f32,
    z_top: f32,
    pub material: MaterialId,
    bump: Bump,
    bbox: Aabb,
}

impl Cylinder {
    pub fn new(
        center: Vec2,
        radius: f32,
        z_bottom: f32,
        z_top: f32,
        material: MaterialId,
        bump: Bump,
    ) -> Self {
        let (z_bottom, z_top) = if z_bottom <= z_top {
            (z_bottom, z_top)
        } else {
            (z_top, z_bottom)
        };
        let bbox = Aabb::new(
            Vec3::new(center.x - radius, center.y - radius, z_bottom),
            Vec3::new(center.x + radius, center.y + radius, z_top),
        )
        .padded(1e-4);
        Self {
            center,
            radius,
            z_bottom,
            z_top,
            material,
            bump,
            bbox,
        }
    }

    pub fn bbox(&self) -> Aabb {
        self.bbox
    }

    /// Both barrel roots (near, far), unclipped in z.
    fn barrel_roots(&self, ray: &Ray) -> Option<(f32, f32)> {
        let ox = ray.origin.x - self.center.x;
        let oy = ray.origin.y - self.center.y;
        let dx = ray.dir.x;
        let dy = ray.dir.y;

        let a = dx * dx + dy * dy;
        if a < 1e-12 {
            // Ray parallel to the axis; only caps can be hit.
            return None;
        }
        let half_b = ox * dx + oy * dy;
        let c = ox * ox + oy * oy - self.radius * self.radius;
        let disc = half_b * half_b - a * c;
        if disc < 0.0 {
            return None;
        }
        let sqrt_d = disc.sqrt();
        Some(((-half_b - sqrt_d) / a, (-half_b + sqrt_d) / a))
    }

    fn on_cap(&self, p: Vec3) -> bool {
        let dx = p.x - self.center.x;
        let dy = p.y - self.center.y;
        dx * dx + dy * dy <= self.radius * self.radius
    }

    pub fn intersect(&self, ray: &Ray, hit: &mut HitInfo, index: u32) -> bool {
        if self.radius <= 0.0 {
            return false;
        }

        let mut best_t = f32::INFINITY;
        let mut best_normal = Vec3::ZERO;

        if let Some((t0, t1)) = self.barrel_roots(ray) {
            for t in [t0, t1] {
                if !hit.accepts(t) || t >= best_t {
                    continue;
                }
                let p = ray.at(t);
                if p.z >= self.z_bottom && p.z <= self.z_top {
                    best_t = t;
                    best_normal =
                        Vec3::new(p.x - self.center.x, p.y - self.center.y, 0.0) / self.radius;
                    // The near root is nearest of the pair; no need to
                    // look at the far one once it lands on the barrel.
                    break;
                }
            }
        }

        if ray.dir.z.abs() > 1e-12 {
            for (z_plane, outward) in [(self.z_bottom, -1.0), (self.z_top, 1.0)] {
                let t = (z_plane - ray.origin.z) / ray.dir.z;
                if hit.accepts(t) && t < best_t && self.on_cap(ray.at(t)) {
                    best_t = t;
                    best_normal = Vec3::new(0.0, 0.0, outward);
                }
            }
        }

        if best_t.is_finite() {
            let normal = facing(best_normal, ray);
            let point = ray.at(best_t);
            hit.commit(best_t, point, self.bump.perturb(point, normal), index);
            true
        } else {
            false
        }
    }

    pub fn intersect_p(&self, ray: &Ray, max_dist: f32) -> bool {
        if self.radius <= 0.0 {
            return false;
        }

        if let Some((t0, t1)) = self.barrel_roots(ray) {
            for t in [t0, t1] {
                if t > RAY_EPSILON && t < max_dist {
                    let z = ray.origin.z + ray.dir.z * t;
                    if z >= self.z_bottom && z <= self.z_top {
                        return true;
                    }
                }
            }
        }

        if ray.dir.z.abs() > 1e-12 {
            for z_plane in [self.z_bottom, self.z_top] {
                let t = (z_plane - ray.origin.z) / ray.dir.z;
                if t > RAY_EPSILON && t < max_dist && self.on_cap(ray.at(t)) {
                    return true;
                }
            }
        }

        false
    }
}
