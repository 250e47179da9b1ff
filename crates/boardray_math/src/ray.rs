use crate::Vec3;

/// A ray in 3D space with precomputed traversal data.
///
/// Beyond origin and (normalized) direction the ray caches the
/// reciprocal direction and a per-axis sign mask. Both are consumed by
/// the AABB slab test, which runs once per BVH node and dominates
/// traversal cost; the sign mask also selects the near child during
/// ordered descent without a branch on the direction itself.
#[derive(Debug, Copy, Clone)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
    pub inv_dir: Vec3,
    /// Per-axis index of the slab entered first: 0 = min face, 1 = max face.
    pub sign: [usize; 3],
}

impl Ray {
    /// Create a new ray. The direction is normalized; a degenerate
    /// (near-zero) direction is kept as-is and will simply never hit
    /// anything, since the slab test rejects the resulting NaNs.
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        let dir = if dir.length_squared() > 1e-12 {
            dir.normalize()
        } else {
            dir
        };
        let inv_dir = Vec3::new(1.0 / dir.x, 1.0 / dir.y, 1.0 / dir.z);
        let sign = [
            (dir.x < 0.0) as usize,
            (dir.y < 0.0) as usize,
            (dir.z < 0.0) as usize,
        ];
        Self {
            origin,
            dir,
            inv_dir,
            sign,
        }
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * dir
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}
