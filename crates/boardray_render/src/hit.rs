use boardray_math::Vec3;

/// Minimum accepted hit distance; rejects self-intersections when a
/// secondary ray starts on a surface. Also used to offset shadow-ray
/// origins along the normal.
pub const RAY_EPSILON: f32 = 1e-4;

/// Mutable accumulator threaded through a nearest-hit query.
///
/// `t` starts at the caller's distance bound (infinity for unbounded
/// queries) and only ever decreases: a primitive may commit a candidate
/// only when it is strictly closer than the current best. That strict
/// comparison is what keeps nearest-hit semantics correct when several
/// primitives' bounding boxes overlap along the ray, and it rejects NaN
/// candidates for free since NaN fails every comparison.
#[derive(Debug, Clone, Copy)]
pub struct HitInfo {
    /// Distance along the ray of the best hit so far.
    pub t: f32,
    pub point: Vec3,
    pub normal: Vec3,
    /// Index of the hit primitive in the scene arena; `None` until a
    /// hit is committed.
    pub prim: Option<u32>,
}

impl HitInfo {
    /// Unbounded query: any finite hit improves on the initial state.
    pub fn new() -> Self {
        Self::with_bound(f32::INFINITY)
    }

    /// Query bounded to hits closer than `max_t` (render-distance cull).
    pub fn with_bound(max_t: f32) -> Self {
        Self {
            t: max_t,
            point: Vec3::ZERO,
            normal: Vec3::ZERO,
            prim: None,
        }
    }

    pub fn is_hit(&self) -> bool {
        self.prim.is_some()
    }

    /// Whether a candidate distance would improve on the current best.
    #[inline]
    pub fn accepts(&self, t: f32) -> bool {
        t > RAY_EPSILON && t < self.t
    }

    /// Commit a hit. Callers must have checked [`HitInfo::accepts`].
    #[inline]
    pub fn commit(&mut self, t: f32, point: Vec3, normal: Vec3, prim: u32) {
        debug_assert!(t <= self.t);
        self.t = t;
        self.point = point;
        self.normal = normal;
        self.prim = Some(prim);
    }
}

impl Default for HitInfo {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_is_strictly_improving() {
        let mut hit = HitInfo::new();
        assert!(hit.accepts(5.0));
        hit.commit(5.0, Vec3::ZERO, Vec3::Z, 0);

        assert!(hit.accepts(4.0));
        assert!(!hit.accepts(5.0)); // ties do not replace the committed hit
        assert!(!hit.accepts(6.0));
    }

    #[test]
    fn test_rejects_nan_and_near_zero() {
        let hit = HitInfo::new();
        assert!(!hit.accepts(f32::NAN));
        assert!(!hit.accepts(0.0));
        assert!(!hit.accepts(RAY_EPSILON / 2.0));
    }

    #[test]
    fn test_bounded_query_rejects_beyond_bound() {
        let hit = HitInfo::with_bound(10.0);
        assert!(hit.accepts(9.0));
        assert!(!hit.accepts(11.0));
        assert!(!hit.is_hit());
    }
}
