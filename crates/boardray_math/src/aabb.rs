use crate::{Interval, Ray, Vec3};

/// Axis-aligned bounding box stored as min/max corners.
///
/// The empty state has `min > max` on every axis and behaves as the
/// identity for unions: it contains nothing, overlaps nothing, and is
/// missed by every ray. Invariant after any constructor or union:
/// `min <= max` componentwise, or the box is empty.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// The empty box (contains nothing).
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
        max: Vec3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
    };

    /// Create a box from ordered corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create a box from two arbitrary corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Reset to the empty state.
    pub fn reset(&mut self) {
        *self = Aabb::EMPTY;
    }

    /// True if the box contains nothing.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// The smallest box containing this box and a point.
    pub fn union_point(&self, p: Vec3) -> Aabb {
        Aabb {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    /// The smallest box containing both boxes.
    pub fn union_box(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// True if the point is inside the box (inclusive).
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Pure overlap test against another box (inclusive of touching faces).
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Slab test using the ray's precomputed reciprocal direction and
    /// sign mask.
    ///
    /// Returns the entry distance if the `[entry, exit]` span overlaps
    /// `limits`, `None` on a miss. The entry distance may be negative
    /// (and below `limits.min`) when the ray origin is inside the box;
    /// callers that care must check, the BVH prunes on the upper bound
    /// only.
    #[inline]
    pub fn entry_distance(&self, ray: &Ray, limits: Interval) -> Option<f32> {
        let mut t0 = (self.bound(ray.sign[0]).x - ray.origin.x) * ray.inv_dir.x;
        let mut t1 = (self.bound(1 - ray.sign[0]).x - ray.origin.x) * ray.inv_dir.x;

        let ty0 = (self.bound(ray.sign[1]).y - ray.origin.y) * ray.inv_dir.y;
        let ty1 = (self.bound(1 - ray.sign[1]).y - ray.origin.y) * ray.inv_dir.y;
        if t0 > ty1 || ty0 > t1 {
            return None;
        }
        // f32::max/min drop NaN lanes (0 * inf when the origin lies on a
        // slab plane), which keeps degenerate axes from poisoning the span.
        t0 = t0.max(ty0);
        t1 = t1.min(ty1);

        let tz0 = (self.bound(ray.sign[2]).z - ray.origin.z) * ray.inv_dir.z;
        let tz1 = (self.bound(1 - ray.sign[2]).z - ray.origin.z) * ray.inv_dir.z;
        if t0 > tz1 || tz0 > t1 {
            return None;
        }
        t0 = t0.max(tz0);
        t1 = t1.min(tz1);

        if t1 < limits.min || t0 > limits.max {
            return None;
        }
        Some(t0)
    }

    /// The corner selected by a ray sign index (0 = min, 1 = max).
    #[inline]
    pub fn bound(&self, i: usize) -> Vec3 {
        if i == 0 {
            self.min
        } else {
            self.max
        }
    }

    /// Center point of the box.
    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Index (0=X, 1=Y, 2=Z) of the axis with the largest extent.
    pub fn longest_axis(&self) -> usize {
        let size = self.max - self.min;
        if size.x > size.y && size.x > size.z {
            0
        } else if size.y > size.z {
            1
        } else {
            2
        }
    }

    /// Expand any axis thinner than `delta` to at least that extent.
    /// Flat geometry (layer slabs, axis-aligned triangles) would
    /// otherwise produce zero-thickness boxes that the slab test can
    /// graze inconsistently.
    pub fn padded(&self, delta: f32) -> Aabb {
        let mut min = self.min;
        let mut max = self.max;
        let pad = delta / 2.0;
        if max.x - min.x < delta {
            min.x -= pad;
            max.x += pad;
        }
        if max.y - min.y < delta {
            min.y -= pad;
            max.y += pad;
        }
        if max.z - min.z < delta {
            min.z -= pad;
            max.z += pad;
        }
        Aabb { min, max }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_orders_corners() {
        let b = Aabb::from_points(Vec3::new(5.0, -1.0, 2.0), Vec3::new(1.0, 3.0, 2.5));
        assert_eq!(b.min, Vec3::new(1.0, -1.0, 2.0));
        assert_eq!(b.max, Vec3::new(5.0, 3.0, 2.5));
    }

    #[test]
    fn test_union_contains_inputs() {
        // Union monotonicity: the result always contains everything
        // that was folded in, for arbitrary sequences.
        let points = [
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(-4.0, 0.5, 9.0),
            Vec3::new(0.0, -7.0, 0.0),
            Vec3::new(2.5, 2.5, -2.5),
        ];
        let mut b = Aabb::EMPTY;
        for p in points {
            b = b.union_point(p);
            assert!(b.contains_point(p));
        }
        for p in points {
            assert!(b.contains_point(p));
        }

        let other = Aabb::from_points(Vec3::splat(10.0), Vec3::splat(12.0));
        let merged = b.union_box(&other);
        for p in points {
            assert!(merged.contains_point(p));
        }
        assert!(merged.contains_point(other.min));
        assert!(merged.contains_point(other.max));
    }

    #[test]
    fn test_reset_restores_empty_identity() {
        let mut b = Aabb::from_points(Vec3::ZERO, Vec3::ONE);
        b.reset();
        assert!(b.is_empty());

        // A reset box is the union identity again, ready for reuse as
        // a fold accumulator.
        let other = Aabb::from_points(Vec3::splat(2.0), Vec3::splat(3.0));
        assert_eq!(b.union_box(&other), other);
        assert_eq!(b.union_point(Vec3::splat(5.0)).centroid(), Vec3::splat(5.0));
    }

    #[test]
    fn test_empty_box_is_union_identity() {
        let b = Aabb::from_points(Vec3::ZERO, Vec3::ONE);
        assert_eq!(Aabb::EMPTY.union_box(&b), b);
        assert!(Aabb::EMPTY.is_empty());
    }

    #[test]
    fn test_intersects() {
        let a = Aabb::from_points(Vec3::ZERO, Vec3::splat(5.0));
        let b = Aabb::from_points(Vec3::splat(3.0), Vec3::splat(10.0));
        let c = Aabb::from_points(Vec3::splat(6.0), Vec3::splat(8.0));

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
        assert!(b.intersects(&c));
        assert!(!Aabb::EMPTY.intersects(&a));
    }

    #[test]
    fn test_entry_distance_hit_and_miss() {
        let b = Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0));
        let limits = Interval::new(0.0, f32::INFINITY);

        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let t = b.entry_distance(&ray, limits).unwrap();
        assert!((t - 4.0).abs() < 1e-5);

        // Pointing away
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(b.entry_distance(&ray, limits).is_none());

        // Offset to the side
        let ray = Ray::new(Vec3::new(3.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(b.entry_distance(&ray, limits).is_none());
    }

    #[test]
    fn test_entry_distance_origin_inside_is_negative() {
        let b = Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let t = b
            .entry_distance(&ray, Interval::new(0.0, f32::INFINITY))
            .unwrap();
        assert!(t < 0.0);
    }

    #[test]
    fn test_entry_distance_empty_box_misses_everything() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(Aabb::EMPTY
            .entry_distance(&ray, Interval::UNIVERSE)
            .is_none());
    }

    #[test]
    fn test_entry_distance_respects_upper_limit() {
        let b = Aabb::from_points(Vec3::new(9.0, -1.0, -1.0), Vec3::new(11.0, 1.0, 1.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        assert!(b.entry_distance(&ray, Interval::new(0.0, 5.0)).is_none());
        assert!(b.entry_distance(&ray, Interval::new(0.0, 20.0)).is_some());
    }

    #[test]
    fn test_axis_parallel_ray_on_boundary() {
        // Origin on a slab plane with a zero direction component
        // produces 0 * inf = NaN in the slab test; must not panic or
        // report a bogus hit span.
        let b = Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0));
        let ray = Ray::new(Vec3::new(-1.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        // Grazing the x = -1 face; either answer is acceptable, it just
        // must be well-defined.
        let _ = b.entry_distance(&ray, Interval::new(0.0, f32::INFINITY));
    }

    #[test]
    fn test_padded_expands_thin_axes_only() {
        let flat = Aabb::from_points(Vec3::new(0.0, 0.0, 1.0), Vec3::new(5.0, 5.0, 1.0));
        let padded = flat.padded(0.001);
        assert!(padded.max.z > padded.min.z);
        assert_eq!(padded.min.x, 0.0);
        assert_eq!(padded.max.x, 5.0);
    }

    #[test]
    fn test_longest_axis() {
        assert_eq!(
            Aabb::from_points(Vec3::ZERO, Vec3::new(10.0, 1.0, 1.0)).longest_axis(),
            0
        );
        assert_eq!(
            Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 10.0, 1.0)).longest_axis(),
            1
        );
        assert_eq!(
            Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 1.0, 10.0)).longest_axis(),
            2
        );
    }
}
